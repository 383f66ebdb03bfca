//! Client configuration: TOML file, then environment, then CLI flags.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

use crate::error::{Result, TutorError};

pub const DEFAULT_CONFIG_FILE: &str = "tutor-chat.toml";
pub const ENDPOINT_ENV: &str = "TUTOR_CHAT_ENDPOINT";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL of the chat backend; `/api/chat` is appended.
    pub endpoint: String,
    /// Directory holding persisted preferences.
    pub storage_dir: PathBuf,
    pub request_timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://127.0.0.1:5000".to_string(),
            storage_dir: PathBuf::from(".tutor-chat"),
            request_timeout_secs: 30,
        }
    }
}

impl ClientConfig {
    pub fn from_toml(text: &str, path: &Path) -> Result<Self> {
        toml::from_str(text).map_err(|source| TutorError::Config {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Read `path` if given, else [`DEFAULT_CONFIG_FILE`] when it exists, else
    /// defaults. [`ENDPOINT_ENV`] overrides the endpoint in every case.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    Self::from_file(default_path)?
                } else {
                    Self::default()
                }
            }
        };

        if let Ok(endpoint) = std::env::var(ENDPOINT_ENV) {
            if !endpoint.trim().is_empty() {
                config.endpoint = endpoint.trim().to_string();
            }
        }
        Ok(config)
    }

    fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        let config = Self::from_toml(&text, path)?;
        debug!(path = %path.display(), ?config, "loaded config");
        Ok(config)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }
}
