//! Crate-level error type.
//!
//! Local input rejections, storage failures and transport failures share one
//! enum so call sites can propagate with `?`. Formatting and escaping never
//! produce errors.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TutorError {
    /// The trimmed message was empty; nothing is recorded or sent.
    #[error("message is empty")]
    EmptyMessage,

    /// The message exceeds the submission cap and is never sent.
    #[error("message too long: {len} UTF-16 code units (max {max})")]
    InputTooLarge { len: usize, max: usize },

    /// Another submission on the same session is still in flight.
    #[error("a message is already being processed")]
    Busy,

    /// The chat backend replied with a non-2xx status.
    #[error("HTTP error! status: {status}")]
    Http { status: u16 },

    /// Connection, timeout or other transport-level failure.
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("stored settings are {len} UTF-16 code units, over the {max} limit")]
    SettingsTooLarge { len: usize, max: usize },

    #[error("stored settings are not a JSON object")]
    SettingsNotObject,

    #[error("invalid storage key {0:?}")]
    InvalidKey(String),

    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config file {}: {source}", path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

pub type Result<T> = std::result::Result<T, TutorError>;
