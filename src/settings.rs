//! User preferences persisted under a single storage key.
//!
//! Reading is best-effort: anything absent, oversized, unparseable or of the
//! wrong shape yields [`Settings::default`], and a corrupted value is removed
//! so the next read starts clean. Only `language` and `autoPlayAudio` are ever
//! read or written.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{Result, TutorError};
use crate::storage::KeyValueStore;

pub const SETTINGS_KEY: &str = "frenchTeacherSettings";
/// Stored values longer than this (in UTF-16 code units) are treated as corrupted.
pub const MAX_SETTINGS_LEN: usize = 10_000;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Zh,
    Fr,
    En,
}

impl Language {
    pub const ALL: [Language; 3] = [Language::Zh, Language::Fr, Language::En];

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "zh" => Some(Language::Zh),
            "fr" => Some(Language::Fr),
            "en" => Some(Language::En),
            _ => None,
        }
    }

    /// Unknown codes fall back to `zh`.
    pub fn coerce(code: &str) -> Self {
        Self::from_code(code).unwrap_or_else(|| {
            warn!(code, "unknown language code, using zh");
            Language::Zh
        })
    }

    pub fn code(&self) -> &'static str {
        match self {
            Language::Zh => "zh",
            Language::Fr => "fr",
            Language::En => "en",
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub language: Language,
    pub auto_play_audio: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            language: Language::Zh,
            auto_play_audio: true,
        }
    }
}

/// Parse a stored settings value.
///
/// Fails on oversized input, invalid JSON and non-object JSON. Within an
/// object, unknown fields are ignored and a missing or mistyped field keeps
/// its default.
pub fn parse_settings(raw: &str) -> Result<Settings> {
    let len = raw.encode_utf16().count();
    if len > MAX_SETTINGS_LEN {
        return Err(TutorError::SettingsTooLarge {
            len,
            max: MAX_SETTINGS_LEN,
        });
    }

    let value: Value = serde_json::from_str(raw)?;
    let Value::Object(fields) = value else {
        return Err(TutorError::SettingsNotObject);
    };

    let mut settings = Settings::default();
    if let Some(language) = fields
        .get("language")
        .and_then(Value::as_str)
        .and_then(Language::from_code)
    {
        settings.language = language;
    }
    if let Some(auto_play) = fields.get("autoPlayAudio").and_then(Value::as_bool) {
        settings.auto_play_audio = auto_play;
    }
    Ok(settings)
}

/// Load/validate/save round trip over a [`KeyValueStore`].
#[derive(Debug, Clone)]
pub struct SettingsStore<S> {
    store: S,
}

impl<S: KeyValueStore> SettingsStore<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn into_inner(self) -> S {
        self.store
    }

    pub fn inner(&self) -> &S {
        &self.store
    }

    /// Never fails. Corrupted values are removed from storage.
    pub fn load(&mut self) -> Settings {
        let raw = match self.store.get(SETTINGS_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Settings::default(),
            Err(e) => {
                warn!(error = %e, "failed to read settings, using defaults");
                return Settings::default();
            }
        };

        match parse_settings(&raw) {
            Ok(settings) => {
                debug!(?settings, "loaded settings");
                settings
            }
            Err(e) => {
                warn!(error = %e, "discarding corrupted settings");
                if let Err(e) = self.store.remove(SETTINGS_KEY) {
                    warn!(error = %e, "failed to remove corrupted settings");
                }
                Settings::default()
            }
        }
    }

    /// Overwrite the stored value with exactly `language` and `autoPlayAudio`.
    pub fn save(&mut self, settings: &Settings) -> Result<()> {
        let serialized = serde_json::to_string(settings)?;
        self.store.set(SETTINGS_KEY, &serialized)?;
        debug!(?settings, "saved settings");
        Ok(())
    }

    /// Only an explicit stored `false` disables autoplay.
    pub fn auto_play_enabled(&self) -> bool {
        let raw = match self.store.get(SETTINGS_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return true,
            Err(e) => {
                warn!(error = %e, "failed to read auto-play setting");
                return true;
            }
        };
        if raw.encode_utf16().count() > MAX_SETTINGS_LEN {
            return true;
        }
        match serde_json::from_str::<Value>(&raw) {
            Ok(value) => value.get("autoPlayAudio") != Some(&Value::Bool(false)),
            Err(e) => {
                warn!(error = %e, "failed to parse auto-play setting");
                true
            }
        }
    }
}
