//! Store configuration.
//!
//! # Responsibility
//! - Describe the full-list store key and cookie attributes.
//! - Load overrides from JSON, defaulting every missing field.
//!
//! # Invariants
//! - A missing config file is not an error; defaults apply.
//! - `list_key` must be non-empty.
//! - `cookie.max_age_days` is capped at the 400-day browser limit.

use log::info;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io::ErrorKind;
use std::path::Path;

/// Default name of the full-list store entry.
pub const DEFAULT_LIST_KEY: &str = "clinicdental_appointments";
const DEFAULT_COOKIE_MAX_AGE_DAYS: u32 = 365;
/// Longest cookie lifetime browsers honor.
pub const MAX_COOKIE_MAX_AGE_DAYS: u32 = 400;
const DEFAULT_COOKIE_MAX_BYTES: usize = 4096;

#[derive(Debug)]
pub enum ConfigError {
    Io {
        path: String,
        source: std::io::Error,
    },
    Parse(serde_json::Error),
    EmptyListKey,
    CookieMaxAgeOutOfRange(u32),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "failed to read config `{path}`: {source}"),
            Self::Parse(err) => write!(f, "invalid store config: {err}"),
            Self::EmptyListKey => write!(f, "store config `list_key` cannot be empty"),
            Self::CookieMaxAgeOutOfRange(days) => write!(
                f,
                "store config `cookie.max_age_days` must be at most {MAX_COOKIE_MAX_AGE_DAYS}, got {days}"
            ),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse(err) => Some(err),
            Self::EmptyListKey | Self::CookieMaxAgeOutOfRange(_) => None,
        }
    }
}

/// Attributes applied when the full list is written as a cookie.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CookieConfig {
    pub max_age_days: u32,
    pub path: String,
    pub same_site: String,
    /// Size above which a written `name=value` pair is reported as too large.
    pub max_bytes: usize,
}

impl Default for CookieConfig {
    fn default() -> Self {
        Self {
            max_age_days: DEFAULT_COOKIE_MAX_AGE_DAYS,
            path: "/".to_string(),
            same_site: "Lax".to_string(),
            max_bytes: DEFAULT_COOKIE_MAX_BYTES,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub list_key: String,
    pub cookie: CookieConfig,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            list_key: DEFAULT_LIST_KEY.to_string(),
            cookie: CookieConfig::default(),
        }
    }
}

impl StoreConfig {
    /// Parses and validates a JSON config document.
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.list_key.trim().is_empty() {
            return Err(ConfigError::EmptyListKey);
        }
        if self.cookie.max_age_days > MAX_COOKIE_MAX_AGE_DAYS {
            return Err(ConfigError::CookieMaxAgeOutOfRange(self.cookie.max_age_days));
        }
        Ok(())
    }
}

/// Loads a `StoreConfig` from `path`, falling back to defaults when the file
/// does not exist.
pub fn load_config(path: impl AsRef<Path>) -> Result<StoreConfig, ConfigError> {
    let path = path.as_ref();
    match std::fs::read_to_string(path) {
        Ok(text) => {
            let config = StoreConfig::from_json_str(&text)?;
            info!(
                "event=config_load module=config status=ok source=file path={}",
                path.display()
            );
            Ok(config)
        }
        Err(err) if err.kind() == ErrorKind::NotFound => {
            info!(
                "event=config_load module=config status=ok source=defaults path={}",
                path.display()
            );
            Ok(StoreConfig::default())
        }
        Err(source) => Err(ConfigError::Io {
            path: path.display().to_string(),
            source,
        }),
    }
}
