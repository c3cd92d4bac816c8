//! Runtime settings for the command-line tool.
//!
//! Settings come from an optional JSON file and are then overridden by
//! environment variables:
//!
//! ```json
//! { "store_path": "/var/lib/paycond/options.json", "option_key": "payment_conditions", "log_level": "info" }
//! ```
//!
//! | variable             | field        |
//! |----------------------|--------------|
//! | `PAYCOND_STORE`      | `store_path` |
//! | `PAYCOND_OPTION_KEY` | `option_key` |
//! | `PAYCOND_LOG`        | `log_level`  |

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::store::{FileRuleStore, DEFAULT_OPTION_KEY};

pub const ENV_STORE: &str = "PAYCOND_STORE";
pub const ENV_OPTION_KEY: &str = "PAYCOND_OPTION_KEY";
pub const ENV_LOG: &str = "PAYCOND_LOG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read settings file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid settings file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub store_path: PathBuf,
    pub option_key: String,
    pub log_level: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            store_path: PathBuf::from("options.json"),
            option_key: DEFAULT_OPTION_KEY.to_owned(),
            log_level: "warn".to_owned(),
        }
    }
}

impl Settings {
    /// Load settings from `path` (if given) and apply environment overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read or parsed.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let settings = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        Ok(settings.with_env(|key| std::env::var(key).ok()))
    }

    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    /// Apply overrides from an environment lookup. Empty values are ignored.
    #[must_use]
    pub fn with_env(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        if let Some(path) = get(ENV_STORE) {
            self.store_path = PathBuf::from(path);
        }
        if let Some(key) = get(ENV_OPTION_KEY) {
            self.option_key = key;
        }
        if let Some(level) = get(ENV_LOG) {
            self.log_level = level;
        }
        self
    }

    /// The rule store these settings point at.
    #[must_use]
    pub fn rule_store(&self) -> FileRuleStore {
        FileRuleStore::with_option_key(&self.store_path, &self.option_key)
    }
}
