use std::path::{Path, PathBuf};

use serde_json::{Map, Value as Json};
use tracing::{debug, info, warn};

use super::{RuleStore, StoreError, DEFAULT_OPTION_KEY};
use crate::Rule;

/// Rule store backed by a JSON option file.
///
/// The file holds a JSON object of named options; the rule list is the
/// value under one key. Other options in the file are preserved on save.
///
/// ```json
/// { "payment_conditions": [ { "id": "1", "action": "disable", ... } ] }
/// ```
#[derive(Debug, Clone)]
pub struct FileRuleStore {
    path: PathBuf,
    option_key: String,
}

impl FileRuleStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_option_key(path, DEFAULT_OPTION_KEY)
    }

    pub fn with_option_key(path: impl Into<PathBuf>, option_key: impl Into<String>) -> Self {
        let path = path.into();
        let option_key = option_key.into();
        debug!(path = %path.display(), option_key = %option_key, "created file rule store");
        Self { path, option_key }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn option_key(&self) -> &str {
        &self.option_key
    }

    fn read_options(&self) -> Result<Map<String, Json>, StoreError> {
        if !self.path.exists() {
            return Ok(Map::new());
        }
        let content = std::fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(Map::new());
        }
        let value: Json = serde_json::from_str(&content).map_err(|source| StoreError::Malformed {
            path: self.path.display().to_string(),
            source,
        })?;
        match value {
            Json::Object(options) => Ok(options),
            _ => {
                warn!(path = %self.path.display(), "option file is not an object, ignoring it");
                Ok(Map::new())
            }
        }
    }
}

impl RuleStore for FileRuleStore {
    fn load(&self) -> Result<Vec<Rule>, StoreError> {
        let mut options = self.read_options()?;
        let rules = options
            .remove(&self.option_key)
            .map(Rule::list_from_json)
            .unwrap_or_default();
        debug!(path = %self.path.display(), rules = rules.len(), "rules loaded");
        Ok(rules)
    }

    fn save(&self, rules: &[Rule]) -> Result<(), StoreError> {
        let mut options = self.read_options()?;
        options.insert(self.option_key.clone(), serde_json::to_value(rules)?);
        let contents = serde_json::to_string_pretty(&Json::Object(options))?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        // Write atomically (write to temp file, then rename)
        let temp_path = self.path.with_extension("tmp");
        std::fs::write(&temp_path, contents)?;
        std::fs::rename(&temp_path, &self.path)?;

        info!(path = %self.path.display(), rules = rules.len(), "rules saved");
        Ok(())
    }

    fn name(&self) -> &'static str {
        "file"
    }
}
