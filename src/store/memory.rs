use std::sync::RwLock;

use super::{RuleStore, StoreError};
use crate::Rule;

/// In-memory rule store.
#[derive(Debug, Default)]
pub struct MemoryRuleStore {
    rules: RwLock<Vec<Rule>>,
}

impl MemoryRuleStore {
    #[must_use]
    pub fn new(rules: Vec<Rule>) -> Self {
        Self {
            rules: RwLock::new(rules),
        }
    }

    /// Build a store from a JSON rule list, with the same leniency as a
    /// stored option value.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Serialization`] if `json` is not valid JSON.
    pub fn from_json(json: &str) -> Result<Self, StoreError> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        Ok(Self::new(Rule::list_from_json(value)))
    }
}

impl RuleStore for MemoryRuleStore {
    fn load(&self) -> Result<Vec<Rule>, StoreError> {
        let guard = self.rules.read().map_err(|_| StoreError::Poisoned)?;
        Ok(guard.clone())
    }

    fn save(&self, rules: &[Rule]) -> Result<(), StoreError> {
        let mut guard = self.rules.write().map_err(|_| StoreError::Poisoned)?;
        *guard = rules.to_vec();
        Ok(())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
