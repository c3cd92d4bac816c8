//! Rule storage backends.
//!
//! Rules live as one ordered list under a single option key. The filtering
//! path only reads through [`RuleStore::get_rules`], which never fails; the
//! admin layer uses [`RuleStore::load`] and [`RuleStore::save`] directly.
//!
//! # Built-in Implementations
//!
//! - [`FileRuleStore`] - JSON option file on disk
//! - [`MemoryRuleStore`] - in-process list (for tests and embedding)

mod file;
mod memory;

pub use file::FileRuleStore;
pub use memory::MemoryRuleStore;

use std::sync::Arc;

use thiserror::Error;

use crate::Rule;

/// Option key the rule list is stored under by default.
pub const DEFAULT_OPTION_KEY: &str = "payment_conditions";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed option file {path}: {source}")]
    Malformed {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("rule store lock poisoned")]
    Poisoned,
}

/// Storage for the ordered rule list.
pub trait RuleStore: Send + Sync {
    /// Load the stored rules in order. Nothing stored yields an empty list.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the backend cannot be read.
    fn load(&self) -> Result<Vec<Rule>, StoreError>;

    /// Replace the whole stored list.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the backend cannot be written.
    fn save(&self, rules: &[Rule]) -> Result<(), StoreError>;

    /// Backend name for logging.
    fn name(&self) -> &'static str;

    /// Read the rules for a filtering pass. Backend failures degrade to an
    /// empty list so checkout is never blocked.
    fn get_rules(&self) -> Vec<Rule> {
        match self.load() {
            Ok(rules) => rules,
            Err(e) => {
                tracing::warn!(store = self.name(), error = %e, "rule store unavailable, skipping filtering");
                Vec::new()
            }
        }
    }
}

impl<S: RuleStore + ?Sized> RuleStore for Arc<S> {
    fn load(&self) -> Result<Vec<Rule>, StoreError> {
        (**self).load()
    }

    fn save(&self, rules: &[Rule]) -> Result<(), StoreError> {
        (**self).save(rules)
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}

/// A shared, type-erased rule store.
pub type BoxRuleStore = Arc<dyn RuleStore>;
