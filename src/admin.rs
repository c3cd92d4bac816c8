//! Rule administration: the write path used by the CLI and any management
//! API. Filtering never goes through here.

use std::collections::{BTreeSet, HashSet};

use serde_json::Value as Json;
use thiserror::Error;
use tracing::info;

use crate::sanitize::{sanitize_text, split_list};
use crate::store::{RuleStore, StoreError};
use crate::{Action, Rule, RuleId};

#[derive(Debug, Error)]
pub enum AdminError {
    #[error("invalid data format: expected a list of rules")]
    InvalidData,

    #[error("rule '{id}' not found")]
    NotFound { id: String },

    #[error("duplicate rule id '{id}'")]
    DuplicateId { id: String },

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Input for [`RuleAdmin::create`]. List fields are comma-separated.
#[derive(Debug, Clone, Default)]
pub struct NewRule {
    pub title: String,
    /// Defaults to `enable` when absent.
    pub action: Option<String>,
    pub payment_methods: String,
    pub countries: String,
}

/// CRUD operations over a [`RuleStore`].
#[derive(Debug)]
pub struct RuleAdmin<S> {
    store: S,
}

impl<S: RuleStore> RuleAdmin<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// # Errors
    ///
    /// Returns [`AdminError::Store`] if the store cannot be read.
    pub fn list(&self) -> Result<Vec<Rule>, AdminError> {
        Ok(self.store.load()?)
    }

    /// # Errors
    ///
    /// Returns [`AdminError::NotFound`] if no rule has this id.
    pub fn get(&self, id: &str) -> Result<Rule, AdminError> {
        self.store
            .load()?
            .into_iter()
            .find(|r| r.id.as_str() == id)
            .ok_or_else(|| AdminError::NotFound { id: id.to_owned() })
    }

    /// Replace the stored list with `input`, a JSON array of rule records.
    ///
    /// Every record is sanitized field by field: a missing id is generated,
    /// `enabled` defaults to false, `action` defaults to `disable`, and list
    /// fields that are not arrays become empty. Returns the stored list.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::InvalidData`] if `input` is not an array,
    /// [`AdminError::DuplicateId`] if two records share an id, or
    /// [`AdminError::Store`] on write failure.
    pub fn replace_all(&self, input: Json) -> Result<Vec<Rule>, AdminError> {
        let Json::Array(records) = input else {
            return Err(AdminError::InvalidData);
        };
        let rules: Vec<Rule> = records.iter().map(sanitize_record).collect();
        check_unique(&rules)?;
        self.store.save(&rules)?;
        info!(rules = rules.len(), "rule list replaced");
        Ok(rules)
    }

    /// Append a new enabled rule.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::Store`] on read or write failure.
    pub fn create(&self, new: NewRule) -> Result<Rule, AdminError> {
        let mut rules = self.store.load()?;
        let action = new
            .action
            .as_deref()
            .map(sanitize_text)
            .map_or(Action::Enable, |a| Action::parse(&a));

        let rule = Rule {
            id: fresh_id(&rules),
            title: sanitize_text(&new.title),
            enabled: true,
            action,
            payment_methods: split_list(&new.payment_methods).into_iter().collect(),
            countries: split_list(&new.countries).into_iter().collect(),
        };
        rules.push(rule.clone());
        self.store.save(&rules)?;
        info!(id = %rule.id, "rule created");
        Ok(rule)
    }

    /// Remove the rule with this id and return it.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::NotFound`] if no rule has this id, or
    /// [`AdminError::Store`] on read or write failure.
    pub fn delete(&self, id: &str) -> Result<Rule, AdminError> {
        let mut rules = self.store.load()?;
        let pos = rules
            .iter()
            .position(|r| r.id.as_str() == id)
            .ok_or_else(|| AdminError::NotFound { id: id.to_owned() })?;
        let removed = rules.remove(pos);
        self.store.save(&rules)?;
        info!(id = %removed.id, "rule deleted");
        Ok(removed)
    }
}

fn fresh_id(existing: &[Rule]) -> RuleId {
    loop {
        let id = RuleId::generate();
        if existing.iter().all(|r| r.id != id) {
            return id;
        }
    }
}

fn check_unique(rules: &[Rule]) -> Result<(), AdminError> {
    let mut seen = HashSet::new();
    for rule in rules {
        if !seen.insert(rule.id.as_str()) {
            return Err(AdminError::DuplicateId {
                id: rule.id.to_string(),
            });
        }
    }
    Ok(())
}

fn sanitize_record(record: &Json) -> Rule {
    let field = |name: &str| record.get(name);

    let id = match field("id") {
        Some(Json::String(s)) => Some(sanitize_text(s)),
        Some(Json::Number(n)) => Some(n.to_string()),
        _ => None,
    }
    .filter(|s| !s.is_empty())
    .map_or_else(RuleId::generate, RuleId::new);

    let action = match field("action") {
        None | Some(Json::Null) => Action::Disable,
        Some(Json::String(s)) => Action::parse(&sanitize_text(s)),
        Some(other) => Action::Unknown(other.to_string()),
    };

    Rule {
        id,
        title: field("title")
            .and_then(Json::as_str)
            .map(sanitize_text)
            .unwrap_or_default(),
        enabled: field("enabled").is_some_and(truthy),
        action,
        payment_methods: sanitize_list(field("payment_methods")),
        countries: sanitize_list(field("countries")),
    }
}

fn sanitize_list(value: Option<&Json>) -> BTreeSet<String> {
    let Some(Json::Array(items)) = value else {
        return BTreeSet::new();
    };
    items
        .iter()
        .filter_map(|item| match item {
            Json::String(s) => Some(sanitize_text(s)),
            Json::Number(n) => Some(n.to_string()),
            _ => None,
        })
        .filter(|s| !s.is_empty())
        .collect()
}

fn truthy(value: &Json) -> bool {
    match value {
        Json::Null => false,
        Json::Bool(b) => *b,
        Json::Number(n) => n.as_f64().is_some_and(|v| v != 0.0),
        Json::String(s) => !s.is_empty() && s != "0",
        Json::Array(a) => !a.is_empty(),
        Json::Object(_) => true,
    }
}
