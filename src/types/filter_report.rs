use std::fmt;
use std::time::Duration;

use super::country::CountryCode;
use super::rule::RuleId;

/// Detailed outcome of one filtering pass, returned by
/// [`filter_detailed()`](crate::filter_detailed).
///
/// Records which rules were applied, which of those matched the customer
/// country, what each rule actually removed, and which rules were skipped
/// (disabled or carrying an unknown action).
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub struct FilterReport {
    country: Option<CountryCode>,
    applied: Vec<RuleId>,
    matched: Vec<RuleId>,
    removed: Vec<(RuleId, Vec<String>)>,
    skipped: Vec<RuleId>,
    duration: Duration,
}

impl FilterReport {
    pub(crate) fn new(country: Option<CountryCode>) -> Self {
        Self {
            country,
            applied: Vec::new(),
            matched: Vec::new(),
            removed: Vec::new(),
            skipped: Vec::new(),
            duration: Duration::ZERO,
        }
    }

    pub(crate) fn record_applied(&mut self, id: &RuleId, matched: bool) {
        self.applied.push(id.clone());
        if matched {
            self.matched.push(id.clone());
        }
    }

    pub(crate) fn record_removed(&mut self, id: &RuleId, methods: Vec<String>) {
        if !methods.is_empty() {
            self.removed.push((id.clone(), methods));
        }
    }

    pub(crate) fn record_skipped(&mut self, id: &RuleId) {
        self.skipped.push(id.clone());
    }

    pub(crate) fn finish(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    /// The country the rules were evaluated against.
    #[must_use]
    pub fn country(&self) -> Option<&CountryCode> {
        self.country.as_ref()
    }

    /// Enabled rules with a known action, in list order.
    #[must_use]
    pub fn applied(&self) -> &[RuleId] {
        &self.applied
    }

    /// Applied rules whose country predicate held.
    #[must_use]
    pub fn matched(&self) -> &[RuleId] {
        &self.matched
    }

    /// Per rule, the methods it removed that were still present.
    #[must_use]
    pub fn removed(&self) -> &[(RuleId, Vec<String>)] {
        &self.removed
    }

    #[must_use]
    pub fn skipped(&self) -> &[RuleId] {
        &self.skipped
    }

    /// All removed method ids, in removal order.
    #[must_use]
    pub fn removed_methods(&self) -> Vec<&str> {
        self.removed
            .iter()
            .flat_map(|(_, methods)| methods.iter().map(String::as_str))
            .collect()
    }

    #[must_use]
    pub fn duration(&self) -> Duration {
        self.duration
    }
}

impl fmt::Display for FilterReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.country {
            Some(c) => write!(f, "country: {c}")?,
            None => write!(f, "country: none")?,
        }
        write!(f, ", applied: {}", self.applied.len())?;
        write!(f, ", removed: [{}]", self.removed_methods().join(", "))?;
        write!(f, ", duration: {:?}", self.duration)?;
        Ok(())
    }
}
