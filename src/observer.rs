//! Diagnostic hooks invoked at extraction and filtering checkpoints.
//!
//! Observers are advisory: they receive borrowed data, return nothing, and
//! cannot influence the result of a filtering pass.

use crate::{CountryCode, Payload, RuleId};

/// Where an extracted country came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountrySource {
    JsonStandard,
    JsonBatch { index: usize },
    JsonDirect,
    FormCountry,
    FormBillingCountry,
    CustomerProfile,
}

/// Receives diagnostic events. Every method defaults to a no-op.
pub trait Observer: Send + Sync {
    fn payload_parsed(&self, _payload: &Payload) {}

    fn json_rejected(&self, _error: &serde_json::Error) {}

    fn country_resolved(&self, _country: &CountryCode, _source: CountrySource) {}

    /// A country key was set at `source` but held no usable value.
    fn country_blank(&self, _source: CountrySource) {}

    fn country_missing(&self) {}

    fn rule_evaluated(&self, _rule: &RuleId, _matched: bool, _removed: &[String]) {}
}

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl Observer for NoopObserver {}

/// Forwards events to `tracing` at debug level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl Observer for TracingObserver {
    fn payload_parsed(&self, payload: &Payload) {
        match payload {
            Payload::Batch { entries, .. } => {
                tracing::debug!(kind = payload.kind(), entries = entries.len(), "payload parsed");
                for (index, entry) in entries.iter().enumerate() {
                    tracing::trace!(
                        index,
                        path = entry.path.as_deref().unwrap_or("unknown"),
                        "batch entry"
                    );
                }
            }
            _ => tracing::debug!(kind = payload.kind(), "payload parsed"),
        }
    }

    fn json_rejected(&self, error: &serde_json::Error) {
        tracing::debug!(%error, "request body is not JSON");
    }

    fn country_resolved(&self, country: &CountryCode, source: CountrySource) {
        tracing::debug!(%country, ?source, "customer country resolved");
    }

    fn country_blank(&self, source: CountrySource) {
        tracing::debug!(?source, "country field is blank");
    }

    fn country_missing(&self) {
        tracing::debug!("no customer country found");
    }

    fn rule_evaluated(&self, rule: &RuleId, matched: bool, removed: &[String]) {
        tracing::debug!(rule = %rule, matched, ?removed, "rule evaluated");
    }
}
