use crate::{CountryCode, Rule};

/// Whether `rule`'s country predicate holds for `country`.
///
/// Exact, case-sensitive membership. A rule without countries never
/// matches, and neither does a missing country.
#[must_use]
pub fn matches(rule: &Rule, country: Option<&CountryCode>) -> bool {
    match country {
        Some(c) => rule.countries.contains(c.as_str()),
        None => false,
    }
}
