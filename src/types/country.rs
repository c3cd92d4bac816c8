use std::fmt;

use crate::sanitize::sanitize_text;

/// A sanitized, non-empty country code as supplied by the customer.
///
/// No case folding or ISO validation happens here: matching against rule
/// countries is an exact string comparison.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CountryCode(String);

impl CountryCode {
    /// Sanitize `raw` and wrap it. Returns `None` when nothing is left.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let clean = sanitize_text(raw);
        if clean.is_empty() {
            None
        } else {
            Some(Self(clean))
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CountryCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CountryCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
