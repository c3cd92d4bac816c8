use crate::CountryCode;

/// A country key looked up in a payload or form.
///
/// `Present(None)` means the key was set but its value sanitized to
/// nothing (or was not a string). A present key ends the lookup chain.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CountryField {
    /// Key absent or `null`.
    #[default]
    Missing,
    Present(Option<CountryCode>),
}

impl CountryField {
    /// `Some` when the key was present, carrying its country if any.
    #[must_use]
    pub fn found(&self) -> Option<Option<&CountryCode>> {
        match self {
            CountryField::Missing => None,
            CountryField::Present(country) => Some(country.as_ref()),
        }
    }
}

/// One sub-request of a batched envelope, reduced to the fields the
/// extractor cares about.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BatchEntry {
    pub path: Option<String>,
    /// `body.billing_address.country`
    pub body_country: CountryField,
    /// `data.billing_address.country`
    pub data_country: CountryField,
}

impl BatchEntry {
    /// The first present country key, `body` before `data`.
    #[must_use]
    pub fn found(&self) -> Option<Option<&CountryCode>> {
        self.body_country.found().or_else(|| self.data_country.found())
    }

    #[must_use]
    pub fn country(&self) -> Option<&CountryCode> {
        self.found().flatten()
    }
}

/// Shape of a request body, as recognized by [`parse_payload`](crate::parse_payload).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    /// Empty, or not valid JSON.
    NotJson,
    /// Top-level `billing_address.country` is set.
    Standard { country: Option<CountryCode> },
    /// A `requests` array. `direct` holds a top-level `country` to fall back
    /// on when no entry has one.
    Batch {
        entries: Vec<BatchEntry>,
        direct: CountryField,
    },
    /// Top-level `country` only.
    Direct { country: Option<CountryCode> },
    /// Valid JSON without any known country field.
    Unrecognized,
}

impl Payload {
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Payload::NotJson => "not_json",
            Payload::Standard { .. } => "standard",
            Payload::Batch { .. } => "batch",
            Payload::Direct { .. } => "direct",
            Payload::Unrecognized => "unrecognized",
        }
    }
}
