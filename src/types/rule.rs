use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value as Json;

/// Opaque rule identifier.
///
/// Stored records carry either a string or an integer id; both are kept as
/// their string form and always written back as a string. Records without
/// a usable id decode with an empty one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RuleId(String);

impl RuleId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// A fresh random identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().simple().to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RuleId {
    fn from(v: &str) -> Self {
        Self(v.to_owned())
    }
}

impl From<String> for RuleId {
    fn from(v: String) -> Self {
        Self(v)
    }
}

impl From<u64> for RuleId {
    fn from(v: u64) -> Self {
        Self(v.to_string())
    }
}

impl Serialize for RuleId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for RuleId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match Json::deserialize(deserializer)? {
            Json::String(s) => Ok(Self(s)),
            Json::Number(n) => Ok(Self(n.to_string())),
            other => Err(serde::de::Error::custom(format!(
                "rule id must be a string or integer, got {other}"
            ))),
        }
    }
}

/// What a rule does to its target payment methods.
///
/// `Disable` removes the targets when the rule matches; `Enable` keeps them
/// only when it matches. Anything else is carried as `Unknown` and never
/// has an effect.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Action {
    Enable,
    #[default]
    Disable,
    Unknown(String),
}

impl Action {
    /// Parse an action keyword. Unrecognized input maps to [`Action::Unknown`].
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match raw {
            "enable" => Action::Enable,
            "disable" => Action::Disable,
            other => Action::Unknown(other.to_owned()),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Action::Enable => "enable",
            Action::Disable => "disable",
            Action::Unknown(raw) => raw,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Action {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Action {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match Json::deserialize(deserializer)? {
            Json::String(s) => Action::parse(&s),
            other => Action::Unknown(other.to_string()),
        })
    }
}

/// A persisted payment rule: a country predicate paired with an
/// enable/disable action over a set of payment method ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    #[serde(default, deserialize_with = "lenient_id")]
    pub id: RuleId,
    #[serde(default, deserialize_with = "lenient_string")]
    pub title: String,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub enabled: bool,
    #[serde(default)]
    pub action: Action,
    #[serde(default, deserialize_with = "lenient_set")]
    pub payment_methods: BTreeSet<String>,
    #[serde(default, deserialize_with = "lenient_set")]
    pub countries: BTreeSet<String>,
}

impl Rule {
    /// A new enabled rule with no targets and no countries.
    pub fn new(id: impl Into<RuleId>, action: Action) -> Self {
        Self {
            id: id.into(),
            title: String::new(),
            enabled: true,
            action,
            payment_methods: BTreeSet::new(),
            countries: BTreeSet::new(),
        }
    }

    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    #[must_use]
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    #[must_use]
    pub fn methods<I, T>(mut self, methods: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.payment_methods = methods.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn countries<I, T>(mut self, countries: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.countries = countries.into_iter().map(Into::into).collect();
        self
    }

    /// Decode a stored rule list. A value that is not an array yields an
    /// empty list, and elements that are not objects are dropped.
    #[must_use]
    pub fn list_from_json(value: Json) -> Vec<Rule> {
        let Json::Array(items) = value else {
            return Vec::new();
        };
        items
            .into_iter()
            .filter_map(|item| {
                if !item.is_object() {
                    tracing::warn!(record = %item, "skipping rule record that is not an object");
                    return None;
                }
                match serde_json::from_value::<Rule>(item) {
                    Ok(rule) => Some(rule),
                    Err(e) => {
                        tracing::warn!(error = %e, "skipping malformed rule record");
                        None
                    }
                }
            })
            .collect()
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{}] {} {:?} when country in {:?}",
            self.id,
            if self.enabled { "on" } else { "off" },
            self.action,
            self.payment_methods,
            self.countries,
        )
    }
}

fn lenient_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<RuleId, D::Error> {
    Ok(match Json::deserialize(deserializer)? {
        Json::String(s) => RuleId(s),
        Json::Number(n) => RuleId(n.to_string()),
        _ => RuleId::default(),
    })
}

fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match Json::deserialize(deserializer)? {
        Json::String(s) => s,
        Json::Number(n) => n.to_string(),
        _ => String::new(),
    })
}

fn lenient_bool<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    Ok(match Json::deserialize(deserializer)? {
        Json::Bool(b) => b,
        Json::Number(n) => n.as_f64().is_some_and(|v| v != 0.0),
        _ => false,
    })
}

fn lenient_set<'de, D: Deserializer<'de>>(deserializer: D) -> Result<BTreeSet<String>, D::Error> {
    Ok(match Json::deserialize(deserializer)? {
        Json::Array(items) => items
            .into_iter()
            .filter_map(|item| match item {
                Json::String(s) => Some(s),
                _ => None,
            })
            .collect(),
        _ => BTreeSet::new(),
    })
}
