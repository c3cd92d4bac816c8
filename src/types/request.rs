use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Source of the last known billing country for the current customer,
/// typically a session or account profile.
pub trait CustomerProfile: Send + Sync {
    fn billing_country(&self) -> Option<String>;
}

impl<F> CustomerProfile for F
where
    F: Fn() -> Option<String> + Send + Sync,
{
    fn billing_country(&self) -> Option<String> {
        self()
    }
}

/// The parts of an inbound checkout request the country extractor reads.
#[derive(Clone, Default)]
pub struct Request {
    body: Option<String>,
    form: HashMap<String, String>,
    customer: Option<Arc<dyn CustomerProfile>>,
}

impl Request {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a request from a urlencoded form body. The body itself is kept
    /// as well, so the JSON step sees it and falls through.
    #[must_use]
    pub fn from_form_body(body: &str) -> Self {
        Self {
            body: Some(body.to_owned()),
            form: crate::form::parse_form(body),
            customer: None,
        }
    }

    #[must_use]
    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Set the raw body from bytes. Invalid UTF-8 is replaced, which at
    /// worst makes the body unparseable as JSON.
    #[must_use]
    pub fn body_bytes(mut self, body: &[u8]) -> Self {
        self.body = Some(String::from_utf8_lossy(body).into_owned());
        self
    }

    #[must_use]
    pub fn form_field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.form.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn customer(mut self, profile: impl CustomerProfile + 'static) -> Self {
        self.customer = Some(Arc::new(profile));
        self
    }

    #[must_use]
    pub fn raw_body(&self) -> Option<&str> {
        self.body.as_deref()
    }

    #[must_use]
    pub fn form(&self, key: &str) -> Option<&str> {
        self.form.get(key).map(String::as_str)
    }

    /// Ask the customer profile for its billing country, if one is attached.
    #[must_use]
    pub fn known_country(&self) -> Option<String> {
        self.customer.as_ref().and_then(|c| c.billing_country())
    }
}

impl fmt::Debug for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Request")
            .field("body", &self.body)
            .field("form", &self.form)
            .field("customer", &self.customer.is_some())
            .finish()
    }
}
