pub mod admin;
pub mod config;
mod engine;
mod extract;
mod filter;
mod form;
mod guard;
mod matcher;
pub mod observer;
pub mod sanitize;
pub mod store;
mod types;

pub use engine::PaymentFilter;
pub use extract::{extract_country, parse_payload, select_country};
pub use filter::{filter, filter_detailed, filter_detailed_observed, filter_observed};
pub use form::{decode_component, parse_form};
pub use guard::should_filter;
pub use matcher::matches;
pub use types::{
    Action, AdminSignal, BatchEntry, CountryCode, CountryField, CustomerProfile, FilterReport,
    GatewayRegistry, Payload, Request, Rule, RuleId,
};
