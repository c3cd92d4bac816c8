mod country;
mod filter_report;
mod gateway;
mod payload;
mod request;
mod rule;
mod signal;

pub use country::CountryCode;
pub use filter_report::FilterReport;
pub use gateway::GatewayRegistry;
pub use payload::{BatchEntry, CountryField, Payload};
pub use request::{CustomerProfile, Request};
pub use rule::{Action, Rule, RuleId};
pub use signal::AdminSignal;
