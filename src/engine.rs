use std::fmt;
use std::sync::Arc;

use crate::extract::extract_country;
use crate::filter::{filter_detailed_observed, filter_observed};
use crate::guard::should_filter;
use crate::observer::{NoopObserver, Observer};
use crate::store::RuleStore;
use crate::{AdminSignal, FilterReport, GatewayRegistry, Request};

/// Filters available payment methods for a checkout request.
///
/// Holds no per-request state: the rule list is read from the store on
/// every call and the customer country is extracted fresh, so one instance
/// can serve concurrent requests behind an `Arc`.
///
/// # Example
///
/// ```
/// use std::collections::BTreeMap;
/// use paycond::{Action, AdminSignal, PaymentFilter, Request, Rule};
/// use paycond::store::MemoryRuleStore;
///
/// let store = MemoryRuleStore::new(vec![
///     Rule::new("1", Action::Disable).countries(["IN"]).methods(["stripe"]),
/// ]);
/// let engine = PaymentFilter::new(store);
///
/// let gateways: BTreeMap<String, &str> =
///     [("stripe".to_owned(), "Stripe"), ("paypal".to_owned(), "PayPal")].into();
/// let request = Request::new().body(r#"{"billing_address":{"country":"IN"}}"#);
///
/// let available = engine.filter_gateways(gateways, &request, AdminSignal::storefront());
/// assert!(!available.contains_key("stripe"));
/// ```
pub struct PaymentFilter<S> {
    store: S,
    observer: Arc<dyn Observer>,
}

impl<S: RuleStore> PaymentFilter<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            observer: Arc::new(NoopObserver),
        }
    }

    /// Attach a diagnostic observer.
    #[must_use]
    pub fn with_observer(mut self, observer: impl Observer + 'static) -> Self {
        self.observer = Arc::new(observer);
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Remove the payment methods the stored rules exclude for this request.
    ///
    /// Admin page renders and empty rule lists return `gateways` unchanged.
    pub fn filter_gateways<G: GatewayRegistry>(
        &self,
        gateways: G,
        request: &Request,
        signal: AdminSignal,
    ) -> G {
        if !should_filter(signal) {
            tracing::trace!("admin page render, filtering skipped");
            return gateways;
        }
        let rules = self.store.get_rules();
        if rules.is_empty() {
            return gateways;
        }
        let country = extract_country(request, self.observer.as_ref());
        filter_observed(gateways, &rules, country.as_ref(), self.observer.as_ref())
    }

    /// [`filter_gateways`](Self::filter_gateways) with a report of what each
    /// rule did. The report is `None` when no rules were applied at all.
    pub fn filter_gateways_detailed<G: GatewayRegistry>(
        &self,
        gateways: G,
        request: &Request,
        signal: AdminSignal,
    ) -> (G, Option<FilterReport>) {
        if !should_filter(signal) {
            return (gateways, None);
        }
        let rules = self.store.get_rules();
        if rules.is_empty() {
            return (gateways, None);
        }
        let country = extract_country(request, self.observer.as_ref());
        let (gateways, report) =
            filter_detailed_observed(gateways, &rules, country.as_ref(), self.observer.as_ref());
        (gateways, Some(report))
    }
}

impl<S: RuleStore> fmt::Debug for PaymentFilter<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PaymentFilter")
            .field("store", &self.store.name())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use super::*;
    use crate::observer::CountrySource;
    use crate::store::MemoryRuleStore;
    use crate::{Action, CountryCode, Rule, RuleId};

    fn gateways() -> HashMap<String, u8> {
        [("stripe".to_owned(), 1), ("paypal".to_owned(), 2)].into()
    }

    fn india_rule() -> Rule {
        Rule::new("1", Action::Disable)
            .countries(["IN"])
            .methods(["stripe"])
    }

    #[test]
    fn filters_storefront_request() {
        let engine = PaymentFilter::new(MemoryRuleStore::new(vec![india_rule()]));
        let req = Request::new().customer(|| Some("IN".to_owned()));
        let out = engine.filter_gateways(gateways(), &req, AdminSignal::storefront());
        assert!(!out.contains_key("stripe"));
        assert!(out.contains_key("paypal"));
    }

    #[test]
    fn admin_page_is_untouched() {
        let engine = PaymentFilter::new(MemoryRuleStore::new(vec![india_rule()]));
        let req = Request::new().form_field("country", "IN");
        let out = engine.filter_gateways(gateways(), &req, AdminSignal::admin_page());
        assert_eq!(out.len(), 2);
        let (_, report) = engine.filter_gateways_detailed(gateways(), &req, AdminSignal::admin_page());
        assert!(report.is_none());
    }

    #[test]
    fn admin_async_is_filtered() {
        let engine = PaymentFilter::new(MemoryRuleStore::new(vec![india_rule()]));
        let req = Request::new().form_field("country", "IN");
        let out = engine.filter_gateways(gateways(), &req, AdminSignal::admin_async());
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn rule_edits_apply_on_next_call() {
        let engine = PaymentFilter::new(MemoryRuleStore::default());
        let req = Request::new().form_field("country", "IN");
        assert_eq!(
            engine.filter_gateways(gateways(), &req, AdminSignal::storefront()).len(),
            2
        );

        engine.store().save(&[india_rule()]).unwrap();
        assert_eq!(
            engine.filter_gateways(gateways(), &req, AdminSignal::storefront()).len(),
            1
        );
    }

    #[derive(Default)]
    struct Recorder {
        events: Mutex<Vec<String>>,
    }

    impl Observer for Arc<Recorder> {
        fn country_resolved(&self, country: &CountryCode, source: CountrySource) {
            self.events
                .lock()
                .unwrap()
                .push(format!("country {country} {source:?}"));
        }

        fn rule_evaluated(&self, rule: &RuleId, matched: bool, removed: &[String]) {
            self.events
                .lock()
                .unwrap()
                .push(format!("rule {rule} {matched} {removed:?}"));
        }
    }

    #[test]
    fn observer_sees_checkpoints() {
        let recorder = Arc::new(Recorder::default());
        let engine = PaymentFilter::new(MemoryRuleStore::new(vec![india_rule()]))
            .with_observer(Arc::clone(&recorder));
        let req = Request::new().body(r#"{"country":"IN"}"#);
        engine.filter_gateways(gateways(), &req, AdminSignal::storefront());

        let events = recorder.events.lock().unwrap();
        assert_eq!(
            *events,
            vec![
                "country IN JsonDirect".to_owned(),
                "rule 1 true [\"stripe\"]".to_owned(),
            ]
        );
    }

    #[test]
    fn detailed_path_notifies_observer() {
        let recorder = Arc::new(Recorder::default());
        let engine = PaymentFilter::new(MemoryRuleStore::new(vec![
            india_rule(),
            Rule::new("2", Action::Enable).countries(["US"]).methods(["paypal"]),
        ]))
        .with_observer(Arc::clone(&recorder));
        let req = Request::new().form_field("country", "IN");
        let (out, _) = engine.filter_gateways_detailed(gateways(), &req, AdminSignal::storefront());
        assert!(out.is_empty());

        let events = recorder.events.lock().unwrap();
        assert_eq!(
            *events,
            vec![
                "country IN FormCountry".to_owned(),
                "rule 1 true [\"stripe\"]".to_owned(),
                "rule 2 false [\"paypal\"]".to_owned(),
            ]
        );
    }

    #[test]
    fn detailed_report_is_returned() {
        let engine = PaymentFilter::new(MemoryRuleStore::new(vec![india_rule()]));
        let req = Request::new().form_field("billing_country", "IN");
        let (out, report) =
            engine.filter_gateways_detailed(gateways(), &req, AdminSignal::storefront());
        let report = report.unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(report.removed_methods(), vec!["stripe"]);
    }
}
