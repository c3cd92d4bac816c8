use std::time::Instant;

use crate::matcher::matches;
use crate::observer::{NoopObserver, Observer};
use crate::{Action, CountryCode, FilterReport, GatewayRegistry, Rule};

enum Step {
    Skipped,
    Applied { matched: bool, removed: Vec<String> },
}

/// Fold `rules` over `gateways` in list order and return what is left.
///
/// A matching `disable` rule removes its methods; a non-matching `enable`
/// rule removes its methods. Disabled rules and unknown actions are skipped.
/// Removal is the only operation, so the result is always a subset of the
/// input and no rule can bring back a method an earlier rule removed.
pub fn filter<G: GatewayRegistry>(gateways: G, rules: &[Rule], country: Option<&CountryCode>) -> G {
    filter_observed(gateways, rules, country, &NoopObserver)
}

/// [`filter`] with an observer notified after every applied rule.
pub fn filter_observed<G: GatewayRegistry>(
    mut gateways: G,
    rules: &[Rule],
    country: Option<&CountryCode>,
    observer: &dyn Observer,
) -> G {
    for rule in rules {
        if let Step::Applied { matched, removed } = apply(&mut gateways, rule, country) {
            observer.rule_evaluated(&rule.id, matched, &removed);
        }
    }
    gateways
}

/// [`filter`], also returning a [`FilterReport`] of what each rule did.
pub fn filter_detailed<G: GatewayRegistry>(
    gateways: G,
    rules: &[Rule],
    country: Option<&CountryCode>,
) -> (G, FilterReport) {
    filter_detailed_observed(gateways, rules, country, &NoopObserver)
}

/// [`filter_detailed`] with an observer notified after every applied rule.
pub fn filter_detailed_observed<G: GatewayRegistry>(
    mut gateways: G,
    rules: &[Rule],
    country: Option<&CountryCode>,
    observer: &dyn Observer,
) -> (G, FilterReport) {
    let start = Instant::now();
    let mut report = FilterReport::new(country.cloned());

    for rule in rules {
        match apply(&mut gateways, rule, country) {
            Step::Skipped => report.record_skipped(&rule.id),
            Step::Applied { matched, removed } => {
                observer.rule_evaluated(&rule.id, matched, &removed);
                report.record_applied(&rule.id, matched);
                report.record_removed(&rule.id, removed);
            }
        }
    }

    (gateways, report.finish(start.elapsed()))
}

fn apply<G: GatewayRegistry>(gateways: &mut G, rule: &Rule, country: Option<&CountryCode>) -> Step {
    if !rule.enabled {
        return Step::Skipped;
    }
    let matched = matches(rule, country);
    let strip = match rule.action {
        Action::Disable => matched,
        Action::Enable => !matched,
        Action::Unknown(_) => return Step::Skipped,
    };

    let mut removed = Vec::new();
    if strip {
        for method in &rule.payment_methods {
            if gateways.remove_method(method) {
                removed.push(method.clone());
            }
        }
    }
    Step::Applied { matched, removed }
}
