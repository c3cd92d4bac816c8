use std::collections::BTreeMap;

use paycond::store::MemoryRuleStore;
use paycond::{AdminSignal, PaymentFilter, Request};

fn main() {
    // Rules as they would be stored by the admin screen
    let store = MemoryRuleStore::from_json(
        r#"[
            {"id": "1", "title": "No cards in India", "enabled": true, "action": "disable",
             "payment_methods": ["stripe"], "countries": ["IN"]},
            {"id": "2", "title": "Local wallet for Brazil only", "enabled": true, "action": "enable",
             "payment_methods": ["pix"], "countries": ["BR"]}
        ]"#,
    )
    .expect("failed to load rules");

    let engine = PaymentFilter::new(store);

    let gateways: BTreeMap<String, &str> = [
        ("stripe".to_owned(), "Credit card"),
        ("paypal".to_owned(), "PayPal"),
        ("pix".to_owned(), "Pix"),
    ]
    .into();

    let requests = [
        ("checkout block, India", Request::new().body(r#"{"billing_address":{"country":"IN"}}"#)),
        ("classic checkout, Brazil", Request::from_form_body("billing_country=BR&payment_method=pix")),
        ("returning customer, Germany", Request::new().customer(|| Some("DE".to_owned()))),
        ("unknown country", Request::new()),
    ];

    for (label, request) in &requests {
        let (available, report) =
            engine.filter_gateways_detailed(gateways.clone(), request, AdminSignal::storefront());
        let names: Vec<&str> = available.values().copied().collect();
        println!("{label}: {}", names.join(", "));
        if let Some(report) = report {
            println!("  {report}");
        }
    }

    // Admin page renders see every method
    let available = engine.filter_gateways(gateways.clone(), &requests[0].1, AdminSignal::admin_page());
    println!("admin settings page: {} methods", available.len());
}
