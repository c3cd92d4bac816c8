use std::collections::HashMap;

use paycond::admin::{AdminError, NewRule, RuleAdmin};
use paycond::config::Settings;
use paycond::store::{FileRuleStore, RuleStore, StoreError};
use paycond::{Action, AdminSignal, PaymentFilter, Request};
use serde_json::json;

fn gateways() -> HashMap<String, ()> {
    [("stripe".to_owned(), ()), ("paypal".to_owned(), ()), ("cod".to_owned(), ())].into()
}

fn sorted(map: &HashMap<String, ()>) -> Vec<&str> {
    let mut keys: Vec<&str> = map.keys().map(String::as_str).collect();
    keys.sort_unstable();
    keys
}

#[test]
fn create_list_delete_round() {
    let dir = tempfile::tempdir().unwrap();
    let admin = RuleAdmin::new(FileRuleStore::new(dir.path().join("options.json")));

    let created = admin
        .create(NewRule {
            title: "<b>No COD</b> abroad".into(),
            action: Some("enable".into()),
            payment_methods: "cod, ".into(),
            countries: "IN,  LK ,".into(),
        })
        .unwrap();
    assert_eq!(created.title, "No COD abroad");
    assert!(created.enabled);
    assert_eq!(created.action, Action::Enable);
    assert_eq!(created.countries.iter().collect::<Vec<_>>(), vec!["IN", "LK"]);

    let listed = admin.list().unwrap();
    assert_eq!(listed, vec![created.clone()]);

    admin.delete(created.id.as_str()).unwrap();
    assert!(admin.list().unwrap().is_empty());
    assert!(matches!(
        admin.delete(created.id.as_str()),
        Err(AdminError::NotFound { .. })
    ));
}

#[test]
fn admin_edits_drive_filtering() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("options.json");
    let admin = RuleAdmin::new(FileRuleStore::new(&path));
    let engine = PaymentFilter::new(FileRuleStore::new(&path));
    let request = Request::new().body(r#"{"billing_address":{"country":"LK"}}"#);

    let out = engine.filter_gateways(gateways(), &request, AdminSignal::storefront());
    assert_eq!(sorted(&out), vec!["cod", "paypal", "stripe"]);

    admin
        .replace_all(json!([
            {"id": "1", "title": "cards", "enabled": "1", "action": "disable",
             "payment_methods": ["stripe"], "countries": ["LK"]},
            {"id": "2", "title": "cod", "enabled": true, "action": "enable",
             "payment_methods": ["cod"], "countries": ["IN"]},
            {"id": "3", "title": "off", "enabled": false, "action": "disable",
             "payment_methods": ["paypal"], "countries": ["LK"]}
        ]))
        .unwrap();

    let out = engine.filter_gateways(gateways(), &request, AdminSignal::storefront());
    assert_eq!(sorted(&out), vec!["paypal"]);
}

#[test]
fn replace_all_rejects_bad_input_without_writing() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("options.json");
    let admin = RuleAdmin::new(FileRuleStore::new(&path));

    assert!(matches!(
        admin.replace_all(json!({"id": "1"})),
        Err(AdminError::InvalidData)
    ));
    assert!(matches!(
        admin.replace_all(json!([{"id": "a"}, {"id": "a"}])),
        Err(AdminError::DuplicateId { .. })
    ));
    assert!(!path.exists());
}

#[test]
fn corrupt_option_file_degrades_to_no_rules() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("options.json");
    std::fs::write(&path, "{ not json").unwrap();

    let store = FileRuleStore::new(&path);
    assert!(matches!(store.load(), Err(StoreError::Malformed { .. })));
    assert!(store.get_rules().is_empty());

    let engine = PaymentFilter::new(store);
    let request = Request::new().form_field("country", "IN");
    let out = engine.filter_gateways(gateways(), &request, AdminSignal::storefront());
    assert_eq!(out.len(), 3);
}

#[test]
fn admin_writes_keep_records_without_id() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("options.json");
    std::fs::write(
        &path,
        r#"{"payment_conditions":[
            {"enabled":true,"action":"disable","countries":["IN"],"payment_methods":["stripe"]}
        ]}"#,
    )
    .unwrap();

    let admin = RuleAdmin::new(FileRuleStore::new(&path));
    let created = admin
        .create(NewRule {
            title: "cod".into(),
            payment_methods: "cod".into(),
            countries: "LK".into(),
            ..NewRule::default()
        })
        .unwrap();
    admin.delete(created.id.as_str()).unwrap();

    let rules = admin.list().unwrap();
    assert_eq!(rules.len(), 1);
    assert_eq!(rules[0].id.as_str(), "");
    assert!(rules[0].payment_methods.contains("stripe"));

    let engine = PaymentFilter::new(FileRuleStore::new(&path));
    let request = Request::new().form_field("billing_country", "IN");
    let out = engine.filter_gateways(gateways(), &request, AdminSignal::storefront());
    assert_eq!(sorted(&out), vec!["cod", "paypal"]);
}

#[test]
fn settings_point_at_option_key() {
    let dir = tempfile::tempdir().unwrap();
    let settings = Settings {
        store_path: dir.path().join("wp_options.json"),
        option_key: "csp_rules".into(),
        ..Settings::default()
    };

    let admin = RuleAdmin::new(settings.rule_store());
    admin
        .create(NewRule {
            title: "test".into(),
            ..NewRule::default()
        })
        .unwrap();

    let raw: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&settings.store_path).unwrap()).unwrap();
    assert_eq!(raw["csp_rules"].as_array().map(Vec::len), Some(1));
    assert!(raw.get("payment_conditions").is_none());
}
