use serde_json::Value as Json;

use crate::observer::{CountrySource, Observer};
use crate::{BatchEntry, CountryCode, CountryField, Payload, Request};

const STANDARD: &str = "/billing_address/country";
const DIRECT: &str = "/country";
const BATCH_BODY: &str = "/body/billing_address/country";
const BATCH_DATA: &str = "/data/billing_address/country";

/// Classify a raw request body.
///
/// Never fails: anything that is not JSON comes back as [`Payload::NotJson`].
#[must_use]
pub fn parse_payload(body: &str) -> Payload {
    decode(body).unwrap_or(Payload::NotJson)
}

/// Pick the customer country out of a classified payload.
///
/// `Standard` wins outright. A batch yields its first entry with a country
/// key (body before data), then its top-level `country`. A key that is set
/// but blank yields `None`.
#[must_use]
pub fn select_country(payload: &Payload) -> Option<&CountryCode> {
    select_with_source(payload).and_then(|(country, _)| country)
}

/// Resolve the customer country for a request.
///
/// Sources are tried in order: the JSON body, the `country` and
/// `billing_country` form fields, then the customer profile. The first
/// JSON or form key that is set decides, even when its value is blank;
/// only the customer profile is skipped when empty.
pub fn extract_country(request: &Request, observer: &dyn Observer) -> Option<CountryCode> {
    if let Some(body) = request.raw_body() {
        match decode(body) {
            Ok(payload) => {
                observer.payload_parsed(&payload);
                if let Some((country, source)) = select_with_source(&payload) {
                    return resolved(country, source, observer);
                }
            }
            Err(e) => observer.json_rejected(&e),
        }
    }

    let form_fields = [
        ("country", CountrySource::FormCountry),
        ("billing_country", CountrySource::FormBillingCountry),
    ];
    for (key, source) in form_fields {
        if let Some(raw) = request.form(key) {
            return resolved(CountryCode::parse(raw).as_ref(), source, observer);
        }
    }

    if let Some(country) = request
        .known_country()
        .as_deref()
        .and_then(CountryCode::parse)
    {
        observer.country_resolved(&country, CountrySource::CustomerProfile);
        return Some(country);
    }

    observer.country_missing();
    None
}

fn resolved(
    country: Option<&CountryCode>,
    source: CountrySource,
    observer: &dyn Observer,
) -> Option<CountryCode> {
    match country {
        Some(country) => {
            observer.country_resolved(country, source);
            Some(country.clone())
        }
        None => {
            observer.country_blank(source);
            None
        }
    }
}

fn decode(body: &str) -> Result<Payload, serde_json::Error> {
    if body.trim().is_empty() {
        return Ok(Payload::NotJson);
    }
    let value: Json = serde_json::from_str(body)?;
    Ok(classify(&value))
}

fn classify(value: &Json) -> Payload {
    if !value.is_object() {
        return Payload::Unrecognized;
    }
    if let CountryField::Present(country) = country_at(value, STANDARD) {
        return Payload::Standard { country };
    }
    let direct = country_at(value, DIRECT);
    if let Some(Json::Array(requests)) = value.get("requests") {
        return Payload::Batch {
            entries: requests.iter().map(batch_entry).collect(),
            direct,
        };
    }
    match direct {
        CountryField::Present(country) => Payload::Direct { country },
        CountryField::Missing => Payload::Unrecognized,
    }
}

fn batch_entry(entry: &Json) -> BatchEntry {
    BatchEntry {
        path: entry.get("path").and_then(Json::as_str).map(str::to_owned),
        body_country: country_at(entry, BATCH_BODY),
        data_country: country_at(entry, BATCH_DATA),
    }
}

// Any non-null value counts as set; only strings can carry a country.
fn country_at(value: &Json, pointer: &str) -> CountryField {
    match value.pointer(pointer) {
        None | Some(Json::Null) => CountryField::Missing,
        Some(Json::String(s)) => CountryField::Present(CountryCode::parse(s)),
        Some(_) => CountryField::Present(None),
    }
}

fn select_with_source(payload: &Payload) -> Option<(Option<&CountryCode>, CountrySource)> {
    match payload {
        Payload::Standard { country } => Some((country.as_ref(), CountrySource::JsonStandard)),
        Payload::Batch { entries, direct } => entries
            .iter()
            .enumerate()
            .find_map(|(index, entry)| {
                entry
                    .found()
                    .map(|c| (c, CountrySource::JsonBatch { index }))
            })
            .or_else(|| direct.found().map(|c| (c, CountrySource::JsonDirect))),
        Payload::Direct { country } => Some((country.as_ref(), CountrySource::JsonDirect)),
        Payload::NotJson | Payload::Unrecognized => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observer::NoopObserver;
    use serde_json::json;

    fn extract(request: &Request) -> Option<String> {
        extract_country(request, &NoopObserver).map(|c| c.as_str().to_owned())
    }

    fn json_request(value: Json) -> Request {
        Request::new().body(value.to_string())
    }

    #[test]
    fn standard_shape() {
        let payload = parse_payload(r#"{"billing_address":{"country":" FR "}}"#);
        assert_eq!(
            payload,
            Payload::Standard {
                country: CountryCode::parse("FR")
            }
        );
        assert_eq!(select_country(&payload).unwrap().as_str(), "FR");
    }

    #[test]
    fn standard_beats_batch() {
        let req = json_request(json!({
            "billing_address": { "country": "US" },
            "requests": [{ "body": { "billing_address": { "country": "IQ" } } }],
        }));
        assert_eq!(extract(&req).as_deref(), Some("US"));
    }

    #[test]
    fn batch_scans_entries_in_order() {
        let req = json_request(json!({
            "requests": [
                { "path": "/x" },
                { "body": { "billing_address": { "country": "IQ" } } },
                { "body": { "billing_address": { "country": "DE" } } },
            ],
        }));
        assert_eq!(extract(&req).as_deref(), Some("IQ"));
    }

    #[test]
    fn batch_entry_prefers_body_over_data() {
        let payload = parse_payload(
            &json!({
                "requests": [{
                    "data": { "billing_address": { "country": "BR" } },
                    "body": { "billing_address": { "country": "AR" } },
                }],
            })
            .to_string(),
        );
        assert_eq!(select_country(&payload).unwrap().as_str(), "AR");
    }

    #[test]
    fn batch_entry_falls_back_to_data() {
        let req = json_request(json!({
            "requests": [{ "data": { "billing_address": { "country": "BR" } } }],
        }));
        assert_eq!(extract(&req).as_deref(), Some("BR"));
    }

    #[test]
    fn empty_batch_falls_through_to_direct() {
        let req = json_request(json!({
            "requests": [{ "path": "/a" }, "junk", 3],
            "country": "NL",
        }));
        assert_eq!(extract(&req).as_deref(), Some("NL"));
    }

    #[test]
    fn non_array_requests_uses_direct() {
        let payload = parse_payload(r#"{"requests":"nope","country":"SE"}"#);
        assert_eq!(payload.kind(), "direct");
        assert_eq!(select_country(&payload).unwrap().as_str(), "SE");
    }

    #[test]
    fn non_string_country_is_set_but_blank() {
        let payload = parse_payload(r#"{"billing_address":{"country":42},"country":"PT"}"#);
        assert_eq!(payload, Payload::Standard { country: None });
        assert_eq!(select_country(&payload), None);
    }

    #[test]
    fn null_country_counts_as_missing() {
        let payload = parse_payload(r#"{"billing_address":{"country":null},"country":"PT"}"#);
        assert_eq!(select_country(&payload).unwrap().as_str(), "PT");
    }

    #[test]
    fn blank_json_country_stops_the_chain() {
        let req = json_request(json!({ "billing_address": { "country": "  " } }))
            .form_field("billing_country", "CA")
            .customer(|| Some("IN".to_owned()));
        assert_eq!(extract(&req), None);

        let req = Request::new()
            .body(r#"{"billing_address":{"country":""}}"#)
            .customer(|| Some("IN".to_owned()));
        assert_eq!(extract(&req), None);
    }

    #[test]
    fn blank_batch_entry_stops_the_scan() {
        let req = json_request(json!({
            "requests": [
                { "body": { "billing_address": { "country": "" } } },
                { "body": { "billing_address": { "country": "DE" } } },
            ],
            "country": "NL",
        }));
        assert_eq!(extract(&req), None);
    }

    #[test]
    fn blank_form_country_stops_the_chain() {
        let req = Request::from_form_body("country=&billing_country=CA")
            .customer(|| Some("IN".to_owned()));
        assert_eq!(extract(&req), None);
    }

    #[test]
    fn missing_keys_fall_through_to_profile() {
        let req = json_request(json!({ "billing_address": { "city": "Pune" } }))
            .form_field("billing_state", "MH")
            .customer(|| Some("IN".to_owned()));
        assert_eq!(extract(&req).as_deref(), Some("IN"));
    }

    #[test]
    fn top_level_array_is_unrecognized() {
        assert_eq!(parse_payload("[1,2,3]"), Payload::Unrecognized);
        assert_eq!(parse_payload("\"IN\""), Payload::Unrecognized);
    }

    #[test]
    fn malformed_json_falls_back_to_form() {
        let req = Request::new()
            .body("{not json")
            .form_field("country", "IN");
        assert_eq!(parse_payload("{not json"), Payload::NotJson);
        assert_eq!(extract(&req).as_deref(), Some("IN"));
    }

    #[test]
    fn form_country_before_billing_country() {
        let req = Request::new()
            .form_field("billing_country", "CA")
            .form_field("country", "MX");
        assert_eq!(extract(&req).as_deref(), Some("MX"));
    }

    #[test]
    fn legacy_form_body() {
        let req = Request::from_form_body("billing_country=CA&terms=on");
        assert_eq!(extract(&req).as_deref(), Some("CA"));
    }

    #[test]
    fn customer_profile_is_last_resort() {
        let req = Request::new()
            .body(r#"{"cart":{}}"#)
            .customer(|| Some("IN".to_owned()));
        assert_eq!(extract(&req).as_deref(), Some("IN"));
    }

    #[test]
    fn empty_profile_country_is_none() {
        let req = Request::new().customer(|| Some(String::new()));
        assert_eq!(extract(&req), None);
    }

    #[test]
    fn nothing_resolvable() {
        assert_eq!(extract(&Request::new()), None);
        assert_eq!(parse_payload(""), Payload::NotJson);
        assert_eq!(parse_payload("   "), Payload::NotJson);
    }

    #[test]
    fn extracted_value_is_sanitized() {
        let req = json_request(json!({ "country": "<b>IQ</b>\n" }));
        assert_eq!(extract(&req).as_deref(), Some("IQ"));
    }
}
