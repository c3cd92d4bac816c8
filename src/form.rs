//! `application/x-www-form-urlencoded` body parsing.

use std::collections::HashMap;

use winnow::combinator::{opt, preceded, separated};
use winnow::error::ModalResult;
use winnow::prelude::*;
use winnow::token::take_till;

fn key<'i>(input: &mut &'i str) -> ModalResult<&'i str> {
    take_till(0.., |c: char| c == '=' || c == '&').parse_next(input)
}

fn value<'i>(input: &mut &'i str) -> ModalResult<&'i str> {
    take_till(0.., |c: char| c == '&').parse_next(input)
}

fn pair<'i>(input: &mut &'i str) -> ModalResult<(&'i str, Option<&'i str>)> {
    (key, opt(preceded('=', value))).parse_next(input)
}

fn pairs<'i>(input: &mut &'i str) -> ModalResult<Vec<(&'i str, Option<&'i str>)>> {
    separated(0.., pair, '&').parse_next(input)
}

/// Parse a urlencoded body into a field map.
///
/// Keys without a value map to the empty string, empty keys are dropped,
/// and a repeated key keeps its last value.
#[must_use]
pub fn parse_form(body: &str) -> HashMap<String, String> {
    let mut fields = HashMap::new();
    let Ok(parsed) = pairs.parse(body.trim()) else {
        return fields;
    };
    for (raw_key, raw_value) in parsed {
        let key = decode_component(raw_key);
        if key.is_empty() {
            continue;
        }
        fields.insert(key, raw_value.map(decode_component).unwrap_or_default());
    }
    fields
}

/// Percent-decode one component, treating `+` as a space.
/// Malformed escapes are kept literally.
#[must_use]
pub fn decode_component(raw: &str) -> String {
    let bytes = raw.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'+' => out.push(b' '),
            b'%' if i + 2 < bytes.len() => {
                match (hex_val(bytes[i + 1]), hex_val(bytes[i + 2])) {
                    (Some(hi), Some(lo)) => {
                        out.push((hi << 4) | lo);
                        i += 3;
                        continue;
                    }
                    _ => out.push(b'%'),
                }
            }
            b => out.push(b),
        }
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

fn hex_val(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}
