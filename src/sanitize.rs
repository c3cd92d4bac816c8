//! Text sanitization for values lifted out of request payloads.
//!
//! Follows the storefront's text-field rules: `script` and `style`
//! elements are removed with their content, other tags are stripped,
//! percent-encoded octets are dropped, whitespace and control characters
//! collapse to a single space, and the result is trimmed.

/// Sanitize a single-line text value.
#[must_use]
pub fn sanitize_text(raw: &str) -> String {
    let stripped = strip_tags(&strip_raw_text_elements(raw));
    let stripped = strip_octets(&stripped);

    let mut out = String::with_capacity(stripped.len());
    let mut pending_space = false;
    for c in stripped.chars() {
        if c.is_whitespace() || c.is_control() {
            pending_space = true;
            continue;
        }
        if pending_space && !out.is_empty() {
            out.push(' ');
        }
        pending_space = false;
        out.push(c);
    }
    out
}

/// Split a comma-separated list, sanitizing each item and dropping empties.
#[must_use]
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(sanitize_text)
        .filter(|s| !s.is_empty())
        .collect()
}

const RAW_TEXT_ELEMENTS: [&str; 2] = ["script", "style"];

// `<script ...>...</script>` and `<style ...>...</style>`, case-insensitive.
// An element without its closing tag is left for `strip_tags`.
fn strip_raw_text_elements(raw: &str) -> String {
    let lower = raw.to_ascii_lowercase();
    let mut out = String::with_capacity(raw.len());
    let mut pos = 0;
    while let Some(found) = lower[pos..].find('<') {
        let start = pos + found;
        let end = RAW_TEXT_ELEMENTS
            .iter()
            .find(|name| lower[start + 1..].starts_with(*name))
            .and_then(|name| {
                let body = start + lower[start..].find('>')? + 1;
                let close = format!("</{name}>");
                Some(body + lower[body..].find(&close)? + close.len())
            });
        match end {
            Some(end) => {
                out.push_str(&raw[pos..start]);
                pos = end;
            }
            None => {
                out.push_str(&raw[pos..=start]);
                pos = start + 1;
            }
        }
    }
    out.push_str(&raw[pos..]);
    out
}

// A '<' only opens a tag when followed by a letter, '/', '!' or '?'.
// An unclosed tag swallows the rest of the input.
fn strip_tags(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();
    while let Some(c) = chars.next() {
        let opens_tag = c == '<'
            && chars
                .peek()
                .is_some_and(|n| n.is_ascii_alphabetic() || matches!(n, '/' | '!' | '?'));
        if !opens_tag {
            out.push(c);
            continue;
        }
        let mut closed = false;
        for inner in chars.by_ref() {
            if inner == '>' {
                closed = true;
                break;
            }
        }
        if !closed {
            break;
        }
    }
    out
}

fn strip_octets(raw: &str) -> String {
    let bytes = raw.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%'
            && i + 2 < bytes.len()
            && bytes[i + 1].is_ascii_hexdigit()
            && bytes[i + 2].is_ascii_hexdigit()
        {
            i += 3;
            continue;
        }
        out.push(bytes[i]);
        i += 1;
    }
    // Only ASCII bytes were removed, so the remainder is still valid UTF-8.
    String::from_utf8(out).unwrap_or_default()
}
