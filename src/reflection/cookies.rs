//! `Cookie` request header parsing.
//!
//! Pairs with an invalid name or value are skipped rather than failing the
//! whole header, so a single bad cookie never hides the others.

use axum::http::{header, HeaderMap};

use crate::reflection::model::RequestCookie;

/// Collect the cookies of every `Cookie` header, in arrival order.
pub fn parse_cookies(headers: &HeaderMap) -> Vec<RequestCookie> {
    let mut cookies = Vec::new();

    for line in headers.get_all(header::COOKIE) {
        let line = String::from_utf8_lossy(line.as_bytes());
        for part in line.split(';') {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }

            let (name, value) = part.split_once('=').unwrap_or((part, ""));
            let name = name.trim();
            if !is_token(name) {
                continue;
            }
            if let Some((value, quoted)) = parse_value(value) {
                cookies.push(RequestCookie {
                    name: name.to_string(),
                    value: value.to_string(),
                    quoted,
                });
            }
        }
    }

    cookies
}

fn parse_value(raw: &str) -> Option<(&str, bool)> {
    let (value, quoted) = match raw.strip_prefix('"').and_then(|v| v.strip_suffix('"')) {
        Some(inner) => (inner, true),
        None => (raw, false),
    };

    value
        .bytes()
        .all(|b| (0x20..0x7f).contains(&b) && b != b'"' && b != b';' && b != b'\\')
        .then_some((value, quoted))
}

fn is_token(name: &str) -> bool {
    !name.is_empty()
        && name.bytes().all(|b| {
            b.is_ascii_alphanumeric() || b"!#$%&'*+-.^_`|~".contains(&b)
        })
}
