//! The reflection handler.
//!
//! Reads the whole request, captures it into a [`Reflection`] and answers
//! with its JSON form. Every request gets a response: failures become a 500
//! with the fallback body.

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::net::SocketAddr;

use axum::extract::{ConnectInfo, Request};
use axum::http::request::Parts;
use axum::http::{header, HeaderMap, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use chrono::{DateTime, FixedOffset, Local};
use percent_encoding::percent_decode_str;

use crate::http::request::{request_host, RequestId};
use crate::http::response::ReflectionError;
use crate::net::TlsSession;
use crate::reflection::cookies::parse_cookies;
use crate::reflection::model::{HeaderValues, Reflection};

/// Format of `meta.timestamp`.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%z";

/// Handler for every method on every path.
pub async fn reflect(request: Request) -> Response {
    let (parts, body) = request.into_parts();

    let body = match axum::body::to_bytes(body, usize::MAX).await {
        Ok(body) => body,
        Err(err) => return ReflectionError::BodyRead(err).into_response(),
    };

    let reflection = capture(&parts, &body, Local::now().fixed_offset());
    match serde_json::to_vec(&reflection) {
        Ok(json) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "application/json")],
            json,
        )
            .into_response(),
        Err(err) => ReflectionError::Serialize(err).into_response(),
    }
}

/// Build the reflection of a request whose body has already been read.
pub fn capture(parts: &Parts, body: &[u8], now: DateTime<FixedOffset>) -> Reflection {
    let mut reflection = Reflection::default();

    reflection.http.version = format!("{:?}", parts.version);
    reflection.http.tls = parts.extensions.get::<TlsSession>().cloned();

    let request = &mut reflection.request;
    request.body = String::from_utf8_lossy(body).into_owned();
    request.cookies = parse_cookies(&parts.headers);
    request.path = percent_decode_str(parts.uri.path())
        .decode_utf8_lossy()
        .into_owned();
    request.params = query_params(&parts.uri);
    request.method = parts.method.to_string();
    request.headers = flatten_headers(&parts.headers);

    let meta = &mut reflection.meta;
    meta.host = request_host(&parts.uri, &parts.headers);
    meta.remote_addr = parts
        .extensions
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.to_string())
        .unwrap_or_default();
    meta.timestamp = now.format(TIMESTAMP_FORMAT).to_string();
    meta.uuid = parts
        .extensions
        .get::<RequestId>()
        .map(ToString::to_string)
        .unwrap_or_default();

    reflection
}

/// Decode the query string; repeated names keep every value in order.
pub fn query_params(uri: &Uri) -> BTreeMap<String, Vec<String>> {
    let mut params: BTreeMap<String, Vec<String>> = BTreeMap::new();
    if let Some(query) = uri.query() {
        for (name, value) in url::form_urlencoded::parse(query.as_bytes()) {
            params
                .entry(name.into_owned())
                .or_default()
                .push(value.into_owned());
        }
    }
    params
}

/// Group header values under their canonical names.
///
/// `Host` is left out: it is reported as `meta.host`, and HTTP/2 carries it
/// as `:authority` rather than as a header.
pub fn flatten_headers(headers: &HeaderMap) -> BTreeMap<String, HeaderValues> {
    let mut flat = BTreeMap::new();

    for (name, value) in headers {
        if *name == header::HOST {
            continue;
        }
        let value = String::from_utf8_lossy(value.as_bytes()).into_owned();
        match flat.entry(canonical_header_name(name.as_str())) {
            Entry::Vacant(entry) => {
                entry.insert(HeaderValues::Single(value));
            }
            Entry::Occupied(mut entry) => entry.get_mut().push(value),
        }
    }

    flat
}

/// `x-forwarded-for` → `X-Forwarded-For`
pub fn canonical_header_name(name: &str) -> String {
    let mut upper = true;
    name.chars()
        .map(|c| {
            let out = if upper {
                c.to_ascii_uppercase()
            } else {
                c.to_ascii_lowercase()
            };
            upper = c == '-';
            out
        })
        .collect()
}
