//! Request identification and access logging.
//!
//! # Responsibilities
//! - Generate a fresh request ID (UUID v4) for every request
//! - Log one line per request before it is handled
//! - Hand the ID to the handler and echo it in the `Request-ID` response header
//!
//! # Design Decisions
//! - IDs supplied by clients are ignored; the ID always comes from the server
//! - The middleware never rejects a request

use std::fmt;

use axum::extract::Request;
use axum::http::{header, HeaderMap, HeaderName, HeaderValue, Uri};
use axum::middleware::Next;
use axum::response::Response;
use uuid::Uuid;

use crate::net::TlsSession;

/// Response header carrying the request ID.
pub const REQUEST_ID: HeaderName = HeaderName::from_static("request-id");

/// Server-generated identifier of a single request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestId(Uuid);

impl RequestId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Virtual host of a request: the URI authority (HTTP/2, absolute-form),
/// otherwise the `Host` header.
pub fn request_host(uri: &Uri, headers: &HeaderMap) -> String {
    if let Some(authority) = uri.authority() {
        return authority.to_string();
    }
    headers
        .get(header::HOST)
        .map(|host| String::from_utf8_lossy(host.as_bytes()).into_owned())
        .unwrap_or_default()
}

/// Stamp, log and forward every request.
pub async fn request_logging(mut request: Request, next: Next) -> Response {
    let request_id = RequestId::new();
    let scheme = if request.extensions().get::<TlsSession>().is_some() {
        "https"
    } else {
        "http"
    };
    let host = request_host(request.uri(), request.headers());
    let target = request
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| request.uri().to_string());

    tracing::info!(
        method = %request.method(),
        version = ?request.version(),
        request_id = %request_id,
        scheme,
        host = %host,
        uri = %target,
        "{} {:?} [id:{}] {}://{}{}",
        request.method(),
        request.version(),
        request_id,
        scheme,
        host,
        target,
    );

    request.extensions_mut().insert(request_id);
    let mut response = next.run(request).await;

    if let Ok(value) = HeaderValue::from_str(&request_id.to_string()) {
        response.headers_mut().insert(REQUEST_ID, value);
    }
    response
}
