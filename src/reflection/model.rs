//! The document returned for every request.
//!
//! Every field is always serialized; empty values come out as `""`, `{}` or
//! `[]`, and `http.tls` is `null` on plaintext connections.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::net::TlsSession;

/// Everything captured about one request.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Reflection {
    pub http: HttpFields,
    #[serde(rename = "data")]
    pub request: RequestFields,
    pub meta: MetaFields,
}

/// Protocol details.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HttpFields {
    /// `HTTP/1.1`, `HTTP/2.0`, ...
    pub version: String,
    pub tls: Option<TlsSession>,
}

/// What the client sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RequestFields {
    pub body: String,
    pub cookies: Vec<RequestCookie>,
    pub path: String,
    pub params: BTreeMap<String, Vec<String>>,
    pub method: String,
    pub headers: BTreeMap<String, HeaderValues>,
}

/// A cookie from a `Cookie` request header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequestCookie {
    pub name: String,
    pub value: String,
    /// The value arrived wrapped in double quotes.
    pub quoted: bool,
}

/// Values of one header: a plain string unless the header repeats.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum HeaderValues {
    Single(String),
    Multiple(Vec<String>),
}

impl HeaderValues {
    /// Append a value, switching to the list form on the second one.
    pub fn push(&mut self, value: String) {
        match self {
            HeaderValues::Single(first) => {
                let first = std::mem::take(first);
                *self = HeaderValues::Multiple(vec![first, value]);
            }
            HeaderValues::Multiple(values) => values.push(value),
        }
    }
}

/// Connection metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MetaFields {
    pub host: String,
    pub remote_addr: String,
    /// `YYYY-MM-DDTHH:MM:SS±HHMM`
    pub timestamp: String,
    pub uuid: String,
}
