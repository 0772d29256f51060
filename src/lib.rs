//! HTTP/HTTPS reflection server library.
//!
//! Every request, on any method and path, is answered with a JSON document
//! describing what the server received: protocol version and TLS session,
//! body, cookies, path, query parameters, method, headers, host, peer
//! address, a timestamp and a per-request ID.

pub mod cli;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod reflection;

pub use config::ServerConfig;
pub use http::build_router;
pub use lifecycle::{Shutdown, Supervisor};
