//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP/TLS connection
//!     → server.rs (router, optional request timeout)
//!     → request.rs (request ID, access log line, Request-ID header)
//!     → reflection handler
//!     → response.rs (500 fallback on failure)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{RequestId, REQUEST_ID};
pub use response::{ReflectionError, FALLBACK_BODY};
pub use server::build_router;
