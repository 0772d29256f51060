//! Request reflection.
//!
//! # Data Flow
//! ```text
//! Request (with RequestId, ConnectInfo and optional TlsSession extensions)
//!     → handler.rs (read body, capture fields)
//!     → model.rs (Reflection document)
//!     → JSON response
//! ```

pub mod cookies;
pub mod handler;
pub mod model;

pub use handler::reflect;
pub use model::{HeaderValues, Reflection, RequestCookie};
