//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming TCP connection
//!     → listener.rs (plaintext or TLS, peer address attached)
//!     → tls.rs (handshake, session details attached as an extension)
//!     → Hand off to the HTTP layer
//! ```
//!
//! # Design Decisions
//! - TLS is optional: it is only offered when usable key material is found
//! - Both listeners serve the same router

pub mod listener;
pub mod tls;

pub use listener::{ListenerError, ListenerKind};
pub use tls::{TlsMaterial, TlsSession};
