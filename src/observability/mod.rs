//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! supervisor, listeners, request middleware
//!     → tracing events with structured fields
//!     → logging.rs (EnvFilter + fmt layer, text or JSON)
//!     → stdout
//! ```

pub mod logging;

pub use logging::{init_logging, LoggingError};
