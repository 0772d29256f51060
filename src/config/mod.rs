//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! defaults
//!     → loader.rs (optional TOML file)
//!     → command line overrides (cli.rs)
//!     → validation.rs (semantic checks)
//!     → ServerConfig (validated, immutable)
//! ```
//!
//! # Design Decisions
//! - Config is immutable once resolved; there is no reload
//! - All fields have defaults so the server runs without any file

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::ConfigError;
pub use schema::{
    ListenerConfig, LogFormat, ObservabilityConfig, ServerConfig, TimeoutConfig, TlsConfig,
};
