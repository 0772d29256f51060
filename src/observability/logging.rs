//! Structured logging.
//!
//! `RUST_LOG` takes precedence over the configured level so operators can
//! turn on debug output without touching the config file.

use thiserror::Error;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::config::{LogFormat, ObservabilityConfig};

/// Error raised when the global subscriber cannot be installed.
#[derive(Debug, Error)]
#[error("failed to initialize logging: {0}")]
pub struct LoggingError(String);

/// Build the level filter for the given configuration.
pub fn env_filter(config: &ObservabilityConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level))
}

/// Initialize the logging subsystem.
pub fn init_logging(config: &ObservabilityConfig) -> Result<(), LoggingError> {
    let filter = env_filter(config);

    let layer = match config.log_format {
        LogFormat::Json => fmt::layer()
            .json()
            .with_target(true)
            .flatten_event(true)
            .with_filter(filter)
            .boxed(),
        LogFormat::Text => fmt::layer().with_target(false).with_filter(filter).boxed(),
    };

    tracing_subscriber::registry()
        .with(layer)
        .try_init()
        .map_err(|e| LoggingError(e.to_string()))
}
