//! Configuration validation.
//!
//! Serde handles the syntactic side; this module checks value ranges and
//! returns every problem at once rather than the first one.

use std::net::IpAddr;

use thiserror::Error;

use crate::config::schema::ServerConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error", "off"];

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("listener.bind_host `{0}` is not an IP address")]
    BindHost(String),

    #[error("observability.log_level `{0}` is not one of trace, debug, info, warn, error, off")]
    LogLevel(String),

    #[error("timeouts.{0} must be greater than zero")]
    ZeroTimeout(&'static str),
}

/// Validate a resolved configuration.
pub fn validate_config(config: &ServerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_host.parse::<IpAddr>().is_err() {
        errors.push(ValidationError::BindHost(config.listener.bind_host.clone()));
    }

    let level = config.observability.log_level.to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ValidationError::LogLevel(
            config.observability.log_level.clone(),
        ));
    }

    if config.timeouts.request_secs == Some(0) {
        errors.push(ValidationError::ZeroTimeout("request_secs"));
    }
    if config.timeouts.shutdown_grace_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("shutdown_grace_secs"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert_eq!(validate_config(&ServerConfig::default()), Ok(()));
    }

    #[test]
    fn reports_every_error() {
        let mut config = ServerConfig::default();
        config.listener.bind_host = "localhost".into();
        config.observability.log_level = "loud".into();
        config.timeouts.request_secs = Some(0);

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![
                ValidationError::BindHost("localhost".into()),
                ValidationError::LogLevel("loud".into()),
                ValidationError::ZeroTimeout("request_secs"),
            ]
        );
    }

    #[test]
    fn log_level_is_case_insensitive() {
        let mut config = ServerConfig::default();
        config.observability.log_level = "DEBUG".into();
        assert!(validate_config(&config).is_ok());
    }
}
