//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from a TOML file and
//! every section falls back to its defaults, so an empty file is valid.

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Root configuration for the reflection server.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    /// Plaintext listener (the TLS listener derives its port from it).
    pub listener: ListenerConfig,

    /// Where to look for TLS material.
    pub tls: TlsConfig,

    /// Request and shutdown timeouts.
    pub timeouts: TimeoutConfig,

    /// Logging settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ListenerConfig {
    /// Interface both listeners bind to.
    pub bind_host: String,

    /// Plaintext port. The HTTPS listener uses `port + 1`.
    pub port: u16,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl ListenerConfig {
    /// Address of the plaintext listener.
    pub fn http_address(&self) -> Option<SocketAddr> {
        let ip: IpAddr = self.bind_host.parse().ok()?;
        Some(SocketAddr::new(ip, self.port))
    }

    /// Address of the TLS listener, `None` when `port + 1` overflows.
    pub fn https_address(&self) -> Option<SocketAddr> {
        let ip: IpAddr = self.bind_host.parse().ok()?;
        let port = self.port.checked_add(1)?;
        Some(SocketAddr::new(ip, port))
    }
}

/// TLS material location. File names are fixed to `server.key` and `server.crt`.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct TlsConfig {
    /// Directory holding the key and certificate, relative to the working directory.
    pub directory: PathBuf,
}

impl Default for TlsConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("."),
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Upper bound for handling a single request. Disabled when unset.
    pub request_secs: Option<u64>,

    /// How long listeners drain in-flight connections on shutdown.
    pub shutdown_grace_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            request_secs: None,
            shutdown_grace_secs: 10,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Output format of the log lines.
    pub log_format: LogFormat,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Text,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human readable single-line output.
    #[default]
    Text,
    /// One JSON object per line.
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_listen_on_8080() {
        let config = ServerConfig::default();
        assert_eq!(
            config.listener.http_address(),
            Some("0.0.0.0:8080".parse().unwrap())
        );
        assert_eq!(
            config.listener.https_address(),
            Some("0.0.0.0:8081".parse().unwrap())
        );
        assert_eq!(config.tls.directory, PathBuf::from("."));
        assert!(config.timeouts.request_secs.is_none());
    }

    #[test]
    fn https_address_overflow() {
        let listener = ListenerConfig {
            bind_host: "127.0.0.1".into(),
            port: u16::MAX,
        };
        assert!(listener.http_address().is_some());
        assert!(listener.https_address().is_none());
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config: ServerConfig = toml::from_str(
            r#"
            [listener]
            port = 9000

            [observability]
            log_format = "json"
            "#,
        )
        .unwrap();

        assert_eq!(config.listener.port, 9000);
        assert_eq!(config.listener.bind_host, "0.0.0.0");
        assert_eq!(config.observability.log_format, LogFormat::Json);
        assert_eq!(config.observability.log_level, "info");
        assert_eq!(config.timeouts.shutdown_grace_secs, 10);
    }
}
