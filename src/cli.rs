//! Command line interface.

use std::path::PathBuf;

use clap::Parser;

use crate::config::loader::{read_config, ConfigError};
use crate::config::validation::validate_config;
use crate::config::{LogFormat, ServerConfig};

/// `<crate version>-<commit>`, with the commit taken from
/// `REFLECTION_SERVER_COMMIT` at build time.
pub fn version_string() -> String {
    format!(
        "{}-{}",
        env!("CARGO_PKG_VERSION"),
        option_env!("REFLECTION_SERVER_COMMIT").unwrap_or("dev")
    )
}

#[derive(Parser, Debug)]
#[command(name = "reflection-server")]
#[command(about = "Echoes every HTTP request back as JSON", long_about = None)]
#[command(disable_version_flag = true)]
pub struct Cli {
    /// Port the reflection server listens on; the https listener adds 1 to it [default: 8080]
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Display the version and exit
    #[arg(short = 'v', long)]
    pub version: bool,

    /// Optional TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log output format
    #[arg(long, value_enum)]
    pub log_format: Option<LogFormat>,
}

impl Cli {
    /// Resolve defaults, the config file and flag overrides into a validated config.
    pub fn resolve_config(&self) -> Result<ServerConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => read_config(path)?,
            None => ServerConfig::default(),
        };

        if let Some(port) = self.port {
            config.listener.port = port;
        }
        if let Some(level) = &self.log_level {
            config.observability.log_level = level.clone();
        }
        if let Some(format) = self.log_format {
            config.observability.log_format = format;
        }

        validate_config(&config).map_err(ConfigError::Validation)?;
        Ok(config)
    }
}
