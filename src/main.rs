//! Reflection server.
//!
//! ```text
//!      client ──▶ :port   (http)  ─┐
//!                                   ├─▶ request_logging ─▶ reflect ─▶ JSON
//!      client ──▶ :port+1 (https) ─┘
//! ```
//!
//! The https listener only starts when `server.key` and `server.crt` are
//! present in the TLS directory.

use clap::Parser;

use reflection_server::cli::{version_string, Cli};
use reflection_server::lifecycle::{Shutdown, Supervisor};
use reflection_server::observability::init_logging;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if cli.version {
        print!("{}", version_string());
        return Ok(());
    }

    let config = cli.resolve_config()?;
    init_logging(&config.observability)?;

    tracing::info!(
        version = %version_string(),
        port = config.listener.port,
        tls_directory = %config.tls.directory.display(),
        "Configuration loaded"
    );

    let shutdown = Shutdown::new();
    tokio::spawn(shutdown.clone().listen_for_signals());

    let report = Supervisor::new(config).run(&shutdown).await;
    tracing::debug!(?report, "Shutdown complete");
    Ok(())
}
