//! Plaintext and TLS listeners.
//!
//! # Responsibilities
//! - Bind to the configured address
//! - Serve the shared router, with peer addresses attached to every request
//! - Drain in-flight connections when shutdown is signalled

use std::fmt;
use std::net::SocketAddr;
use std::time::Duration;

use axum::Router;
use axum_server::Handle;
use thiserror::Error;
use tokio::sync::broadcast;

use crate::net::tls::{self, SessionAcceptor, TlsMaterial};

/// Which of the two listeners an event refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListenerKind {
    Http,
    Https,
}

impl ListenerKind {
    /// URI scheme served by this listener.
    pub fn scheme(&self) -> &'static str {
        match self {
            ListenerKind::Http => "http",
            ListenerKind::Https => "https",
        }
    }
}

impl fmt::Display for ListenerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.scheme())
    }
}

/// Error type for listener operations.
#[derive(Debug, Error)]
pub enum ListenerError {
    /// Failed to bind or to keep accepting.
    #[error("failed to serve on {addr}: {source}")]
    Serve {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    /// The TLS material was rejected by rustls.
    #[error("failed to load TLS material: {0}")]
    Tls(#[source] std::io::Error),
}

/// Everything a listener needs besides its transport.
pub struct ListenerSpec {
    pub addr: SocketAddr,
    pub router: Router,
    pub shutdown: broadcast::Receiver<()>,
    pub grace: Duration,
}

/// Run the plaintext listener until it fails or shutdown completes.
pub async fn serve_http(spec: ListenerSpec) -> Result<(), ListenerError> {
    let ListenerSpec {
        addr,
        router,
        shutdown,
        grace,
    } = spec;

    tracing::info!(%addr, "attempting to listen for http");
    let handle = drain_on_shutdown(shutdown, grace);

    axum_server::bind(addr)
        .handle(handle)
        .serve(router.into_make_service_with_connect_info::<SocketAddr>())
        .await
        .map_err(|source| ListenerError::Serve { addr, source })
}

/// Run the TLS listener until it fails or shutdown completes.
pub async fn serve_https(spec: ListenerSpec, material: TlsMaterial) -> Result<(), ListenerError> {
    let ListenerSpec {
        addr,
        router,
        shutdown,
        grace,
    } = spec;

    tracing::info!(%addr, "attempting to listen for https");
    let config = tls::load_tls_config(&material)
        .await
        .map_err(ListenerError::Tls)?;
    let handle = drain_on_shutdown(shutdown, grace);

    axum_server::bind(addr)
        .acceptor(SessionAcceptor::new(config))
        .handle(handle)
        .serve(router.into_make_service_with_connect_info::<SocketAddr>())
        .await
        .map_err(|source| ListenerError::Serve { addr, source })
}

/// Create a server handle that starts a graceful shutdown once the
/// coordinator fires.
fn drain_on_shutdown(mut shutdown: broadcast::Receiver<()>, grace: Duration) -> Handle {
    let handle = Handle::new();
    let trigger = handle.clone();

    tokio::spawn(async move {
        // A closed channel means the coordinator is gone; treat it as a signal too.
        let _ = shutdown.recv().await;
        trigger.graceful_shutdown(Some(grace));
    });

    handle
}
