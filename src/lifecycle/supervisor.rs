//! Listener supervision.
//!
//! Starts the plaintext listener, starts the TLS listener when key material
//! is available, then waits until every started listener has reported its
//! terminal outcome. Listeners are never restarted.

use std::future::Future;
use std::net::SocketAddr;
use std::time::Duration;

use axum::Router;
use tokio::sync::mpsc;

use crate::config::ServerConfig;
use crate::http::build_router;
use crate::lifecycle::Shutdown;
use crate::net::listener::{self, ListenerError, ListenerKind, ListenerSpec};
use crate::net::tls::{self, TlsMaterial};

/// Lifecycle of one listener.
#[derive(Debug, Default)]
pub enum ListenerState {
    #[default]
    NotStarted,
    Listening,
    /// Terminal. Carries the error the listener stopped with, if any.
    Terminated(Option<ListenerError>),
}

/// Final state of both listeners once the supervisor returns.
#[derive(Debug, Default)]
pub struct SupervisorReport {
    pub http: ListenerState,
    pub https: ListenerState,
}

impl SupervisorReport {
    pub fn state(&self, kind: ListenerKind) -> &ListenerState {
        match kind {
            ListenerKind::Http => &self.http,
            ListenerKind::Https => &self.https,
        }
    }

    fn state_mut(&mut self, kind: ListenerKind) -> &mut ListenerState {
        match kind {
            ListenerKind::Http => &mut self.http,
            ListenerKind::Https => &mut self.https,
        }
    }
}

/// Terminal signal sent exactly once by each listener task.
#[derive(Debug)]
struct ListenerExit {
    kind: ListenerKind,
    result: Result<(), ListenerError>,
}

/// Owns the router and brings the listeners up and down.
pub struct Supervisor {
    config: ServerConfig,
    router: Router,
}

impl Supervisor {
    pub fn new(config: ServerConfig) -> Self {
        let router = build_router(&config);
        Self { config, router }
    }

    /// Run until every started listener has terminated.
    pub async fn run(self, shutdown: &Shutdown) -> SupervisorReport {
        tracing::info!("starting the reflection server...");

        let (done_tx, mut done_rx) = mpsc::channel::<ListenerExit>(2);
        let mut report = SupervisorReport::default();
        let grace = Duration::from_secs(self.config.timeouts.shutdown_grace_secs);

        if let Some(addr) = self.config.listener.http_address() {
            let spec = self.spec(addr, shutdown, grace);
            spawn_listener(ListenerKind::Http, listener::serve_http(spec), done_tx.clone());
            report.http = ListenerState::Listening;
        } else {
            tracing::error!(
                bind_host = %self.config.listener.bind_host,
                "invalid bind address, http listener not started"
            );
        }

        if let Some(material) = self.discover_tls() {
            match self.config.listener.https_address() {
                Some(addr) => {
                    let spec = self.spec(addr, shutdown, grace);
                    spawn_listener(
                        ListenerKind::Https,
                        listener::serve_https(spec, material),
                        done_tx.clone(),
                    );
                    report.https = ListenerState::Listening;
                }
                None => tracing::warn!(
                    port = self.config.listener.port,
                    "no port left above the http port, https listener not started"
                ),
            }
        }
        drop(done_tx);

        while let Some(ListenerExit { kind, result }) = done_rx.recv().await {
            match &result {
                Ok(()) => tracing::info!(listener = %kind, "{kind} server stopped"),
                Err(e) => tracing::error!(listener = %kind, error = %e, "{kind} server terminated with: {e}"),
            }
            *report.state_mut(kind) = ListenerState::Terminated(result.err());
        }

        for kind in [ListenerKind::Http, ListenerKind::Https] {
            if matches!(report.state(kind), ListenerState::Listening) {
                tracing::error!(listener = %kind, "{kind} listener task ended without reporting");
            }
        }

        tracing::info!("stopping the reflection server");
        report
    }

    fn spec(&self, addr: SocketAddr, shutdown: &Shutdown, grace: Duration) -> ListenerSpec {
        ListenerSpec {
            addr,
            router: self.router.clone(),
            shutdown: shutdown.subscribe(),
            grace,
        }
    }

    fn discover_tls(&self) -> Option<TlsMaterial> {
        match tls::discover(&self.config.tls.directory) {
            Ok(material) => {
                tracing::info!(
                    key = %material.key_path.display(),
                    cert = %material.cert_path.display(),
                    "{} and {} found - tls will be enabled",
                    tls::KEY_FILE,
                    tls::CERT_FILE
                );
                Some(material)
            }
            Err(reason) => {
                tracing::info!(
                    %reason,
                    "{reason} - provide {} and {} for https to be available",
                    tls::KEY_FILE,
                    tls::CERT_FILE
                );
                None
            }
        }
    }
}

fn spawn_listener<F>(kind: ListenerKind, serve: F, done: mpsc::Sender<ListenerExit>)
where
    F: Future<Output = Result<(), ListenerError>> + Send + 'static,
{
    tokio::spawn(async move {
        let result = serve.await;
        let _ = done.send(ListenerExit { kind, result }).await;
    });
}
