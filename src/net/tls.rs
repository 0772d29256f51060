//! TLS material discovery, certificate loading and session capture.

use std::fs::File;
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};

use axum::{middleware::AddExtension, Extension};
use axum_server::accept::Accept;
use axum_server::tls_rustls::{RustlsAcceptor, RustlsConfig};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use futures_util::future::BoxFuture;
use serde::Serialize;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_rustls::server::TlsStream;
use tower::Layer;

/// File name of the private key inside the TLS directory.
pub const KEY_FILE: &str = "server.key";
/// File name of the certificate chain inside the TLS directory.
pub const CERT_FILE: &str = "server.crt";

/// A key and certificate pair that passed discovery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsMaterial {
    pub key_path: PathBuf,
    pub cert_path: PathBuf,
}

/// Why the HTTPS listener stays off.
#[derive(Debug, Error)]
pub enum TlsUnavailable {
    #[error("{} not found", .0.display())]
    Missing(PathBuf),

    #[error("server.key and server.crt found but they were not quite as expected")]
    NotRegularFiles,

    #[error("{} is not usable: {reason}", path.display())]
    Malformed { path: PathBuf, reason: String },

    #[error("cannot inspect {}: {source}", path.display())]
    Inaccessible { path: PathBuf, source: io::Error },
}

/// Look for `server.key` and `server.crt` in `directory`.
///
/// Both must exist, neither may be a directory, and both must contain PEM
/// data rustls can use. Symlinks are not followed for the type check.
pub fn discover(directory: &Path) -> Result<TlsMaterial, TlsUnavailable> {
    let key_path = directory.join(KEY_FILE);
    let cert_path = directory.join(CERT_FILE);

    let key_meta = inspect(&key_path)?;
    let cert_meta = inspect(&cert_path)?;
    if key_meta.is_dir() || cert_meta.is_dir() {
        return Err(TlsUnavailable::NotRegularFiles);
    }

    let material = TlsMaterial {
        key_path,
        cert_path,
    };
    check_pem(&material)?;
    Ok(material)
}

fn inspect(path: &Path) -> Result<std::fs::Metadata, TlsUnavailable> {
    std::fs::symlink_metadata(path).map_err(|source| match source.kind() {
        io::ErrorKind::NotFound => TlsUnavailable::Missing(path.to_path_buf()),
        _ => TlsUnavailable::Inaccessible {
            path: path.to_path_buf(),
            source,
        },
    })
}

fn check_pem(material: &TlsMaterial) -> Result<(), TlsUnavailable> {
    let malformed = |path: &Path, reason: String| TlsUnavailable::Malformed {
        path: path.to_path_buf(),
        reason,
    };

    let file = File::open(&material.cert_path)
        .map_err(|e| malformed(&material.cert_path, e.to_string()))?;
    let certs = rustls_pemfile::certs(&mut BufReader::new(file))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| malformed(&material.cert_path, e.to_string()))?;
    if certs.is_empty() {
        return Err(malformed(
            &material.cert_path,
            "no certificates found".to_string(),
        ));
    }

    let file = File::open(&material.key_path)
        .map_err(|e| malformed(&material.key_path, e.to_string()))?;
    match rustls_pemfile::private_key(&mut BufReader::new(file)) {
        Ok(Some(_)) => Ok(()),
        Ok(None) => Err(malformed(
            &material.key_path,
            "no private key found".to_string(),
        )),
        Err(e) => Err(malformed(&material.key_path, e.to_string())),
    }
}

/// Pin the process-wide rustls crypto provider.
///
/// Several provider features can be active in one build, in which case
/// rustls refuses to pick one on its own.
pub fn install_crypto_provider() {
    let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();
}

/// Load the rustls server configuration for the discovered material.
pub async fn load_tls_config(material: &TlsMaterial) -> Result<RustlsConfig, io::Error> {
    install_crypto_provider();
    RustlsConfig::from_pem_file(&material.cert_path, &material.key_path).await
}

/// Negotiated parameters of an encrypted connection.
///
/// Inserted into every request served over TLS; its absence means the
/// connection is plaintext.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TlsSession {
    pub version: String,
    pub cipher_suite: String,
    pub alpn_protocol: String,
    pub server_name: String,
    /// Base64 DER of each certificate the client presented.
    pub peer_certificates: Vec<String>,
}

impl TlsSession {
    fn from_connection(conn: &rustls::ServerConnection) -> Self {
        Self {
            version: conn
                .protocol_version()
                .map(|v| format!("{v:?}"))
                .unwrap_or_default(),
            cipher_suite: conn
                .negotiated_cipher_suite()
                .map(|s| format!("{:?}", s.suite()))
                .unwrap_or_default(),
            alpn_protocol: conn
                .alpn_protocol()
                .map(|p| String::from_utf8_lossy(p).into_owned())
                .unwrap_or_default(),
            server_name: conn.server_name().unwrap_or_default().to_string(),
            peer_certificates: conn
                .peer_certificates()
                .map(|certs| certs.iter().map(|c| STANDARD.encode(c.as_ref())).collect())
                .unwrap_or_default(),
        }
    }
}

/// Rustls acceptor that records the [`TlsSession`] of each connection.
#[derive(Clone)]
pub struct SessionAcceptor {
    inner: RustlsAcceptor,
}

impl SessionAcceptor {
    pub fn new(config: RustlsConfig) -> Self {
        Self {
            inner: RustlsAcceptor::new(config),
        }
    }
}

impl<I, S> Accept<I, S> for SessionAcceptor
where
    I: AsyncRead + AsyncWrite + Unpin + Send + 'static,
    S: Send + 'static,
{
    type Stream = TlsStream<I>;
    type Service = AddExtension<S, TlsSession>;
    type Future = BoxFuture<'static, io::Result<(Self::Stream, Self::Service)>>;

    fn accept(&self, stream: I, service: S) -> Self::Future {
        let acceptor = self.inner.clone();

        Box::pin(async move {
            let (stream, service) = acceptor.accept(stream, service).await?;
            let session = TlsSession::from_connection(stream.get_ref().1);
            tracing::debug!(
                version = %session.version,
                cipher_suite = %session.cipher_suite,
                "TLS handshake complete"
            );
            let service = Extension(session).layer(service);
            Ok((stream, service))
        })
    }
}
