//! Shared utilities for integration tests.

use std::net::{SocketAddr, TcpListener};
use std::path::Path;
use std::time::Duration;

use reflection_server::net::tls::{CERT_FILE, KEY_FILE};
use reflection_server::ServerConfig;

/// A port such that both it and the next one are currently free.
#[allow(dead_code)]
pub fn free_port_pair() -> u16 {
    for _ in 0..50 {
        let first = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = first.local_addr().unwrap().port();
        if port == u16::MAX {
            continue;
        }
        if TcpListener::bind(("127.0.0.1", port + 1)).is_ok() {
            return port;
        }
    }
    panic!("no free port pair found");
}

/// Config bound to localhost with TLS material looked up in `tls_dir`.
#[allow(dead_code)]
pub fn local_config(port: u16, tls_dir: &Path) -> ServerConfig {
    let mut config = ServerConfig::default();
    config.listener.bind_host = "127.0.0.1".into();
    config.listener.port = port;
    config.tls.directory = tls_dir.to_path_buf();
    config.timeouts.shutdown_grace_secs = 1;
    config
}

/// Wait until something accepts connections on `addr`.
#[allow(dead_code)]
pub async fn wait_for_listener(addr: SocketAddr) {
    for _ in 0..100 {
        if tokio::net::TcpStream::connect(addr).await.is_ok() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("nothing listening on {addr}");
}

/// Write a self-signed `server.crt` / `server.key` pair into `dir`.
#[allow(dead_code)]
pub fn write_tls_material(dir: &Path) {
    let rcgen::CertifiedKey { cert, key_pair } =
        rcgen::generate_simple_self_signed(vec!["localhost".to_string()]).unwrap();
    std::fs::write(dir.join(CERT_FILE), cert.pem()).unwrap();
    std::fs::write(dir.join(KEY_FILE), key_pair.serialize_pem()).unwrap();
}

/// Client that trusts the self-signed test certificate.
#[allow(dead_code)]
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .danger_accept_invalid_certs(true)
        .no_proxy()
        .build()
        .unwrap()
}
