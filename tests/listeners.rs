//! Live listener tests: real sockets, real TLS.

use std::net::SocketAddr;

use serde_json::Value;

use reflection_server::http::REQUEST_ID;
use reflection_server::lifecycle::{ListenerState, Shutdown, Supervisor};

mod common;

#[tokio::test]
async fn plaintext_only_without_tls_material() {
    let port = common::free_port_pair();
    let empty = tempfile::tempdir().unwrap();
    let shutdown = Shutdown::new();

    let supervisor = Supervisor::new(common::local_config(port, empty.path()));
    let running = {
        let shutdown = shutdown.clone();
        tokio::spawn(async move { supervisor.run(&shutdown).await })
    };

    let addr: SocketAddr = ([127, 0, 0, 1], port).into();
    common::wait_for_listener(addr).await;

    let res = common::client()
        .get(format!("http://{addr}/foo?x=1"))
        .header("cookie", "a=b")
        .send()
        .await
        .expect("server unreachable");

    assert_eq!(res.status(), 200);
    let id = res.headers()[REQUEST_ID].to_str().unwrap().to_string();
    let json: Value = res.json().await.unwrap();

    assert_eq!(json["http"]["tls"], Value::Null);
    assert_eq!(json["data"]["path"], "/foo");
    assert_eq!(json["data"]["cookies"][0]["value"], "b");
    assert_eq!(json["meta"]["uuid"], id);
    assert_eq!(json["meta"]["host"], addr.to_string());
    assert!(json["meta"]["remote_addr"]
        .as_str()
        .unwrap()
        .starts_with("127.0.0.1:"));

    // Nothing on port + 1.
    let https: SocketAddr = ([127, 0, 0, 1], port + 1).into();
    assert!(tokio::net::TcpStream::connect(https).await.is_err());

    shutdown.trigger();
    let report = running.await.unwrap();
    assert!(matches!(report.http, ListenerState::Terminated(None)));
    assert!(matches!(report.https, ListenerState::NotStarted));
}

#[tokio::test]
async fn https_listener_on_next_port() {
    let port = common::free_port_pair();
    let tls_dir = tempfile::tempdir().unwrap();
    common::write_tls_material(tls_dir.path());
    let shutdown = Shutdown::new();

    let supervisor = Supervisor::new(common::local_config(port, tls_dir.path()));
    let running = {
        let shutdown = shutdown.clone();
        tokio::spawn(async move { supervisor.run(&shutdown).await })
    };

    let http: SocketAddr = ([127, 0, 0, 1], port).into();
    let https: SocketAddr = ([127, 0, 0, 1], port + 1).into();
    common::wait_for_listener(http).await;
    common::wait_for_listener(https).await;

    let client = common::client();

    let res = client
        .post(format!("https://{https}/secure?k=v"))
        .body("over tls")
        .send()
        .await
        .expect("https unreachable");
    assert_eq!(res.status(), 200);
    let id = res.headers()[REQUEST_ID].to_str().unwrap().to_string();
    let json: Value = res.json().await.unwrap();

    let tls = &json["http"]["tls"];
    assert!(tls.is_object(), "expected tls details, got {tls}");
    assert!(!tls["version"].as_str().unwrap().is_empty());
    assert!(!tls["cipher_suite"].as_str().unwrap().is_empty());
    assert_eq!(tls["peer_certificates"], serde_json::json!([]));
    assert_eq!(json["data"]["body"], "over tls");
    assert_eq!(json["data"]["params"]["k"][0], "v");
    assert_eq!(json["meta"]["uuid"], id);

    let res = client.get(format!("http://{http}/")).send().await.unwrap();
    let json: Value = res.json().await.unwrap();
    assert_eq!(json["http"]["tls"], Value::Null);

    shutdown.trigger();
    let report = running.await.unwrap();
    assert!(matches!(report.http, ListenerState::Terminated(None)));
    assert!(matches!(report.https, ListenerState::Terminated(None)));
}

#[tokio::test]
async fn one_failed_listener_does_not_stop_the_other() {
    let port = common::free_port_pair();
    let tls_dir = tempfile::tempdir().unwrap();
    common::write_tls_material(tls_dir.path());
    let _blocker = std::net::TcpListener::bind(("127.0.0.1", port + 1)).unwrap();
    let shutdown = Shutdown::new();

    let supervisor = Supervisor::new(common::local_config(port, tls_dir.path()));
    let running = {
        let shutdown = shutdown.clone();
        tokio::spawn(async move { supervisor.run(&shutdown).await })
    };

    let http: SocketAddr = ([127, 0, 0, 1], port).into();
    common::wait_for_listener(http).await;
    let res = common::client()
        .get(format!("http://{http}/still-up"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    assert!(!running.is_finished());

    shutdown.trigger();
    let report = running.await.unwrap();
    assert!(matches!(report.http, ListenerState::Terminated(None)));
    assert!(matches!(report.https, ListenerState::Terminated(Some(_))));
}
