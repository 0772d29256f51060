//! Version mode: runs the real binary.

use std::net::{TcpListener, TcpStream};
use std::process::Command;

use reflection_server::cli::version_string;

fn free_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
}

#[test]
fn version_flag_prints_and_exits_without_listening() {
    let port = free_port();

    let output = Command::new(env!("CARGO_BIN_EXE_reflection-server"))
        .args(["--version", "--port", &port.to_string()])
        .output()
        .expect("failed to run binary");

    assert!(output.status.success(), "exit status {}", output.status);
    assert_eq!(String::from_utf8(output.stdout).unwrap(), version_string());

    // The process has exited and never bound the port.
    assert!(TcpStream::connect(("127.0.0.1", port)).is_err());
    assert!(TcpListener::bind(("127.0.0.1", port)).is_ok());
}

#[test]
fn short_version_flag_matches_long() {
    let output = Command::new(env!("CARGO_BIN_EXE_reflection-server"))
        .arg("-v")
        .output()
        .expect("failed to run binary");

    assert!(output.status.success());
    assert_eq!(String::from_utf8(output.stdout).unwrap(), version_string());
}
