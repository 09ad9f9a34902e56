//! Shared helpers for CLI tests.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// An isolated credentials file and service URL for one test.
pub struct TestEnv {
    pub dir: tempfile::TempDir,
    pub service: String,
}

impl TestEnv {
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            dir: tempfile::tempdir().expect("Failed to create temp dir"),
            service: service.into(),
        }
    }

    /// A service nothing listens on.
    pub fn offline() -> Self {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("Failed to bind");
        let port = listener.local_addr().expect("No local address").port();
        drop(listener);
        Self::new(format!("http://127.0.0.1:{}", port))
    }

    pub fn store_path(&self) -> PathBuf {
        self.dir.path().join("credentials.json")
    }

    /// Run the CLI binary with this environment.
    pub fn run(&self, args: &[&str]) -> Output {
        run_cli(args, &self.store_path(), &self.service)
    }

    /// Run the CLI from async code without blocking the mock server.
    pub async fn run_async(&self, args: &[&str]) -> Output {
        let args: Vec<String> = args.iter().map(|a| a.to_string()).collect();
        let store = self.store_path();
        let service = self.service.clone();
        tokio::task::spawn_blocking(move || {
            let args: Vec<&str> = args.iter().map(String::as_str).collect();
            run_cli(&args, &store, &service)
        })
        .await
        .expect("CLI task panicked")
    }
}

pub fn run_cli(args: &[&str], store: &Path, service: &str) -> Output {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_skypost"));
    cmd.args(args);
    cmd.env("SKYPOST_STORE", store);
    cmd.env("SKYPOST_SERVICE", service);
    cmd.env("NO_COLOR", "1");
    cmd.env_remove("SKYPOST_PASSWORD");
    cmd.env_remove("RUST_LOG");
    cmd.output().expect("Failed to execute CLI")
}

pub fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

pub fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

/// Mount a createSession endpoint that accepts `alice` / `correct`.
pub async fn mount_login(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/xrpc/com.atproto.server.createSession"))
        .and(wiremock::matchers::body_json(json!({
            "identifier": "alice",
            "password": "correct"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "accessJwt": "tok123",
            "refreshJwt": "ref123",
            "did": "did:plc:abc",
            "handle": "alice.bsky.social"
        })))
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(path("/xrpc/com.atproto.server.createSession"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": "AuthenticationRequired",
            "message": "Invalid identifier or password"
        })))
        .mount(server)
        .await;
}
