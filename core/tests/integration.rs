//! End-to-end relay tests against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port, then drives `RequestRelay` over
//! real HTTP through the `ureq` transport. Covers status/body capture for
//! success and error streams (including non-UTF-8 and large bodies), the
//! outgoing headers and payload, timeouts,
//! and delivery through a host-drained main loop.

use std::net::SocketAddr;
use std::sync::{mpsc, Arc};
use std::time::{Duration, Instant};

use mock_server::{Inspected, LARGE_BODY_LEN};
use relay_core::{
    Arguments, HttpResponse, MainLoop, MethodResult, Outcome, RelayConfig, RelayError, RequestRelay,
};

const WAIT: Duration = Duration::from_secs(20);

fn start_server() -> SocketAddr {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener).await
        })
        .unwrap();
    });

    addr
}

fn args(addr: SocketAddr, path: &str) -> Arguments {
    Arguments::new()
        .with("url", &format!("http://{addr}{path}"))
        .with("token", "secret")
}

fn call(relay: &RequestRelay, method: &str, args: &Arguments) -> Outcome {
    let rx = relay.call(method, args);
    let (tx, done) = mpsc::channel();
    std::thread::spawn(move || {
        let _ = tx.send(rx.blocking_recv());
    });
    done.recv_timeout(WAIT)
        .expect("no outcome delivered")
        .expect("outcome channel dropped")
}

#[test]
fn get_returns_status_and_body() {
    let addr = start_server();
    let relay = RequestRelay::new(&RelayConfig::default()).unwrap();

    let outcome = call(&relay, "getAuthMe", &args(addr, "/auth/me"));
    assert_eq!(
        outcome,
        Ok(HttpResponse {
            status_code: 200,
            body: r#"{"ok":true}"#.to_string()
        })
    );
}

#[test]
fn non_2xx_is_still_a_success_with_error_body() {
    let addr = start_server();
    let relay = RequestRelay::new(&RelayConfig::default()).unwrap();

    let outcome = call(&relay, "fetch", &args(addr, "/missing"));
    assert_eq!(
        outcome,
        Ok(HttpResponse {
            status_code: 404,
            body: "not found".to_string()
        })
    );
}

#[test]
fn error_status_without_body_yields_empty_string() {
    let addr = start_server();
    let relay = RequestRelay::new(&RelayConfig::default()).unwrap();

    let response = call(&relay, "fetch", &args(addr, "/empty-error")).unwrap();
    assert_eq!(response.status_code, 500);
    assert_eq!(response.body, "");
}

#[test]
fn invalid_utf8_body_is_decoded_lossily() {
    let addr = start_server();
    let relay = RequestRelay::new(&RelayConfig::default()).unwrap();

    let outcome = call(&relay, "fetch", &args(addr, "/latin1"));
    assert_eq!(
        outcome,
        Ok(HttpResponse {
            status_code: 200,
            body: "ok\u{FFFD}!".to_string()
        })
    );
}

#[test]
fn body_past_ten_mebibytes_is_read_fully() {
    let addr = start_server();
    let relay = RequestRelay::new(&RelayConfig::default()).unwrap();

    let response = call(&relay, "fetch", &args(addr, "/large")).unwrap();
    assert_eq!(response.status_code, 200);
    assert_eq!(response.body.len(), LARGE_BODY_LEN);
    assert!(response.body.bytes().all(|b| b == b'a'));
}

#[test]
fn post_sends_headers_and_exact_payload() {
    let addr = start_server();
    let relay = RequestRelay::new(&RelayConfig::default()).unwrap();

    let response = call(&relay, "post", &args(addr, "/inspect").with("body", r#"{"x":1}"#)).unwrap();
    assert_eq!(response.status_code, 200);

    let seen: Inspected = serde_json::from_str(&response.body).unwrap();
    assert_eq!(seen.method, "POST");
    assert_eq!(seen.authorization.as_deref(), Some("Bearer secret"));
    assert_eq!(seen.content_type.as_deref(), Some("application/json"));
    assert_eq!(seen.accept.as_deref(), Some("application/json"));
    assert_eq!(seen.connection.as_deref(), Some("close"));
    assert_eq!(seen.body, r#"{"x":1}"#);
}

#[test]
fn post_to_echo_returns_the_body() {
    let addr = start_server();
    let relay = RequestRelay::new(&RelayConfig::default()).unwrap();

    let response = call(&relay, "post", &args(addr, "/echo").with("body", r#"{"x":1}"#)).unwrap();
    assert_eq!(response.body, r#"{"x":1}"#);
}

#[test]
fn fetch_sends_get_with_bearer_and_no_body() {
    let addr = start_server();
    let relay = RequestRelay::new(&RelayConfig::default()).unwrap();

    let response = call(&relay, "fetch", &args(addr, "/inspect").with("body", "ignored")).unwrap();
    let seen: Inspected = serde_json::from_str(&response.body).unwrap();
    assert_eq!(seen.method, "GET");
    assert_eq!(seen.authorization.as_deref(), Some("Bearer secret"));
    assert_eq!(seen.connection.as_deref(), Some("close"));
    assert!(seen.body.is_empty());
}

#[test]
fn unresponsive_endpoint_times_out_as_network_error() {
    let addr = start_server();
    let config = RelayConfig {
        read_timeout_ms: 300,
        ..RelayConfig::default()
    };
    let relay = RequestRelay::new(&config).unwrap();

    let started = Instant::now();
    let outcome = call(&relay, "fetch", &args(addr, "/hang"));
    assert!(matches!(outcome, Err(RelayError::NetworkError(_))), "{outcome:?}");
    assert!(started.elapsed() < Duration::from_secs(10));
}

#[test]
fn refused_connection_is_a_network_error() {
    let port = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port();
    let relay = RequestRelay::new(&RelayConfig::default()).unwrap();

    let outcome = call(
        &relay,
        "fetch",
        &Arguments::new()
            .with("url", &format!("http://127.0.0.1:{port}/auth/me"))
            .with("token", "secret"),
    );
    assert!(matches!(outcome, Err(RelayError::NetworkError(_))));
}

#[test]
fn repeated_invocations_are_identical() {
    let addr = start_server();
    let relay = RequestRelay::new(&RelayConfig::default()).unwrap();
    let args = args(addr, "/auth/me");

    let first = call(&relay, "fetch", &args);
    let second = call(&relay, "fetch", &args);
    assert!(first.is_ok());
    assert_eq!(first, second);
}

#[test]
fn validation_errors_resolve_without_a_server() {
    let relay = RequestRelay::new(&RelayConfig::default()).unwrap();

    let outcome = call(&relay, "post", &Arguments::new().with("url", "http://127.0.0.1:1").with("token", "t"));
    assert_eq!(outcome, Err(RelayError::missing("body")));
}

/// Records the first delivery into a channel.
struct Forward(mpsc::Sender<String>);

impl MethodResult for Forward {
    fn success(self: Box<Self>, response: HttpResponse) {
        let _ = self.0.send(format!("{} {}", response.status_code, response.body));
    }

    fn error(self: Box<Self>, code: &str, message: &str) {
        let _ = self.0.send(format!("{code} {message}"));
    }

    fn not_implemented(self: Box<Self>) {
        let _ = self.0.send("not implemented".to_string());
    }
}

#[test]
fn main_loop_delivery_waits_for_the_host() {
    let addr = start_server();
    let (handle, main_loop) = MainLoop::new();
    let relay = RequestRelay::with_dispatcher(&RelayConfig::default(), Arc::new(handle)).unwrap();
    let (tx, rx) = mpsc::channel();

    relay.handle("getAuthMe", &args(addr, "/auth/me"), Box::new(Forward(tx)));

    assert!(main_loop.run_next(WAIT));
    assert_eq!(rx.try_recv().unwrap(), r#"200 {"ok":true}"#);
    assert_eq!(main_loop.run_pending(), 0);
}
