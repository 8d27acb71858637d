use axum::{
    http::{header, HeaderMap, Method, StatusCode},
    routing::{any, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;

/// What `/inspect` saw of the incoming request.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Inspected {
    pub method: String,
    pub authorization: Option<String>,
    pub content_type: Option<String>,
    pub accept: Option<String>,
    pub connection: Option<String>,
    pub body: String,
}

pub fn app() -> Router {
    Router::new()
        .route("/auth/me", get(auth_me))
        .route("/echo", post(echo))
        .route("/inspect", any(inspect))
        .route("/hang", get(hang))
        .route("/empty-error", get(empty_error))
        .route("/latin1", get(latin1))
        .route("/large", get(large))
        .fallback(not_found)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

fn header_str(headers: &HeaderMap, name: header::HeaderName) -> Option<String> {
    headers.get(name).and_then(|v| v.to_str().ok()).map(str::to_string)
}

async fn auth_me(headers: HeaderMap) -> (StatusCode, String) {
    match header_str(&headers, header::AUTHORIZATION) {
        Some(value) if value.starts_with("Bearer ") && value.len() > "Bearer ".len() => {
            (StatusCode::OK, r#"{"ok":true}"#.to_string())
        }
        _ => (StatusCode::UNAUTHORIZED, "unauthorized".to_string()),
    }
}

async fn echo(body: String) -> String {
    body
}

async fn inspect(method: Method, headers: HeaderMap, body: String) -> Json<Inspected> {
    Json(Inspected {
        method: method.to_string(),
        authorization: header_str(&headers, header::AUTHORIZATION),
        content_type: header_str(&headers, header::CONTENT_TYPE),
        accept: header_str(&headers, header::ACCEPT),
        connection: header_str(&headers, header::CONNECTION),
        body,
    })
}

/// Accepts the request and never answers.
async fn hang() -> StatusCode {
    std::future::pending::<()>().await;
    StatusCode::OK
}

async fn empty_error() -> StatusCode {
    StatusCode::INTERNAL_SERVER_ERROR
}

/// Size of the `/large` body, past ureq's default 10 MiB read limit.
pub const LARGE_BODY_LEN: usize = 11 * 1024 * 1024;

/// Body bytes that are not valid UTF-8.
async fn latin1() -> Vec<u8> {
    b"ok\xff!".to_vec()
}

async fn large() -> Vec<u8> {
    vec![b'a'; LARGE_BODY_LEN]
}

async fn not_found() -> (StatusCode, &'static str) {
    (StatusCode::NOT_FOUND, "not found")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inspected_serializes_missing_headers_as_null() {
        let seen = Inspected {
            method: "GET".to_string(),
            authorization: None,
            content_type: None,
            accept: None,
            connection: None,
            body: String::new(),
        };
        let json = serde_json::to_value(&seen).unwrap();
        assert_eq!(json["method"], "GET");
        assert!(json["authorization"].is_null());
    }

    #[test]
    fn inspected_roundtrips_through_json() {
        let seen = Inspected {
            method: "POST".to_string(),
            authorization: Some("Bearer t".to_string()),
            content_type: Some("application/json".to_string()),
            accept: Some("application/json".to_string()),
            connection: Some("close".to_string()),
            body: r#"{"x":1}"#.to_string(),
        };
        let json = serde_json::to_string(&seen).unwrap();
        let back: Inspected = serde_json::from_str(&json).unwrap();
        assert_eq!(back.authorization, seen.authorization);
        assert_eq!(back.body, seen.body);
    }
}
