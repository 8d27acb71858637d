//! HTTP transport types shared by request construction and the transport.
//!
//! # Design
//! Requests and responses are plain data. `request::build` produces an
//! `HttpRequest` without touching the network and a `Transport` turns it into
//! an `HttpResponse`, so the header and body rules can be tested without a
//! server.
//!
//! All fields use owned types (`String`, `Vec`) so values can move onto a
//! worker thread and across the FFI boundary without lifetime concerns.

use serde::Serialize;

/// HTTP method for a relayed request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
        }
    }
}

/// An HTTP request described as plain data.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl HttpRequest {
    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// The captured status and body text of a completed request.
///
/// `body` is the success stream for 2xx codes and the error stream otherwise
/// (empty when the server sent none). Serializes to the success payload
/// handed back to the host: `{"statusCode": 200, "body": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpResponse {
    pub status_code: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..=299).contains(&self.status_code)
    }
}
