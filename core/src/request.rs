//! Request construction for validated invocations.
//!
//! Pure data transformation: the same `Invocation` always yields the same
//! `HttpRequest`, and nothing here performs I/O.

use crate::http::{HttpMethod, HttpRequest};
use crate::invocation::Invocation;

/// Build the outgoing request for an invocation.
///
/// Every request carries the bearer credential, JSON content negotiation
/// headers, and `Connection: close`. GET requests never carry a body.
pub fn build(invocation: &Invocation) -> HttpRequest {
    let method = invocation.method.http_method();
    let headers = vec![
        ("Authorization".to_string(), format!("Bearer {}", invocation.token)),
        ("Content-Type".to_string(), "application/json".to_string()),
        ("Accept".to_string(), "application/json".to_string()),
        ("Connection".to_string(), "close".to_string()),
    ];
    let body = match method {
        HttpMethod::Post => invocation.body.clone(),
        HttpMethod::Get => None,
    };

    HttpRequest {
        method,
        url: invocation.url.clone(),
        headers,
        body,
    }
}
