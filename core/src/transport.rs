//! Blocking HTTP execution.
//!
//! # Design
//! `Transport` is the single I/O seam of the relay. The production
//! implementation drives `ureq` with a fresh agent per request, so a
//! connection is owned by exactly one invocation and is released when the
//! agent drops at the end of `execute`. Non-2xx statuses are returned as data
//! rather than errors; only transport failures become `NetworkError`.

use std::time::Duration;

use crate::config::RelayConfig;
use crate::error::RelayError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

/// Executes one `HttpRequest` to completion on the current thread.
pub trait Transport: Send + Sync {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, RelayError>;
}

/// `ureq`-backed transport with fixed connect and read timeouts.
#[derive(Debug, Clone)]
pub struct UreqTransport {
    connect_timeout: Duration,
    read_timeout: Duration,
}

impl UreqTransport {
    pub fn new(config: &RelayConfig) -> Self {
        Self {
            connect_timeout: config.connect_timeout(),
            read_timeout: config.read_timeout(),
        }
    }

    fn agent(&self) -> ureq::Agent {
        ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_connect(Some(self.connect_timeout))
            .timeout_send_body(Some(self.read_timeout))
            .timeout_recv_response(Some(self.read_timeout))
            .timeout_recv_body(Some(self.read_timeout))
            .build()
            .new_agent()
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new(&RelayConfig::default())
    }
}

impl Transport for UreqTransport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, RelayError> {
        let agent = self.agent();

        let result = match request.method {
            HttpMethod::Get => {
                let mut builder = agent.get(&request.url);
                for (name, value) in &request.headers {
                    builder = builder.header(name.as_str(), value.as_str());
                }
                builder.call()
            }
            HttpMethod::Post => {
                let mut builder = agent.post(&request.url);
                for (name, value) in &request.headers {
                    builder = builder.header(name.as_str(), value.as_str());
                }
                builder.send(request.body.as_deref().unwrap_or_default().as_bytes())
            }
        };

        let mut response = result.map_err(network_error)?;
        let status_code = response.status().as_u16();
        // With status-as-error disabled the body reader yields the success
        // stream for 2xx and the error stream otherwise; no stream reads as "".
        // The body is read uncapped and invalid UTF-8 becomes U+FFFD.
        let bytes = response
            .body_mut()
            .with_config()
            .limit(u64::MAX)
            .read_to_vec()
            .map_err(network_error)?;
        let body = String::from_utf8_lossy(&bytes).into_owned();

        Ok(HttpResponse { status_code, body })
    }
}

fn network_error(err: ureq::Error) -> RelayError {
    RelayError::NetworkError(err.to_string())
}
