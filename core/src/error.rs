//! Error types for the request relay.
//!
//! # Design
//! The relay reports exactly three failure categories. Connect, write, read
//! and timeout failures all collapse into `NetworkError`; callers that need
//! more detail get the transport's message text, not a finer-grained kind.
//! Non-2xx responses are not errors at all: they reach the caller as an
//! ordinary `HttpResponse`.

use thiserror::Error;

/// Errors delivered as the terminal outcome of an invocation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RelayError {
    /// A required argument was missing. The message names the field, e.g.
    /// `"url required"`.
    #[error("{0}")]
    InvalidArguments(String),

    /// The method name is not one the relay serves.
    #[error("method not implemented: {0}")]
    UnsupportedMethod(String),

    /// Connection setup, request write, or response read failed (timeouts
    /// included). Carries the transport's description, possibly empty.
    #[error("{0}")]
    NetworkError(String),
}

/// Coarse classification of a `RelayError`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidArguments,
    UnsupportedMethod,
    NetworkError,
}

impl ErrorKind {
    /// Wire code reported to the host's error path.
    pub fn code(self) -> &'static str {
        match self {
            ErrorKind::InvalidArguments => "INVALID_ARGS",
            ErrorKind::UnsupportedMethod => "NOT_IMPLEMENTED",
            ErrorKind::NetworkError => "NETWORK_ERROR",
        }
    }
}

impl RelayError {
    pub fn missing(field: &str) -> Self {
        RelayError::InvalidArguments(format!("{field} required"))
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            RelayError::InvalidArguments(_) => ErrorKind::InvalidArguments,
            RelayError::UnsupportedMethod(_) => ErrorKind::UnsupportedMethod,
            RelayError::NetworkError(_) => ErrorKind::NetworkError,
        }
    }

    /// The human-readable message without any prefix.
    pub fn message(&self) -> &str {
        match self {
            RelayError::InvalidArguments(msg)
            | RelayError::UnsupportedMethod(msg)
            | RelayError::NetworkError(msg) => msg,
        }
    }
}
