//! Authenticated HTTP request relay.
//!
//! # Overview
//! A host (UI layer, FFI caller) hands the relay a method name and an
//! argument map. The relay validates them, performs one bearer-authenticated
//! HTTP call on a background worker, and reports exactly one outcome: the
//! status code with the raw body text, or a typed error.
//!
//! # Design
//! - `Invocation::parse` validates synchronously; failures never touch the
//!   network.
//! - `request::build` turns an invocation into a plain-data `HttpRequest`;
//!   `Transport` executes it. Only the transport performs I/O.
//! - `RequestRelay` owns a bounded worker pool and a `Dispatcher` that picks
//!   the thread each delivery runs on.
//! - Non-2xx responses are successes at this layer; only transport failures
//!   become `RelayError::NetworkError`.

pub mod config;
pub mod delivery;
pub mod error;
pub mod http;
pub mod invocation;
pub mod relay;
pub mod request;
pub mod transport;

pub use config::RelayConfig;
pub use delivery::{deliver, Dispatcher, Immediate, LoopHandle, MainLoop, MethodResult, Outcome};
pub use error::{ErrorKind, RelayError};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use invocation::{Arguments, Invocation, MethodName};
pub use relay::RequestRelay;
pub use transport::{Transport, UreqTransport};
