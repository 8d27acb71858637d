//! The request relay: validate, execute in the background, deliver once.
//!
//! # Design
//! Validation runs on the calling thread and failures are delivered there
//! immediately, before any background work is scheduled. Valid invocations
//! become one blocking task on a bounded worker pool (a tokio runtime used
//! only for `spawn_blocking`). Each task owns its request outright, so no
//! state is shared between invocations, and its outcome is handed to the
//! configured `Dispatcher` exactly once.

use std::io;
use std::sync::Arc;

use tokio::runtime::{Builder, Runtime};
use tokio::sync::oneshot;

use crate::config::RelayConfig;
use crate::delivery::{deliver, Dispatcher, Immediate, MethodResult, Outcome};
use crate::error::RelayError;
use crate::http::HttpResponse;
use crate::invocation::{Arguments, Invocation};
use crate::request;
use crate::transport::{Transport, UreqTransport};

pub struct RequestRelay {
    transport: Arc<dyn Transport>,
    dispatcher: Arc<dyn Dispatcher>,
    // Always `Some` until drop.
    runtime: Option<Runtime>,
}

impl RequestRelay {
    /// Relay backed by `ureq`, delivering on the worker thread.
    pub fn new(config: &RelayConfig) -> io::Result<Self> {
        Self::with_parts(config, Arc::new(UreqTransport::new(config)), Arc::new(Immediate))
    }

    /// Relay backed by `ureq`, delivering through `dispatcher`.
    pub fn with_dispatcher(config: &RelayConfig, dispatcher: Arc<dyn Dispatcher>) -> io::Result<Self> {
        Self::with_parts(config, Arc::new(UreqTransport::new(config)), dispatcher)
    }

    pub fn with_parts(
        config: &RelayConfig,
        transport: Arc<dyn Transport>,
        dispatcher: Arc<dyn Dispatcher>,
    ) -> io::Result<Self> {
        let runtime = Builder::new_multi_thread()
            .worker_threads(1)
            .max_blocking_threads(config.max_workers.max(1))
            .thread_name("relay-worker")
            .build()?;
        log::info!(
            "request relay ready on channel {} (workers={}, connect={}ms, read={}ms)",
            config.channel,
            config.max_workers,
            config.connect_timeout_ms,
            config.read_timeout_ms
        );
        Ok(Self {
            transport,
            dispatcher,
            runtime: Some(runtime),
        })
    }

    /// Handle one method call. `result` receives exactly one of its three
    /// terminal calls: on this thread for rejected invocations, through the
    /// dispatcher otherwise.
    pub fn handle(&self, method: &str, args: &Arguments, result: Box<dyn MethodResult>) {
        let invocation = match Invocation::parse(method, args) {
            Ok(invocation) => invocation,
            Err(err) => {
                log::debug!("[{method}] rejected: {err}");
                deliver(result, Err(err));
                return;
            }
        };

        let dispatcher = self.dispatcher.clone();
        self.submit(invocation, move |outcome| {
            dispatcher.dispatch(Box::new(move || deliver(result, outcome)));
        });
    }

    /// Future-style variant of `handle`. Rejected invocations resolve
    /// immediately; the dispatcher is bypassed.
    pub fn call(&self, method: &str, args: &Arguments) -> oneshot::Receiver<Outcome> {
        let (tx, rx) = oneshot::channel();
        match Invocation::parse(method, args) {
            Ok(invocation) => self.submit(invocation, move |outcome| {
                let _ = tx.send(outcome);
            }),
            Err(err) => {
                log::debug!("[{method}] rejected: {err}");
                let _ = tx.send(Err(err));
            }
        }
        rx
    }

    fn submit<F>(&self, invocation: Invocation, on_done: F)
    where
        F: FnOnce(Outcome) + Send + 'static,
    {
        let Some(runtime) = self.runtime.as_ref() else {
            log::warn!("[{}] relay shut down, request not sent", invocation.method.as_str());
            on_done(Err(RelayError::NetworkError("relay is shut down".to_string())));
            return;
        };
        let transport = self.transport.clone();
        runtime.spawn_blocking(move || {
            let request = request::build(&invocation);
            let outcome = transport.execute(&request);
            log_outcome(&invocation, &outcome);
            on_done(outcome);
        });
    }
}

impl Drop for RequestRelay {
    fn drop(&mut self) {
        // In-flight requests keep running to completion on their own threads.
        if let Some(runtime) = self.runtime.take() {
            runtime.shutdown_background();
        }
    }
}

fn log_outcome(invocation: &Invocation, outcome: &Outcome) {
    let method = invocation.method.as_str();
    match outcome {
        Ok(response) => log::debug!("{} (id={})", describe_response(method, response), invocation.id),
        Err(err) => log::warn!("[{method}] network error: {err} (id={})", invocation.id),
    }
}

/// `bodyLength` counts characters, not bytes.
fn describe_response(method: &str, response: &HttpResponse) -> String {
    format!(
        "[{method}] <- status={} | bodyLength={} body={}",
        response.status_code,
        response.body.chars().count(),
        response.body
    )
}
