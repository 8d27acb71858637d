//! Terminal delivery of outcomes back to the caller.
//!
//! # Design
//! A `MethodResult` is the caller's response channel. Its methods take
//! `self: Box<Self>`, so once one of them runs the channel is gone and a
//! second delivery cannot be expressed.
//!
//! A `Dispatcher` decides which thread runs the delivery. `Immediate` runs it
//! on the worker that finished the request. `MainLoop` queues it for the host
//! thread, which drains the queue with `run_pending` or `run_next`.

use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::time::Duration;

use crate::error::{ErrorKind, RelayError};
use crate::http::HttpResponse;

/// Single terminal result of an invocation.
pub type Outcome = Result<HttpResponse, RelayError>;

/// Response channel for one invocation.
pub trait MethodResult: Send {
    fn success(self: Box<Self>, response: HttpResponse);

    /// `code` is one of the `ErrorKind::code` strings other than
    /// `NOT_IMPLEMENTED`.
    fn error(self: Box<Self>, code: &str, message: &str);

    fn not_implemented(self: Box<Self>);
}

/// Route an outcome to the matching `MethodResult` method.
pub fn deliver(result: Box<dyn MethodResult>, outcome: Outcome) {
    match outcome {
        Ok(response) => result.success(response),
        Err(err) => match err.kind() {
            ErrorKind::UnsupportedMethod => result.not_implemented(),
            kind => result.error(kind.code(), err.message()),
        },
    }
}

pub type Job = Box<dyn FnOnce() + Send>;

/// Runs delivery jobs on the execution context the caller expects.
pub trait Dispatcher: Send + Sync {
    fn dispatch(&self, job: Job);
}

/// Runs jobs on whichever thread dispatches them.
#[derive(Debug, Default, Clone, Copy)]
pub struct Immediate;

impl Dispatcher for Immediate {
    fn dispatch(&self, job: Job) {
        job()
    }
}

/// Sending half of a `MainLoop`.
#[derive(Clone)]
pub struct LoopHandle {
    tx: Sender<Job>,
}

impl Dispatcher for LoopHandle {
    fn dispatch(&self, job: Job) {
        if let Err(mpsc::SendError(job)) = self.tx.send(job) {
            // The host loop is gone; run the job here rather than drop it.
            log::warn!("main loop closed, delivering on worker thread");
            job()
        }
    }
}

/// Queue of delivery jobs owned by the host thread.
pub struct MainLoop {
    rx: Receiver<Job>,
}

impl MainLoop {
    pub fn new() -> (LoopHandle, MainLoop) {
        let (tx, rx) = mpsc::channel();
        (LoopHandle { tx }, MainLoop { rx })
    }

    /// Run every job queued so far. Returns how many ran.
    pub fn run_pending(&self) -> usize {
        let mut ran = 0;
        while let Ok(job) = self.rx.try_recv() {
            job();
            ran += 1;
        }
        ran
    }

    /// Wait up to `timeout` for one job and run it.
    pub fn run_next(&self, timeout: Duration) -> bool {
        match self.rx.recv_timeout(timeout) {
            Ok(job) => {
                job();
                true
            }
            Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => false,
        }
    }
}
