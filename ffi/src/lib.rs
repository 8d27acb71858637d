//! C-ABI wrapper around `relay-core`.
//!
//! # Overview
//! Exposes the request relay through `extern "C"` functions so any language
//! with a C FFI can issue bearer-authenticated HTTP calls and receive the
//! status and body through a callback, without linking to Rust's runtime.
//!
//! # Design
//! - Every `extern "C"` function wraps its body in `catch_unwind` so panics
//!   never cross the FFI boundary.
//! - `relay_handle` mirrors the host's method-call contract: method name plus
//!   a JSON object of string arguments in, exactly one callback out.
//! - With `FfiDelivery::MainLoop` callbacks are queued until the host calls
//!   `relay_run_pending` or `relay_wait_next` on its own thread.
//! - The C caller owns the relay handle and must release it with
//!   `relay_free`. Outcome strings are borrowed for the callback only.

pub mod types;

use std::ffi::{c_void, CStr};
use std::os::raw::c_char;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Duration;

use relay_core::{deliver, Arguments, MainLoop, MethodResult, RelayConfig, RelayError, RequestRelay};

use types::*;

// ---------------------------------------------------------------------------
// Relay lifecycle
// ---------------------------------------------------------------------------

/// Create a new relay.
///
/// `config_json` may be null for defaults, or a JSON object such as
/// `{"readTimeoutMs":5000,"maxWorkers":4}`. Returns null if the config does
/// not parse, the worker pool cannot start, or an internal panic occurs.
/// The caller must free the returned pointer with `relay_free`.
#[unsafe(no_mangle)]
pub extern "C" fn relay_new(config_json: *const c_char, delivery: FfiDelivery) -> *mut FfiRelay {
    catch_unwind(|| {
        let config = if config_json.is_null() {
            RelayConfig::default()
        } else {
            let json = unsafe { CStr::from_ptr(config_json) }.to_str().unwrap_or("");
            match RelayConfig::from_json(json) {
                Ok(config) => config,
                Err(e) => {
                    log::warn!("relay_new: {e}");
                    return std::ptr::null_mut();
                }
            }
        };

        let (relay, main_loop) = match delivery {
            FfiDelivery::Worker => (RequestRelay::new(&config), None),
            FfiDelivery::MainLoop => {
                let (handle, main_loop) = MainLoop::new();
                (RequestRelay::with_dispatcher(&config, Arc::new(handle)), Some(main_loop))
            }
        };
        match relay {
            Ok(inner) => Box::into_raw(Box::new(FfiRelay { inner, main_loop })),
            Err(e) => {
                log::warn!("relay_new: failed to start worker pool: {e}");
                std::ptr::null_mut()
            }
        }
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Free a relay created by `relay_new`. Safe to call with null.
///
/// Requests already in flight run to completion; with `MainLoop` delivery
/// their callbacks then run on the worker thread.
#[unsafe(no_mangle)]
pub extern "C" fn relay_free(relay: *mut FfiRelay) {
    if !relay.is_null() {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            drop(unsafe { Box::from_raw(relay) });
        }));
    }
}

// ---------------------------------------------------------------------------
// Method calls
// ---------------------------------------------------------------------------

/// Handle one method call (`getAuthMe`, `fetch` or `post`).
///
/// `args_json` is a JSON object of string arguments (`url`, `token`, and
/// `body` for `post`); null is treated as `{}`. `callback` is invoked exactly
/// once with `user_data`: synchronously on this thread for rejected calls,
/// later for calls that reach the network. A null `callback` drops the call.
#[unsafe(no_mangle)]
pub extern "C" fn relay_handle(
    relay: *const FfiRelay,
    method: *const c_char,
    args_json: *const c_char,
    callback: Option<FfiCallback>,
    user_data: *mut c_void,
) {
    let Some(callback) = callback else {
        log::warn!("relay_handle: null callback, call dropped");
        return;
    };

    let outcome = catch_unwind(AssertUnwindSafe(|| {
        let result: Box<dyn MethodResult> = Box::new(CallbackResult {
            callback,
            user_data: UserData(user_data),
        });

        if relay.is_null() {
            deliver(result, Err(null_arg("relay")));
            return;
        }
        let relay = unsafe { &*relay };
        let method = if method.is_null() {
            ""
        } else {
            unsafe { CStr::from_ptr(method) }.to_str().unwrap_or("")
        };
        let args = if args_json.is_null() {
            Ok(Arguments::new())
        } else {
            let json = unsafe { CStr::from_ptr(args_json) }.to_str().unwrap_or("");
            Arguments::from_json(json)
        };

        match args {
            Ok(args) => relay.inner.handle(method, &args, result),
            Err(e) => deliver(result, Err(e)),
        }
    }));

    if outcome.is_err() {
        log::error!("relay_handle: panic while handling call");
    }
}

fn null_arg(name: &str) -> RelayError {
    RelayError::InvalidArguments(format!("null argument: {name}"))
}

// ---------------------------------------------------------------------------
// Main-loop delivery
// ---------------------------------------------------------------------------

/// Run every queued callback on the calling thread. Returns how many ran.
/// Always 0 for relays created with `FfiDelivery::Worker`.
#[unsafe(no_mangle)]
pub extern "C" fn relay_run_pending(relay: *const FfiRelay) -> u32 {
    catch_unwind(AssertUnwindSafe(|| {
        if relay.is_null() {
            return 0;
        }
        let relay = unsafe { &*relay };
        match &relay.main_loop {
            Some(main_loop) => main_loop.run_pending() as u32,
            None => 0,
        }
    }))
    .unwrap_or(0)
}

/// Wait up to `timeout_ms` for one queued callback and run it on the calling
/// thread. Returns true if a callback ran.
#[unsafe(no_mangle)]
pub extern "C" fn relay_wait_next(relay: *const FfiRelay, timeout_ms: u32) -> bool {
    catch_unwind(AssertUnwindSafe(|| {
        if relay.is_null() {
            return false;
        }
        let relay = unsafe { &*relay };
        match &relay.main_loop {
            Some(main_loop) => main_loop.run_next(Duration::from_millis(u64::from(timeout_ms))),
            None => false,
        }
    }))
    .unwrap_or(false)
}

/// Library version as a static NUL-terminated string. Never free it.
#[unsafe(no_mangle)]
pub extern "C" fn relay_version() -> *const c_char {
    concat!(env!("CARGO_PKG_VERSION"), "\0").as_ptr() as *const c_char
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
