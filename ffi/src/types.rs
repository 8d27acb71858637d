//! `#[repr(C)]` types for the FFI boundary.
//!
//! # Design
//! Outcomes cross the boundary as an `FfiOutcome` that lives on the Rust
//! stack for the duration of the callback. Every string it points to is
//! borrowed: the C caller copies what it needs and never frees anything.
//! Conversion from core types lives here to keep `lib.rs` focused on the
//! `extern "C"` surface.

use std::ffi::{c_void, CString};
use std::os::raw::c_char;

use relay_core::{HttpResponse, MainLoop, MethodResult, RequestRelay};

/// Opaque handle to a `RequestRelay`. C callers receive a pointer to this
/// and pass it back into every FFI function.
pub struct FfiRelay {
    pub(crate) inner: RequestRelay,
    /// Present when deliveries are queued for `relay_run_pending`.
    pub(crate) main_loop: Option<MainLoop>,
}

/// Where `relay_handle` callbacks run.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiDelivery {
    /// On the worker thread that performed the request.
    Worker = 0,
    /// On whichever thread calls `relay_run_pending` / `relay_wait_next`.
    MainLoop = 1,
}

/// Discriminates the fields of `FfiOutcome` that are set.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiOutcomeKind {
    /// `status_code` and `body` are set.
    Success = 0,
    /// `error_code` and `error_message` are set.
    Error = 1,
    /// The method name is not served. No other field is set.
    NotImplemented = 2,
}

/// Terminal outcome handed to an `FfiCallback`. Valid only during the call.
#[repr(C)]
pub struct FfiOutcome {
    pub kind: FfiOutcomeKind,
    pub status_code: u16,
    pub body: *const c_char,
    pub error_code: *const c_char,
    pub error_message: *const c_char,
}

/// Receives exactly one outcome per `relay_handle` call.
pub type FfiCallback = extern "C" fn(user_data: *mut c_void, outcome: *const FfiOutcome);

/// Caller-owned context pointer, passed back untouched.
pub(crate) struct UserData(pub(crate) *mut c_void);

// SAFETY: the relay never dereferences the pointer; the C caller promises it
// is usable from the thread the callback runs on.
unsafe impl Send for UserData {}

/// `MethodResult` that forwards into a C callback.
pub(crate) struct CallbackResult {
    pub(crate) callback: FfiCallback,
    pub(crate) user_data: UserData,
}

impl CallbackResult {
    fn fire(self, outcome: &FfiOutcome) {
        (self.callback)(self.user_data.0, outcome);
    }
}

impl MethodResult for CallbackResult {
    fn success(self: Box<Self>, response: HttpResponse) {
        let body = to_cstring(response.body);
        self.fire(&FfiOutcome {
            kind: FfiOutcomeKind::Success,
            status_code: response.status_code,
            body: body.as_ptr(),
            error_code: std::ptr::null(),
            error_message: std::ptr::null(),
        });
    }

    fn error(self: Box<Self>, code: &str, message: &str) {
        let code = to_cstring(code.to_string());
        let message = to_cstring(message.to_string());
        self.fire(&FfiOutcome {
            kind: FfiOutcomeKind::Error,
            status_code: 0,
            body: std::ptr::null(),
            error_code: code.as_ptr(),
            error_message: message.as_ptr(),
        });
    }

    fn not_implemented(self: Box<Self>) {
        self.fire(&FfiOutcome {
            kind: FfiOutcomeKind::NotImplemented,
            status_code: 0,
            body: std::ptr::null(),
            error_code: std::ptr::null(),
            error_message: std::ptr::null(),
        });
    }
}

/// Convert to a C string, dropping interior NUL bytes instead of failing.
pub(crate) fn to_cstring(s: String) -> CString {
    CString::new(s).unwrap_or_else(|e| {
        let mut bytes = e.into_vec();
        bytes.retain(|&b| b != 0);
        CString::new(bytes).unwrap_or_default()
    })
}
