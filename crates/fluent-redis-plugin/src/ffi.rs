//! C exports called by Fluent Bit.
//!
//! Each export converts raw host arguments into safe Rust values, calls into
//! [`crate::host`], and catches any panic so it never unwinds across the
//! `extern "C"` boundary.

#![allow(non_snake_case)]

use std::borrow::Cow;
use std::ffi::{CStr, c_void};
use std::os::raw::{c_char, c_int};
use std::panic::{AssertUnwindSafe, catch_unwind};

use tracing::error;

use crate::host;
use crate::proxy::{self, FLB_ERROR, FlbPluginProxyDef};

/// Returned by `FLBPluginRegister` when the host passes no definition.
const REGISTER_FAILED: c_int = -1;

/// Run `f`, turning a panic into `on_panic`.
fn guarded<F>(entry: &'static str, on_panic: c_int, f: F) -> c_int
where
    F: FnOnce() -> c_int,
{
    match catch_unwind(AssertUnwindSafe(f)) {
        Ok(code) => code,
        Err(payload) => {
            let cause = payload
                .downcast_ref::<&str>()
                .map(|s| (*s).to_owned())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown cause".to_owned());
            error!(entry, cause, "panic caught at plugin boundary");
            on_panic
        }
    }
}

/// Register the plugin with Fluent Bit.
///
/// Returns 0 on success and -1 if `def` is null.
///
/// # Safety
///
/// `def` must be null or point to a writable `flb_plugin_proxy_def` that is
/// not accessed concurrently.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn FLBPluginRegister(def: *mut FlbPluginProxyDef) -> c_int {
    guarded("register", REGISTER_FAILED, || {
        // SAFETY: the caller guarantees `def` is null or valid and exclusive.
        match unsafe { def.as_mut() } {
            Some(def) => {
                proxy::register(def);
                0
            }
            None => REGISTER_FAILED,
        }
    })
}

/// Initialize the plugin: logging, configuration, runtime, first connect.
///
/// Returns `FLB_OK` or `FLB_ERROR`.
///
/// # Safety
///
/// `_plugin` is the host's opaque plugin handle and is never dereferenced.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn FLBPluginInit(_plugin: *mut c_void) -> c_int {
    guarded("init", FLB_ERROR, host::init)
}

/// Deliver one chunk of encoded records.
///
/// Returns `FLB_OK`, `FLB_RETRY` or `FLB_ERROR`.
///
/// # Safety
///
/// - `data` must be null or valid for reads of `length` bytes for the
///   duration of the call.
/// - `tag` must be null or a NUL-terminated string valid for the duration
///   of the call.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn FLBPluginFlush(
    data: *const c_void,
    length: c_int,
    tag: *const c_char,
) -> c_int {
    guarded("flush", FLB_ERROR, || {
        // SAFETY: forwarded caller guarantees on `data`/`length`.
        let chunk = unsafe { chunk_from_raw(data, length) };
        // SAFETY: forwarded caller guarantee on `tag`.
        let tag = unsafe { tag_from_raw(tag) };
        host::flush(chunk, &tag)
    })
}

/// Shut the plugin down. Always returns 0.
#[unsafe(no_mangle)]
pub extern "C" fn FLBPluginExit() -> c_int {
    guarded("exit", 0, host::exit)
}

/// Borrow the host's chunk. Null or non-positive lengths are empty.
///
/// # Safety
///
/// `data` must be null or valid for reads of `length` bytes for `'a`.
unsafe fn chunk_from_raw<'a>(data: *const c_void, length: c_int) -> &'a [u8] {
    match usize::try_from(length) {
        Ok(len) if len > 0 && !data.is_null() => {
            // SAFETY: non-null and valid for `len` bytes per the caller.
            unsafe { std::slice::from_raw_parts(data.cast::<u8>(), len) }
        }
        _ => &[],
    }
}

/// Borrow the host's tag, replacing invalid UTF-8. Null is empty.
///
/// # Safety
///
/// `tag` must be null or a NUL-terminated string valid for `'a`.
unsafe fn tag_from_raw<'a>(tag: *const c_char) -> Cow<'a, str> {
    if tag.is_null() {
        return Cow::Borrowed("");
    }
    // SAFETY: non-null and NUL-terminated per the caller.
    unsafe { CStr::from_ptr(tag) }.to_string_lossy()
}
