use std::io;

use libc::c_int;
use rbshim::ExcType;

#[cfg(any(target_os = "linux", target_os = "android", target_os = "emscripten"))]
fn errno_location() -> *mut c_int {
    // SAFETY: returns the calling thread's errno slot, valid for the life of the thread
    unsafe { libc::__errno_location() }
}

#[cfg(any(target_os = "macos", target_os = "ios", target_os = "freebsd"))]
fn errno_location() -> *mut c_int {
    // SAFETY: returns the calling thread's errno slot, valid for the life of the thread
    unsafe { libc::__error() }
}

#[cfg(any(target_os = "netbsd", target_os = "openbsd"))]
fn errno_location() -> *mut c_int {
    // SAFETY: returns the calling thread's errno slot, valid for the life of the thread
    unsafe { libc::__errno() }
}

/// Resets errno, for calls whose failure return is also a valid result.
pub(crate) fn clear_errno() {
    // SAFETY: the pointer is the current thread's errno and is always writable
    unsafe { *errno_location() = 0 };
}

/// Current errno, `0` when unset.
pub(crate) fn errno() -> c_int {
    io::Error::last_os_error().raw_os_error().unwrap_or(0)
}

/// Turns a `-1` return into the current errno.
pub(crate) fn check(ret: c_int) -> io::Result<c_int> {
    if ret == -1 { Err(io::Error::last_os_error()) } else { Ok(ret) }
}

pub(crate) fn invalid_argument() -> io::Error {
    io::Error::from_raw_os_error(libc::EINVAL)
}

/// The host exception class and message for a failed wrapper call.
///
/// `call` names the operation, e.g. `"opendir"`, and is appended to the OS message.
#[must_use]
pub fn exception_for(call: &str, err: &io::Error) -> (ExcType, String) {
    (ExcType::SystemCallError, format!("{err} - {call}"))
}
