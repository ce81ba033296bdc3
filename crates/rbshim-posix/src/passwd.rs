use std::{
    ffi::{CStr, CString},
    io,
    mem::MaybeUninit,
    ptr,
};

use libc::c_char;

/// Used when `sysconf` gives no hint for the `getpwnam_r` buffer.
const FALLBACK_BUFFER_SIZE: usize = 16 * 1024;

/// Looks up the home directory of the user called `name`.
///
/// Returns `Ok(None)` when no such user exists. The lookup buffer starts at the size
/// suggested by `sysconf(_SC_GETPW_R_SIZE_MAX)` and doubles on `ERANGE`.
pub fn user_home(name: &str) -> io::Result<Option<String>> {
    let name = CString::new(name)?;
    // SAFETY: sysconf has no preconditions
    let suggested = unsafe { libc::sysconf(libc::_SC_GETPW_R_SIZE_MAX) };
    let mut buffer_size = usize::try_from(suggested)
        .ok()
        .filter(|&size| size > 0)
        .unwrap_or(FALLBACK_BUFFER_SIZE);

    loop {
        let mut buffer: Vec<c_char> = vec![0; buffer_size];
        let mut entry = MaybeUninit::<libc::passwd>::uninit();
        let mut result: *mut libc::passwd = ptr::null_mut();
        // SAFETY: every pointer refers to a live local and `buffer.len()` is its real size
        let ret = unsafe {
            libc::getpwnam_r(
                name.as_ptr(),
                entry.as_mut_ptr(),
                buffer.as_mut_ptr(),
                buffer.len(),
                &raw mut result,
            )
        };
        if !result.is_null() {
            // SAFETY: on success `result` points at `entry`, whose strings live in `buffer`
            let dir = unsafe { (*result).pw_dir };
            if dir.is_null() {
                return Ok(Some(String::new()));
            }
            // SAFETY: pw_dir is a NUL-terminated string inside `buffer`, still alive here
            let home = unsafe { CStr::from_ptr(dir) };
            return Ok(Some(home.to_string_lossy().into_owned()));
        }
        match ret {
            // some libcs report a missing user as an error instead of a null result
            0 | libc::ENOENT | libc::ESRCH => return Ok(None),
            libc::ERANGE => {
                buffer_size = buffer_size
                    .checked_mul(2)
                    .ok_or_else(|| io::Error::from_raw_os_error(libc::ERANGE))?;
            }
            errno => return Err(io::Error::from_raw_os_error(errno)),
        }
    }
}
