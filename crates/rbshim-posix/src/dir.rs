use std::{
    ffi::{CStr, CString, OsStr, OsString},
    io,
    os::unix::ffi::OsStrExt,
    path::Path,
    ptr::NonNull,
};

use crate::errno::{clear_errno, errno};

/// An open directory stream.
///
/// Entries come back in the order the OS returns them, including `.` and `..`.
/// The stream is closed on drop.
#[derive(Debug)]
pub struct Dir {
    stream: NonNull<libc::DIR>,
}

impl Dir {
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = CString::new(path.as_ref().as_os_str().as_bytes())?;
        // SAFETY: path is a valid NUL-terminated string
        let stream = unsafe { libc::opendir(path.as_ptr()) };
        NonNull::new(stream)
            .map(|stream| Self { stream })
            .ok_or_else(io::Error::last_os_error)
    }

    /// Reads the next entry name, `Ok(None)` at the end of the stream.
    pub fn read_name(&mut self) -> io::Result<Option<OsString>> {
        // a null return means either end of stream or failure, told apart by errno
        clear_errno();
        // SAFETY: the stream is open for as long as `self` lives
        let entry = unsafe { libc::readdir(self.stream.as_ptr()) };
        if entry.is_null() {
            return match errno() {
                0 => Ok(None),
                code => Err(io::Error::from_raw_os_error(code)),
            };
        }
        // SAFETY: readdir returned a valid entry whose name is NUL-terminated; it stays
        // valid until the next call on this stream, and we copy it out before that
        let name = unsafe { CStr::from_ptr((*entry).d_name.as_ptr()) };
        Ok(Some(OsStr::from_bytes(name.to_bytes()).to_owned()))
    }

    /// Restarts the stream from the first entry.
    pub fn rewind(&mut self) {
        // SAFETY: the stream is open for as long as `self` lives
        unsafe { libc::rewinddir(self.stream.as_ptr()) };
    }
}

impl Iterator for Dir {
    type Item = io::Result<OsString>;

    fn next(&mut self) -> Option<Self::Item> {
        self.read_name().transpose()
    }
}

impl Drop for Dir {
    fn drop(&mut self) {
        // SAFETY: the stream was opened by `open` and is closed exactly once
        unsafe { libc::closedir(self.stream.as_ptr()) };
    }
}
