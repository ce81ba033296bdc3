//! Portable wrappers over the POSIX calls native extensions need from the host.
//!
//! Each wrapper normalizes the platform's structures into fixed-width Rust values and
//! reports failure as an [`std::io::Error`] carrying the errno. Use
//! [`exception_for`] to turn such an error into the host exception to raise.
#![cfg(unix)]

mod dir;
mod errno;
mod flock;
mod passwd;
mod process;
mod rusage;
mod select;

pub use crate::{
    dir::Dir,
    errno::exception_for,
    flock::{FlockOp, flock},
    passwd::user_home,
    process::{PriorityTarget, WaitOptions, WaitStatus, getpriority, waitpid},
    rusage::{RusageTimes, getrusage},
    select::select,
};
