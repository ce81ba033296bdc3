use std::io;

use libc::{c_int, id_t, pid_t};

use crate::errno::{check, clear_errno, errno};

/// What the `who` argument of [`getpriority`] identifies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum PriorityTarget {
    Process,
    ProcessGroup,
    User,
}

/// Reads the scheduling priority (nice value) of a process, group or user.
///
/// `who == 0` means the caller. Nice values can legitimately be `-1`, so failure is
/// detected through errno rather than the return value.
pub fn getpriority(target: PriorityTarget, who: id_t) -> io::Result<i32> {
    let which = match target {
        PriorityTarget::Process => libc::PRIO_PROCESS,
        PriorityTarget::ProcessGroup => libc::PRIO_PGRP,
        PriorityTarget::User => libc::PRIO_USER,
    };
    clear_errno();
    // SAFETY: getpriority takes plain integers
    let ret = unsafe { libc::getpriority(which, who) };
    if ret == -1 {
        let code = errno();
        if code != 0 {
            return Err(io::Error::from_raw_os_error(code));
        }
    }
    Ok(ret)
}

/// How a child process changed state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WaitStatus {
    /// Exited normally with this code.
    Exited(i32),
    /// Terminated by this signal.
    Signaled(i32),
    /// Stopped by this signal.
    Stopped(i32),
    /// Any other change, e.g. continued.
    Other,
}

impl WaitStatus {
    /// Decodes a raw status word as filled in by `waitpid`.
    #[must_use]
    pub fn from_raw(status: c_int) -> Self {
        if libc::WIFEXITED(status) {
            Self::Exited(libc::WEXITSTATUS(status))
        } else if libc::WIFSIGNALED(status) {
            Self::Signaled(libc::WTERMSIG(status))
        } else if libc::WIFSTOPPED(status) {
            Self::Stopped(libc::WSTOPSIG(status))
        } else {
            Self::Other
        }
    }

    #[must_use]
    pub fn success(self) -> bool {
        self == Self::Exited(0)
    }
}

/// Flags for [`waitpid`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WaitOptions {
    /// Return immediately if no child has changed state (`WNOHANG`).
    pub no_hang: bool,
    /// Also report stopped children (`WUNTRACED`).
    pub untraced: bool,
}

impl WaitOptions {
    #[must_use]
    pub fn no_hang() -> Self {
        Self {
            no_hang: true,
            ..Self::default()
        }
    }

    fn bits(self) -> c_int {
        let mut bits = 0;
        if self.no_hang {
            bits |= libc::WNOHANG;
        }
        if self.untraced {
            bits |= libc::WUNTRACED;
        }
        bits
    }
}

/// Waits for a child to change state.
///
/// `pid` follows `waitpid(2)`: a pid, `-1` for any child, `0` or `-pgid` for a group.
/// Returns `Ok(None)` when `no_hang` is set and no child has changed state yet.
pub fn waitpid(pid: pid_t, options: WaitOptions) -> io::Result<Option<(pid_t, WaitStatus)>> {
    let mut status: c_int = 0;
    // SAFETY: status is a live local the call writes into
    let ret = check(unsafe { libc::waitpid(pid, &raw mut status, options.bits()) })?;
    if ret == 0 {
        return Ok(None);
    }
    Ok(Some((ret, WaitStatus::from_raw(status))))
}
