use std::{
    io,
    os::fd::{AsFd, AsRawFd},
};

use crate::errno::check;

/// Advisory lock operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum FlockOp {
    Shared,
    Exclusive,
    Unlock,
}

impl FlockOp {
    fn bits(self, non_blocking: bool) -> libc::c_int {
        let op = match self {
            Self::Shared => libc::LOCK_SH,
            Self::Exclusive => libc::LOCK_EX,
            Self::Unlock => libc::LOCK_UN,
        };
        if non_blocking { op | libc::LOCK_NB } else { op }
    }
}

/// Applies or removes an advisory lock on an open file.
///
/// With `non_blocking`, a conflicting lock fails with [`io::ErrorKind::WouldBlock`]
/// instead of waiting.
pub fn flock(file: &impl AsFd, op: FlockOp, non_blocking: bool) -> io::Result<()> {
    let fd = file.as_fd().as_raw_fd();
    // SAFETY: fd is borrowed from a live owner for the duration of the call
    check(unsafe { libc::flock(fd, op.bits(non_blocking)) })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn non_blocking_adds_flag() {
        assert_eq!(FlockOp::Exclusive.bits(true), libc::LOCK_EX | libc::LOCK_NB);
        assert_eq!(FlockOp::Unlock.bits(false), libc::LOCK_UN);
    }
}
