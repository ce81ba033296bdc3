use std::{io, mem::MaybeUninit, os::fd::RawFd, ptr};

use crate::errno::{check, invalid_argument};

#[expect(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
const FD_LIMIT: RawFd = libc::FD_SETSIZE as RawFd;

const MICROS_PER_SECOND: i64 = 1_000_000;

/// An initialized `fd_set`.
struct FdSet(libc::fd_set);

impl FdSet {
    /// Builds a set holding `fds`, raising `max_fd` to the highest descriptor seen.
    fn new(fds: &[RawFd], max_fd: &mut RawFd) -> io::Result<Self> {
        let mut raw = MaybeUninit::<libc::fd_set>::uninit();
        // SAFETY: FD_ZERO writes every byte of the set, so it is initialized afterwards
        let mut set = unsafe {
            libc::FD_ZERO(raw.as_mut_ptr());
            raw.assume_init()
        };
        for &fd in fds {
            if !(0..FD_LIMIT).contains(&fd) {
                return Err(invalid_argument());
            }
            // SAFETY: fd is within 0..FD_SETSIZE
            unsafe { libc::FD_SET(fd, &raw mut set) };
            *max_fd = (*max_fd).max(fd);
        }
        Ok(Self(set))
    }

    fn as_mut_ptr(&mut self) -> *mut libc::fd_set {
        &raw mut self.0
    }

    /// Replaces every descriptor that is not in the set with `-1`.
    fn mark_ready(&self, fds: &mut [RawFd]) {
        for fd in fds {
            // SAFETY: fd was range-checked when the set was built
            if !unsafe { libc::FD_ISSET(*fd, &raw const self.0) } {
                *fd = -1;
            }
        }
    }
}

/// Waits until descriptors in any of the three lists are ready.
///
/// Returns the number of ready descriptors. When it is positive, every descriptor
/// that is not ready is replaced with `-1` in place; on timeout the lists are left
/// as passed. A negative `timeout_us` blocks indefinitely.
///
/// Descriptors outside `0..FD_SETSIZE` fail with `EINVAL`.
pub fn select(read: &mut [RawFd], write: &mut [RawFd], except: &mut [RawFd], timeout_us: i64) -> io::Result<usize> {
    let mut max_fd = 0;
    let mut read_set = FdSet::new(read, &mut max_fd)?;
    let mut write_set = FdSet::new(write, &mut max_fd)?;
    let mut except_set = FdSet::new(except, &mut max_fd)?;

    let mut timeout = if timeout_us >= 0 {
        Some(libc::timeval {
            tv_sec: (timeout_us / MICROS_PER_SECOND)
                .try_into()
                .map_err(|_| invalid_argument())?,
            tv_usec: (timeout_us % MICROS_PER_SECOND)
                .try_into()
                .map_err(|_| invalid_argument())?,
        })
    } else {
        None
    };
    let timeout_ptr = timeout.as_mut().map_or(ptr::null_mut(), ptr::from_mut);

    // SAFETY: the sets are initialized locals and the timeout is null or a live local
    let ret = unsafe {
        libc::select(
            max_fd + 1,
            read_set.as_mut_ptr(),
            write_set.as_mut_ptr(),
            except_set.as_mut_ptr(),
            timeout_ptr,
        )
    };
    let ready = check(ret)?;
    if ready > 0 {
        read_set.mark_ready(read);
        write_set.mark_ready(write);
        except_set.mark_ready(except);
    }
    Ok(usize::try_from(ready).unwrap_or_default())
}
