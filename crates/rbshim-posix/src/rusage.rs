use std::{io, mem::MaybeUninit};

use libc::c_int;

use crate::errno::check;

/// CPU times consumed by this process and its waited-for children, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RusageTimes {
    pub user: f64,
    pub system: f64,
    pub children_user: f64,
    pub children_system: f64,
}

/// Reads user and system CPU time for the process and its children.
pub fn getrusage() -> io::Result<RusageTimes> {
    let own = rusage(libc::RUSAGE_SELF)?;
    let children = rusage(libc::RUSAGE_CHILDREN)?;
    Ok(RusageTimes {
        user: seconds(own.ru_utime),
        system: seconds(own.ru_stime),
        children_user: seconds(children.ru_utime),
        children_system: seconds(children.ru_stime),
    })
}

fn rusage(who: c_int) -> io::Result<libc::rusage> {
    let mut usage = MaybeUninit::<libc::rusage>::uninit();
    // SAFETY: getrusage writes the whole struct on success
    check(unsafe { libc::getrusage(who, usage.as_mut_ptr()) })?;
    // SAFETY: initialized by the successful call above
    Ok(unsafe { usage.assume_init() })
}

#[expect(clippy::cast_precision_loss)]
fn seconds(time: libc::timeval) -> f64 {
    time.tv_sec as f64 + f64::from(i32::try_from(time.tv_usec).unwrap_or_default()) / 1e6
}
