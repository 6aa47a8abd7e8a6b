//! POSIX backend, delegating to pthreads and POSIX semaphores via `libc`.

mod condvar;
mod mutex;
mod semaphore;
mod tls;

pub(crate) use condvar::CondVar;
pub(crate) use mutex::Mutex;
pub(crate) use semaphore::Semaphore;
pub(crate) use tls::TlsFacility;

use std::time::Duration;

use crate::clock::Deadline;
use crate::thread::SleepOutcome;

/// Converts the time left until `deadline` into an absolute
/// `CLOCK_REALTIME` timespec, the reference clock of the pthread and
/// semaphore timed-wait calls.
pub(crate) fn deadline_to_abs_timespec(deadline: Deadline) -> libc::timespec {
    let remaining = deadline.remaining();
    let mut now = libc::timespec {
        tv_sec: 0,
        tv_nsec: 0,
    };
    // clock_gettime on CLOCK_REALTIME cannot fail with a valid timespec.
    unsafe {
        libc::clock_gettime(libc::CLOCK_REALTIME, &raw mut now);
    }

    let nanos = i64::from(remaining.subsec_nanos()) + now.tv_nsec as i64;
    libc::timespec {
        tv_sec: now.tv_sec
            + remaining.as_secs() as libc::time_t
            + (nanos / 1_000_000_000) as libc::time_t,
        tv_nsec: (nanos % 1_000_000_000) as _,
    }
}

/// Suspends the calling thread via `nanosleep`, reporting the remaining
/// time when a signal cut the sleep short.
pub(crate) fn sleep(duration: Duration) -> SleepOutcome {
    let request = libc::timespec {
        tv_sec: duration.as_secs() as libc::time_t,
        tv_nsec: duration.subsec_nanos() as libc::c_long,
    };
    let mut remaining = libc::timespec {
        tv_sec: 0,
        tv_nsec: 0,
    };

    let rc = unsafe { libc::nanosleep(&raw const request, &raw mut remaining) };
    if rc == 0 {
        return SleepOutcome::Completed;
    }
    if std::io::Error::last_os_error().raw_os_error() == Some(libc::EINTR) {
        return SleepOutcome::Interrupted {
            remaining: Duration::new(
                remaining.tv_sec.max(0) as u64,
                remaining.tv_nsec.clamp(0, 999_999_999) as u32,
            ),
        };
    }
    // The request is always a well-formed timespec, so EINVAL cannot
    // occur; treat anything else as a completed sleep.
    SleepOutcome::Completed
}
