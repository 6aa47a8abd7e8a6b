//! Portable backend built from `std::sync` pieces.
//!
//! Reproduces the behaviors the native backend gets from the platform:
//! a recursive core lock with an advisory flag for plain semantics, a
//! two-event pair behind the condition variable, a registry of named
//! semaphore counters, and an explicit TLS destructor pass driven by
//! the thread trampoline.

mod condvar;
mod event;
mod mutex;
mod semaphore;
mod spin;
mod tls;

pub(crate) use condvar::CondVar;
pub(crate) use mutex::Mutex;
pub(crate) use semaphore::Semaphore;
pub(crate) use tls::TlsFacility;

use std::time::Duration;

use crate::thread::SleepOutcome;

/// Suspends the calling thread. `std::thread::sleep` resumes across
/// signal interruptions itself, so the outcome is always completion.
pub(crate) fn sleep(duration: Duration) -> SleepOutcome {
    std::thread::sleep(duration);
    SleepOutcome::Completed
}
