//! Result taxonomy shared by every primitive in this crate.
//!
//! Timeouts and contention are expected, frequent outcomes for
//! synchronization primitives, so they are ordinary error values rather
//! than panics. No function in this crate terminates the process; callers
//! decide how to surface failures.

use thiserror::Error;

/// Result alias used across the crate.
pub type ThreadingResult<T> = core::result::Result<T, ThreadingError>;

/// Error values returned by the synchronization primitives.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThreadingError {
    /// The resource is currently held by another party; the caller may retry.
    #[error("resource is busy, held by another thread")]
    Busy,

    /// The deadline elapsed before the operation could complete.
    #[error("deadline elapsed before the operation completed")]
    TimedOut,

    /// Re-entrant acquisition of a non-recursive lock was detected.
    #[error("re-entrant acquisition of a non-recursive lock")]
    Deadlock,

    /// An argument was outside the accepted range for the operation.
    #[error("invalid argument")]
    InvalidArgument,

    /// Allocation of the backing object failed. Fatal only to the creation
    /// call, never to the process.
    #[error("out of memory while creating a synchronization object")]
    OutOfMemory,

    /// A named object with the same identity already exists.
    #[error("an object with the same name already exists")]
    AlreadyExists,

    /// No named object with the given identity exists.
    #[error("no object with the given name exists")]
    NotFound,

    /// The operation was interrupted before completing.
    #[error("operation interrupted")]
    Interrupted,

    /// Unclassified operating-system level failure.
    #[error("unclassified operating system failure")]
    Fail,
}

/// Maps an `errno`-style code onto the crate taxonomy.
///
/// The native backend funnels every raw OS return through this single
/// translation point.
#[cfg(unix)]
pub(crate) fn from_errno(code: i32) -> ThreadingError {
    match code {
        libc::EBUSY | libc::EAGAIN => ThreadingError::Busy,
        libc::ETIMEDOUT => ThreadingError::TimedOut,
        libc::EDEADLK => ThreadingError::Deadlock,
        libc::EINVAL => ThreadingError::InvalidArgument,
        libc::ENOMEM | libc::ENOSPC => ThreadingError::OutOfMemory,
        libc::EEXIST => ThreadingError::AlreadyExists,
        libc::ENOENT => ThreadingError::NotFound,
        libc::EINTR => ThreadingError::Interrupted,
        _ => ThreadingError::Fail,
    }
}

/// Translates a pthread-style return code (0 on success, errno on failure).
#[cfg(unix)]
pub(crate) fn check(code: i32) -> ThreadingResult<()> {
    if code == 0 {
        Ok(())
    } else {
        Err(from_errno(code))
    }
}
