//! Deadlines for timed lock and wait operations.
//!
//! A [`Deadline`] is an absolute point on the monotonic clock, not a
//! duration. Every timed operation in this crate takes a deadline, so
//! retries after a spurious wakeup never extend the total wait.

use std::time::{Duration, Instant};

/// An absolute point in time after which a timed operation gives up.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use foundation_threading::clock::Deadline;
///
/// let deadline = Deadline::after(Duration::from_millis(50));
/// assert!(!deadline.has_passed());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Deadline {
    at: Instant,
}

impl Deadline {
    /// A deadline that has already passed when observed.
    #[inline]
    #[must_use]
    pub fn now() -> Self {
        Self { at: Instant::now() }
    }

    /// A deadline `duration` from the current instant.
    #[inline]
    #[must_use]
    pub fn after(duration: Duration) -> Self {
        Self {
            at: Instant::now() + duration,
        }
    }

    /// Whether the deadline lies in the past.
    #[inline]
    #[must_use]
    pub fn has_passed(&self) -> bool {
        Instant::now() >= self.at
    }

    /// Time left until the deadline, saturating at zero.
    #[inline]
    #[must_use]
    pub fn remaining(&self) -> Duration {
        self.at.saturating_duration_since(Instant::now())
    }
}
