//! Exponential backoff for short waits.
//!
//! Used by [`OnceFlag`](crate::once::OnceFlag) waiters and the emulated
//! backend's internal locks: spin briefly with increasing backoff, then
//! hand the remainder of the wait to the scheduler.

use core::hint;

const SPIN_LIMIT: u32 = 7;

/// Spin-then-yield backoff helper.
///
/// The first few rounds issue exponentially more `spin_loop` hints; once
/// the limit is reached, [`SpinWait::relax`] yields the thread instead.
pub struct SpinWait {
    counter: u32,
}

impl SpinWait {
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self { counter: 0 }
    }

    /// Performs one backoff round.
    ///
    /// Returns `true` while spinning is still cheaper than yielding,
    /// `false` once the caller should block or yield instead.
    #[inline]
    pub fn spin(&mut self) -> bool {
        if self.counter >= SPIN_LIMIT {
            return false;
        }
        for _ in 0..(1u32 << self.counter) {
            hint::spin_loop();
        }
        self.counter += 1;
        true
    }

    /// Backs off once, yielding the thread when the spin budget is spent.
    #[inline]
    pub fn relax(&mut self) {
        if !self.spin() {
            std::thread::yield_now();
        }
    }

    /// Restarts the backoff sequence.
    #[inline]
    pub fn reset(&mut self) {
        self.counter = 0;
    }
}

impl Default for SpinWait {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}
