//! One-shot initialization flag.
//!
//! [`OnceFlag`] elects exactly one caller to run the routine; every
//! other caller blocks until the routine has finished, so completion of
//! any `call_once` means the initialization is visible. The election is
//! a single CAS on the state word, and losers spin-then-yield rather
//! than parking, since the guarded routines are expected to be short.

use core::sync::atomic::{AtomicU32, Ordering};

use crate::spin_wait::SpinWait;

const UNINIT: u32 = 0;
const ELECTING: u32 = 1;
const RUNNING: u32 = 2;
const DONE: u32 = 3;
const POISONED: u32 = 4;

pub struct OnceFlag {
    state: AtomicU32,
}

impl Default for OnceFlag {
    fn default() -> Self {
        Self::new()
    }
}

impl OnceFlag {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: AtomicU32::new(UNINIT),
        }
    }

    /// Whether some call to [`call_once`](Self::call_once) has completed.
    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.state.load(Ordering::Acquire) == DONE
    }

    /// Runs `routine` if no caller has before; otherwise blocks until
    /// the elected caller finishes.
    ///
    /// # Panics
    ///
    /// If the elected routine panics the flag is poisoned and every
    /// present and future caller panics as well.
    pub fn call_once<F>(&self, routine: F)
    where
        F: FnOnce(),
    {
        if self.is_completed() {
            return;
        }
        match self
            .state
            .compare_exchange(UNINIT, ELECTING, Ordering::AcqRel, Ordering::Acquire)
        {
            Ok(_) => {
                self.state.store(RUNNING, Ordering::Release);
                let guard = PoisonOnPanic { state: &self.state };
                routine();
                core::mem::forget(guard);
                self.state.store(DONE, Ordering::Release);
            }
            Err(_) => self.wait_done(),
        }
    }

    fn wait_done(&self) {
        let mut backoff = SpinWait::new();
        loop {
            match self.state.load(Ordering::Acquire) {
                DONE => return,
                POISONED => panic!("one-shot initialization routine panicked"),
                _ => backoff.relax(),
            }
        }
    }
}

struct PoisonOnPanic<'a> {
    state: &'a AtomicU32,
}

impl Drop for PoisonOnPanic<'_> {
    fn drop(&mut self) {
        self.state.store(POISONED, Ordering::Release);
    }
}
