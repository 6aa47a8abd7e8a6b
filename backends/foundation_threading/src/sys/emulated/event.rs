//! The two-event pair behind the emulated condition variable.
//!
//! Models an auto-reset event (one waiter consumes the signal) and a
//! manual-reset event (stays signaled until reset) that can be waited
//! on together, in the style of OS event objects.

use std::sync::{Condvar, Mutex};

use crate::clock::Deadline;
use crate::result::{ThreadingError, ThreadingResult};

/// Which of the two events released a waiter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum WakeKind {
    /// The auto-reset signal event; consumed by exactly one waiter.
    Signal,
    /// The manual-reset broadcast event; stays set until reset.
    Broadcast,
}

#[derive(Default)]
struct EventState {
    signal: bool,
    broadcast: bool,
}

pub(crate) struct EventPair {
    state: Mutex<EventState>,
    cond: Condvar,
}

impl EventPair {
    pub(crate) fn new() -> Self {
        Self {
            state: Mutex::new(EventState::default()),
            cond: Condvar::new(),
        }
    }

    fn locked(&self) -> std::sync::MutexGuard<'_, EventState> {
        // The inner lock is never held across a panic.
        self.state.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Sets the auto-reset event.
    pub(crate) fn set_signal(&self) {
        self.locked().signal = true;
        // Every waiter re-checks; exactly one will consume the signal.
        self.cond.notify_all();
    }

    /// Sets the manual-reset event.
    pub(crate) fn set_broadcast(&self) {
        self.locked().broadcast = true;
        self.cond.notify_all();
    }

    /// Clears the manual-reset event.
    pub(crate) fn reset_broadcast(&self) {
        self.locked().broadcast = false;
    }

    /// Blocks until either event is set, consuming the signal event when
    /// it is the one that fired.
    pub(crate) fn wait_either(&self, deadline: Option<Deadline>) -> ThreadingResult<WakeKind> {
        let mut state = self.locked();
        loop {
            if state.signal {
                state.signal = false;
                return Ok(WakeKind::Signal);
            }
            if state.broadcast {
                return Ok(WakeKind::Broadcast);
            }
            state = match deadline {
                None => self
                    .cond
                    .wait(state)
                    .unwrap_or_else(std::sync::PoisonError::into_inner),
                Some(deadline) => {
                    if deadline.has_passed() {
                        return Err(ThreadingError::TimedOut);
                    }
                    self.cond
                        .wait_timeout(state, deadline.remaining())
                        .unwrap_or_else(std::sync::PoisonError::into_inner)
                        .0
                }
            };
        }
    }
}
