//! Condition variable paired with [`Mutex`].
//!
//! The usual contract applies: callers hold the mutex around the wait
//! and re-check their predicate in a loop, since wakeups may be spurious
//! and notifications sent with no waiter registered are lost.

use crate::clock::Deadline;
use crate::mutex::Mutex;
use crate::result::ThreadingResult;
use crate::sys::{imp, CondVarBackend};

pub struct CondVar {
    inner: imp::CondVar,
}

impl CondVar {
    pub fn new() -> ThreadingResult<Self> {
        Ok(Self {
            inner: imp::CondVar::create()?,
        })
    }

    /// Wakes at least one waiting thread, if any is waiting.
    pub fn notify_one(&self) -> ThreadingResult<()> {
        self.inner.signal()
    }

    /// Wakes every thread currently waiting.
    pub fn notify_all(&self) -> ThreadingResult<()> {
        self.inner.broadcast()
    }

    /// Atomically releases `mutex` and blocks until notified, then
    /// re-acquires `mutex` before returning.
    ///
    /// `mutex` must be held by the calling thread.
    pub fn wait(&self, mutex: &Mutex) -> ThreadingResult<()> {
        self.inner.wait(&mutex.inner, None)
    }

    /// Like [`wait`](Self::wait) but gives up once the deadline passes,
    /// reporting `TimedOut`. The mutex is re-acquired on the timeout
    /// path too.
    pub fn wait_deadline(&self, mutex: &Mutex, deadline: Deadline) -> ThreadingResult<()> {
        self.inner.wait(&mutex.inner, Some(deadline))
    }
}
