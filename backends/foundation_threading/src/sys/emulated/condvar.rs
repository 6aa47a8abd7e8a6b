//! Emulated condition variable over the two-event pair.
//!
//! A waiter registers itself in the count, releases the caller's mutex,
//! then blocks on the event pair. Wakers only set an event when someone
//! is registered. The last waiter released by a broadcast resets the
//! manual-reset event so a later wait blocks again.

use crate::clock::Deadline;
use crate::result::ThreadingResult;
use crate::sys::emulated::event::{EventPair, WakeKind};
use crate::sys::emulated::mutex::Mutex;
use crate::sys::emulated::spin::SpinLock;
use crate::sys::{CondVarBackend, MutexBackend};

pub(crate) struct CondVar {
    waiters: SpinLock<u32>,
    events: EventPair,
}

impl CondVarBackend for CondVar {
    type Mutex = Mutex;

    fn create() -> ThreadingResult<Self> {
        Ok(Self {
            waiters: SpinLock::new(0),
            events: EventPair::new(),
        })
    }

    fn signal(&self) -> ThreadingResult<()> {
        if *self.waiters.lock() > 0 {
            self.events.set_signal();
        }
        Ok(())
    }

    fn broadcast(&self) -> ThreadingResult<()> {
        if *self.waiters.lock() > 0 {
            self.events.set_broadcast();
        }
        Ok(())
    }

    fn wait(&self, mutex: &Self::Mutex, deadline: Option<Deadline>) -> ThreadingResult<()> {
        *self.waiters.lock() += 1;
        mutex.unlock()?;

        let outcome = self.events.wait_either(deadline);

        {
            let mut waiters = self.waiters.lock();
            *waiters -= 1;
            // The last waiter out of a broadcast closes the gate behind
            // itself. A timed-out waiter leaves the events untouched.
            if *waiters == 0 && outcome == Ok(WakeKind::Broadcast) {
                self.events.reset_broadcast();
            }
        }

        // The mutex is reacquired on every exit path, timeout included.
        mutex.lock(None)?;
        outcome.map(|_| ())
    }
}
