//! Emulated mutex.
//!
//! The base primitive is an always-recursive, waitable lock
//! (`RecursiveCore`), the shape hosts without native plain mutexes
//! offer. Plain semantics are layered on top with an advisory `locked`
//! flag; owner re-entry busy-polls that flag forever, reproducing the
//! non-recursive deadlock instead of silently permitting reentrancy.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Condvar, Mutex as StdMutex, PoisonError};
use std::thread::ThreadId;
use std::time::Duration;

use crate::clock::Deadline;
use crate::mutex::MutexKind;
use crate::result::{ThreadingError, ThreadingResult};
use crate::sys::MutexBackend;

#[derive(Default)]
struct OwnerState {
    owner: Option<ThreadId>,
    depth: u32,
}

/// Always-recursive waitable lock, the "OS primitive" of this backend.
struct RecursiveCore {
    state: StdMutex<OwnerState>,
    available: Condvar,
}

impl RecursiveCore {
    fn new() -> Self {
        Self {
            state: StdMutex::new(OwnerState::default()),
            available: Condvar::new(),
        }
    }

    fn acquire(&self, deadline: Option<Deadline>) -> ThreadingResult<()> {
        let me = std::thread::current().id();
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);

        if state.owner == Some(me) {
            state.depth += 1;
            return Ok(());
        }
        while state.owner.is_some() {
            state = match deadline {
                None => self
                    .available
                    .wait(state)
                    .unwrap_or_else(PoisonError::into_inner),
                Some(deadline) => {
                    if deadline.has_passed() {
                        return Err(ThreadingError::TimedOut);
                    }
                    self.available
                        .wait_timeout(state, deadline.remaining())
                        .unwrap_or_else(PoisonError::into_inner)
                        .0
                }
            };
        }
        state.owner = Some(me);
        state.depth = 1;
        Ok(())
    }

    fn try_acquire(&self) -> ThreadingResult<()> {
        let me = std::thread::current().id();
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        match state.owner {
            Some(owner) if owner == me => {
                state.depth += 1;
                Ok(())
            }
            Some(_) => Err(ThreadingError::Busy),
            None => {
                state.owner = Some(me);
                state.depth = 1;
                Ok(())
            }
        }
    }

    fn held_by_caller(&self) -> bool {
        let state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.owner == Some(std::thread::current().id())
    }

    fn release(&self) -> ThreadingResult<()> {
        let me = std::thread::current().id();
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if state.owner != Some(me) {
            return Err(ThreadingError::Fail);
        }
        state.depth -= 1;
        if state.depth == 0 {
            state.owner = None;
            drop(state);
            self.available.notify_one();
        }
        Ok(())
    }
}

pub(crate) struct Mutex {
    core: RecursiveCore,
    /// Advisory flag used only to emulate non-recursive semantics on top
    /// of the inherently recursive core.
    locked: AtomicBool,
    kind: MutexKind,
}

impl Mutex {
    /// Owner re-entry lands here with the core held at depth two and the
    /// flag still set, so an unbounded poll never ends: a live deadlock,
    /// matching the plain-mutex contract. A deadline bounds the poll the
    /// way `pthread_mutex_timedlock` would.
    fn simulate_deadlock(&self, deadline: Option<Deadline>) -> ThreadingResult<()> {
        while self.locked.load(Ordering::Acquire) {
            if let Some(deadline) = deadline {
                if deadline.has_passed() {
                    return Err(ThreadingError::TimedOut);
                }
            }
            std::thread::sleep(Duration::from_millis(1));
        }
        self.locked.store(true, Ordering::Release);
        Ok(())
    }
}

impl MutexBackend for Mutex {
    fn create(kind: MutexKind) -> ThreadingResult<Self> {
        Ok(Self {
            core: RecursiveCore::new(),
            locked: AtomicBool::new(false),
            kind,
        })
    }

    fn lock(&self, deadline: Option<Deadline>) -> ThreadingResult<()> {
        self.core.acquire(deadline)?;
        if !self.kind.is_recursive() {
            if let Err(error) = self.simulate_deadlock(deadline) {
                self.core.release()?;
                return Err(error);
            }
        }
        Ok(())
    }

    fn try_lock(&self) -> ThreadingResult<()> {
        self.core.try_acquire()?;
        if !self.kind.is_recursive() {
            if self.locked.load(Ordering::Acquire) {
                // Either owner re-entry or a stale flag: back out the
                // core acquisition and report contention.
                self.core.release()?;
                return Err(ThreadingError::Busy);
            }
            self.locked.store(true, Ordering::Release);
        }
        Ok(())
    }

    fn unlock(&self) -> ThreadingResult<()> {
        if !self.kind.is_recursive() {
            // Only the owner may clear the flag; a stranger's unlock must
            // leave the holder's state untouched.
            if !self.core.held_by_caller() {
                return Err(ThreadingError::Fail);
            }
            self.locked.store(false, Ordering::Release);
        }
        self.core.release()
    }
}
