//! Mutex over `pthread_mutex_t`.
//!
//! Recursive mutexes use `PTHREAD_MUTEX_RECURSIVE`; plain ones are pinned
//! to `PTHREAD_MUTEX_NORMAL`, whose owner re-entry blocks forever — the
//! documented hazard of the plain kind.

use std::cell::UnsafeCell;
use std::time::Duration;

use crate::clock::Deadline;
use crate::mutex::MutexKind;
use crate::result::{check, from_errno, ThreadingError, ThreadingResult};
use crate::sys::MutexBackend;

pub(crate) struct Mutex {
    // Boxed so the pthread object never moves after init.
    handle: Box<UnsafeCell<libc::pthread_mutex_t>>,
    kind: MutexKind,
}

unsafe impl Send for Mutex {}
unsafe impl Sync for Mutex {}

impl Mutex {
    pub(crate) fn raw(&self) -> *mut libc::pthread_mutex_t {
        self.handle.get()
    }

    /// Acquisition poll loop for hosts without `pthread_mutex_timedlock`,
    /// and the 5 ms retry cadence it uses.
    #[cfg_attr(any(target_os = "linux", target_os = "android"), allow(dead_code))]
    fn timed_lock_polling(&self, deadline: Deadline) -> ThreadingResult<()> {
        const POLL_INTERVAL: Duration = Duration::from_millis(5);
        loop {
            match self.try_lock() {
                Ok(()) => return Ok(()),
                Err(ThreadingError::Busy) => {
                    if deadline.has_passed() {
                        return Err(ThreadingError::TimedOut);
                    }
                    std::thread::sleep(POLL_INTERVAL.min(deadline.remaining()));
                }
                Err(other) => return Err(other),
            }
        }
    }

    #[cfg(any(target_os = "linux", target_os = "android"))]
    fn timed_lock(&self, deadline: Deadline) -> ThreadingResult<()> {
        let ts = super::deadline_to_abs_timespec(deadline);
        check(unsafe { libc::pthread_mutex_timedlock(self.raw(), &raw const ts) })
    }

    #[cfg(not(any(target_os = "linux", target_os = "android")))]
    fn timed_lock(&self, deadline: Deadline) -> ThreadingResult<()> {
        self.timed_lock_polling(deadline)
    }
}

impl MutexBackend for Mutex {
    fn create(kind: MutexKind) -> ThreadingResult<Self> {
        let handle = Box::new(UnsafeCell::new(unsafe {
            std::mem::zeroed::<libc::pthread_mutex_t>()
        }));

        let rc = unsafe {
            let mut attr = std::mem::zeroed::<libc::pthread_mutexattr_t>();
            let rc = libc::pthread_mutexattr_init(&raw mut attr);
            if rc != 0 {
                return Err(from_errno(rc));
            }
            libc::pthread_mutexattr_settype(
                &raw mut attr,
                if kind.is_recursive() {
                    libc::PTHREAD_MUTEX_RECURSIVE
                } else {
                    libc::PTHREAD_MUTEX_NORMAL
                },
            );
            let rc = libc::pthread_mutex_init(handle.get(), &raw const attr);
            libc::pthread_mutexattr_destroy(&raw mut attr);
            rc
        };
        if rc != 0 {
            tracing::error!(code = rc, "failed to initialize pthread mutex");
            return Err(from_errno(rc));
        }
        Ok(Self { handle, kind })
    }

    fn lock(&self, deadline: Option<Deadline>) -> ThreadingResult<()> {
        match deadline {
            Some(deadline) if self.kind.is_timed() => self.timed_lock(deadline),
            _ => check(unsafe { libc::pthread_mutex_lock(self.raw()) }),
        }
    }

    fn try_lock(&self) -> ThreadingResult<()> {
        check(unsafe { libc::pthread_mutex_trylock(self.raw()) })
    }

    fn unlock(&self) -> ThreadingResult<()> {
        check(unsafe { libc::pthread_mutex_unlock(self.raw()) })
    }
}

impl Drop for Mutex {
    fn drop(&mut self) {
        // Destroying a locked mutex is a caller error; nothing to report.
        unsafe {
            libc::pthread_mutex_destroy(self.raw());
        }
    }
}
