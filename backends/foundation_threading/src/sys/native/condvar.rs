//! Condition variable over `pthread_cond_t`.

use std::cell::UnsafeCell;

use crate::clock::Deadline;
use crate::result::{check, from_errno, ThreadingError, ThreadingResult};
use crate::sys::CondVarBackend;

use super::mutex::Mutex;

pub(crate) struct CondVar {
    handle: Box<UnsafeCell<libc::pthread_cond_t>>,
}

unsafe impl Send for CondVar {}
unsafe impl Sync for CondVar {}

impl CondVar {
    fn raw(&self) -> *mut libc::pthread_cond_t {
        self.handle.get()
    }
}

impl CondVarBackend for CondVar {
    type Mutex = Mutex;

    fn create() -> ThreadingResult<Self> {
        let handle = Box::new(UnsafeCell::new(unsafe {
            std::mem::zeroed::<libc::pthread_cond_t>()
        }));
        let rc = unsafe { libc::pthread_cond_init(handle.get(), std::ptr::null()) };
        if rc != 0 {
            tracing::error!(code = rc, "failed to initialize pthread condvar");
            return Err(from_errno(rc));
        }
        Ok(Self { handle })
    }

    fn signal(&self) -> ThreadingResult<()> {
        check(unsafe { libc::pthread_cond_signal(self.raw()) })
    }

    fn broadcast(&self) -> ThreadingResult<()> {
        check(unsafe { libc::pthread_cond_broadcast(self.raw()) })
    }

    fn wait(&self, mutex: &Mutex, deadline: Option<Deadline>) -> ThreadingResult<()> {
        match deadline {
            None => check(unsafe { libc::pthread_cond_wait(self.raw(), mutex.raw()) }),
            Some(deadline) => {
                let ts = super::deadline_to_abs_timespec(deadline);
                let rc = unsafe {
                    libc::pthread_cond_timedwait(self.raw(), mutex.raw(), &raw const ts)
                };
                match rc {
                    0 => Ok(()),
                    libc::ETIMEDOUT => Err(ThreadingError::TimedOut),
                    other => Err(from_errno(other)),
                }
            }
        }
    }
}

impl Drop for CondVar {
    fn drop(&mut self) {
        unsafe {
            libc::pthread_cond_destroy(self.raw());
        }
    }
}
