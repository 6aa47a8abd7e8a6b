//! Counting semaphore over POSIX `sem_t`, unnamed and named.

use std::cell::UnsafeCell;
use std::ffi::CString;

use crate::clock::Deadline;
use crate::result::{from_errno, ThreadingError, ThreadingResult};
use crate::semaphore::OpenOptions;
use crate::sys::SemaphoreBackend;

enum Handle {
    /// Process-private semaphore, storage owned by this object.
    Unnamed(Box<UnsafeCell<libc::sem_t>>),
    /// System-wide named semaphore obtained from `sem_open`.
    Named(*mut libc::sem_t),
}

pub(crate) struct Semaphore {
    handle: Handle,
}

unsafe impl Send for Semaphore {}
unsafe impl Sync for Semaphore {}

fn last_errno() -> i32 {
    std::io::Error::last_os_error().raw_os_error().unwrap_or(0)
}

/// POSIX requires named semaphores to start with a slash.
fn normalized_name(name: &str) -> ThreadingResult<CString> {
    let full = if name.starts_with('/') {
        name.to_owned()
    } else {
        format!("/{name}")
    };
    CString::new(full).map_err(|_| ThreadingError::InvalidArgument)
}

impl Semaphore {
    fn raw(&self) -> *mut libc::sem_t {
        match &self.handle {
            Handle::Unnamed(cell) => cell.get(),
            Handle::Named(ptr) => *ptr,
        }
    }

    #[cfg_attr(any(target_os = "linux", target_os = "android"), allow(dead_code))]
    fn timed_wait_polling(&self, deadline: Deadline) -> ThreadingResult<()> {
        const POLL_INTERVAL: std::time::Duration = std::time::Duration::from_millis(5);
        loop {
            match self.try_wait() {
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
    fn timed_wait(&self, deadline: Deadline) -> ThreadingResult<()> {
        let ts = super::deadline_to_abs_timespec(deadline);
        loop {
            if unsafe { libc::sem_timedwait(self.raw(), &raw const ts) } == 0 {
                return Ok(());
            }
            match last_errno() {
                libc::EINTR => {}
                libc::ETIMEDOUT => return Err(ThreadingError::TimedOut),
                other => return Err(from_errno(other)),
            }
        }
    }

    #[cfg(not(any(target_os = "linux", target_os = "android")))]
    fn timed_wait(&self, deadline: Deadline) -> ThreadingResult<()> {
        self.timed_wait_polling(deadline)
    }
}

impl SemaphoreBackend for Semaphore {
    fn create(initial: u32) -> ThreadingResult<Self> {
        let cell = Box::new(UnsafeCell::new(unsafe {
            std::mem::zeroed::<libc::sem_t>()
        }));
        if unsafe { libc::sem_init(cell.get(), 0, initial as libc::c_uint) } != 0 {
            let code = last_errno();
            tracing::error!(code, "sem_init failed");
            return Err(from_errno(code));
        }
        Ok(Self {
            handle: Handle::Unnamed(cell),
        })
    }

    fn open(name: &str, options: OpenOptions, initial: u32) -> ThreadingResult<Self> {
        let name = normalized_name(name)?;
        let mut oflag = 0;
        if options.is_create() {
            oflag |= libc::O_CREAT;
        }
        if options.is_exclusive() {
            oflag |= libc::O_EXCL;
        }

        let sem = unsafe {
            libc::sem_open(
                name.as_ptr(),
                oflag,
                0o644 as libc::c_uint,
                initial as libc::c_uint,
            )
        };
        if sem == libc::SEM_FAILED {
            let code = last_errno();
            tracing::warn!(name = ?name, code, "sem_open failed");
            return Err(from_errno(code));
        }
        Ok(Self {
            handle: Handle::Named(sem),
        })
    }

    fn unlink(name: &str) -> ThreadingResult<()> {
        let name = normalized_name(name)?;
        if unsafe { libc::sem_unlink(name.as_ptr()) } != 0 {
            return Err(from_errno(last_errno()));
        }
        Ok(())
    }

    fn wait(&self, deadline: Option<Deadline>) -> ThreadingResult<()> {
        match deadline {
            Some(deadline) => self.timed_wait(deadline),
            None => loop {
                if unsafe { libc::sem_wait(self.raw()) } == 0 {
                    return Ok(());
                }
                match last_errno() {
                    libc::EINTR => {}
                    other => return Err(from_errno(other)),
                }
            },
        }
    }

    fn try_wait(&self) -> ThreadingResult<()> {
        if unsafe { libc::sem_trywait(self.raw()) } == 0 {
            Ok(())
        } else {
            Err(from_errno(last_errno()))
        }
    }

    fn post(&self) -> ThreadingResult<()> {
        if unsafe { libc::sem_post(self.raw()) } == 0 {
            Ok(())
        } else {
            Err(from_errno(last_errno()))
        }
    }

    fn value(&self) -> ThreadingResult<i32> {
        let mut value: libc::c_int = 0;
        if unsafe { libc::sem_getvalue(self.raw(), &raw mut value) } != 0 {
            return Err(from_errno(last_errno()));
        }
        // Some implementations report waiter counts as negatives.
        Ok(value.max(0))
    }
}

impl Drop for Semaphore {
    fn drop(&mut self) {
        unsafe {
            match &self.handle {
                Handle::Unnamed(cell) => {
                    libc::sem_destroy(cell.get());
                }
                Handle::Named(ptr) => {
                    libc::sem_close(*ptr);
                }
            }
        }
    }
}
