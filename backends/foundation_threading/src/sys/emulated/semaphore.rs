//! Emulated counting semaphore.
//!
//! Unnamed semaphores are a plain counted monitor. Named semaphores
//! share their counter through a process-wide registry keyed by the
//! normalized name; unlinking removes the name while existing handles
//! keep the counter alive, mirroring POSIX unlink semantics.

use std::collections::HashMap;
use std::sync::{Arc, Condvar, Mutex as StdMutex, OnceLock, PoisonError};

use crate::clock::Deadline;
use crate::result::{ThreadingError, ThreadingResult};
use crate::semaphore::{OpenOptions, SEM_VALUE_MAX};
use crate::sys::SemaphoreBackend;

struct SemCore {
    count: StdMutex<u32>,
    available: Condvar,
}

impl SemCore {
    fn new(initial: u32) -> Self {
        Self {
            count: StdMutex::new(initial),
            available: Condvar::new(),
        }
    }
}

pub(crate) struct Semaphore {
    core: Arc<SemCore>,
}

fn registry() -> &'static StdMutex<HashMap<String, Arc<SemCore>>> {
    static REGISTRY: OnceLock<StdMutex<HashMap<String, Arc<SemCore>>>> = OnceLock::new();
    REGISTRY.get_or_init(|| StdMutex::new(HashMap::new()))
}

/// Mirrors the leading-slash rule of the native backend so names behave
/// the same on both.
fn normalized_name(name: &str) -> ThreadingResult<String> {
    if name.contains('\0') {
        return Err(ThreadingError::InvalidArgument);
    }
    if name.starts_with('/') {
        Ok(name.to_owned())
    } else {
        Ok(format!("/{name}"))
    }
}

impl SemaphoreBackend for Semaphore {
    fn create(initial: u32) -> ThreadingResult<Self> {
        Ok(Self {
            core: Arc::new(SemCore::new(initial)),
        })
    }

    fn open(name: &str, options: OpenOptions, initial: u32) -> ThreadingResult<Self> {
        let name = normalized_name(name)?;
        let mut registry = registry().lock().unwrap_or_else(PoisonError::into_inner);
        match registry.get(&name) {
            Some(core) => {
                if options.is_create() && options.is_exclusive() {
                    return Err(ThreadingError::AlreadyExists);
                }
                Ok(Self {
                    core: Arc::clone(core),
                })
            }
            None => {
                if !options.is_create() {
                    return Err(ThreadingError::NotFound);
                }
                let core = Arc::new(SemCore::new(initial));
                registry.insert(name, Arc::clone(&core));
                Ok(Self { core })
            }
        }
    }

    fn unlink(name: &str) -> ThreadingResult<()> {
        let name = normalized_name(name)?;
        let mut registry = registry().lock().unwrap_or_else(PoisonError::into_inner);
        if registry.remove(&name).is_none() {
            return Err(ThreadingError::NotFound);
        }
        Ok(())
    }

    fn wait(&self, deadline: Option<Deadline>) -> ThreadingResult<()> {
        let mut count = self
            .core
            .count
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        while *count == 0 {
            count = match deadline {
                None => self
                    .core
                    .available
                    .wait(count)
                    .unwrap_or_else(PoisonError::into_inner),
                Some(deadline) => {
                    if deadline.has_passed() {
                        return Err(ThreadingError::TimedOut);
                    }
                    self.core
                        .available
                        .wait_timeout(count, deadline.remaining())
                        .unwrap_or_else(PoisonError::into_inner)
                        .0
                }
            };
        }
        *count -= 1;
        Ok(())
    }

    fn try_wait(&self) -> ThreadingResult<()> {
        let mut count = self
            .core
            .count
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if *count == 0 {
            return Err(ThreadingError::Busy);
        }
        *count -= 1;
        Ok(())
    }

    fn post(&self) -> ThreadingResult<()> {
        let mut count = self
            .core
            .count
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if *count >= SEM_VALUE_MAX {
            return Err(ThreadingError::Fail);
        }
        *count += 1;
        drop(count);
        self.core.available.notify_one();
        Ok(())
    }

    fn value(&self) -> ThreadingResult<i32> {
        let count = self
            .core
            .count
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        Ok(i32::try_from(*count).unwrap_or(i32::MAX))
    }
}
