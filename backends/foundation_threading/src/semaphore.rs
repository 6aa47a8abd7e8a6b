//! Counting semaphores, process-private and named.
//!
//! Unnamed semaphores come from [`Semaphore::new`]. Named semaphores are
//! opened through [`OpenOptions`], which mirrors the create/exclusive
//! split of filesystem opens: plain open attaches to an existing name,
//! create makes it on demand, create-exclusive insists on making it.

use crate::clock::Deadline;
use crate::result::{ThreadingError, ThreadingResult};
use crate::sys::{imp, SemaphoreBackend};

/// Largest count a semaphore may hold.
pub const SEM_VALUE_MAX: u32 = i32::MAX as u32;

/// How [`Semaphore::open`] treats the name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OpenOptions {
    create: bool,
    exclusive: bool,
}

impl OpenOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create the semaphore when the name does not exist yet.
    #[must_use]
    pub fn create(mut self, create: bool) -> Self {
        self.create = create;
        self
    }

    /// Combined with [`create`](Self::create), fail with
    /// [`ThreadingError::AlreadyExists`] when the name is taken.
    #[must_use]
    pub fn exclusive(mut self, exclusive: bool) -> Self {
        self.exclusive = exclusive;
        self
    }

    pub(crate) fn is_create(self) -> bool {
        self.create
    }

    pub(crate) fn is_exclusive(self) -> bool {
        self.exclusive
    }
}

pub struct Semaphore {
    inner: imp::Semaphore,
}

fn validated_initial(initial: u32) -> ThreadingResult<u32> {
    if initial > SEM_VALUE_MAX {
        return Err(ThreadingError::InvalidArgument);
    }
    Ok(initial)
}

impl Semaphore {
    /// Creates a process-private semaphore holding `initial` permits.
    pub fn new(initial: u32) -> ThreadingResult<Self> {
        Ok(Self {
            inner: imp::Semaphore::create(validated_initial(initial)?)?,
        })
    }

    /// Opens the named semaphore `name`, creating it with `initial`
    /// permits when `options` ask for that. Names are normalized to a
    /// single leading slash.
    pub fn open(name: &str, options: OpenOptions, initial: u32) -> ThreadingResult<Self> {
        Ok(Self {
            inner: imp::Semaphore::open(name, options, validated_initial(initial)?)?,
        })
    }

    /// Removes `name` from the namespace. Handles already open stay
    /// usable; the underlying semaphore goes away once they are gone.
    pub fn unlink(name: &str) -> ThreadingResult<()> {
        imp::Semaphore::unlink(name)
    }

    /// Blocks until a permit can be taken.
    pub fn wait(&self) -> ThreadingResult<()> {
        self.inner.wait(None)
    }

    /// Blocks until a permit can be taken or the deadline passes.
    pub fn wait_deadline(&self, deadline: Deadline) -> ThreadingResult<()> {
        self.inner.wait(Some(deadline))
    }

    /// Takes a permit if one is available, reporting
    /// [`ThreadingError::Busy`] otherwise.
    pub fn try_wait(&self) -> ThreadingResult<()> {
        self.inner.try_wait()
    }

    /// Returns one permit, waking a waiter if any is blocked.
    pub fn post(&self) -> ThreadingResult<()> {
        self.inner.post()
    }

    /// Snapshot of the current permit count. Immediately stale under
    /// concurrency; meant for diagnostics.
    pub fn value(&self) -> ThreadingResult<i32> {
        self.inner.value()
    }
}
