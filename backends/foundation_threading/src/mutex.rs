//! Mutual exclusion with plain, timed and recursive capabilities.
//!
//! A mutex is created with a [`MutexKind`] describing what it supports;
//! capabilities can be combined with `|`. A plain (non-recursive) mutex
//! deadlocks on owner re-entry rather than reporting it, and only a
//! `TIMED` mutex accepts deadline-bounded acquisition.

use crate::clock::Deadline;
use crate::result::{ThreadingError, ThreadingResult};
use crate::sys::{imp, MutexBackend};

/// Capability set of a mutex, combined with the `|` operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MutexKind(u8);

impl MutexKind {
    /// No extra capabilities: single acquisition, untimed.
    pub const PLAIN: MutexKind = MutexKind(0);
    /// Supports acquisition bounded by a [`Deadline`].
    pub const TIMED: MutexKind = MutexKind(0b01);
    /// Supports nested acquisition by the owning thread.
    pub const RECURSIVE: MutexKind = MutexKind(0b10);

    #[must_use]
    pub fn is_timed(self) -> bool {
        self.0 & Self::TIMED.0 != 0
    }

    #[must_use]
    pub fn is_recursive(self) -> bool {
        self.0 & Self::RECURSIVE.0 != 0
    }
}

impl core::ops::BitOr for MutexKind {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

pub struct Mutex {
    kind: MutexKind,
    pub(crate) inner: imp::Mutex,
}

impl Mutex {
    /// Creates a mutex with the given capability set.
    pub fn new(kind: MutexKind) -> ThreadingResult<Self> {
        Ok(Self {
            kind,
            inner: imp::Mutex::create(kind)?,
        })
    }

    /// Creates a plain mutex.
    pub fn plain() -> ThreadingResult<Self> {
        Self::new(MutexKind::PLAIN)
    }

    #[must_use]
    pub fn kind(&self) -> MutexKind {
        self.kind
    }

    /// Blocks until the mutex is acquired.
    ///
    /// Re-entry on a non-recursive mutex deadlocks.
    pub fn lock(&self) -> ThreadingResult<()> {
        self.inner.lock(None)
    }

    /// Blocks until the mutex is acquired or the deadline passes.
    ///
    /// Only valid on a mutex created with [`MutexKind::TIMED`]; on any
    /// other kind this reports [`ThreadingError::InvalidArgument`]
    /// without touching the lock.
    pub fn lock_deadline(&self, deadline: Deadline) -> ThreadingResult<()> {
        if !self.kind.is_timed() {
            return Err(ThreadingError::InvalidArgument);
        }
        self.inner.lock(Some(deadline))
    }

    /// Acquires the mutex if that is possible without blocking,
    /// reporting [`ThreadingError::Busy`] otherwise.
    pub fn try_lock(&self) -> ThreadingResult<()> {
        self.inner.try_lock()
    }

    /// Releases one acquisition by the calling thread.
    pub fn unlock(&self) -> ThreadingResult<()> {
        self.inner.unlock()
    }
}
