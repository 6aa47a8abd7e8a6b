//! Thread-local storage keys with optional destructors.
//!
//! A [`TlsKey`] is a process-wide handle; the value stored through it is
//! per thread and starts out null. When a key carries a destructor, the
//! destructor runs at thread end for every thread whose slot still holds
//! a non-null value, with the slot nulled before the call. Destructors
//! that store fresh values trigger further passes, up to
//! [`TLS_DESTRUCTOR_ITERATIONS`] rounds.
//!
//! Destructors are guaranteed only for threads started through
//! [`crate::thread::Thread::spawn`]; a process's main thread should free
//! its values itself.

use crate::result::ThreadingResult;
use crate::sys::{imp, TlsBackend};

/// Per-value destructor, receiving the stored pointer.
pub type TlsDestructor = extern "C" fn(*mut u8);

/// Upper bound on destructor passes at thread end.
pub const TLS_DESTRUCTOR_ITERATIONS: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TlsKey {
    raw: <imp::TlsFacility as TlsBackend>::Key,
}

impl TlsKey {
    /// Allocates a fresh key, visible to every thread with its value
    /// starting out null everywhere.
    pub fn create(destructor: Option<TlsDestructor>) -> ThreadingResult<Self> {
        Ok(Self {
            raw: imp::TlsFacility::create_key(destructor)?,
        })
    }

    /// Releases the key. No destructors run for values still stored
    /// under it; freeing those is the caller's business.
    pub fn delete(self) {
        imp::TlsFacility::delete_key(self.raw);
    }

    /// The calling thread's value for this key, null if never set.
    #[must_use]
    pub fn get(self) -> *mut u8 {
        imp::TlsFacility::get(self.raw)
    }

    /// Stores `value` for the calling thread.
    pub fn set(self, value: *mut u8) -> ThreadingResult<()> {
        imp::TlsFacility::set(self.raw, value)
    }
}
