//! Platform backends.
//!
//! The public primitive types own a backend object behind one of these
//! capability traits. Exactly two implementations exist:
//!
//! - [`native`]: delegates to the POSIX thread and semaphore APIs through
//!   `libc`. Selected on unix targets.
//! - [`emulated`]: rebuilds the same guarantees from portable pieces (an
//!   event pair, a recursive core lock, a process-wide TLS registry).
//!   Selected everywhere else, and forceable on any target with the
//!   `emulated_backend` feature so both implementations stay testable on
//!   one host.

use cfg_if::cfg_if;

use crate::clock::Deadline;
use crate::mutex::MutexKind;
use crate::result::ThreadingResult;
use crate::semaphore::OpenOptions;
use crate::tls::TlsDestructor;

/// Mutual exclusion capability.
///
/// `lock` with a deadline is only ever invoked for mutexes created with
/// the `TIMED` capability; the public layer enforces that.
pub(crate) trait MutexBackend: Send + Sync + Sized {
    fn create(kind: MutexKind) -> ThreadingResult<Self>;
    fn lock(&self, deadline: Option<Deadline>) -> ThreadingResult<()>;
    fn try_lock(&self) -> ThreadingResult<()>;
    fn unlock(&self) -> ThreadingResult<()>;
}

/// Condition-variable capability.
///
/// `wait` must be entered with `mutex` held by the calling thread, and
/// re-acquires it before returning on every path.
pub(crate) trait CondVarBackend: Send + Sync + Sized {
    type Mutex: MutexBackend;

    fn create() -> ThreadingResult<Self>;
    fn signal(&self) -> ThreadingResult<()>;
    fn broadcast(&self) -> ThreadingResult<()>;
    fn wait(&self, mutex: &Self::Mutex, deadline: Option<Deadline>) -> ThreadingResult<()>;
}

/// Counting-semaphore capability, including the named lifecycle.
pub(crate) trait SemaphoreBackend: Send + Sync + Sized {
    fn create(initial: u32) -> ThreadingResult<Self>;
    fn open(name: &str, options: OpenOptions, initial: u32) -> ThreadingResult<Self>;
    fn unlink(name: &str) -> ThreadingResult<()>;

    fn wait(&self, deadline: Option<Deadline>) -> ThreadingResult<()>;
    fn try_wait(&self) -> ThreadingResult<()>;
    fn post(&self) -> ThreadingResult<()>;
    fn value(&self) -> ThreadingResult<i32>;
}

/// Thread-local storage capability.
///
/// Keys are plain copyable handles; the backend owns the destructor
/// bookkeeping. `run_thread_destructors` is called from the spawn
/// trampoline and from `thread::exit`; on backends whose platform already
/// fires key destructors it is a no-op.
pub(crate) trait TlsBackend {
    type Key: Copy + PartialEq + core::fmt::Debug;

    fn create_key(destructor: Option<TlsDestructor>) -> ThreadingResult<Self::Key>;
    fn delete_key(key: Self::Key);
    fn get(key: Self::Key) -> *mut u8;
    fn set(key: Self::Key, value: *mut u8) -> ThreadingResult<()>;
    fn run_thread_destructors();
}

#[cfg(unix)]
#[cfg_attr(feature = "emulated_backend", allow(dead_code))]
pub(crate) mod native;

#[cfg_attr(all(unix, not(feature = "emulated_backend")), allow(dead_code))]
pub(crate) mod emulated;

cfg_if! {
    if #[cfg(all(unix, not(feature = "emulated_backend")))] {
        pub(crate) use native as imp;
    } else {
        pub(crate) use emulated as imp;
    }
}
