//! Portable threading primitives with one behavior on every platform.
//!
//! Mutexes, condition variables, counting semaphores, typed atomics,
//! worker threads, thread-local storage and one-shot initialization,
//! backed either by the platform's POSIX facilities or by a pure
//! `std::sync` emulation of the same guarantees. The backend is picked
//! at compile time; the `emulated_backend` feature forces the portable
//! one anywhere so both stay testable on a single host.

// Public modules
pub mod atomic;
pub mod clock;
pub mod condvar;
pub mod mutex;
pub mod once;
pub mod result;
pub mod semaphore;
pub mod thread;
pub mod tls;

// Internal support
mod spin_wait;
pub(crate) mod sys;

// Re-export the primitive types
pub use atomic::{
    signal_fence, thread_fence, AtomicCell32, AtomicCell64, AtomicCellPtr, FenceOrder, MemoryOrder,
};
pub use clock::Deadline;
pub use condvar::CondVar;
pub use mutex::{Mutex, MutexKind};
pub use once::OnceFlag;
pub use result::{ThreadingError, ThreadingResult};
pub use semaphore::{OpenOptions, Semaphore, SEM_VALUE_MAX};
pub use thread::{SleepOutcome, Thread, ThreadIdent};
pub use tls::{TlsDestructor, TlsKey, TLS_DESTRUCTOR_ITERATIONS};
