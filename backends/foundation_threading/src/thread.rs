//! Worker threads with integer exit codes.
//!
//! [`Thread::spawn`] wraps the task in a trampoline so that [`exit`] can
//! cut the task short with a code, and so TLS destructors registered
//! through [`crate::tls`] run when the task finishes, however it
//! finishes. A task that panics for any other reason surfaces as
//! [`ThreadingError::Fail`] from [`Thread::join`].

use std::panic::{catch_unwind, resume_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use crate::result::{ThreadingError, ThreadingResult};
use crate::sys::{imp, TlsBackend};

/// How a [`sleep`] call ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SleepOutcome {
    /// The full duration elapsed.
    Completed,
    /// A signal cut the sleep short with this much time left.
    Interrupted { remaining: Duration },
}

/// Unwind payload carrying the code passed to [`exit`].
struct ExitRequest {
    code: i32,
}

/// Opaque thread identity; compare with `==`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ThreadIdent(std::thread::ThreadId);

/// Identity of the calling thread.
#[must_use]
pub fn current() -> ThreadIdent {
    ThreadIdent(std::thread::current().id())
}

pub struct Thread {
    handle: std::thread::JoinHandle<i32>,
}

impl Thread {
    /// Spawns a worker running `task` and returns a handle to it.
    ///
    /// Spawn failure is resource exhaustion as far as the platform is
    /// concerned, so it surfaces as [`ThreadingError::OutOfMemory`].
    pub fn spawn<F>(task: F) -> ThreadingResult<Self>
    where
        F: FnOnce() -> i32 + Send + 'static,
    {
        let handle = std::thread::Builder::new()
            .spawn(move || {
                let outcome = catch_unwind(AssertUnwindSafe(task));
                <imp::TlsFacility as TlsBackend>::run_thread_destructors();
                match outcome {
                    Ok(code) => code,
                    Err(payload) => match payload.downcast::<ExitRequest>() {
                        Ok(request) => request.code,
                        Err(payload) => resume_unwind(payload),
                    },
                }
            })
            .map_err(|error| {
                tracing::error!(%error, "thread spawn failed");
                ThreadingError::OutOfMemory
            })?;
        Ok(Self { handle })
    }

    /// Blocks until the worker finishes and returns its exit code.
    ///
    /// A worker that panicked (other than through [`exit`]) yields
    /// [`ThreadingError::Fail`].
    pub fn join(self) -> ThreadingResult<i32> {
        self.handle.join().map_err(|_| ThreadingError::Fail)
    }

    /// Identity of the worker, comparable with [`current`].
    #[must_use]
    pub fn ident(&self) -> ThreadIdent {
        ThreadIdent(self.handle.thread().id())
    }

    /// Releases the handle; the worker keeps running unobserved.
    pub fn detach(self) {
        drop(self.handle);
    }
}

/// Ends the calling task with `code`, as if it had returned it.
///
/// Only meaningful inside a task started by [`Thread::spawn`]; on any
/// other thread the unwind propagates as an ordinary panic.
pub fn exit(code: i32) -> ! {
    std::panic::panic_any(ExitRequest { code })
}

/// Stable numeric identifier of the calling thread.
///
/// Identifiers start at 1 and are assigned on first use; they are never
/// reused within a process.
pub fn current_id() -> u64 {
    static NEXT_ID: AtomicU64 = AtomicU64::new(1);
    thread_local! {
        static CACHED: std::cell::Cell<u64> = const { std::cell::Cell::new(0) };
    }
    CACHED.with(|cached| {
        let mut id = cached.get();
        if id == 0 {
            id = NEXT_ID.fetch_add(1, Ordering::Relaxed);
            cached.set(id);
        }
        id
    })
}

/// Suspends the calling thread for `duration`.
pub fn sleep(duration: Duration) -> SleepOutcome {
    imp::sleep(duration)
}

/// Yields the rest of the calling thread's timeslice.
pub fn yield_now() {
    std::thread::yield_now();
}
