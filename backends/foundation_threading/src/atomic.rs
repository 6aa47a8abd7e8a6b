//! Fixed-width and pointer-width atomic cells with per-call memory orders.
//!
//! Every access names its [`MemoryOrder`] explicitly, mirroring the
//! `atomic_*_explicit` style of interface. Orders that are invalid for a
//! particular access (for example an acquire store) are strengthened to
//! sequentially consistent, never weakened.

use core::sync::atomic::{self, AtomicI32, AtomicI64, AtomicPtr, Ordering};

/// Memory ordering requested for a single atomic access.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoryOrder {
    Relaxed,
    Acquire,
    Release,
    AcqRel,
    SeqCst,
}

impl MemoryOrder {
    /// Ordering for a pure load. Release flavours are strengthened.
    #[inline]
    fn for_load(self) -> Ordering {
        match self {
            Self::Relaxed => Ordering::Relaxed,
            Self::Acquire => Ordering::Acquire,
            Self::Release | Self::AcqRel | Self::SeqCst => Ordering::SeqCst,
        }
    }

    /// Ordering for a pure store. Acquire flavours are strengthened.
    #[inline]
    fn for_store(self) -> Ordering {
        match self {
            Self::Relaxed => Ordering::Relaxed,
            Self::Release => Ordering::Release,
            Self::Acquire | Self::AcqRel | Self::SeqCst => Ordering::SeqCst,
        }
    }

    /// Ordering for a read-modify-write access. All flavours are valid.
    #[inline]
    fn for_rmw(self) -> Ordering {
        match self {
            Self::Relaxed => Ordering::Relaxed,
            Self::Acquire => Ordering::Acquire,
            Self::Release => Ordering::Release,
            Self::AcqRel => Ordering::AcqRel,
            Self::SeqCst => Ordering::SeqCst,
        }
    }

    /// Ordering for the failure path of a compare-and-swap, which is a
    /// load and must not carry release semantics.
    #[inline]
    fn for_failure(self) -> Ordering {
        self.for_load()
    }
}

/// Ordering granularity accepted by the standalone fences.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FenceOrder {
    Acquire,
    Release,
    SeqCst,
}

impl FenceOrder {
    #[inline]
    fn as_ordering(self) -> Ordering {
        match self {
            Self::Acquire => Ordering::Acquire,
            Self::Release => Ordering::Release,
            Self::SeqCst => Ordering::SeqCst,
        }
    }
}

/// A full memory fence between threads.
#[inline]
pub fn thread_fence(order: FenceOrder) {
    atomic::fence(order.as_ordering());
}

/// A compiler-only fence; orders accesses with respect to a signal
/// handler running on the same thread.
#[inline]
pub fn signal_fence(order: FenceOrder) {
    atomic::compiler_fence(order.as_ordering());
}

macro_rules! atomic_cell {
    ($(#[$doc:meta])* $name:ident, $atomic:ty, $value:ty) => {
        $(#[$doc])*
        #[derive(Debug, Default)]
        pub struct $name {
            inner: $atomic,
        }

        impl $name {
            #[inline]
            #[must_use]
            pub const fn new(value: $value) -> Self {
                Self {
                    inner: <$atomic>::new(value),
                }
            }

            /// Reads the cell.
            #[inline]
            pub fn load(&self, order: MemoryOrder) -> $value {
                self.inner.load(order.for_load())
            }

            /// Writes the cell.
            #[inline]
            pub fn store(&self, value: $value, order: MemoryOrder) {
                self.inner.store(value, order.for_store());
            }

            /// Atomically adds `delta` and returns the updated value.
            #[inline]
            pub fn fetch_add(&self, delta: $value, order: MemoryOrder) -> $value {
                self.inner
                    .fetch_add(delta, order.for_rmw())
                    .wrapping_add(delta)
            }

            /// Atomically adds `delta` and returns the previous value.
            #[inline]
            pub fn exchange_add(&self, delta: $value, order: MemoryOrder) -> $value {
                self.inner.fetch_add(delta, order.for_rmw())
            }

            /// Atomically adds one and returns the updated value.
            #[inline]
            pub fn increment(&self, order: MemoryOrder) -> $value {
                self.fetch_add(1, order)
            }

            /// Atomically subtracts one and returns the updated value.
            #[inline]
            pub fn decrement(&self, order: MemoryOrder) -> $value {
                self.fetch_add(-1, order)
            }

            /// Stores `desired` and returns `true` iff the cell holds
            /// `expected` at the moment of the attempt. Failure means
            /// the value genuinely differed.
            #[inline]
            pub fn compare_and_swap(
                &self,
                expected: $value,
                desired: $value,
                success: MemoryOrder,
                failure: MemoryOrder,
            ) -> bool {
                self.inner
                    .compare_exchange(
                        expected,
                        desired,
                        success.for_rmw(),
                        failure.for_failure(),
                    )
                    .is_ok()
            }
        }
    };
}

atomic_cell!(
    /// A 32-bit atomic cell.
    AtomicCell32,
    AtomicI32,
    i32
);

atomic_cell!(
    /// A 64-bit atomic cell.
    AtomicCell64,
    AtomicI64,
    i64
);

/// A pointer-width atomic cell.
#[derive(Debug)]
pub struct AtomicCellPtr {
    inner: AtomicPtr<u8>,
}

impl AtomicCellPtr {
    #[inline]
    #[must_use]
    pub const fn new(value: *mut u8) -> Self {
        Self {
            inner: AtomicPtr::new(value),
        }
    }

    /// Reads the cell.
    #[inline]
    pub fn load(&self, order: MemoryOrder) -> *mut u8 {
        self.inner.load(order.for_load())
    }

    /// Writes the cell.
    #[inline]
    pub fn store(&self, value: *mut u8, order: MemoryOrder) {
        self.inner.store(value, order.for_store());
    }

    /// Stores `desired` and returns `true` iff the cell holds `expected`
    /// at the moment of the attempt, as for the integer cells.
    #[inline]
    pub fn compare_and_swap(
        &self,
        expected: *mut u8,
        desired: *mut u8,
        success: MemoryOrder,
        failure: MemoryOrder,
    ) -> bool {
        self.inner
            .compare_exchange(expected, desired, success.for_rmw(), failure.for_failure())
            .is_ok()
    }
}

impl Default for AtomicCellPtr {
    #[inline]
    fn default() -> Self {
        Self::new(core::ptr::null_mut())
    }
}
