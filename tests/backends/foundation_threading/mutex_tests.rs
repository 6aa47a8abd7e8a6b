//! Multi-threaded mutex scenarios across the backends.

use std::cell::UnsafeCell;
use std::sync::Arc;
use std::time::{Duration, Instant};

use foundation_threading::{Deadline, Mutex, MutexKind, ThreadingError};

/// A counter guarded the C way: lock, touch, unlock.
struct GuardedCounter {
    mutex: Mutex,
    value: UnsafeCell<u64>,
}

unsafe impl Sync for GuardedCounter {}

#[test]
#[ntest::timeout(30000)]
fn test_contended_increments_are_exact() {
    const THREADS: usize = 8;
    const INCREMENTS: u64 = 2000;

    let counter = Arc::new(GuardedCounter {
        mutex: Mutex::plain().unwrap(),
        value: UnsafeCell::new(0),
    });

    let workers: Vec<_> = (0..THREADS)
        .map(|_| {
            let counter = Arc::clone(&counter);
            std::thread::spawn(move || {
                for _ in 0..INCREMENTS {
                    counter.mutex.lock().unwrap();
                    // Held, so even the holder's probe is turned away.
                    assert_eq!(counter.mutex.try_lock(), Err(ThreadingError::Busy));
                    unsafe {
                        *counter.value.get() += 1;
                    }
                    counter.mutex.unlock().unwrap();
                }
            })
        })
        .collect();
    for worker in workers {
        worker.join().unwrap();
    }

    assert_eq!(unsafe { *counter.value.get() }, THREADS as u64 * INCREMENTS);
}

#[test]
#[ntest::timeout(10000)]
fn test_try_lock_probes_see_busy_only_while_held() {
    let mutex = Arc::new(Mutex::plain().unwrap());
    mutex.lock().unwrap();

    let prober = {
        let mutex = Arc::clone(&mutex);
        std::thread::spawn(move || {
            // Held by the main thread: every probe must be turned away.
            for _ in 0..100 {
                assert_eq!(mutex.try_lock(), Err(ThreadingError::Busy));
            }
        })
    };
    prober.join().unwrap();
    mutex.unlock().unwrap();

    let prober = {
        let mutex = Arc::clone(&mutex);
        std::thread::spawn(move || {
            mutex.try_lock().unwrap();
            mutex.unlock().unwrap();
        })
    };
    prober.join().unwrap();
}

#[test]
#[ntest::timeout(10000)]
fn test_recursive_depth_released_only_at_zero() {
    const DEPTH: usize = 5;
    let mutex = Arc::new(Mutex::new(MutexKind::RECURSIVE).unwrap());

    for _ in 0..DEPTH {
        mutex.lock().unwrap();
    }

    let probe = |mutex: &Arc<Mutex>| {
        let mutex = Arc::clone(mutex);
        std::thread::spawn(move || {
            let outcome = mutex.try_lock();
            if outcome.is_ok() {
                mutex.unlock().unwrap();
            }
            outcome
        })
        .join()
        .unwrap()
    };

    for _ in 0..DEPTH - 1 {
        mutex.unlock().unwrap();
        assert_eq!(probe(&mutex), Err(ThreadingError::Busy));
    }
    mutex.unlock().unwrap();
    assert_eq!(probe(&mutex), Ok(()));
}

#[test]
#[ntest::timeout(10000)]
fn test_timed_lock_bounds() {
    const WAIT: Duration = Duration::from_millis(80);
    // Generous slack for scheduling noise on loaded CI hosts.
    const SLACK: Duration = Duration::from_millis(2000);

    let mutex = Arc::new(Mutex::new(MutexKind::TIMED).unwrap());
    mutex.lock().unwrap();

    let contender = {
        let mutex = Arc::clone(&mutex);
        std::thread::spawn(move || {
            let started = Instant::now();
            let outcome = mutex.lock_deadline(Deadline::after(WAIT));
            (outcome, started.elapsed())
        })
    };
    let (outcome, waited) = contender.join().unwrap();
    assert_eq!(outcome, Err(ThreadingError::TimedOut));
    assert!(waited >= WAIT, "timed out {waited:?} before the deadline");
    assert!(waited < WAIT + SLACK, "timed out far too late: {waited:?}");

    mutex.unlock().unwrap();

    // Uncontended: the deadline is irrelevant and acquisition immediate.
    mutex.lock_deadline(Deadline::after(WAIT)).unwrap();
    mutex.unlock().unwrap();
}

#[test]
fn test_timed_recursive_combination() {
    let mutex = Mutex::new(MutexKind::TIMED | MutexKind::RECURSIVE).unwrap();
    mutex.lock().unwrap();
    // Owner re-entry through the timed path must succeed immediately.
    mutex
        .lock_deadline(Deadline::after(Duration::from_millis(10)))
        .unwrap();
    mutex.unlock().unwrap();
    mutex.unlock().unwrap();
}
