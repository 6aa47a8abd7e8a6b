//! Concurrent contracts of the typed atomic cells.

use std::sync::Arc;

use foundation_threading::{AtomicCell32, AtomicCell64, AtomicCellPtr, MemoryOrder};

#[test]
fn test_fetch_add_returns_updated_value() {
    let cell = AtomicCell32::new(10);
    assert_eq!(cell.fetch_add(5, MemoryOrder::SeqCst), 15);
    assert_eq!(cell.fetch_add(-20, MemoryOrder::SeqCst), -5);
    assert_eq!(cell.load(MemoryOrder::SeqCst), -5);
}

#[test]
#[ntest::timeout(30000)]
fn test_exchange_add_previous_values_partition_the_range() {
    const THREADS: i64 = 8;
    const PER_THREAD: i64 = 1000;

    let cell = Arc::new(AtomicCell64::new(0));
    let workers: Vec<_> = (0..THREADS)
        .map(|_| {
            let cell = Arc::clone(&cell);
            std::thread::spawn(move || {
                let mut seen = Vec::with_capacity(PER_THREAD as usize);
                for _ in 0..PER_THREAD {
                    seen.push(cell.exchange_add(1, MemoryOrder::SeqCst));
                }
                seen
            })
        })
        .collect();

    let mut all: Vec<i64> = workers
        .into_iter()
        .flat_map(|w| w.join().unwrap())
        .collect();
    all.sort_unstable();

    // Every pre-update value appears exactly once: no two threads saw
    // the same state.
    let expected: Vec<i64> = (0..THREADS * PER_THREAD).collect();
    assert_eq!(all, expected);
    assert_eq!(cell.load(MemoryOrder::SeqCst), THREADS * PER_THREAD);
}

#[test]
#[ntest::timeout(30000)]
fn test_increment_decrement_balance() {
    let cell = Arc::new(AtomicCell32::new(0));
    let workers: Vec<_> = (0..4)
        .map(|_| {
            let cell = Arc::clone(&cell);
            std::thread::spawn(move || {
                for _ in 0..500 {
                    cell.increment(MemoryOrder::SeqCst);
                    cell.decrement(MemoryOrder::SeqCst);
                }
            })
        })
        .collect();
    for worker in workers {
        worker.join().unwrap();
    }
    assert_eq!(cell.load(MemoryOrder::SeqCst), 0);
}

#[test]
#[ntest::timeout(30000)]
fn test_compare_and_swap_elects_one_winner_per_step() {
    const THREADS: i32 = 8;
    const STEPS: i32 = 200;

    let cell = Arc::new(AtomicCell32::new(0));
    let workers: Vec<_> = (0..THREADS)
        .map(|_| {
            let cell = Arc::clone(&cell);
            std::thread::spawn(move || {
                let mut wins = 0;
                while cell.load(MemoryOrder::Acquire) < STEPS {
                    let current = cell.load(MemoryOrder::Acquire);
                    if current < STEPS
                        && cell.compare_and_swap(
                            current,
                            current + 1,
                            MemoryOrder::SeqCst,
                            MemoryOrder::Relaxed,
                        )
                    {
                        wins += 1;
                    }
                }
                wins
            })
        })
        .collect();

    let total: i32 = workers.into_iter().map(|w| w.join().unwrap()).sum();
    assert_eq!(total, STEPS);
    assert_eq!(cell.load(MemoryOrder::SeqCst), STEPS);
}

#[test]
fn test_pointer_cell_swings_between_slots() {
    let mut slots = [0u8, 0u8];
    let first: *mut u8 = &raw mut slots[0];
    let second: *mut u8 = &raw mut slots[1];

    let cell = AtomicCellPtr::new(first);
    assert_eq!(cell.load(MemoryOrder::SeqCst), first);

    assert!(cell.compare_and_swap(first, second, MemoryOrder::SeqCst, MemoryOrder::Relaxed));
    assert!(!cell.compare_and_swap(first, second, MemoryOrder::SeqCst, MemoryOrder::Relaxed));
    assert_eq!(cell.load(MemoryOrder::SeqCst), second);

    cell.store(std::ptr::null_mut(), MemoryOrder::SeqCst);
    assert!(cell.load(MemoryOrder::SeqCst).is_null());
}
