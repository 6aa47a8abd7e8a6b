//! Producer/consumer scenarios over the condition variable.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use foundation_threading::{CondVar, Deadline, Mutex, ThreadingError};

/// Bounded queue in the classic mutex-plus-two-condvars shape.
struct Channel {
    mutex: Mutex,
    not_empty: CondVar,
    not_full: CondVar,
    queue: std::cell::UnsafeCell<VecDeque<u32>>,
    capacity: usize,
}

unsafe impl Sync for Channel {}

impl Channel {
    fn new(capacity: usize) -> Self {
        Self {
            mutex: Mutex::plain().unwrap(),
            not_empty: CondVar::new().unwrap(),
            not_full: CondVar::new().unwrap(),
            queue: std::cell::UnsafeCell::new(VecDeque::new()),
            capacity,
        }
    }

    fn push(&self, item: u32) {
        self.mutex.lock().unwrap();
        unsafe {
            while (*self.queue.get()).len() == self.capacity {
                self.not_full.wait(&self.mutex).unwrap();
            }
            (*self.queue.get()).push_back(item);
        }
        self.mutex.unlock().unwrap();
        self.not_empty.notify_one().unwrap();
    }

    fn pop(&self) -> u32 {
        self.mutex.lock().unwrap();
        let item = unsafe {
            while (*self.queue.get()).is_empty() {
                self.not_empty.wait(&self.mutex).unwrap();
            }
            (*self.queue.get()).pop_front().unwrap()
        };
        self.mutex.unlock().unwrap();
        self.not_full.notify_one().unwrap();
        item
    }
}

#[test]
#[ntest::timeout(30000)]
fn test_producers_and_consumers_hand_over_everything() {
    const PRODUCERS: u32 = 4;
    const PER_PRODUCER: u32 = 250;

    let channel = Arc::new(Channel::new(16));

    let producers: Vec<_> = (0..PRODUCERS)
        .map(|id| {
            let channel = Arc::clone(&channel);
            std::thread::spawn(move || {
                for i in 0..PER_PRODUCER {
                    channel.push(id * PER_PRODUCER + i);
                }
            })
        })
        .collect();

    let consumer = {
        let channel = Arc::clone(&channel);
        std::thread::spawn(move || {
            let mut seen = vec![false; (PRODUCERS * PER_PRODUCER) as usize];
            for _ in 0..PRODUCERS * PER_PRODUCER {
                seen[channel.pop() as usize] = true;
            }
            seen
        })
    };

    for producer in producers {
        producer.join().unwrap();
    }
    let seen = consumer.join().unwrap();
    assert!(seen.iter().all(|&s| s), "an item was lost or duplicated");
}

#[test]
#[ntest::timeout(30000)]
fn test_waiter_unblocks_only_when_count_drained() {
    use std::sync::atomic::{AtomicU32, Ordering};

    const NOTIFIERS: u32 = 8;

    struct Shared {
        mutex: Mutex,
        cond: CondVar,
        count: AtomicU32,
    }
    unsafe impl Sync for Shared {}

    let shared = Arc::new(Shared {
        mutex: Mutex::plain().unwrap(),
        cond: CondVar::new().unwrap(),
        count: AtomicU32::new(NOTIFIERS),
    });

    let waiter = {
        let shared = Arc::clone(&shared);
        std::thread::spawn(move || {
            shared.mutex.lock().unwrap();
            while shared.count.load(Ordering::Acquire) > 0 {
                shared.cond.wait(&shared.mutex).unwrap();
            }
            // Unblocked exactly once, and only with the count drained.
            assert_eq!(shared.count.load(Ordering::Acquire), 0);
            shared.mutex.unlock().unwrap();
        })
    };

    let notifiers: Vec<_> = (0..NOTIFIERS)
        .map(|_| {
            let shared = Arc::clone(&shared);
            std::thread::spawn(move || {
                shared.mutex.lock().unwrap();
                shared.count.fetch_sub(1, Ordering::AcqRel);
                shared.mutex.unlock().unwrap();
                shared.cond.notify_all().unwrap();
            })
        })
        .collect();

    for notifier in notifiers {
        notifier.join().unwrap();
    }
    waiter.join().unwrap();
}

#[test]
#[ntest::timeout(10000)]
fn test_timed_wait_leaves_state_unchanged() {
    let mutex = Mutex::plain().unwrap();
    let cond = CondVar::new().unwrap();

    mutex.lock().unwrap();
    for _ in 0..3 {
        assert_eq!(
            cond.wait_deadline(&mutex, Deadline::after(Duration::from_millis(20))),
            Err(ThreadingError::TimedOut)
        );
    }
    // Timeouts must not leave residue that satisfies a later waiter
    // without a notification.
    assert_eq!(
        cond.wait_deadline(&mutex, Deadline::after(Duration::from_millis(20))),
        Err(ThreadingError::TimedOut)
    );
    mutex.unlock().unwrap();
}

#[test]
#[ntest::timeout(10000)]
fn test_notification_without_waiter_is_lost() {
    let mutex = Mutex::plain().unwrap();
    let cond = CondVar::new().unwrap();

    cond.notify_one().unwrap();
    cond.notify_all().unwrap();

    mutex.lock().unwrap();
    assert_eq!(
        cond.wait_deadline(&mutex, Deadline::after(Duration::from_millis(30))),
        Err(ThreadingError::TimedOut)
    );
    mutex.unlock().unwrap();
}
