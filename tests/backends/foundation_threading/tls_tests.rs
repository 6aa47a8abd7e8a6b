//! Thread-local storage scenarios across many workers.

use std::sync::atomic::{AtomicUsize, Ordering};

use foundation_threading::{thread, Thread, TlsKey};

#[test]
#[ntest::timeout(60000)]
fn test_destructor_runs_once_per_worker() {
    const WORKERS: usize = 256;

    static FIRED: AtomicUsize = AtomicUsize::new(0);
    extern "C" fn count(_: *mut u8) {
        FIRED.fetch_add(1, Ordering::AcqRel);
    }

    let key = TlsKey::create(Some(count)).unwrap();

    let workers: Vec<_> = (0..WORKERS)
        .map(|i| {
            Thread::spawn(move || {
                key.set((i + 1) as *mut u8).unwrap();
                assert_eq!(key.get(), (i + 1) as *mut u8);
                0
            })
            .unwrap()
        })
        .collect();
    for worker in workers {
        worker.join().unwrap();
    }

    assert_eq!(FIRED.load(Ordering::Acquire), WORKERS);
    key.delete();
}

#[test]
#[ntest::timeout(30000)]
fn test_values_do_not_leak_between_workers() {
    let key = TlsKey::create(None).unwrap();

    let workers: Vec<_> = (0..8)
        .map(|i| {
            Thread::spawn(move || {
                // Fresh slot on every worker.
                assert!(key.get().is_null());
                key.set((i + 1) as *mut u8).unwrap();
                assert_eq!(key.get(), (i + 1) as *mut u8);
                0
            })
            .unwrap()
        })
        .collect();
    for worker in workers {
        worker.join().unwrap();
    }

    key.delete();
}

#[test]
#[ntest::timeout(10000)]
fn test_multiple_keys_are_independent() {
    let first = TlsKey::create(None).unwrap();
    let second = TlsKey::create(None).unwrap();

    Thread::spawn(move || {
        first.set(0xA as *mut u8).unwrap();
        second.set(0xB as *mut u8).unwrap();
        assert_eq!(first.get(), 0xA as *mut u8);
        assert_eq!(second.get(), 0xB as *mut u8);
        0
    })
    .unwrap()
    .join()
    .unwrap();

    first.delete();
    second.delete();
}

#[test]
#[ntest::timeout(10000)]
fn test_destructor_fires_on_exit_path() {
    static FIRED: AtomicUsize = AtomicUsize::new(0);
    extern "C" fn count(_: *mut u8) {
        FIRED.fetch_add(1, Ordering::AcqRel);
    }

    let key = TlsKey::create(Some(count)).unwrap();
    let worker = Thread::spawn(move || {
        key.set(1 as *mut u8).unwrap();
        thread::exit(3)
    })
    .unwrap();
    assert_eq!(worker.join().unwrap(), 3);
    assert_eq!(FIRED.load(Ordering::Acquire), 1);

    key.delete();
}
