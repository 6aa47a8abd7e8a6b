//! Emulated thread-local storage.
//!
//! Keys live in a process-wide slot table; values live in a per-thread
//! list. The platform fires no destructors of its own here, so the
//! thread trampoline drives the bounded destructor loop explicitly.

use std::cell::RefCell;

use crate::result::{ThreadingError, ThreadingResult};
use crate::sys::emulated::spin::SpinLock;
use crate::sys::TlsBackend;
use crate::tls::{TlsDestructor, TLS_DESTRUCTOR_ITERATIONS};

struct KeySlot {
    live: bool,
    /// Bumped every time the slot index is handed out again, so values
    /// stored under an earlier key at the same index are never visible
    /// to the new one.
    generation: u32,
    destructor: Option<TlsDestructor>,
}

/// A per-thread value, stamped with the generation of the slot it was
/// stored under. An entry whose stamp no longer matches the slot belongs
/// to a deleted key and reads as absent.
struct Entry {
    key: u32,
    generation: u32,
    value: *mut u8,
}

static KEYS: SpinLock<Vec<KeySlot>> = SpinLock::new(Vec::new());

thread_local! {
    static VALUES: RefCell<Vec<Entry>> = const { RefCell::new(Vec::new()) };
}

fn live_generation(key: u32) -> Option<u32> {
    KEYS.lock()
        .get(key as usize)
        .filter(|slot| slot.live)
        .map(|slot| slot.generation)
}

pub(crate) struct TlsFacility;

impl TlsBackend for TlsFacility {
    type Key = u32;

    fn create_key(destructor: Option<TlsDestructor>) -> ThreadingResult<Self::Key> {
        let mut keys = KEYS.lock();
        if let Some(index) = keys.iter().position(|slot| !slot.live) {
            let slot = &mut keys[index];
            slot.live = true;
            slot.generation = slot.generation.wrapping_add(1);
            slot.destructor = destructor;
            #[allow(clippy::cast_possible_truncation)]
            return Ok(index as u32);
        }
        let index = u32::try_from(keys.len()).map_err(|_| ThreadingError::OutOfMemory)?;
        keys.push(KeySlot {
            live: true,
            generation: 0,
            destructor,
        });
        Ok(index)
    }

    fn delete_key(key: Self::Key) {
        if let Some(slot) = KEYS.lock().get_mut(key as usize) {
            slot.live = false;
            slot.destructor = None;
        }
    }

    fn get(key: Self::Key) -> *mut u8 {
        let Some(generation) = live_generation(key) else {
            return std::ptr::null_mut();
        };
        VALUES.with(|values| {
            values
                .borrow()
                .iter()
                .find(|entry| entry.key == key && entry.generation == generation)
                .map_or(std::ptr::null_mut(), |entry| entry.value)
        })
    }

    fn set(key: Self::Key, value: *mut u8) -> ThreadingResult<()> {
        let Some(generation) = live_generation(key) else {
            return Err(ThreadingError::InvalidArgument);
        };
        VALUES.with(|values| {
            let mut values = values.borrow_mut();
            if let Some(entry) = values.iter_mut().find(|entry| entry.key == key) {
                // A stale entry from an earlier key at this index is
                // simply overwritten.
                entry.generation = generation;
                entry.value = value;
            } else {
                values.push(Entry {
                    key,
                    generation,
                    value,
                });
            }
        });
        Ok(())
    }

    fn run_thread_destructors() {
        for _ in 0..TLS_DESTRUCTOR_ITERATIONS {
            // Snapshot and null out first; a destructor may touch the
            // per-thread list itself.
            let pending: Vec<(TlsDestructor, *mut u8)> = VALUES.with(|values| {
                let mut values = values.borrow_mut();
                let mut pending = Vec::new();
                for entry in values.iter_mut() {
                    if entry.value.is_null() {
                        continue;
                    }
                    // Outlived values only reach a destructor while their
                    // key is still the one they were stored under.
                    let destructor = KEYS
                        .lock()
                        .get(entry.key as usize)
                        .filter(|slot| slot.live && slot.generation == entry.generation)
                        .and_then(|slot| slot.destructor);
                    let taken = std::mem::replace(&mut entry.value, std::ptr::null_mut());
                    if let Some(destructor) = destructor {
                        pending.push((destructor, taken));
                    }
                }
                pending
            });
            if pending.is_empty() {
                break;
            }
            for (destructor, value) in pending {
                destructor(value);
            }
        }
    }
}
