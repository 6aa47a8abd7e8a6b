//! Thread-local storage over pthread keys.
//!
//! The platform fires key destructors itself when a thread terminates,
//! with the POSIX bounded-iteration guarantee, so the trampoline hook is
//! a no-op here.

use crate::result::{check, from_errno, ThreadingResult};
use crate::sys::TlsBackend;
use crate::tls::TlsDestructor;

pub(crate) struct TlsFacility;

impl TlsBackend for TlsFacility {
    type Key = libc::pthread_key_t;

    fn create_key(destructor: Option<TlsDestructor>) -> ThreadingResult<Self::Key> {
        let mut key: libc::pthread_key_t = 0;
        // The destructor type differs from pthread's only in the pointee
        // type of its argument, which has identical ABI.
        let native_dtor: Option<unsafe extern "C" fn(*mut libc::c_void)> =
            destructor.map(|dtor| unsafe {
                std::mem::transmute::<TlsDestructor, unsafe extern "C" fn(*mut libc::c_void)>(dtor)
            });
        let rc = unsafe { libc::pthread_key_create(&raw mut key, native_dtor) };
        if rc != 0 {
            tracing::error!(code = rc, "pthread_key_create failed");
            return Err(from_errno(rc));
        }
        Ok(key)
    }

    fn delete_key(key: Self::Key) {
        unsafe {
            libc::pthread_key_delete(key);
        }
    }

    fn get(key: Self::Key) -> *mut u8 {
        unsafe { libc::pthread_getspecific(key).cast() }
    }

    fn set(key: Self::Key, value: *mut u8) -> ThreadingResult<()> {
        check(unsafe { libc::pthread_setspecific(key, value.cast()) })
    }

    fn run_thread_destructors() {
        // pthread runs key destructors at thread exit.
    }
}
