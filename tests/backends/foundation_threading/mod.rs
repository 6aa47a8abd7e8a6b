mod atomic_tests;
mod condvar_tests;
mod mutex_tests;
mod tls_tests;
