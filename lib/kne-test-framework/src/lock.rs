use std::sync::{Mutex, MutexGuard};

use once_cell::sync::Lazy;

static LOCK: Lazy<Mutex<()>> = Lazy::new(Mutex::default);

/// Take an exclusive lock on the shared cluster for the duration of one
/// test case. A test that panicked while holding the lock does not poison
/// it for the rest of the suite.
pub fn lock() -> MutexGuard<'static, ()> {
    LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
