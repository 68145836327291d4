pub mod logging;

use std::sync::{Mutex, MutexGuard};

/// Locks `mutex`, taking the inner value back if a previous holder panicked.
/// The guarded data is append-only or wholesale-replaced, so a poisoned guard
/// never exposes a half-applied update.
pub(crate) fn lock_or_recover<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
