//! Single-Flight Guard (spec §4.6): ensures at most one classification is
//! in progress per normalized path at a time, so concurrent scanner threads
//! never issue duplicate forced-404 probes for the same directory.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

/// Serializes callers by key; it does not memoize — each caller still runs
/// its own classification once the lock for its key is free. Per-key lock
/// entries are reclaimed once no other caller references them, so the map
/// stays bounded by concurrent-path count, not total-paths-ever-seen.
#[derive(Default)]
pub struct SingleFlightGuard {
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl SingleFlightGuard {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f` while holding the lock for `key`.
    pub fn with_guard<T>(&self, key: &str, f: impl FnOnce() -> T) -> T {
        let key_lock = {
            let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
            locks.entry(key.to_string()).or_default().clone()
        };

        let _held = key_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let result = f();

        {
            let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
            if let Some(entry) = locks.get(key)
                && Arc::strong_count(entry) <= 2
            {
                locks.remove(key);
            }
        }

        result
    }
}
