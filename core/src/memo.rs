//! Recent-Decision Memo (spec §4.7): a small bounded cache of recent
//! `is_404` decisions keyed by a fingerprint of `(url, body)`, so that
//! back-to-back calls on the same response short-circuit without
//! re-running the decision tree or touching the signature store.

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, PoisonError};

use sha2::{Digest, Sha256};

/// Default capacity (spec §4.7: "default small, e.g. 128").
pub const DEFAULT_CAPACITY: usize = 128;

struct Inner {
    /// Least-recently-used at the front.
    order: VecDeque<String>,
    entries: HashMap<String, bool>,
}

/// By-value LRU cache of booleans. Evicting an entry here never touches
/// the signature store (spec §4.7 invariant).
pub struct RecentDecisionMemo {
    inner: Mutex<Inner>,
    capacity: usize,
}

impl RecentDecisionMemo {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self { inner: Mutex::new(Inner { order: VecDeque::new(), entries: HashMap::new() }), capacity }
    }

    /// Prior decision for `(url, body)`, if still cached. Promotes the
    /// entry to most-recently-used on hit.
    #[must_use]
    pub fn get(&self, url: &str, body: &[u8]) -> Option<bool> {
        let key = fingerprint(url, body);
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);

        let decision = *inner.entries.get(&key)?;
        if let Some(pos) = inner.order.iter().position(|k| k == &key) {
            inner.order.remove(pos);
        }
        inner.order.push_back(key);
        Some(decision)
    }

    pub fn put(&self, url: &str, body: &[u8], decision: bool) {
        let key = fingerprint(url, body);
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);

        if inner.entries.contains_key(&key) {
            if let Some(pos) = inner.order.iter().position(|k| k == &key) {
                inner.order.remove(pos);
            }
        } else if inner.entries.len() >= self.capacity {
            if let Some(oldest) = inner.order.pop_front() {
                inner.entries.remove(&oldest);
            }
        }

        inner.entries.insert(key.clone(), decision);
        inner.order.push_back(key);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner).entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for RecentDecisionMemo {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

/// `(url, body)` fingerprint. Collisions are harmless here — a false
/// memo hit only costs a stale boolean, never a correctness issue in the
/// signature store.
fn fingerprint(url: &str, body: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(url.as_bytes());
    hasher.update(b"\0");
    hasher.update(body);
    hasher.finalize().iter().map(|b| format!("{b:02x}")).collect()
}
