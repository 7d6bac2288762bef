use std::collections::HashSet;
use std::hash::Hash;
use std::sync::{Arc, Mutex, PoisonError};

/// Per-key single-flight lock: at most one holder per key, different keys never block each other.
#[derive(Clone)]
pub struct InFlight<K> {
    keys: Arc<Mutex<HashSet<K>>>,
}

/// Releases its key when dropped, whether the request succeeded or not.
pub struct FlightGuard<K: Eq + Hash> {
    keys: Arc<Mutex<HashSet<K>>>,
    key: K,
}

impl<K: Eq + Hash + Clone> InFlight<K> {
    pub fn new() -> Self {
        Self {
            keys: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    /// `None` when the key is already held.
    pub fn try_acquire(&self, key: &K) -> Option<FlightGuard<K>> {
        let mut keys = self.keys.lock().unwrap_or_else(PoisonError::into_inner);
        if !keys.insert(key.clone()) {
            return None;
        }
        Some(FlightGuard {
            keys: self.keys.clone(),
            key: key.clone(),
        })
    }

    pub fn is_held(&self, key: &K) -> bool {
        self.keys
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(key)
    }
}

impl<K: Eq + Hash + Clone> Default for InFlight<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Eq + Hash> Drop for FlightGuard<K> {
    fn drop(&mut self) {
        self.keys
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.key);
    }
}
