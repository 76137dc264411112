use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::debug;

use crate::animation::SharedAnimation;

/// Maximum number of cached animations before the cache is emptied
pub const DEFAULT_CAPACITY: usize = 50;

type AnimationMap = HashMap<String, SharedAnimation>;

/// Decoded animations keyed by uri, so hovering over the same thumbnail twice
/// doesn't decode it twice.
///
/// When an insert finds the cache full, every entry is dropped before the new
/// one goes in. Browsing a large directory therefore restarts the cache cold
/// instead of keeping a recency order.
pub struct AnimationCache {
    entries: Mutex<AnimationMap>,
    capacity: usize,
}

impl Default for AnimationCache {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl AnimationCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            capacity: capacity.max(1),
        }
    }

    fn entries(&self) -> MutexGuard<'_, AnimationMap> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn get(&self, key: &str) -> Option<SharedAnimation> {
        self.entries().get(key).cloned()
    }

    pub fn put(&self, key: impl Into<String>, animation: SharedAnimation) {
        let mut entries = self.entries();

        if entries.len() >= self.capacity {
            entries.clear();
            debug!("Animation cache full, cleared all entries");
        }

        entries.insert(key.into(), animation);
    }

    pub fn remove(&self, key: &str) {
        self.entries().remove(key);
    }

    pub fn clear(&self) {
        self.entries().clear();
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries().contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
