//! Pluggable storage behind [`super::ContentCache`].

use std::sync::Arc;

use dashmap::DashMap;

use super::{CacheEntry, CacheKey};
use crate::model::GroupKey;

/// Key/value store for cache entries.
///
/// Implementations must be safe for concurrent use; the cache serializes computation
/// per key but not storage access.
pub trait CacheStorage: Send + Sync {
    fn get(&self, key: &CacheKey) -> Option<Arc<CacheEntry>>;

    fn put(&self, key: CacheKey, entry: Arc<CacheEntry>);

    fn remove(&self, key: &CacheKey) -> Option<Arc<CacheEntry>>;

    /// Remove every entry of `group`. Returns how many were removed.
    fn remove_group(&self, group: &GroupKey) -> usize;

    fn clear(&self);

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// In-process storage backed by a [`DashMap`].
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: DashMap<CacheKey, Arc<CacheEntry>>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl CacheStorage for MemoryStorage {
    fn get(&self, key: &CacheKey) -> Option<Arc<CacheEntry>> {
        self.entries.get(key).map(|entry| Arc::clone(entry.value()))
    }

    fn put(&self, key: CacheKey, entry: Arc<CacheEntry>) {
        self.entries.insert(key, entry);
    }

    fn remove(&self, key: &CacheKey) -> Option<Arc<CacheEntry>> {
        self.entries.remove(key).map(|(_, entry)| entry)
    }

    fn remove_group(&self, group: &GroupKey) -> usize {
        let before = self.entries.len();
        self.entries.retain(|key, _| &key.group != group);
        before.saturating_sub(self.entries.len())
    }

    fn clear(&self) {
        self.entries.clear();
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}
