//! Content-addressed cache for group outputs
//!
//! Group outputs are keyed by [`CacheKey`]: the group identity, an output variant
//! (e.g. unminimized) and a hash of the group's resolved inputs. Any change to an
//! input produces a new key, and storing it evicts the entry for the previous inputs
//! of the same group and variant.
//!
//! # Concurrency
//!
//! [`ContentCache::get_or_compute`] guarantees at-most-once computation per key within
//! the process. Concurrent callers for the same missing key serialize on a per-key
//! async mutex (held in a [`DashMap`]); the first computes and stores, the rest
//! find the stored entry once they acquire the lock. Different keys never contend.
//!
//! A failed computation stores nothing, so the next waiter computes again under the
//! same lock. The lock entry is dropped by whoever releases it last, including a
//! caller whose future was abandoned mid-computation.
//!
//! # Examples
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use assetweave::cache::{CacheKey, ContentCache, MemoryStorage};
//! use assetweave::core::ResourceType;
//! use assetweave::model::GroupKey;
//!
//! # async fn example() -> assetweave::core::Result<()> {
//! let cache = ContentCache::new(
//!     Arc::new(MemoryStorage::new()),
//!     assetweave::hash::default_strategy(),
//!     assetweave::naming::default_strategy(),
//! );
//! let key = CacheKey::new(GroupKey::new("all", ResourceType::Js), "inputs-hash");
//! let entry = cache.get_or_compute(key, || async { Ok(b"var a;".to_vec()) }).await?;
//! assert_eq!(entry.name, "all.js");
//! # Ok(())
//! # }
//! ```

mod storage;

pub use storage::{CacheStorage, MemoryStorage};

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tokio::sync::Mutex;
use tracing::debug;

use crate::core::Result;
use crate::hash::HashStrategy;
use crate::model::GroupKey;
use crate::naming::NamingStrategy;

/// Group identity, output variant and the hash of the group's resolved inputs.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub group: GroupKey,
    /// Distinguishes outputs of the same inputs, e.g. `unminimized`; empty by default
    pub variant: String,
    pub hash: String,
}

impl CacheKey {
    pub fn new(group: GroupKey, hash: impl Into<String>) -> Self {
        Self {
            group,
            variant: String::new(),
            hash: hash.into(),
        }
    }

    #[must_use]
    pub fn with_variant(mut self, variant: impl Into<String>) -> Self {
        self.variant = variant.into();
        self
    }

    fn generation(&self) -> (GroupKey, String) {
        (self.group.clone(), self.variant.clone())
    }
}

/// An immutable cached output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    pub content: Vec<u8>,
    /// Published name from the naming strategy
    pub name: String,
    /// Hash of `content`
    pub hash: String,
    pub created_at: DateTime<Utc>,
}

/// Hit/miss counters and current size.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
}

/// Memoizes group outputs with per-key single-flight computation.
pub struct ContentCache {
    storage: Arc<dyn CacheStorage>,
    /// Per-key async locks serializing computation of the same key.
    inflight: DashMap<CacheKey, Arc<Mutex<()>>>,
    /// Input hash of the latest entry per group and variant, for eviction on change.
    generations: DashMap<(GroupKey, String), String>,
    hash: Arc<dyn HashStrategy>,
    naming: Arc<dyn NamingStrategy>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl ContentCache {
    pub fn new(
        storage: Arc<dyn CacheStorage>,
        hash: Arc<dyn HashStrategy>,
        naming: Arc<dyn NamingStrategy>,
    ) -> Self {
        Self {
            storage,
            inflight: DashMap::new(),
            generations: DashMap::new(),
            hash,
            naming,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// The stored entry for `key`, or the result of `compute` stored under it.
    ///
    /// `compute` runs at most once per key at a time; concurrent callers for the
    /// same key wait for it and receive the same entry.
    ///
    /// # Errors
    ///
    /// Whatever `compute` or the naming strategy returns; nothing is stored then.
    pub async fn get_or_compute<F, Fut>(&self, key: CacheKey, compute: F) -> Result<Arc<CacheEntry>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<u8>>>,
    {
        if let Some(entry) = self.lookup(&key) {
            return Ok(entry);
        }

        let inflight = Inflight::join(&self.inflight, &key);
        let _held = inflight.lock.lock().await;

        if let Some(entry) = self.lookup(&key) {
            return Ok(entry);
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        debug!("Cache miss for {}", key.group);
        self.store(&key, compute().await)
    }

    fn lookup(&self, key: &CacheKey) -> Option<Arc<CacheEntry>> {
        let entry = self.storage.get(key)?;
        self.hits.fetch_add(1, Ordering::Relaxed);
        Some(entry)
    }

    fn store(&self, key: &CacheKey, content: Result<Vec<u8>>) -> Result<Arc<CacheEntry>> {
        let content = content?;
        let name = self.naming.rename(&key.group.file_name(), &content)?;
        let entry = Arc::new(CacheEntry {
            hash: self.hash.get_hash(&content),
            content,
            name,
            created_at: Utc::now(),
        });

        if let Some(previous) = self.generations.insert(key.generation(), key.hash.clone()) {
            if previous != key.hash {
                debug!("Inputs of {} changed, evicting previous output", key.group);
                let stale = CacheKey {
                    hash: previous,
                    ..key.clone()
                };
                self.storage.remove(&stale);
            }
        }
        self.storage.put(key.clone(), Arc::clone(&entry));
        Ok(entry)
    }

    /// Drop every entry of `group`.
    pub fn invalidate(&self, group: &GroupKey) -> usize {
        self.generations.retain(|(generation, _), _| generation != group);
        self.storage.remove_group(group)
    }

    /// Drop every entry.
    pub fn clear(&self) {
        self.generations.clear();
        self.storage.clear();
    }

    #[must_use]
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.storage.len(),
        }
    }
}

/// A caller's share of the per-key lock.
///
/// Dropping the last share removes the lock entry, so waiters queued behind a failed
/// or abandoned computation keep the same lock as callers arriving later.
struct Inflight<'a> {
    map: &'a DashMap<CacheKey, Arc<Mutex<()>>>,
    key: &'a CacheKey,
    lock: Arc<Mutex<()>>,
}

impl<'a> Inflight<'a> {
    fn join(map: &'a DashMap<CacheKey, Arc<Mutex<()>>>, key: &'a CacheKey) -> Self {
        let lock = Arc::clone(
            map.entry(key.clone())
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .value(),
        );
        Self { map, key, lock }
    }
}

impl Drop for Inflight<'_> {
    fn drop(&mut self) {
        // One reference in the map, one here: nobody else is waiting.
        self.map.remove_if(self.key, |_, lock| {
            Arc::ptr_eq(lock, &self.lock) && Arc::strong_count(lock) == 2
        });
    }
}

impl fmt::Debug for ContentCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContentCache")
            .field("hash", &self.hash.alias())
            .field("naming", &self.naming.alias())
            .field("stats", &self.stats())
            .finish()
    }
}
