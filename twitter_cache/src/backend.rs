use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::entry::{CacheEntry, Cacheable};
use crate::key::CacheKey;

/// Process-wide store of fetched entities, shared between clients through an `Arc`.
///
/// `hit` counts lookups that found an entry, `store` counts puts that introduced a
/// new key. Both only ever grow.
#[derive(Debug, Default)]
pub struct CacheBackend {
    entries: RwLock<HashMap<CacheKey, CacheEntry>>,
    hit: AtomicU64,
    store: AtomicU64,
}

impl CacheBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Look up an entry. Counts a hit when found.
    pub async fn get(&self, key: &CacheKey) -> Option<CacheEntry> {
        let entry = self.entries.read().await.get(key).cloned();
        if entry.is_some() {
            self.hit.fetch_add(1, Ordering::Relaxed);
            tracing::debug!("Cache hit: {}", key);
        }
        entry
    }

    pub async fn get_as<T: Cacheable>(&self, key: &CacheKey) -> Option<Arc<T>> {
        self.get(key).await.and_then(T::from_entry)
    }

    /// Insert or overwrite an entry. Returns true if the key was new, which is
    /// the only case counted as a store.
    pub async fn put(&self, key: CacheKey, entry: CacheEntry) -> bool {
        let mut entries = self.entries.write().await;
        let inserted = entries.insert(key, entry).is_none();
        if inserted {
            self.store.fetch_add(1, Ordering::Relaxed);
        }
        inserted
    }

    /// Insert only if the key is absent, leaving an existing entry untouched.
    /// Returns true if the entry was inserted.
    pub async fn put_if_absent(&self, key: CacheKey, entry: CacheEntry) -> bool {
        let mut entries = self.entries.write().await;
        if entries.contains_key(&key) {
            return false;
        }
        entries.insert(key, entry);
        self.store.fetch_add(1, Ordering::Relaxed);
        true
    }

    pub async fn has(&self, key: &CacheKey) -> bool {
        self.entries.read().await.contains_key(key)
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    pub fn hits(&self) -> u64 {
        self.hit.load(Ordering::Relaxed)
    }

    pub fn stores(&self) -> u64 {
        self.store.load(Ordering::Relaxed)
    }
}
