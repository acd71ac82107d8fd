//! TTL key-value cache for remote NFT metadata
//!
//! Keyed by (collection, token id). Entries are immutable until a local
//! mutation (a claim, a resale) invalidates them, so a short TTL plus
//! explicit invalidation keeps the view honest without re-fetching on every
//! render. Explicit invalidation always wins over remaining TTL.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::constants::{METADATA_CACHE_CAP, METADATA_TTL};

struct CacheEntry<T> {
    value: T,
    fetched_at: Instant,
}

/// In-memory TTL cache with a defensive size ceiling.
///
/// The std `Mutex` is never held across an await: every method locks, works
/// on the map synchronously, and returns.
pub struct MetadataCache<T> {
    entries: Mutex<HashMap<(String, String), CacheEntry<T>>>,
    ttl: Duration,
    capacity: usize,
}

impl<T: Clone> MetadataCache<T> {
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
            capacity,
        }
    }

    /// Fetch a live entry, dropping it if the TTL has lapsed.
    pub fn get(&self, collection: &str, token_id: &str) -> Option<T> {
        let key = (collection.to_string(), token_id.to_string());
        let mut entries = self.entries.lock().expect("metadata cache poisoned");

        match entries.get(&key) {
            Some(entry) if entry.fetched_at.elapsed() < self.ttl => Some(entry.value.clone()),
            Some(_) => {
                entries.remove(&key);
                None
            }
            None => None,
        }
    }

    pub fn insert(&self, collection: &str, token_id: &str, value: T) {
        let key = (collection.to_string(), token_id.to_string());
        let mut entries = self.entries.lock().expect("metadata cache poisoned");

        if entries.len() >= self.capacity && !entries.contains_key(&key) {
            // Evict the stalest entry rather than refusing the insert
            if let Some(oldest) = entries
                .iter()
                .min_by_key(|(_, e)| e.fetched_at)
                .map(|(k, _)| k.clone())
            {
                entries.remove(&oldest);
            }
        }

        entries.insert(
            key,
            CacheEntry {
                value,
                fetched_at: Instant::now(),
            },
        );
    }

    pub fn invalidate(&self, collection: &str, token_id: &str) {
        let key = (collection.to_string(), token_id.to_string());
        let mut entries = self.entries.lock().expect("metadata cache poisoned");
        entries.remove(&key);
    }

    /// Invalidate a batch of keys, e.g. every position touched by a claim.
    pub fn invalidate_many<K: AsRef<str>, V: AsRef<str>>(&self, keys: &[(K, V)]) {
        let mut entries = self.entries.lock().expect("metadata cache poisoned");
        for (collection, token_id) in keys {
            entries.remove(&(collection.as_ref().to_string(), token_id.as_ref().to_string()));
        }
    }

    pub fn clear(&self) {
        let mut entries = self.entries.lock().expect("metadata cache poisoned");
        entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.lock().expect("metadata cache poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T: Clone> Default for MetadataCache<T> {
    fn default() -> Self {
        Self::new(METADATA_TTL, METADATA_CACHE_CAP)
    }
}
