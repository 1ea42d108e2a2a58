//! In-memory response cache.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, RwLock};

use search_connector_shared::{HttpResponse, IndexTarget};
use tracing::trace;

use crate::errors::Result;
use crate::interfaces::{CacheHandle, CacheProvider, ResponseCache};

/// Default number of cached responses.
pub const DEFAULT_MAX_ENTRIES: usize = 1024;

#[derive(Default)]
struct Entries {
    map: HashMap<String, HttpResponse>,
    order: VecDeque<String>,
}

/// Bounded response cache. The oldest entry is evicted first.
pub struct InMemoryResponseCache {
    max_entries: usize,
    entries: RwLock<Entries>,
}

impl InMemoryResponseCache {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_MAX_ENTRIES)
    }

    /// A cache holding at most `max_entries` responses (at least one).
    pub fn with_capacity(max_entries: usize) -> Self {
        Self {
            max_entries: max_entries.max(1),
            entries: RwLock::new(Entries::default()),
        }
    }

    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .map
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries.map.clear();
        entries.order.clear();
    }
}

impl Default for InMemoryResponseCache {
    fn default() -> Self {
        Self::new()
    }
}

impl ResponseCache for InMemoryResponseCache {
    fn get(&self, key: &str) -> Option<HttpResponse> {
        self.entries
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .map
            .get(key)
            .cloned()
    }

    fn put(&self, key: &str, response: HttpResponse) {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        if entries.map.insert(key.to_string(), response).is_none() {
            entries.order.push_back(key.to_string());
        }
        while entries.map.len() > self.max_entries {
            match entries.order.pop_front() {
                Some(oldest) => {
                    trace!(key = %oldest, "Evicting cached response");
                    entries.map.remove(&oldest);
                }
                None => break,
            }
        }
    }

    fn remove(&self, key: &str) {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        if entries.map.remove(key).is_some() {
            entries.order.retain(|k| k != key);
        }
    }

    fn remove_prefix(&self, prefix: &str) -> usize {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        let before = entries.map.len();
        entries.map.retain(|k, _| !k.starts_with(prefix));
        entries.order.retain(|k| !k.starts_with(prefix));
        before - entries.map.len()
    }
}

/// Hands the same cache to every index.
pub struct SharedCacheProvider {
    cache: CacheHandle,
}

impl SharedCacheProvider {
    pub fn new(cache: CacheHandle) -> Self {
        Self { cache }
    }

    /// A provider backed by a fresh [`InMemoryResponseCache`].
    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemoryResponseCache::new()))
    }

    /// The cache handed out by [`CacheProvider::create`].
    pub fn cache(&self) -> &CacheHandle {
        &self.cache
    }
}

impl CacheProvider for SharedCacheProvider {
    fn create(&self, _target: &IndexTarget) -> Result<CacheHandle> {
        Ok(self.cache.clone())
    }
}
