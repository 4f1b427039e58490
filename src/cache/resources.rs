//! Byte-budgeted LRU cache of fetched resources
//!
//! The budget is restored after the fact: an insert that pushes the total over
//! the budget queues one eviction pass rather than evicting inline, so a
//! single oversized resource can briefly exceed it.

use lru::LruCache;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::cache::loader::{LoadFuture, Resource, ResourceLoader};
use crate::cache::utils::human_size;

/// Point-in-time view of the cache size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    pub entries: usize,
    pub total_bytes: usize,
    pub budget_bytes: usize,
}

struct Inner {
    budget_bytes: usize,
    total_bytes: usize,
    lru: LruCache<String, Arc<Resource>>,
}

/// Cache that wraps a [`ResourceLoader`] so repeat loads of a locator are
/// served from memory until evicted.
///
/// Entries are keyed by the requested locator; the stored resource carries
/// the canonical one. Failed loads are never cached.
#[derive(Clone)]
pub struct ResourceCache {
    inner: Arc<Mutex<Inner>>,
    loader: Arc<dyn ResourceLoader>,
    eviction_queued: Arc<AtomicBool>,
}

impl ResourceCache {
    pub fn new(loader: Arc<dyn ResourceLoader>, budget_bytes: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                budget_bytes,
                total_bytes: 0,
                lru: LruCache::unbounded(),
            })),
            loader,
            eviction_queued: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Return the cached resource for `locator`, loading it on a miss.
    pub async fn get_or_load(&self, locator: &str) -> Option<Arc<Resource>> {
        let cached = self.inner.lock().lru.get(locator).cloned();
        if let Some(resource) = cached {
            tracing::trace!("Resource cache hit for {}", locator);
            return Some(resource);
        }

        let resource = self.loader.load(locator).await?;
        self.insert(locator, resource.clone());
        Some(resource)
    }

    fn insert(&self, locator: &str, resource: Arc<Resource>) {
        {
            let mut inner = self.inner.lock();
            let size = resource.size_bytes();
            if let Some(previous) = inner.lru.put(locator.to_string(), resource) {
                inner.total_bytes = inner.total_bytes.saturating_sub(previous.size_bytes());
            }
            inner.total_bytes = inner.total_bytes.saturating_add(size);
        }
        self.enqueue_eviction();
    }

    /// Queue at most one eviction pass. On a tokio runtime the pass runs as a
    /// separate task; without one it runs right after the insert.
    fn enqueue_eviction(&self) {
        if self.eviction_queued.swap(true, Ordering::AcqRel) {
            return;
        }

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let cache = self.clone();
                handle.spawn(async move {
                    cache.run_queued_eviction();
                });
            }
            Err(_) => self.run_queued_eviction(),
        }
    }

    fn run_queued_eviction(&self) {
        self.eviction_queued.store(false, Ordering::Release);
        self.evict();
    }

    /// Evict least-recently-used entries until the cache is within budget or
    /// empty. Returns the number of evicted entries.
    pub fn evict(&self) -> usize {
        let (evicted, freed) = {
            let mut inner = self.inner.lock();
            let mut evicted = 0;
            let mut freed = 0;
            while inner.total_bytes > inner.budget_bytes {
                let Some((_locator, resource)) = inner.lru.pop_lru() else {
                    inner.total_bytes = 0;
                    break;
                };
                inner.total_bytes = inner.total_bytes.saturating_sub(resource.size_bytes());
                freed += resource.size_bytes();
                evicted += 1;
            }
            (evicted, freed)
        };

        if evicted > 0 {
            tracing::info!(
                "evicting: {} specifiers from cache ({})",
                evicted,
                human_size(freed)
            );
        }
        evicted
    }

    pub fn contains(&self, locator: &str) -> bool {
        self.inner.lock().lru.contains(locator)
    }

    pub fn len(&self) -> usize {
        self.inner.lock().lru.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn total_bytes(&self) -> usize {
        self.inner.lock().total_bytes
    }

    pub fn budget_bytes(&self) -> usize {
        self.inner.lock().budget_bytes
    }

    pub fn stats(&self) -> CacheStats {
        let inner = self.inner.lock();
        CacheStats {
            entries: inner.lru.len(),
            total_bytes: inner.total_bytes,
            budget_bytes: inner.budget_bytes,
        }
    }
}

impl ResourceLoader for ResourceCache {
    fn load<'a>(&'a self, locator: &'a str) -> LoadFuture<'a> {
        Box::pin(self.get_or_load(locator))
    }
}
