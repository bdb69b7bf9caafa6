//! # `cache` (OPTIONAL)
//!
//! In-memory LRU cache of backend responses. Without it the client still
//! works, every read just goes to the backend.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use lru::LruCache;
use parking_lot::{Mutex, RwLock};
use shared_types::{InitAction, SubsystemFailure};
use std::num::NonZeroUsize;
use std::sync::Arc;
use tracing::{debug, info};

pub const STEP_NAME: &str = "cache";

/// A cached backend response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedResponse {
    pub body: Vec<u8>,
    pub stored_at: DateTime<Utc>,
}

/// LRU response cache
pub struct ResponseCache {
    entries: Mutex<LruCache<String, CachedResponse>>,
    capacity: NonZeroUsize,
}

impl ResponseCache {
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
            capacity,
        }
    }

    pub fn get(&self, key: &str) -> Option<CachedResponse> {
        self.entries.lock().get(key).cloned()
    }

    pub fn put(&self, key: impl Into<String>, body: Vec<u8>) {
        self.entries.lock().put(
            key.into(),
            CachedResponse {
                body,
                stored_at: Utc::now(),
            },
        );
    }

    pub fn invalidate(&self, key: &str) -> bool {
        self.entries.lock().pop(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity.get()
    }
}

/// Where the cache lives once the step has run. Empty means degraded.
#[derive(Default)]
pub struct CacheSlot {
    cache: RwLock<Option<Arc<ResponseCache>>>,
}

impl CacheSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> Option<Arc<ResponseCache>> {
        self.cache.read().clone()
    }

    pub fn is_available(&self) -> bool {
        self.cache.read().is_some()
    }
}

pub struct CacheStep {
    capacity: usize,
    slot: Arc<CacheSlot>,
}

impl CacheStep {
    pub fn new(capacity: usize, slot: Arc<CacheSlot>) -> Self {
        Self { capacity, slot }
    }
}

#[async_trait]
impl InitAction for CacheStep {
    async fn run(&self) -> Result<(), SubsystemFailure> {
        let capacity = NonZeroUsize::new(self.capacity)
            .ok_or_else(|| SubsystemFailure::misconfigured("cache capacity is zero"))?;

        let mut slot = self.slot.cache.write();
        if slot.is_some() {
            debug!("[Cache] Already initialized");
            return Ok(());
        }
        *slot = Some(Arc::new(ResponseCache::new(capacity)));

        info!(capacity = capacity.get(), "[Cache] Response cache ready");
        Ok(())
    }
}
