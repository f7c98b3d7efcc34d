use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::Value;
use std::{
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
    time::Duration,
};
use tokio::time::Instant;
use tracing::trace;

/// Every this many insertions, [`MemoryCache`] sweeps out all expired entries.
pub const PURGE_INTERVAL: usize = 64;

/// Identifies one cached response.
///
/// The body is the full serialized envelope, so any difference in method,
/// parameters, locale or token yields a different key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub namespace: &'static str,
    pub prefix: String,
    pub body: String,
}

impl CacheKey {
    pub fn derive(prefix: &str, body: &str) -> Self {
        Self {
            namespace: std::any::type_name::<super::DirectClient>(),
            prefix: prefix.to_string(),
            body: body.to_string(),
        }
    }
}

/// A key/value store with per-entry expiry.
///
/// Implementations are expected to make `get` and `set` individually atomic.
/// A miss is `None`; a stored `null` is `Some(Value::Null)`.
#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn get(&self, key: &CacheKey) -> Option<Value>;
    async fn set(&self, key: CacheKey, value: Value, ttl: Duration);
}

#[derive(Debug)]
struct CacheEntry {
    value: Value,
    expires_at: Instant,
}

/// An in-process [`CacheStore`].
///
/// Clones share the same entries. An expired entry is dropped when it is
/// looked up, and every [`PURGE_INTERVAL`] insertions all expired entries are
/// swept, so keys that are never requested again don't pile up.
#[derive(Debug, Clone, Default)]
pub struct MemoryCache {
    entries: Arc<DashMap<CacheKey, CacheEntry>>,
    insertions: Arc<AtomicUsize>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn purge_expired(&self) {
        let now = Instant::now();
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.expires_at > now);
        let purged = before.saturating_sub(self.entries.len());
        trace!(purged, "purged expired cache entries");
    }
}

#[async_trait]
impl CacheStore for MemoryCache {
    async fn get(&self, key: &CacheKey) -> Option<Value> {
        let now = Instant::now();
        if let Some(entry) = self.entries.get(key) {
            if entry.expires_at > now {
                return Some(entry.value.clone());
            }
        }

        // Our shard guard must be released before removing.
        self.entries
            .remove_if(key, |_, entry| entry.expires_at <= now);
        None
    }

    async fn set(&self, key: CacheKey, value: Value, ttl: Duration) {
        let inserted = self.insertions.fetch_add(1, Ordering::Relaxed) + 1;
        if inserted % PURGE_INTERVAL == 0 {
            self.purge_expired();
        }

        let expires_at = Instant::now() + ttl;
        self.entries.insert(key, CacheEntry { value, expires_at });
    }
}
