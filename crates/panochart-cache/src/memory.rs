//! In-process TTL store.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;

use crate::store::{CacheFuture, TtlCache};

#[derive(Debug, Clone)]
struct CacheEntry {
    body: Vec<u8>,
    expires_at: Instant,
}

#[derive(Debug, Default)]
struct CacheInner {
    map: HashMap<String, CacheEntry>,
}

impl CacheInner {
    fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.map.get(key).and_then(|entry| {
            if Instant::now() < entry.expires_at {
                Some(entry.body.clone())
            } else {
                None
            }
        })
    }

    /// Inserts the entry, sweeping expired ones first so stale keys never pile up.
    fn put(&mut self, key: String, body: Vec<u8>, ttl: Duration) {
        let now = Instant::now();
        self.clear_expired(now);
        self.map.insert(
            key,
            CacheEntry {
                body,
                expires_at: now + ttl,
            },
        );
    }

    fn clear_expired(&mut self, now: Instant) {
        self.map.retain(|_, entry| entry.expires_at > now);
    }
}

/// Thread-safe in-memory [`TtlCache`].
///
/// Clones share the same underlying map.
#[derive(Debug, Clone, Default)]
pub struct MemoryCache {
    inner: Arc<RwLock<CacheInner>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached bytes when present and not expired.
    pub async fn read(&self, key: &str) -> Option<Vec<u8>> {
        let store = self.inner.read().await;
        store.get(key)
    }

    /// Stores `body` under `key` for `ttl`. A zero TTL is a no-op.
    ///
    /// Every write also drops entries that have already expired.
    pub async fn write(&self, key: impl Into<String>, body: Vec<u8>, ttl: Duration) {
        if ttl.is_zero() {
            return;
        }
        let mut store = self.inner.write().await;
        store.put(key.into(), body, ttl);
    }

    pub async fn clear_expired(&self) {
        let mut store = self.inner.write().await;
        store.clear_expired(Instant::now());
    }

    pub async fn clear(&self) {
        let mut store = self.inner.write().await;
        store.map.clear();
    }

    /// Number of entries held, expired ones included.
    pub async fn len(&self) -> usize {
        let store = self.inner.read().await;
        store.map.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl TtlCache for MemoryCache {
    fn get<'a>(&'a self, key: &'a str) -> CacheFuture<'a, Option<Vec<u8>>> {
        Box::pin(async move { Ok(self.read(key).await) })
    }

    fn set<'a>(&'a self, key: &'a str, value: Vec<u8>, ttl: Duration) -> CacheFuture<'a, ()> {
        Box::pin(async move {
            self.write(key, value, ttl).await;
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn stores_and_overwrites_entries() {
        let cache = MemoryCache::new();

        assert!(cache.read("key1").await.is_none());

        cache.write("key1", b"value1".to_vec(), Duration::from_secs(1)).await;
        assert_eq!(cache.read("key1").await, Some(b"value1".to_vec()));

        cache.write("key1", b"value2".to_vec(), Duration::from_secs(1)).await;
        assert_eq!(cache.read("key1").await, Some(b"value2".to_vec()));
    }

    #[tokio::test]
    async fn entries_expire_after_ttl() {
        let cache = MemoryCache::new();

        cache.write("key1", b"value1".to_vec(), Duration::from_millis(100)).await;
        assert!(cache.read("key1").await.is_some());

        tokio::time::sleep(Duration::from_millis(150)).await;
        assert!(cache.read("key1").await.is_none());

        cache.clear_expired().await;
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn clear_removes_everything() {
        let cache = MemoryCache::new();
        cache.write("key1", b"a".to_vec(), Duration::from_secs(60)).await;
        cache.write("key2", b"b".to_vec(), Duration::from_secs(60)).await;
        assert_eq!(cache.len().await, 2);

        cache.clear().await;
        assert_eq!(cache.len().await, 0);
    }

    #[tokio::test]
    async fn zero_ttl_keeps_nothing() {
        let cache = MemoryCache::new();

        cache.write("key1", b"value1".to_vec(), Duration::ZERO).await;
        assert!(cache.read("key1").await.is_none());
        assert_eq!(cache.len().await, 0);
    }

    #[tokio::test]
    async fn writes_sweep_expired_entries() {
        let cache = MemoryCache::new();
        for from in 0..5 {
            cache
                .write(format!("BTCUSDT|1m|{from}|"), b"[]".to_vec(), Duration::from_millis(50))
                .await;
        }
        assert_eq!(cache.len().await, 5);

        tokio::time::sleep(Duration::from_millis(80)).await;
        cache.write("BTCUSDT|1m|5|", b"[]".to_vec(), Duration::from_secs(60)).await;

        assert_eq!(cache.len().await, 1);
        assert!(cache.read("BTCUSDT|1m|5|").await.is_some());
    }

    #[tokio::test]
    async fn port_round_trips_through_trait_object() {
        let cache: Arc<dyn TtlCache> = Arc::new(MemoryCache::new());

        cache
            .set("k", b"v".to_vec(), Duration::from_secs(60))
            .await
            .expect("memory set never fails");
        let value = cache.get("k").await.expect("memory get never fails");
        assert_eq!(value, Some(b"v".to_vec()));
        assert_eq!(cache.get("missing").await.expect("get"), None);
    }
}
