//! In-process TTL cache
//!
//! Dashmap-backed backend with per-entry expiry. Expiry is checked on read,
//! so a stale entry is never returned; writes opportunistically sweep the
//! map once it grows past a size step so dead entries do not pile up between
//! reads.

use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

use super::{AtomicCacheStats, CacheBackend, CacheStats};
use crate::utils::error::Result;

const SWEEP_STEP: usize = 256;

#[derive(Debug, Clone)]
struct Entry {
    value: serde_json::Value,
    expires_at: Instant,
}

impl Entry {
    fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }
}

/// Dashmap-backed [`CacheBackend`] with lazy per-entry expiry
#[derive(Debug, Default)]
pub struct InMemoryCache {
    entries: DashMap<String, Entry>,
    stats: Arc<AtomicCacheStats>,
}

impl InMemoryCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    fn sweep_expired(&self) {
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired());
        let removed = before - self.entries.len();
        if removed > 0 {
            for _ in 0..removed {
                self.stats.record_eviction();
            }
            debug!(removed, "swept expired cache entries");
        }
    }
}

#[async_trait]
impl CacheBackend for InMemoryCache {
    async fn get(&self, key: &str) -> Result<Option<serde_json::Value>> {
        if let Some(entry) = self.entries.get(key) {
            if !entry.is_expired() {
                self.stats.record_hit();
                return Ok(Some(entry.value.clone()));
            }
        }
        // drop expired entry eagerly so the map does not hold dead rows
        if self
            .entries
            .remove_if(key, |_, entry| entry.is_expired())
            .is_some()
        {
            self.stats.record_eviction();
        }
        self.stats.record_miss();
        Ok(None)
    }

    async fn set_with_ttl(
        &self,
        key: &str,
        value: serde_json::Value,
        ttl: Duration,
    ) -> Result<()> {
        self.entries.insert(
            key.to_string(),
            Entry {
                value,
                expires_at: Instant::now() + ttl,
            },
        );
        if self.entries.len().is_multiple_of(SWEEP_STEP) {
            self.sweep_expired();
        }
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.entries.remove(key);
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        self.entries.clear();
        Ok(())
    }

    fn stats(&self) -> CacheStats {
        self.stats.snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_get_after_set() {
        let cache = InMemoryCache::new();
        cache
            .set_with_ttl("k", json!({"v": 1}), Duration::from_secs(60))
            .await
            .unwrap();
        assert_eq!(cache.get("k").await.unwrap(), Some(json!({"v": 1})));
        assert_eq!(cache.stats().hits, 1);
    }

    #[tokio::test]
    async fn test_expired_entry_never_returned() {
        let cache = InMemoryCache::new();
        cache
            .set_with_ttl("k", json!(42), Duration::from_millis(10))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(25)).await;
        assert_eq!(cache.get("k").await.unwrap(), None);
        let stats = cache.stats();
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.evictions, 1);
    }

    #[tokio::test]
    async fn test_delete_and_clear() {
        let cache = InMemoryCache::new();
        cache
            .set_with_ttl("a", json!(1), Duration::from_secs(60))
            .await
            .unwrap();
        cache
            .set_with_ttl("b", json!(2), Duration::from_secs(60))
            .await
            .unwrap();

        cache.delete("a").await.unwrap();
        assert_eq!(cache.get("a").await.unwrap(), None);

        cache.clear().await.unwrap();
        assert_eq!(cache.get("b").await.unwrap(), None);
    }
}
