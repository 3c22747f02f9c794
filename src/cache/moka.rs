//! Moka-backed cache
//!
//! Backend over `moka::future::Cache` with per-entry TTL supplied through a
//! moka `Expiry` policy; moka drops expired entries before a read can see
//! them.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::{Duration, Instant};

use super::{AtomicCacheStats, CacheBackend, CacheStats};
use crate::utils::error::Result;

struct PerEntryTtl;

impl ::moka::Expiry<String, (serde_json::Value, Duration)> for PerEntryTtl {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &(serde_json::Value, Duration),
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(value.1)
    }
}

/// [`CacheBackend`] over a moka future cache
pub struct MokaCache {
    cache: ::moka::future::Cache<String, (serde_json::Value, Duration)>,
    stats: Arc<AtomicCacheStats>,
}

impl std::fmt::Debug for MokaCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MokaCache")
            .field("entry_count", &self.cache.entry_count())
            .finish()
    }
}

impl MokaCache {
    /// Create a cache holding at most `max_entries` live entries
    pub fn new(max_entries: u64) -> Self {
        Self {
            cache: ::moka::future::Cache::builder()
                .max_capacity(max_entries)
                .expire_after(PerEntryTtl)
                .build(),
            stats: Arc::new(AtomicCacheStats::default()),
        }
    }
}

#[async_trait]
impl CacheBackend for MokaCache {
    async fn get(&self, key: &str) -> Result<Option<serde_json::Value>> {
        match self.cache.get(key).await {
            Some((value, _ttl)) => {
                self.stats.record_hit();
                Ok(Some(value))
            }
            None => {
                self.stats.record_miss();
                Ok(None)
            }
        }
    }

    async fn set_with_ttl(
        &self,
        key: &str,
        value: serde_json::Value,
        ttl: Duration,
    ) -> Result<()> {
        self.cache.insert(key.to_string(), (value, ttl)).await;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.cache.invalidate(key).await;
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        self.cache.invalidate_all();
        Ok(())
    }

    fn stats(&self) -> CacheStats {
        self.stats.snapshot()
    }
}
