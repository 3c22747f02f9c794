//! Cache layer for derived summaries
//!
//! The aggregation paths cache computed summaries to avoid recomputation.
//! The backend is a capability interface selected at construction time: an
//! in-process TTL map or a moka-backed cache. A read after an entry's TTL
//! has elapsed never returns the stale value.

mod memory;
mod moka;

pub use memory::InMemoryCache;
pub use moka::MokaCache;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use crate::utils::error::Result;

/// Key/TTL cache capability
#[async_trait]
pub trait CacheBackend: Send + Sync + std::fmt::Debug {
    /// Value for the key, or `None` if absent or expired
    async fn get(&self, key: &str) -> Result<Option<serde_json::Value>>;

    /// Store a value under the key with a per-entry time-to-live
    async fn set_with_ttl(&self, key: &str, value: serde_json::Value, ttl: Duration)
    -> Result<()>;

    /// Remove the key if present
    async fn delete(&self, key: &str) -> Result<()>;

    /// Drop every entry
    async fn clear(&self) -> Result<()>;

    /// Counter snapshot
    fn stats(&self) -> CacheStats;
}

/// Lock-free hit/miss counters shared by both backends
#[derive(Debug, Default)]
pub(crate) struct AtomicCacheStats {
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
}

impl AtomicCacheStats {
    pub(crate) fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_eviction(&self) {
        self.evictions.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
        }
    }
}

/// Cache statistics snapshot
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    /// Reads that found a live entry
    pub hits: u64,
    /// Reads that found nothing, or an expired entry
    pub misses: u64,
    /// Entries dropped because their TTL elapsed
    pub evictions: u64,
}

impl CacheStats {
    /// Hit rate over all reads, 0.0 when no reads happened
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}
