//! Cache backends.
//!
//! A backend is the *mechanism* of the cache (where bytes live, how access is
//! serialized, what gets counted); the [`EvictionPolicy`](crate::EvictionPolicy)
//! inside it is the *policy* (what to throw away). The split keeps either side
//! swappable without touching the other.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex};

use bytes::Bytes;

use crate::policy::EvictionPolicy;

/// Storage behind a [`CachedStore`](crate::CachedStore).
pub trait CacheBackend: Send + Sync {
    /// Returns the cached shard, if present.
    fn get(&self, shard_id: u32) -> Option<Bytes>;

    /// Stores a shard, possibly evicting another.
    fn set(&self, shard_id: u32, data: Bytes);

    /// Current hit/miss counters and entry count.
    fn stats(&self) -> CacheStats;
}

/// Point-in-time cache statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: i64,
    pub misses: i64,
    /// Current number of entries.
    pub size: usize,
}

impl CacheStats {
    /// Hit rate as a percentage; 0 when nothing has been looked up.
    #[must_use]
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            return 0.0;
        }
        self.hits as f64 / total as f64 * 100.0
    }
}

/// Thread-safe in-memory backend with a pluggable eviction policy.
///
/// `get`/`set` serialize on the policy mutex; counters are atomics so
/// [`CacheBackend::stats`] never blocks behind a reader.
pub struct MemoryBackend {
    policy: Mutex<Box<dyn EvictionPolicy>>,
    collector: Arc<dyn stats::Collector>,
    hits: AtomicI64,
    misses: AtomicI64,
}

impl MemoryBackend {
    /// Backend with the given policy and no metrics.
    pub fn new(policy: Box<dyn EvictionPolicy>) -> Self {
        Self::with_collector(policy, Arc::new(stats::Noop))
    }

    /// Backend publishing cache metrics to `collector`.
    pub fn with_collector(
        policy: Box<dyn EvictionPolicy>,
        collector: Arc<dyn stats::Collector>,
    ) -> Self {
        Self {
            policy: Mutex::new(policy),
            collector,
            hits: AtomicI64::new(0),
            misses: AtomicI64::new(0),
        }
    }
}

impl CacheBackend for MemoryBackend {
    fn get(&self, shard_id: u32) -> Option<Bytes> {
        let found = self.policy.lock().expect("cache lock").get(shard_id);
        match found {
            Some(data) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                self.collector.inc_counter(stats::METRIC_CACHE_HITS, 1);
                Some(data)
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                self.collector.inc_counter(stats::METRIC_CACHE_MISSES, 1);
                None
            }
        }
    }

    fn set(&self, shard_id: u32, data: Bytes) {
        let len = {
            let mut policy = self.policy.lock().expect("cache lock");
            policy.add(shard_id, data);
            policy.len()
        };
        self.collector.set_gauge(stats::METRIC_CACHE_SIZE, len as i64);
    }

    fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            size: self.policy.lock().expect("cache lock").len(),
        }
    }
}
