//! Cache eviction policies.

use std::num::NonZeroUsize;

use bytes::Bytes;
use thiserror::Error;

/// The cache capacity must be a positive entry count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("cache capacity must be positive")]
pub struct InvalidCapacity;

/// Decides which cached shard to evict when room is needed.
///
/// The policy owns the stored values; the surrounding backend serializes
/// access, so methods take `&mut self`.
pub trait EvictionPolicy: Send {
    /// Returns the cached value, marking it as used.
    fn get(&mut self, shard_id: u32) -> Option<Bytes>;

    /// Inserts a value, evicting if at capacity. Returns `true` when an
    /// existing entry was evicted to make room.
    fn add(&mut self, shard_id: u32, data: Bytes) -> bool;

    /// Number of entries currently held.
    fn len(&self) -> usize;

    /// Whether the policy holds no entries.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Least-recently-used eviction with a fixed entry capacity.
#[derive(Debug)]
pub struct LruPolicy {
    entries: lru::LruCache<u32, Bytes>,
}

impl LruPolicy {
    /// Creates a policy holding at most `capacity` shards.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidCapacity`] when `capacity` is zero.
    pub fn new(capacity: usize) -> Result<Self, InvalidCapacity> {
        let capacity = NonZeroUsize::new(capacity).ok_or(InvalidCapacity)?;
        Ok(Self {
            entries: lru::LruCache::new(capacity),
        })
    }
}

impl EvictionPolicy for LruPolicy {
    fn get(&mut self, shard_id: u32) -> Option<Bytes> {
        self.entries.get(&shard_id).cloned()
    }

    fn add(&mut self, shard_id: u32, data: Bytes) -> bool {
        match self.entries.push(shard_id, data) {
            // push returns the displaced pair; the same key coming back means
            // an overwrite, not an eviction.
            Some((evicted, _)) => evicted != shard_id,
            None => false,
        }
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}
