//! Read-through caching store.

use async_trait::async_trait;
use bytes::Bytes;
use tokio_util::sync::CancellationToken;

use crate::{CacheBackend, CacheStats, Store, StoreError};

/// Wraps another [`Store`] with a cache keyed by shard id.
///
/// A hit is served from the backend without touching the underlying store.
/// A miss delegates, then inserts the result. Errors are propagated verbatim
/// and never cached, so a transient failure does not poison the cache.
///
/// Concurrent misses for the same shard may each dispatch a store read; both
/// results are identical bytes and the second insert overwrites the first.
/// Single-flighting is deliberately not attempted.
pub struct CachedStore {
    inner: Box<dyn Store>,
    backend: Box<dyn CacheBackend>,
}

impl CachedStore {
    /// Wraps `inner` with the given cache backend.
    pub fn new(inner: Box<dyn Store>, backend: Box<dyn CacheBackend>) -> Self {
        Self { inner, backend }
    }

    /// Current cache statistics.
    pub fn stats(&self) -> CacheStats {
        self.backend.stats()
    }
}

#[async_trait]
impl Store for CachedStore {
    async fn read_shard(
        &self,
        cancel: &CancellationToken,
        shard_id: u32,
    ) -> Result<Bytes, StoreError> {
        if let Some(data) = self.backend.get(shard_id) {
            return Ok(data);
        }

        let data = self.inner.read_shard(cancel, shard_id).await?;
        self.backend.set(shard_id, data.clone());
        Ok(data)
    }

    async fn close(&self) -> Result<(), StoreError> {
        self.inner.close().await
    }
}
