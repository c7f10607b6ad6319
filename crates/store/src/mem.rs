//! In-memory store for tests.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use bytes::Bytes;
use tokio_util::sync::CancellationToken;

use crate::{Store, StoreError};

/// Holds shard payloads in a map. Data set through [`MemStore::set_shard`] is
/// returned as-is (already decompressed).
#[derive(Debug, Default)]
pub struct MemStore {
    shards: RwLock<HashMap<u32, Bytes>>,
}

impl MemStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the decompressed payload for a shard.
    pub fn set_shard(&self, shard_id: u32, data: impl Into<Bytes>) {
        self.shards
            .write()
            .expect("memstore lock")
            .insert(shard_id, data.into());
    }
}

#[async_trait]
impl Store for MemStore {
    async fn read_shard(
        &self,
        cancel: &CancellationToken,
        shard_id: u32,
    ) -> Result<Bytes, StoreError> {
        if cancel.is_cancelled() {
            return Err(StoreError::Cancelled);
        }

        self.shards
            .read()
            .expect("memstore lock")
            .get(&shard_id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn close(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
