mod backend_tests;

use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use tokio_util::sync::CancellationToken;

use crate::{Store, StoreError};

/// Helper: write a compressed shard file under `<root>/shards/`.
pub(crate) fn write_shard_file(root: &Path, shard_id: u32, codec: &dyn codec::Codec, data: &[u8]) {
    let shards = root.join("shards");
    std::fs::create_dir_all(&shards).unwrap();
    let path = shards.join(crate::shard_file_name(shard_id, codec.extension()));
    let file = std::fs::File::create(path).unwrap();
    let mut w = codec.writer(Box::new(file)).unwrap();
    w.write_all(data).unwrap();
    w.finish().unwrap();
}

/// A store that fails every read. Used to prove the cache serves hits without
/// touching the underlying store.
pub(crate) struct FailStore;

#[async_trait]
impl Store for FailStore {
    async fn read_shard(
        &self,
        _cancel: &CancellationToken,
        _shard_id: u32,
    ) -> Result<Bytes, StoreError> {
        Err(StoreError::Io(std::io::Error::other("store unplugged")))
    }

    async fn close(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

/// A store that serves from memory until [`SwitchStore::unplug`] flips it
/// into failing every read.
pub(crate) struct SwitchStore {
    inner: crate::MemStore,
    unplugged: std::sync::atomic::AtomicBool,
}

impl SwitchStore {
    pub(crate) fn new() -> Self {
        Self {
            inner: crate::MemStore::new(),
            unplugged: std::sync::atomic::AtomicBool::new(false),
        }
    }

    pub(crate) fn set_shard(&self, shard_id: u32, data: impl Into<Bytes>) {
        self.inner.set_shard(shard_id, data);
    }

    pub(crate) fn unplug(&self) {
        self.unplugged
            .store(true, std::sync::atomic::Ordering::SeqCst);
    }
}

#[async_trait]
impl Store for SwitchStore {
    async fn read_shard(
        &self,
        cancel: &CancellationToken,
        shard_id: u32,
    ) -> Result<Bytes, StoreError> {
        if self.unplugged.load(std::sync::atomic::Ordering::SeqCst) {
            return Err(StoreError::Io(std::io::Error::other("store unplugged")));
        }
        self.inner.read_shard(cancel, shard_id).await
    }

    async fn close(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

/// Helper: a zstd codec shared by the disk tests.
pub(crate) fn zstd() -> Arc<dyn codec::Codec> {
    Arc::new(codec::ZstdCodec::new())
}
