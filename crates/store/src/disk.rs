//! Local filesystem store.

use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use tokio_util::sync::CancellationToken;

use crate::{decompress, shard_file_name, Store, StoreError};

/// Reads shards from `<root>/shards/NNNNN.<ext>` on the local filesystem.
pub struct DiskStore {
    root: PathBuf,
    codec: Arc<dyn codec::Codec>,
}

impl std::fmt::Debug for DiskStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiskStore").field("root", &self.root).finish()
    }
}

impl DiskStore {
    /// Creates a disk store rooted at an existing directory.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] if `root` does not exist or is not a
    /// directory.
    pub fn new(root: impl Into<PathBuf>, codec: Arc<dyn codec::Codec>) -> Result<Self, StoreError> {
        let root = root.into();
        let meta = std::fs::metadata(&root)?;
        if !meta.is_dir() {
            return Err(StoreError::Io(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{} is not a directory", root.display()),
            )));
        }
        Ok(Self { root, codec })
    }

    fn shard_path(&self, shard_id: u32) -> PathBuf {
        self.root
            .join("shards")
            .join(shard_file_name(shard_id, self.codec.extension()))
    }
}

#[async_trait]
impl Store for DiskStore {
    async fn read_shard(
        &self,
        cancel: &CancellationToken,
        shard_id: u32,
    ) -> Result<Bytes, StoreError> {
        if cancel.is_cancelled() {
            return Err(StoreError::Cancelled);
        }

        let compressed = match tokio::fs::read(self.shard_path(shard_id)).await {
            Ok(data) => data,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Err(StoreError::NotFound),
            Err(e) => return Err(StoreError::Io(e)),
        };

        if cancel.is_cancelled() {
            return Err(StoreError::Cancelled);
        }

        decompress(self.codec.as_ref(), &compressed)
    }

    async fn close(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
