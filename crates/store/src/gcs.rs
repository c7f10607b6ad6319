//! Google Cloud Storage store.

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use object_store::gcp::{GoogleCloudStorage, GoogleCloudStorageBuilder};
use object_store::{path::Path as ObjectPath, ObjectStore};
use tokio_util::sync::CancellationToken;

use crate::{
    decompress, map_object_error, normalize_prefix, shard_file_name, Store, StoreError,
};

/// Reads shards from a GCS bucket at `<prefix>shards/NNNNN.<ext>`.
///
/// Credentials come from the environment (application default credentials or
/// `GOOGLE_SERVICE_ACCOUNT`).
pub struct GcsStore {
    remote: GoogleCloudStorage,
    prefix: String,
    codec: Arc<dyn codec::Codec>,
}

impl GcsStore {
    /// Starts building a store for `bucket`. The bucket must already exist.
    pub fn builder(bucket: impl Into<String>, codec: Arc<dyn codec::Codec>) -> GcsStoreBuilder {
        GcsStoreBuilder {
            bucket: bucket.into(),
            prefix: String::new(),
            codec,
        }
    }

    fn shard_key(&self, shard_id: u32) -> ObjectPath {
        ObjectPath::from(format!(
            "{}shards/{}",
            self.prefix,
            shard_file_name(shard_id, self.codec.extension())
        ))
    }
}

/// Configures a [`GcsStore`].
pub struct GcsStoreBuilder {
    bucket: String,
    prefix: String,
    codec: Arc<dyn codec::Codec>,
}

impl GcsStoreBuilder {
    /// Key prefix for all operations, normalized to end in `/`.
    #[must_use]
    pub fn prefix(mut self, prefix: &str) -> Self {
        self.prefix = normalize_prefix(prefix);
        self
    }

    /// Builds the store.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] when the GCS client cannot be constructed.
    pub fn build(self) -> Result<GcsStore, StoreError> {
        let remote = GoogleCloudStorageBuilder::from_env()
            .with_bucket_name(&self.bucket)
            .build()
            .map_err(map_object_error)?;

        Ok(GcsStore {
            remote,
            prefix: self.prefix,
            codec: self.codec,
        })
    }
}

#[async_trait]
impl Store for GcsStore {
    async fn read_shard(
        &self,
        cancel: &CancellationToken,
        shard_id: u32,
    ) -> Result<Bytes, StoreError> {
        if cancel.is_cancelled() {
            return Err(StoreError::Cancelled);
        }

        let result = self
            .remote
            .get(&self.shard_key(shard_id))
            .await
            .map_err(map_object_error)?;

        if cancel.is_cancelled() {
            return Err(StoreError::Cancelled);
        }

        let compressed = result.bytes().await.map_err(map_object_error)?;

        if cancel.is_cancelled() {
            return Err(StoreError::Cancelled);
        }

        decompress(self.codec.as_ref(), &compressed)
    }

    async fn close(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
