//! Amazon S3 store.

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use object_store::aws::{AmazonS3, AmazonS3Builder};
use object_store::{path::Path as ObjectPath, ObjectStore};
use tokio_util::sync::CancellationToken;

use crate::{
    decompress, map_object_error, normalize_prefix, shard_file_name, Store, StoreError,
};

/// Reads shards from an S3 bucket at `<prefix>shards/NNNNN.<ext>`.
///
/// Credentials and default region come from the environment (the standard
/// `AWS_*` variables); [`S3StoreBuilder::region`] and
/// [`S3StoreBuilder::endpoint`] override them, the latter for S3-compatible
/// services like MinIO.
pub struct S3Store {
    remote: AmazonS3,
    prefix: String,
    codec: Arc<dyn codec::Codec>,
}

impl S3Store {
    /// Starts building a store for `bucket`. The bucket must already exist.
    pub fn builder(bucket: impl Into<String>, codec: Arc<dyn codec::Codec>) -> S3StoreBuilder {
        S3StoreBuilder {
            bucket: bucket.into(),
            prefix: String::new(),
            region: None,
            endpoint: None,
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

/// Configures an [`S3Store`].
pub struct S3StoreBuilder {
    bucket: String,
    prefix: String,
    region: Option<String>,
    endpoint: Option<String>,
    codec: Arc<dyn codec::Codec>,
}

impl S3StoreBuilder {
    /// Key prefix for all operations, normalized to end in `/`.
    #[must_use]
    pub fn prefix(mut self, prefix: &str) -> Self {
        self.prefix = normalize_prefix(prefix);
        self
    }

    /// Overrides the AWS region.
    #[must_use]
    pub fn region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    /// Custom endpoint for S3-compatible services.
    #[must_use]
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Builds the store.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] when the S3 client cannot be constructed
    /// (e.g. missing credentials).
    pub fn build(self) -> Result<S3Store, StoreError> {
        let mut builder = AmazonS3Builder::from_env().with_bucket_name(&self.bucket);
        if let Some(region) = self.region {
            builder = builder.with_region(region);
        }
        if let Some(endpoint) = self.endpoint {
            builder = builder.with_endpoint(endpoint).with_allow_http(true);
        }
        let remote = builder.build().map_err(map_object_error)?;

        Ok(S3Store {
            remote,
            prefix: self.prefix,
            codec: self.codec,
        })
    }
}

#[async_trait]
impl Store for S3Store {
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
