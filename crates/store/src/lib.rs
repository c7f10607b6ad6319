//! # Store — shard storage backends
//!
//! A [`Store`] performs one job: hand back the *decompressed* bytes of a
//! shard, addressed by its integer id. Everything else — path layout,
//! transport, decompression — is internal to the implementation.
//!
//! ```text
//! Client
//!   |
//!   v
//! ┌──────────────────────────────────────────────┐
//! │ CachedStore            (optional, read-through)│
//! │   backend: MemoryBackend ── policy: LruPolicy │
//! └──────────────┬───────────────────────────────┘
//!                │ miss
//!                v
//! ┌──────────────────────────────────────────────┐
//! │ DiskStore | S3Store | GcsStore | MemStore     │
//! │   read shards/NNNNN.<ext> ── codec reader     │
//! └──────────────────────────────────────────────┘
//! ```
//!
//! Every read accepts a [`CancellationToken`] checked before I/O starts and
//! between I/O steps. Stores never retry — retry policy belongs to callers.

use std::io::Read;

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

mod backend;
mod cached;
mod disk;
mod gcs;
mod mem;
mod policy;
mod s3;

pub use backend::{CacheBackend, CacheStats, MemoryBackend};
pub use cached::CachedStore;
pub use disk::DiskStore;
pub use gcs::{GcsStore, GcsStoreBuilder};
pub use mem::MemStore;
pub use policy::{EvictionPolicy, InvalidCapacity, LruPolicy};
pub use s3::{S3Store, S3StoreBuilder};

/// Errors raised by storage backends.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The shard does not exist in the store.
    #[error("shard not found")]
    NotFound,

    /// The cancellation token tripped before or during the read.
    #[error("read cancelled")]
    Cancelled,

    /// The underlying read or transport failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The shard bytes could not be decompressed.
    #[error("codec error: {0}")]
    Codec(std::io::Error),
}

/// A storage backend for reading shard files.
#[async_trait]
pub trait Store: Send + Sync {
    /// Reads and decompresses the content of a shard.
    async fn read_shard(
        &self,
        cancel: &CancellationToken,
        shard_id: u32,
    ) -> Result<Bytes, StoreError>;

    /// Releases any resources held by the store.
    async fn close(&self) -> Result<(), StoreError>;
}

#[async_trait]
impl<S: Store + ?Sized> Store for std::sync::Arc<S> {
    async fn read_shard(
        &self,
        cancel: &CancellationToken,
        shard_id: u32,
    ) -> Result<Bytes, StoreError> {
        (**self).read_shard(cancel, shard_id).await
    }

    async fn close(&self) -> Result<(), StoreError> {
        (**self).close().await
    }
}

/// Filename of a shard: five-digit zero-padded id plus the codec extension.
pub fn shard_file_name(shard_id: u32, extension: &str) -> String {
    if extension.is_empty() {
        format!("{shard_id:05}")
    } else {
        format!("{shard_id:05}.{extension}")
    }
}

/// Runs compressed shard bytes through the codec's reader.
pub(crate) fn decompress(
    codec: &dyn codec::Codec,
    compressed: &[u8],
) -> Result<Bytes, StoreError> {
    let mut reader = codec.reader(Box::new(compressed)).map_err(StoreError::Codec)?;
    let mut out = Vec::new();
    reader.read_to_end(&mut out).map_err(StoreError::Codec)?;
    Ok(Bytes::from(out))
}

/// Maps an `object_store` error onto ours.
pub(crate) fn map_object_error(err: object_store::Error) -> StoreError {
    match err {
        object_store::Error::NotFound { .. } => StoreError::NotFound,
        other => StoreError::Io(std::io::Error::other(other)),
    }
}

/// Normalizes a key prefix to end in exactly one `/` when non-empty.
pub(crate) fn normalize_prefix(prefix: &str) -> String {
    let trimmed = prefix.trim_end_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("{trimmed}/")
    }
}

#[cfg(test)]
mod tests;
