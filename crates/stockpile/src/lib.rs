//! # Stockpile — fast lookups into pre-computed chess evaluations
//!
//! An embeddable, read-only lookup engine over the Lichess evaluation
//! database: hundreds of millions of positions, sharded into sorted
//! compressed files, answered in sub-millisecond time on a warm cache.
//!
//! ```no_run
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn demo() -> Result<(), stockpile::Error> {
//! let client = stockpile::Client::open_data_root("/path/to/data")?;
//!
//! let cancel = CancellationToken::new();
//! let eval = client
//!     .lookup(&cancel, "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1")
//!     .await?;
//! println!("evaluation: {}", eval.score());
//!
//! client.close().await?;
//! # Ok(())
//! # }
//! ```
//!
//! A lookup normalizes the FEN to its four-field fingerprint, routes it to a
//! shard via the configured strategy, fetches the shard through the store
//! (the cache usually intercepts), and binary-searches the decompressed
//! bytes. Only the matched line is parsed.

mod eval;

pub use eval::{Eval, Pv};

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use search::SearchError;
use store::{Store, StoreError};

/// Errors surfaced by the client.
#[derive(Debug, Error)]
pub enum Error {
    /// The position is not in the database.
    #[error("position not found")]
    NotFound,

    /// The client has been closed.
    #[error("client closed")]
    Closed,

    /// No backing store was configured.
    #[error("no store provided")]
    NoStore,

    /// The operation was cancelled.
    #[error("lookup cancelled")]
    Cancelled,

    /// Invalid configuration (unknown strategy, bad manifest, bad capacity).
    #[error("configuration error: {0}")]
    Config(String),

    /// An underlying read failed.
    #[error("io error: {0}")]
    Io(#[source] std::io::Error),

    /// Shard decompression failed.
    #[error("codec error: {0}")]
    Codec(#[source] std::io::Error),

    /// The matched record is not valid JSON.
    #[error("parsing eval record: {0}")]
    Parse(#[from] serde_json::Error),
}

impl From<StoreError> for Error {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => Error::NotFound,
            StoreError::Cancelled => Error::Cancelled,
            StoreError::Io(e) => Error::Io(e),
            StoreError::Codec(e) => Error::Codec(e),
        }
    }
}

/// Provides access to the evaluation database.
///
/// A `Client` is safe for concurrent use. Lookups are read-only; the only
/// mutable state is the closed flag and the metrics sink, both of which
/// tolerate concurrency.
pub struct Client {
    store: Box<dyn Store>,
    strategy: Arc<dyn shard::Strategy>,
    total_shards: u32,
    stats: Arc<dyn stats::Collector>,
    closed: AtomicBool,
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("total_shards", &self.total_shards)
            .field("closed", &self.closed)
            .finish()
    }
}

impl Client {
    /// Starts configuring a client.
    #[must_use]
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Opens a client over a local data directory, configured entirely from
    /// its `manifest.json` (shard count, strategy, compression codec).
    pub fn open_data_root(dir: impl AsRef<std::path::Path>) -> Result<Self, Error> {
        Self::builder().data_root(dir)?.build()
    }

    /// Returns the evaluation for a FEN position.
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`] when the position is absent (or its shard file
    /// does not exist), [`Error::Closed`] after [`Client::close`],
    /// [`Error::Cancelled`] when the token trips mid-read.
    pub async fn lookup(&self, cancel: &CancellationToken, fen: &str) -> Result<Eval, Error> {
        if self.closed.load(Ordering::Acquire) {
            return Err(Error::Closed);
        }

        self.stats.inc_counter(stats::METRIC_LOOKUPS, 1);

        // The shard files store four-field fingerprints, so the search key is
        // the normalized form; an unnormalizable input searches as-is and
        // becomes an ordinary not-found. The raw input goes to the strategy,
        // which does its own normalization (or deliberately skips it).
        let key = match fen::normalize(fen) {
            Ok(normalized) => normalized,
            Err(_) => fen.to_string(),
        };

        let shard_id = self.strategy.shard_id(fen, self.total_shards);
        self.stats.inc_counter(stats::METRIC_SHARD_FETCHES, 1);

        let data = self.store.read_shard(cancel, shard_id).await?;
        debug!(shard_id, bytes = data.len(), "shard fetched");

        match search::search(&data, &key) {
            Ok(record) => {
                self.stats.inc_counter(stats::METRIC_HITS, 1);
                Ok(Eval::from_record(record))
            }
            Err(SearchError::NotFound) => {
                self.stats.inc_counter(stats::METRIC_MISSES, 1);
                Err(Error::NotFound)
            }
            Err(SearchError::Parse(e)) => Err(Error::Parse(e)),
        }
    }

    /// Releases the client's resources.
    ///
    /// The first call closes the store and returns its result; every later
    /// call returns [`Error::Closed`]. Lookups that entered before the close
    /// may complete; lookups after it observe [`Error::Closed`].
    pub async fn close(&self) -> Result<(), Error> {
        if self
            .closed
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(Error::Closed);
        }

        self.store.close().await.map_err(Error::from)
    }

    /// The sharding strategy in use.
    #[must_use]
    pub fn strategy(&self) -> &dyn shard::Strategy {
        self.strategy.as_ref()
    }

    /// The configured number of shards.
    #[must_use]
    pub fn total_shards(&self) -> u32 {
        self.total_shards
    }
}

/// Configures and constructs a [`Client`].
pub struct ClientBuilder {
    store: Option<Box<dyn Store>>,
    strategy: Arc<dyn shard::Strategy>,
    total_shards: u32,
    stats: Arc<dyn stats::Collector>,
}

impl ClientBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            store: None,
            strategy: Arc::new(shard::MaterialStrategy),
            total_shards: builder::DEFAULT_TOTAL_SHARDS,
            stats: Arc::new(stats::Noop),
        }
    }

    /// Sets the backing store. Required unless [`ClientBuilder::data_root`]
    /// is used.
    #[must_use]
    pub fn store(mut self, store: Box<dyn Store>) -> Self {
        self.store = Some(store);
        self
    }

    /// Sets the sharding strategy. Defaults to material-based sharding.
    #[must_use]
    pub fn strategy(mut self, strategy: Arc<dyn shard::Strategy>) -> Self {
        self.strategy = strategy;
        self
    }

    /// Sets the total shard count. Defaults to 32768 and must match the
    /// manifest of the data being read.
    #[must_use]
    pub fn total_shards(mut self, n: u32) -> Self {
        self.total_shards = n;
        self
    }

    /// Sets the metrics sink. Defaults to a no-op.
    #[must_use]
    pub fn stats(mut self, stats: Arc<dyn stats::Collector>) -> Self {
        self.stats = stats;
        self
    }

    /// Configures store, strategy, and shard count from a data directory's
    /// `manifest.json`.
    ///
    /// # Errors
    ///
    /// [`Error::Config`] when the manifest is unreadable or names an unknown
    /// strategy or compression codec.
    pub fn data_root(mut self, dir: impl AsRef<std::path::Path>) -> Result<Self, Error> {
        let dir = dir.as_ref();
        let manifest = builder::read_manifest(dir).map_err(|e| Error::Config(e.to_string()))?;

        let codec = codec::codec_by_token(&manifest.compression).ok_or_else(|| {
            Error::Config(format!(
                "unknown compression in manifest: {:?}",
                manifest.compression
            ))
        })?;
        let strategy = shard::strategy_by_name(&manifest.strategy).ok_or_else(|| {
            Error::Config(format!("unknown strategy in manifest: {}", manifest.strategy))
        })?;

        let disk = store::DiskStore::new(dir, codec).map_err(Error::from)?;

        self.store = Some(Box::new(disk));
        self.strategy = strategy;
        self.total_shards = manifest.total_shards;
        Ok(self)
    }

    /// Builds the client.
    ///
    /// # Errors
    ///
    /// [`Error::NoStore`] when no backing store was configured.
    pub fn build(self) -> Result<Client, Error> {
        let store = self.store.ok_or(Error::NoStore)?;

        debug!(
            total_shards = self.total_shards,
            strategy = self.strategy.name(),
            "client initialized"
        );

        Ok(Client {
            store,
            strategy: self.strategy,
            total_shards: self.total_shards,
            stats: self.stats,
            closed: AtomicBool::new(false),
        })
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
