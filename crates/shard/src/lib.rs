//! # Shard — position-to-shard routing
//!
//! A [`Strategy`] maps a FEN fingerprint to a shard id in `[0, total_shards)`.
//! The choice of strategy is persisted in the manifest so that readers route
//! lookups exactly the way the build routed records.
//!
//! Two strategies exist:
//!
//! | Name       | Distribution | Locality                                     |
//! |------------|--------------|----------------------------------------------|
//! | `material` | clustered    | consecutive positions of a game share a shard |
//! | `fnv32`    | uniform      | none (baseline for benchmarking)              |
//!
//! Captures are rare relative to moves, so positions from one game usually
//! keep the same material signature. Routing by material therefore lands a
//! game-replay workload on a handful of shards, which is what makes the shard
//! cache effective.

use std::sync::Arc;

mod fnv;
mod material;

pub use fnv::FnvStrategy;
pub use material::MaterialStrategy;

/// A sharding algorithm mapping FEN positions to shard ids.
///
/// Implementations must be deterministic, stateless, and independent of
/// process state: the same `(fen, total_shards)` pair always yields the same
/// id, across processes and across builds.
pub trait Strategy: Send + Sync {
    /// Stable strategy name, persisted in the manifest.
    fn name(&self) -> &'static str;

    /// Computes the shard id for a position, in `[0, total_shards)`.
    ///
    /// Never fails: unparseable input degrades to a hash of the raw string,
    /// so a malformed FEN becomes an ordinary not-found at lookup time.
    fn shard_id(&self, fen: &str, total_shards: u32) -> u32;
}

/// Looks a strategy up by its persisted name.
pub fn strategy_by_name(name: &str) -> Option<Arc<dyn Strategy>> {
    match name {
        "material" => Some(Arc::new(MaterialStrategy)),
        "fnv32" => Some(Arc::new(FnvStrategy)),
        _ => None,
    }
}

/// 32-bit FNV-1a over a byte string.
pub(crate) fn fnv1a32(bytes: &[u8]) -> u32 {
    let mut h: u32 = 0x811C_9DC5;
    for &b in bytes {
        h ^= u32::from(b);
        h = h.wrapping_mul(0x0100_0193);
    }
    h
}
