//! Build manifest.
//!
//! `manifest.json` sits at the data root and makes the directory
//! self-describing: readers take the shard count, sharding strategy, and
//! compression codec from it instead of guessing. It is written last, only
//! after every shard completed, so a manifest's presence implies a complete
//! build.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Name of the manifest file within the data root.
pub const MANIFEST_FILENAME: &str = "manifest.json";

/// Current manifest format version.
pub const MANIFEST_VERSION: u32 = 1;

/// Metadata describing a built shard tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    pub version: u32,
    pub total_shards: u32,
    pub strategy: String,
    pub record_count: u64,
    /// Non-empty shards actually written.
    pub shard_count: u32,
    pub built_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
    pub compression: String,
}

/// Writes the manifest to `<dir>/manifest.json`.
pub fn write_manifest(dir: &Path, manifest: &Manifest) -> Result<()> {
    let path = dir.join(MANIFEST_FILENAME);
    let data = serde_json::to_vec_pretty(manifest).context("marshaling manifest")?;
    std::fs::write(&path, data)
        .with_context(|| format!("writing manifest at {}", path.display()))?;
    Ok(())
}

/// Reads the manifest from a data root.
pub fn read_manifest(dir: &Path) -> Result<Manifest> {
    let path = dir.join(MANIFEST_FILENAME);
    let data = std::fs::read(&path)
        .with_context(|| format!("reading manifest at {}", path.display()))?;
    serde_json::from_slice(&data).context("parsing manifest")
}
