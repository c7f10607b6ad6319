//! The `stats` command.

use std::path::Path;

use anyhow::{bail, Context, Result};

use builder::format_bytes;

pub(crate) fn run(data_dir: &Path) -> Result<()> {
    let shards_dir = data_dir.join("shards");
    if !shards_dir.exists() {
        bail!(
            "data directory {} does not exist; run 'stockpile build' first",
            data_dir.display()
        );
    }

    let manifest = builder::read_manifest(data_dir).ok();
    let extension = manifest
        .as_ref()
        .and_then(|m| codec::codec_by_token(&m.compression))
        .map(|c| c.extension())
        .unwrap_or("zst");

    let mut shard_count = 0u64;
    let mut total_size = 0u64;
    for entry in std::fs::read_dir(&shards_dir).context("reading shards directory")? {
        let entry = entry?;
        let path = entry.path();
        if path.is_dir() {
            continue;
        }
        let matches = match path.extension().and_then(|e| e.to_str()) {
            Some(ext) => ext == extension,
            None => extension.is_empty(),
        };
        if !matches {
            continue;
        }
        shard_count += 1;
        total_size += entry.metadata().map(|m| m.len()).unwrap_or(0);
    }

    if shard_count == 0 {
        println!("No shards found in data directory.");
        println!("Run 'stockpile build' to create the database.");
        return Ok(());
    }

    println!("Data directory: {}", data_dir.display());
    println!("Shards:         {shard_count}");
    println!("Total size:     {}", format_bytes(total_size));

    if let Some(m) = manifest {
        println!("Records:        {}", m.record_count);
        println!("Strategy:       {}", m.strategy);
        let compression = if m.compression.is_empty() { "none" } else { m.compression.as_str() };
        println!("Compression:    {compression}");
        println!("Built at:       {}", m.built_at.to_rfc3339());
    }

    Ok(())
}
