//! The `verify` command.

use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use tracing::debug;

pub(crate) fn run(data_dir: &Path, quick: bool) -> Result<()> {
    let shards_dir = data_dir.join("shards");
    if !shards_dir.exists() {
        bail!("data directory {} does not exist", data_dir.display());
    }

    let codec: Arc<dyn codec::Codec> = builder::read_manifest(data_dir)
        .ok()
        .and_then(|m| codec::codec_by_token(&m.compression))
        .unwrap_or_else(|| Arc::new(codec::ZstdCodec::new()));

    let mut files: Vec<_> = std::fs::read_dir(&shards_dir)
        .context("reading shards directory")?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| !p.is_dir())
        .collect();
    files.sort();

    if files.is_empty() {
        println!("No shards found in data directory.");
        return Ok(());
    }

    println!("Verifying {} shards...", files.len());

    let mut err_count = 0;
    for (i, path) in files.iter().enumerate() {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        debug!(shard = %name, "verifying {}/{}", i + 1, files.len());

        if let Err(e) = verify_shard(path, codec.as_ref(), quick) {
            eprintln!("  ERROR: {name}: {e:#}");
            err_count += 1;
        }
    }

    if err_count > 0 {
        bail!("{err_count} shards failed verification");
    }
    println!("All shards verified successfully.");
    Ok(())
}

/// Decompresses one shard and checks its structure: every line is a valid
/// record, fingerprints are strictly ascending, and each record's `fen`
/// field matches the fingerprint the read path would extract.
fn verify_shard(path: &Path, codec: &dyn codec::Codec, quick: bool) -> Result<()> {
    let compressed = std::fs::read(path).context("reading shard")?;
    let mut reader = codec
        .reader(Box::new(&compressed[..]))
        .context("creating decompressor")?;
    let mut data = Vec::new();
    reader.read_to_end(&mut data).context("decompressing")?;

    let lines: Vec<&[u8]> = data
        .split(|&b| b == b'\n')
        .filter(|l| !l.is_empty())
        .collect();
    if lines.is_empty() {
        bail!("empty shard");
    }

    if quick {
        check_line(lines[0]).context("first entry")?;
        if lines.len() > 1 {
            check_line(lines[lines.len() - 1]).context("last entry")?;
            let first = search::extract_fen(lines[0]);
            let last = search::extract_fen(lines[lines.len() - 1]);
            if first >= last {
                bail!("entries out of order: {first:?} >= {last:?}");
            }
        }
        return Ok(());
    }

    let mut prev: Option<String> = None;
    for (n, line) in lines.iter().enumerate() {
        let record = check_line(line).with_context(|| format!("line {}", n + 1))?;
        let fp = search::extract_fen(line);
        if record.fen != fp {
            bail!("line {}: fen field {:?} does not match fingerprint {:?}", n + 1, record.fen, fp);
        }
        if let Some(prev) = &prev {
            if prev.as_str() >= fp {
                bail!("line {}: not strictly ascending ({prev:?} >= {fp:?})", n + 1);
            }
        }
        prev = Some(fp.to_string());
    }

    Ok(())
}

fn check_line(line: &[u8]) -> Result<search::EvalRecord> {
    serde_json::from_slice(line).context("invalid record")
}
