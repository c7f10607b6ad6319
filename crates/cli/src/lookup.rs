//! The `lookup` command.

use std::path::Path;
use std::time::{Duration, Instant};

use anyhow::{anyhow, bail, Context, Result};
use tokio_util::sync::CancellationToken;

use stockpile::{Client, Error, Eval};
use store::{CachedStore, DiskStore, LruPolicy, MemoryBackend};

/// Shards held in the lookup cache. A single lookup touches one shard, but a
/// warm cache makes repeated invocations against the same material cheap.
const CACHE_SHARDS: usize = 100;

pub(crate) async fn run(data_dir: &Path, fen: &str, json: bool, timing: bool) -> Result<()> {
    if !data_dir.exists() {
        bail!(
            "data directory {} does not exist; run 'stockpile build' first",
            data_dir.display()
        );
    }

    let manifest = builder::read_manifest(data_dir)?;
    let codec = codec::codec_by_token(&manifest.compression)
        .ok_or_else(|| anyhow!("unknown compression in manifest: {:?}", manifest.compression))?;
    let strategy = shard::strategy_by_name(&manifest.strategy)
        .ok_or_else(|| anyhow!("unknown strategy in manifest: {}", manifest.strategy))?;

    let disk = DiskStore::new(data_dir, codec).context("opening data directory")?;
    let cached = CachedStore::new(
        Box::new(disk),
        Box::new(MemoryBackend::new(Box::new(LruPolicy::new(CACHE_SHARDS)?))),
    );

    let client = Client::builder()
        .store(Box::new(cached))
        .strategy(strategy)
        .total_shards(manifest.total_shards)
        .build()?;

    let cancel = CancellationToken::new();
    let start = Instant::now();
    let result = client.lookup(&cancel, fen).await;
    let elapsed = start.elapsed();

    let eval = match result {
        Ok(eval) => eval,
        Err(Error::NotFound) => bail!("position not found in database"),
        Err(e) => return Err(e).context("lookup failed"),
    };

    if json {
        print_eval_json(&eval, elapsed, timing);
    } else {
        print_eval_text(&eval, elapsed, timing);
    }

    client.close().await?;
    Ok(())
}

fn print_eval_text(eval: &Eval, elapsed: Duration, timing: bool) {
    println!("FEN:   {}", eval.fen);
    println!("Score: {}", eval.score());
    println!("Depth: {}", eval.depth);
    for (i, pv) in eval.pvs.iter().enumerate() {
        println!("PV {}:  {} ({})", i + 1, pv.line, pv.score());
    }
    if timing {
        println!("Time:  {elapsed:?}");
    }
}

fn print_eval_json(eval: &Eval, elapsed: Duration, timing: bool) {
    let pvs: Vec<serde_json::Value> = eval
        .pvs
        .iter()
        .map(|pv| {
            let mut obj = serde_json::Map::new();
            if let Some(cp) = pv.centipawns {
                obj.insert("cp".to_string(), cp.into());
            }
            if let Some(mate) = pv.mate {
                obj.insert("mate".to_string(), mate.into());
            }
            obj.insert("line".to_string(), pv.line.clone().into());
            serde_json::Value::Object(obj)
        })
        .collect();

    let mut out = serde_json::json!({
        "fen": eval.fen,
        "score": eval.score(),
        "depth": eval.depth,
        "pvs": pvs,
    });
    if timing {
        out["elapsed_ms"] = (elapsed.as_millis() as u64).into();
    }
    println!("{out}");
}
