//! The `build` command.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use tokio_util::sync::CancellationToken;

use builder::{format_duration, Builder, Phase, Progress};

pub(crate) struct BuildOptions {
    pub source: PathBuf,
    pub output: PathBuf,
    pub output_remote: Option<String>,
    pub shards: u32,
    pub strategy: String,
    pub workers: usize,
    pub max_memory: usize,
}

pub(crate) async fn run(opts: BuildOptions) -> Result<()> {
    let strategy = shard::strategy_by_name(&opts.strategy)
        .ok_or_else(|| anyhow!("unknown strategy: {}", opts.strategy))?;

    if let Some(remote) = &opts.output_remote {
        bail!(
            "remote output ({remote}) is not handled by this binary; \
             build locally and sync the data directory with external tooling"
        );
    }

    if !opts.source.exists() {
        bail!("source file {} does not exist", opts.source.display());
    }
    std::fs::create_dir_all(&opts.output).context("creating output directory")?;

    println!("Building stockpile database");
    println!("  Source:     {}", opts.source.display());
    println!("  Output:     {}", opts.output.display());
    println!("  Shards:     {}", opts.shards);
    println!("  Strategy:   {}", strategy.name());
    println!("  Workers:    {}", opts.workers);
    println!("  Max Memory: {} MB", opts.max_memory);
    println!();

    // Ctrl-C trips the token; the pipeline notices in its partition and
    // merge loops and cleans up its temp state.
    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                eprintln!("\nInterrupted, cleaning up...");
                cancel.cancel();
            }
        });
    }

    let pipeline = Builder::new(&opts.output)
        .total_shards(opts.shards)
        .strategy(strategy)
        .workers(opts.workers)
        .max_memory_mb(opts.max_memory)
        .source_url(opts.source.display().to_string())
        .progress(Arc::new(print_progress));

    let source = opts.source.clone();
    let summary =
        tokio::task::spawn_blocking(move || pipeline.build_from_file(&cancel, &source))
            .await
            .context("build task panicked")??;

    println!(
        "Wrote {} records into {} shards in {}",
        summary.records_written,
        summary.shards_created,
        format_duration(summary.elapsed)
    );
    Ok(())
}

fn print_progress(p: &Progress) {
    match p.phase {
        Phase::Sort => print!("\r[Sort] {} records processed", p.records_read),
        Phase::Shard => print!(
            "\r[Shard] {} / {} shards created, {} records",
            p.shards_created, p.shards_total, p.records_written
        ),
        Phase::Done => println!(
            "\n[Done] {} records in {} shards ({})",
            p.records_written,
            p.shards_created,
            format_duration(p.elapsed)
        ),
    }
    std::io::stdout().flush().ok();
}
