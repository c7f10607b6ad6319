//! Stockpile CLI — manage and query the chess evaluation database.
//!
//! Commands:
//! - `build`  — shard a source dump into the on-disk database
//! - `lookup` — look up a single position's evaluation
//! - `stats`  — summarize a built database
//! - `verify` — check shard integrity and ordering

mod build;
mod lookup;
mod stats_cmd;
mod verify;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// Fast lookups for pre-computed chess position evaluations.
#[derive(Parser)]
#[command(name = "stockpile")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Directory containing evaluation data
    #[arg(short = 'd', long, global = true, default_value = "./data")]
    data_dir: PathBuf,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the evaluation database from a source dump
    Build {
        /// Source file (newline-delimited JSON, optionally zstd-compressed)
        #[arg(long)]
        source: PathBuf,

        /// Output directory for shards
        #[arg(short, long, default_value = "./data")]
        output: PathBuf,

        /// Remote output location (bucket URL). Upload is handled by
        /// external tooling; this flag is recorded but not acted on.
        #[arg(long)]
        output_remote: Option<String>,

        /// Number of shards to create
        #[arg(long, default_value_t = builder::DEFAULT_TOTAL_SHARDS)]
        shards: u32,

        /// Sharding strategy: material, fnv32
        #[arg(long, default_value = "material")]
        strategy: String,

        /// Parallel workers for shard compression
        #[arg(long, default_value_t = 4)]
        workers: usize,

        /// Max memory in MB before spilling to disk
        #[arg(long = "max-memory", default_value_t = 1024)]
        max_memory: usize,
    },

    /// Look up the evaluation for a chess position
    Lookup {
        /// Position in FEN notation (at least placement and side to move)
        fen: String,

        /// Output result as JSON
        #[arg(long)]
        json: bool,

        /// Show lookup timing
        #[arg(long)]
        timing: bool,
    },

    /// Show statistics about the evaluation database
    Stats,

    /// Verify the integrity of the evaluation database
    Verify {
        /// Only check the first and last entries in each shard
        #[arg(long)]
        quick: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Build {
            source,
            output,
            output_remote,
            shards,
            strategy,
            workers,
            max_memory,
        } => {
            build::run(build::BuildOptions {
                source,
                output,
                output_remote,
                shards,
                strategy,
                workers,
                max_memory,
            })
            .await
        }
        Commands::Lookup { fen, json, timing } => {
            lookup::run(&cli.data_dir, &fen, json, timing).await
        }
        Commands::Stats => stats_cmd::run(&cli.data_dir),
        Commands::Verify { quick } => verify::run(&cli.data_dir, quick),
    }
}
