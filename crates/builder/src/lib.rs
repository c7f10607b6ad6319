//! # Builder — the shard build pipeline
//!
//! Transforms a stream of newline-delimited JSON evaluation records into the
//! on-disk layout the read path consumes: `shards/NNNNN.<ext>` files sorted
//! ascending by fingerprint, plus a `manifest.json` describing the build.
//!
//! ```text
//! source (jsonl, optionally compressed)
//!   |
//!   v  partition: extract fen → strategy.shard_id
//! ┌───────────────────────────────────────────────┐
//! │ collectors[0..N]      MemoryAccountant        │
//! │   in-memory batches ──── over budget? ───┐    │
//! │                                          v    │
//! │                      spill largest → run file │
//! └──────────────────┬────────────────────────────┘
//!                    │  (per non-empty collector, bounded worker pool)
//!                    v
//!            k-way merge (min-heap)
//!                    │  bounded channel
//!                    v
//!            codec writer → shards/NNNNN.zst
//!                    |
//!                    v
//!             manifest.json (written last)
//! ```
//!
//! The build is destructive on the output root: `shards/` is removed and
//! recreated, and the manifest is only written after every shard completed,
//! so a present manifest always describes a complete tree. The temp
//! directory holding spill runs is removed on the way out, cancelled or not.

mod collector;
mod manifest;
mod merge;
mod progress;
mod run;

pub use collector::{MemoryAccountant, ShardCollector};
pub use manifest::{read_manifest, write_manifest, Manifest, MANIFEST_FILENAME, MANIFEST_VERSION};
pub use merge::SortedStream;
pub use progress::{format_bytes, format_duration, log_progress, Phase, Progress, ProgressFn};

use std::collections::VecDeque;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc, Mutex};
use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// Default number of shards to create.
pub const DEFAULT_TOTAL_SHARDS: u32 = 32768;

/// The public evaluation database this engine was built for. Recorded in the
/// manifest as the informational `source_url` unless overridden.
pub const DEFAULT_SOURCE_URL: &str = "https://database.lichess.org/lichess_db_eval.jsonl.zst";

/// Partition progress is reported every this many records.
const PROGRESS_INTERVAL: u64 = 100_000;

/// Records buffered between the merge heap and the codec writer, letting the
/// compressor overlap with the merge.
const MERGE_CHANNEL_DEPTH: usize = 100;

/// The cancellation token tripped during the build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("build cancelled")]
pub struct BuildCancelled;

/// What a completed build produced.
#[derive(Debug, Clone, Copy)]
pub struct BuildSummary {
    pub records_read: u64,
    pub records_written: u64,
    /// Non-empty shards written.
    pub shards_created: u32,
    pub elapsed: Duration,
}

/// Builds the shard database from source data.
pub struct Builder {
    output_dir: PathBuf,
    total_shards: u32,
    strategy: Arc<dyn shard::Strategy>,
    codec: Arc<dyn codec::Codec>,
    workers: usize,
    max_memory_mb: usize,
    temp_dir: Option<PathBuf>,
    source_url: Option<String>,
    progress: ProgressFn,
}

impl Builder {
    /// Builder with defaults: 32768 shards, material strategy, zstd at
    /// maximum compression, 4 writeout workers, a 1 GiB memory budget.
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            total_shards: DEFAULT_TOTAL_SHARDS,
            strategy: Arc::new(shard::MaterialStrategy),
            codec: Arc::new(codec::ZstdCodec::best()),
            workers: 4,
            max_memory_mb: 1024,
            temp_dir: None,
            source_url: None,
            progress: Arc::new(|p: &Progress| log_progress(p)),
        }
    }

    /// Sets the number of shards.
    #[must_use]
    pub fn total_shards(mut self, n: u32) -> Self {
        self.total_shards = n;
        self
    }

    /// Sets the sharding strategy.
    #[must_use]
    pub fn strategy(mut self, strategy: Arc<dyn shard::Strategy>) -> Self {
        self.strategy = strategy;
        self
    }

    /// Sets the shard compression codec.
    #[must_use]
    pub fn codec(mut self, codec: Arc<dyn codec::Codec>) -> Self {
        self.codec = codec;
        self
    }

    /// Sets the number of parallel shard-writeout workers.
    #[must_use]
    pub fn workers(mut self, n: usize) -> Self {
        self.workers = n.max(1);
        self
    }

    /// Sets the memory budget, in MiB, before collectors spill to disk.
    #[must_use]
    pub fn max_memory_mb(mut self, mb: usize) -> Self {
        self.max_memory_mb = mb;
        self
    }

    /// Overrides the working directory for spill run files.
    #[must_use]
    pub fn temp_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.temp_dir = Some(dir.into());
        self
    }

    /// Records where the source data came from in the manifest.
    #[must_use]
    pub fn source_url(mut self, url: impl Into<String>) -> Self {
        self.source_url = Some(url.into());
        self
    }

    /// Sets the progress callback.
    #[must_use]
    pub fn progress(mut self, progress: ProgressFn) -> Self {
        self.progress = progress;
        self
    }

    /// Builds the database from a local source file.
    ///
    /// When the filename carries the codec's extension the source is run
    /// through the decompressor; otherwise it is read raw.
    pub fn build_from_file(
        &self,
        cancel: &CancellationToken,
        source: &Path,
    ) -> Result<BuildSummary> {
        let file = File::open(source)
            .with_context(|| format!("opening source file {}", source.display()))?;

        let ext = source.extension().and_then(|e| e.to_str());
        let codec_ext = self.codec.extension();
        let reader: Box<dyn Read> = if !codec_ext.is_empty() && ext == Some(codec_ext) {
            self.codec
                .reader(Box::new(file))
                .context("creating source decompressor")?
        } else {
            Box::new(file)
        };

        self.build_from_reader(cancel, BufReader::new(reader))
    }

    /// Builds the database from an already-decompressed record stream.
    pub fn build_from_reader(
        &self,
        cancel: &CancellationToken,
        reader: impl BufRead,
    ) -> Result<BuildSummary> {
        let start = Instant::now();

        // Destructive prepare: the shard tree is rebuilt wholesale.
        let shards_dir = self.output_dir.join("shards");
        if shards_dir.exists() {
            std::fs::remove_dir_all(&shards_dir).context("cleaning shards directory")?;
        }
        std::fs::create_dir_all(&shards_dir).context("creating shards directory")?;

        let temp_dir = self
            .temp_dir
            .clone()
            .unwrap_or_else(|| self.output_dir.join(".tmp"));
        std::fs::create_dir_all(&temp_dir).context("creating temp directory")?;
        let _temp_guard = TempDirGuard(temp_dir.clone());

        self.process_records(cancel, reader, &shards_dir, &temp_dir, start)
    }

    /// Partitions records into collectors, then writes shards and manifest.
    fn process_records(
        &self,
        cancel: &CancellationToken,
        mut reader: impl BufRead,
        shards_dir: &Path,
        temp_dir: &Path,
        start: Instant,
    ) -> Result<BuildSummary> {
        let accountant = Arc::new(MemoryAccountant::new(self.max_memory_mb));
        let mut collectors: Vec<ShardCollector> = (0..self.total_shards)
            .map(|id| ShardCollector::new(id, temp_dir.to_path_buf(), Arc::clone(&accountant)))
            .collect();

        self.report(Phase::Sort, 0, 0, 0, start);

        let mut line = Vec::with_capacity(1024);
        let mut records_read: u64 = 0;
        loop {
            if cancel.is_cancelled() {
                return Err(BuildCancelled.into());
            }

            line.clear();
            let n = reader.read_until(b'\n', &mut line).context("reading source")?;
            if n == 0 {
                break;
            }
            while line.last().is_some_and(|&b| b == b'\n' || b == b'\r') {
                line.pop();
            }
            if line.is_empty() {
                continue;
            }

            // Records without a fen field cannot be routed; skip them the
            // same way lookups would never find them.
            let fp = search::extract_fen(&line);
            if fp.is_empty() {
                continue;
            }
            let shard_id = self.strategy.shard_id(fp, self.total_shards);

            // Stored fingerprints must be in canonical four-field form so the
            // read path's normalized search key matches byte-for-byte.
            match canonicalize_record(&line, fp) {
                Some(canonical) => collectors[shard_id as usize].add(&canonical),
                None => collectors[shard_id as usize].add(&line),
            }
            if accountant.over_budget() {
                spill_until_under_budget(&mut collectors, &accountant)?;
            }

            records_read += 1;
            if records_read % PROGRESS_INTERVAL == 0 {
                self.report(Phase::Sort, records_read, 0, 0, start);
            }
        }

        self.report(Phase::Shard, records_read, 0, 0, start);
        let (records_written, shards_created) =
            self.write_shards(cancel, shards_dir, collectors, records_read, start)?;
        self.report(Phase::Done, records_read, records_written, shards_created, start);

        write_manifest(
            &self.output_dir,
            &Manifest {
                version: MANIFEST_VERSION,
                total_shards: self.total_shards,
                strategy: self.strategy.name().to_string(),
                record_count: records_written,
                shard_count: shards_created,
                built_at: chrono::Utc::now(),
                source_url: self.source_url.clone(),
                compression: self.codec.token().to_string(),
            },
        )
        .context("writing manifest")?;

        Ok(BuildSummary {
            records_read,
            records_written,
            shards_created,
            elapsed: start.elapsed(),
        })
    }

    /// Writes every non-empty collector to its shard file using a bounded
    /// pool of worker threads. The first error stops new work; workers finish
    /// the shard they are on and the run is reported failed.
    fn write_shards(
        &self,
        cancel: &CancellationToken,
        shards_dir: &Path,
        collectors: Vec<ShardCollector>,
        records_read: u64,
        start: Instant,
    ) -> Result<(u64, u32)> {
        let pending: VecDeque<ShardCollector> =
            collectors.into_iter().filter(|c| c.count() > 0).collect();

        let queue = Mutex::new(pending);
        let abort = AtomicBool::new(false);
        let (tx, rx) = mpsc::channel::<Result<u64>>();

        let mut records_written = 0u64;
        let mut shards_created = 0u32;
        let mut first_err: Option<anyhow::Error> = None;

        std::thread::scope(|s| {
            let queue = &queue;
            let abort = &abort;
            for _ in 0..self.workers {
                let tx = tx.clone();
                s.spawn(move || loop {
                    if abort.load(Ordering::SeqCst) {
                        break;
                    }
                    let Some(collector) = queue.lock().expect("work queue lock").pop_front()
                    else {
                        break;
                    };
                    let result = self.write_shard(cancel, shards_dir, collector);
                    if tx.send(result).is_err() {
                        break;
                    }
                });
            }
            drop(tx);

            for result in rx {
                match result {
                    Ok(count) => {
                        records_written += count;
                        shards_created += 1;
                        if first_err.is_none() {
                            self.report(
                                Phase::Shard,
                                records_read,
                                records_written,
                                shards_created,
                                start,
                            );
                        }
                    }
                    Err(e) => {
                        abort.store(true, Ordering::SeqCst);
                        if first_err.is_none() {
                            first_err = Some(e);
                        }
                    }
                }
            }
        });

        match first_err {
            Some(e) => Err(e),
            None => Ok((records_written, shards_created)),
        }
    }

    /// Streams one collector's records, merged in fingerprint order, through
    /// the codec writer into the shard file.
    fn write_shard(
        &self,
        cancel: &CancellationToken,
        shards_dir: &Path,
        collector: ShardCollector,
    ) -> Result<u64> {
        let shard_id = collector.shard_id();
        let mut file_name = format!("{shard_id:05}");
        if !self.codec.extension().is_empty() {
            file_name.push('.');
            file_name.push_str(self.codec.extension());
        }
        let path = shards_dir.join(file_name);

        let file = File::create(&path)
            .with_context(|| format!("creating shard file {}", path.display()))?;
        let mut writer = self
            .codec
            .writer(Box::new(BufWriter::new(file)))
            .context("creating shard compressor")?;

        // The merge runs on its own thread behind a bounded channel so the
        // compressor overlaps with heap work.
        let (tx, rx) = mpsc::sync_channel::<Vec<u8>>(MERGE_CHANNEL_DEPTH);
        let count = std::thread::scope(|s| -> Result<u64> {
            let merge = s.spawn(move || -> Result<()> {
                let mut stream = SortedStream::new(collector)?;
                while let Some(record) = stream.next_record()? {
                    if cancel.is_cancelled() {
                        return Err(BuildCancelled.into());
                    }
                    if tx.send(record).is_err() {
                        break; // writer side gave up
                    }
                }
                Ok(())
            });

            let mut count = 0u64;
            for record in rx {
                writer
                    .write_all(&record)
                    .with_context(|| format!("writing shard {shard_id}"))?;
                writer.write_all(b"\n")?;
                count += 1;
            }

            match merge.join() {
                Ok(result) => result?,
                Err(_) => bail!("merge thread panicked"),
            }
            Ok(count)
        })?;

        writer.finish().context("finalizing shard file")?;
        Ok(count)
    }

    fn report(
        &self,
        phase: Phase,
        records_read: u64,
        records_written: u64,
        shards_created: u32,
        start: Instant,
    ) {
        (self.progress)(&Progress {
            phase,
            records_read,
            records_written,
            shards_created,
            shards_total: self.total_shards,
            elapsed: start.elapsed(),
        });
    }
}

/// Rewrites a record's fen field to its normalized four-field fingerprint.
///
/// Returns `None` when the field is already canonical or cannot be
/// normalized (such records are stored verbatim and found by their raw key).
fn canonicalize_record(line: &[u8], fp: &str) -> Option<Vec<u8>> {
    let normalized = fen::normalize(fp).ok()?;
    if normalized == fp {
        return None;
    }

    const MARKER: &[u8] = b"\"fen\":\"";
    let pos = line.windows(MARKER.len()).position(|w| w == MARKER)?;
    let start = pos + MARKER.len();
    let end = start + line[start..].iter().position(|&b| b == b'"')?;

    let mut out = Vec::with_capacity(line.len());
    out.extend_from_slice(&line[..start]);
    out.extend_from_slice(normalized.as_bytes());
    out.extend_from_slice(&line[end..]);
    Some(out)
}

/// Spills the collector with the largest in-memory footprint, repeatedly,
/// until the accountant is back under budget or nothing is left to spill.
fn spill_until_under_budget(
    collectors: &mut [ShardCollector],
    accountant: &MemoryAccountant,
) -> Result<()> {
    while accountant.over_budget() {
        let largest = collectors
            .iter_mut()
            .filter(|c| c.in_memory_bytes() > 0)
            .max_by_key(|c| c.in_memory_bytes());
        match largest {
            Some(collector) => collector.spill()?,
            None => break,
        }
    }
    Ok(())
}

/// Removes the spill directory when the build ends, successfully or not.
struct TempDirGuard(PathBuf);

impl Drop for TempDirGuard {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.0);
    }
}

#[cfg(test)]
mod tests;
