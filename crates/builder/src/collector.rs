//! Per-shard record collectors and the global memory accountant.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::Result;

use crate::run::write_run;

/// Estimated bookkeeping overhead per in-memory record (vec header plus
/// allocator slack), added on top of the record's byte length.
const RECORD_OVERHEAD: u64 = 24;

/// Tracks the sum of in-memory record bytes across all collectors against a
/// fixed budget. Shared between collectors, so the totals sit behind a mutex.
pub struct MemoryAccountant {
    inner: Mutex<Totals>,
}

struct Totals {
    total_bytes: u64,
    max_bytes: u64,
}

impl MemoryAccountant {
    /// Accountant with a budget of `max_mb` mebibytes.
    pub fn new(max_mb: usize) -> Self {
        Self {
            inner: Mutex::new(Totals {
                total_bytes: 0,
                max_bytes: max_mb as u64 * 1024 * 1024,
            }),
        }
    }

    pub(crate) fn add(&self, bytes: u64) {
        self.inner.lock().expect("accountant lock").total_bytes += bytes;
    }

    pub(crate) fn remove(&self, bytes: u64) {
        let mut totals = self.inner.lock().expect("accountant lock");
        totals.total_bytes = totals.total_bytes.saturating_sub(bytes);
    }

    /// Whether the tracked total exceeds the budget.
    pub fn over_budget(&self) -> bool {
        let totals = self.inner.lock().expect("accountant lock");
        totals.total_bytes > totals.max_bytes
    }

    /// Currently tracked bytes.
    pub fn total_bytes(&self) -> u64 {
        self.inner.lock().expect("accountant lock").total_bytes
    }
}

/// Accumulates the records routed to one shard, spilling sorted batches to
/// run files when the accountant calls for it.
pub struct ShardCollector {
    shard_id: u32,
    records: Vec<Vec<u8>>,
    memory_bytes: u64,
    temp_dir: PathBuf,
    run_files: Vec<PathBuf>,
    spilled_records: u64,
    spill_seq: u32,
    accountant: Arc<MemoryAccountant>,
}

impl ShardCollector {
    pub fn new(shard_id: u32, temp_dir: PathBuf, accountant: Arc<MemoryAccountant>) -> Self {
        Self {
            shard_id,
            records: Vec::new(),
            memory_bytes: 0,
            temp_dir,
            run_files: Vec::new(),
            spilled_records: 0,
            spill_seq: 0,
            accountant,
        }
    }

    /// Copies a record into the collector. The source buffer is reused by the
    /// partition loop, so the copy is mandatory.
    pub fn add(&mut self, record: &[u8]) {
        self.records.push(record.to_vec());
        let size = record.len() as u64 + RECORD_OVERHEAD;
        self.memory_bytes += size;
        self.accountant.add(size);
    }

    /// Sorts the in-memory batch by fingerprint and writes it out as a run
    /// file, releasing the memory back to the accountant.
    ///
    /// A collector may spill many times; each spill produces one run file.
    pub fn spill(&mut self) -> Result<()> {
        if self.records.is_empty() {
            return Ok(());
        }

        self.records
            .sort_by(|a, b| search::extract_fen(a).cmp(search::extract_fen(b)));

        let run_path = self
            .temp_dir
            .join(format!("shard_{:05}_{}.run", self.shard_id, self.spill_seq));
        self.spill_seq += 1;
        write_run(&run_path, &self.records)?;

        self.accountant.remove(self.memory_bytes);
        self.spilled_records += self.records.len() as u64;
        self.run_files.push(run_path);
        self.records = Vec::new();
        self.memory_bytes = 0;

        Ok(())
    }

    /// Total records routed here, spilled or not.
    pub fn count(&self) -> u64 {
        self.records.len() as u64 + self.spilled_records
    }

    /// Bytes currently held in memory (the spill-candidate metric).
    pub fn in_memory_bytes(&self) -> u64 {
        self.memory_bytes
    }

    pub fn shard_id(&self) -> u32 {
        self.shard_id
    }

    /// Number of run files produced so far.
    pub fn run_count(&self) -> usize {
        self.run_files.len()
    }

    /// Tears the collector apart into its unsorted in-memory batch and the
    /// paths of its sorted run files.
    pub(crate) fn into_parts(self) -> (Vec<Vec<u8>>, Vec<PathBuf>) {
        (self.records, self.run_files)
    }
}
