//! K-way merge over a collector's sorted sources.
//!
//! One cursor walks the in-memory batch (sorted here, on the fly) and one
//! walks each spilled run file. A min-heap keyed by fingerprint yields the
//! globally next record; nothing is ever materialized as a full list, so a
//! shard far larger than memory streams straight into the codec writer.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use anyhow::Result;

use crate::collector::ShardCollector;
use crate::run::RunFileReader;

/// A pending record from one merge source.
struct HeapEntry {
    fen: String,
    record: Vec<u8>,
    /// 0 = in-memory batch, 1+ = run file index + 1.
    source: usize,
}

impl PartialEq for HeapEntry {
    fn eq(&self, other: &Self) -> bool {
        self.fen == other.fen && self.source == other.source
    }
}

impl Eq for HeapEntry {}

impl PartialOrd for HeapEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for HeapEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap is a max-heap; we want the *smallest* fingerprint first,
        // so reverse the comparison. On tie, prefer the lower source index
        // (arbitrary but deterministic).
        other
            .fen
            .cmp(&self.fen)
            .then_with(|| other.source.cmp(&self.source))
    }
}

/// Streams a collector's records in ascending fingerprint order.
pub struct SortedStream {
    batch: std::vec::IntoIter<Vec<u8>>,
    runs: Vec<RunFileReader>,
    heap: BinaryHeap<HeapEntry>,
}

impl SortedStream {
    /// Consumes a collector, sorting its in-memory batch and opening a reader
    /// per run file. The heap is primed with the head of every source.
    pub fn new(collector: ShardCollector) -> Result<Self> {
        let (mut batch, run_paths) = collector.into_parts();
        batch.sort_by(|a, b| search::extract_fen(a).cmp(search::extract_fen(b)));

        let mut runs = Vec::with_capacity(run_paths.len());
        for path in &run_paths {
            runs.push(RunFileReader::open(path)?);
        }

        let mut stream = Self {
            batch: batch.into_iter(),
            runs,
            heap: BinaryHeap::new(),
        };

        if let Some(record) = stream.batch.next() {
            stream.push_entry(record, 0);
        }
        for i in 0..stream.runs.len() {
            if let Some(record) = stream.runs[i].next_record()? {
                stream.push_entry(record, i + 1);
            }
        }

        Ok(stream)
    }

    /// Returns the next record in fingerprint order, or `None` when every
    /// source is exhausted.
    pub fn next_record(&mut self) -> Result<Option<Vec<u8>>> {
        let Some(top) = self.heap.pop() else {
            return Ok(None);
        };

        // Refill from the source that just yielded.
        if top.source == 0 {
            if let Some(record) = self.batch.next() {
                self.push_entry(record, 0);
            }
        } else if let Some(record) = self.runs[top.source - 1].next_record()? {
            self.push_entry(record, top.source);
        }

        Ok(Some(top.record))
    }

    fn push_entry(&mut self, record: Vec<u8>, source: usize) {
        self.heap.push(HeapEntry {
            fen: search::extract_fen(&record).to_string(),
            record,
            source,
        });
    }
}
