use std::sync::Arc;

use tempfile::tempdir;

use super::{record_line, standalone_collector};
use crate::collector::{MemoryAccountant, ShardCollector};
use crate::run::RunFileReader;
use crate::spill_until_under_budget;

// -------------------- MemoryAccountant --------------------

#[test]
fn accountant_tracks_totals() {
    let acc = MemoryAccountant::new(1); // 1 MiB budget
    assert!(!acc.over_budget());

    acc.add(512 * 1024);
    assert!(!acc.over_budget());
    acc.add(600 * 1024);
    assert!(acc.over_budget());
    assert_eq!(acc.total_bytes(), 1112 * 1024);

    acc.remove(600 * 1024);
    assert!(!acc.over_budget());
}

#[test]
fn accountant_remove_saturates() {
    let acc = MemoryAccountant::new(1);
    acc.add(10);
    acc.remove(100);
    assert_eq!(acc.total_bytes(), 0);
}

// -------------------- ShardCollector --------------------

#[test]
fn add_copies_and_counts() {
    let dir = tempdir().unwrap();
    let (mut collector, acc) = standalone_collector(dir.path());

    let mut buf = record_line("fp-a", 1);
    collector.add(&buf);
    // The partition loop reuses its buffer; the collector must have copied.
    buf.fill(b'X');
    collector.add(&buf);

    assert_eq!(collector.count(), 2);
    assert!(collector.in_memory_bytes() > 0);
    assert_eq!(acc.total_bytes(), collector.in_memory_bytes());
}

#[test]
fn spill_writes_sorted_run_and_frees_memory() {
    let dir = tempdir().unwrap();
    let (mut collector, acc) = standalone_collector(dir.path());

    // Insert out of order.
    collector.add(&record_line("fp-c", 3));
    collector.add(&record_line("fp-a", 1));
    collector.add(&record_line("fp-b", 2));

    collector.spill().unwrap();

    assert_eq!(collector.in_memory_bytes(), 0);
    assert_eq!(acc.total_bytes(), 0);
    assert_eq!(collector.count(), 3);
    assert_eq!(collector.run_count(), 1);

    // The run file holds the batch sorted by fingerprint.
    let run_path = dir.path().join("shard_00000_0.run");
    let mut reader = RunFileReader::open(&run_path).unwrap();
    let mut fens = Vec::new();
    while let Some(record) = reader.next_record().unwrap() {
        fens.push(search::extract_fen(&record).to_string());
    }
    assert_eq!(fens, vec!["fp-a", "fp-b", "fp-c"]);
}

#[test]
fn spill_on_empty_collector_is_noop() {
    let dir = tempdir().unwrap();
    let (mut collector, _) = standalone_collector(dir.path());
    collector.spill().unwrap();
    assert_eq!(collector.run_count(), 0);
}

#[test]
fn repeated_spills_produce_unique_run_files() {
    let dir = tempdir().unwrap();
    let (mut collector, _) = standalone_collector(dir.path());

    collector.add(&record_line("fp-a", 1));
    collector.spill().unwrap();
    collector.add(&record_line("fp-b", 2));
    collector.spill().unwrap();

    assert_eq!(collector.run_count(), 2);
    assert!(dir.path().join("shard_00000_0.run").exists());
    assert!(dir.path().join("shard_00000_1.run").exists());
}

// -------------------- Spill policy --------------------

#[test]
fn largest_collector_spills_first() {
    let dir = tempdir().unwrap();
    let acc = Arc::new(MemoryAccountant::new(0)); // everything is over budget
    let mut collectors: Vec<ShardCollector> = (0..3)
        .map(|id| ShardCollector::new(id, dir.path().to_path_buf(), Arc::clone(&acc)))
        .collect();

    collectors[0].add(&record_line("fp-small", 1));
    collectors[2].add(&record_line("fp-much-much-much-larger-record", 1));
    collectors[2].add(&record_line("fp-much-much-much-larger-record-2", 2));

    spill_until_under_budget(&mut collectors, &acc).unwrap();

    // Budget zero forces everything out.
    assert_eq!(acc.total_bytes(), 0);
    assert_eq!(collectors[0].run_count(), 1);
    assert_eq!(collectors[1].run_count(), 0);
    assert_eq!(collectors[2].run_count(), 1);
}
