mod collector_tests;

use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use crate::collector::{MemoryAccountant, ShardCollector};

/// Helper: a record line in the shard JSON schema.
pub(crate) fn record_line(fp: &str, cp: i64) -> Vec<u8> {
    format!(
        r#"{{"fen":"{fp}","evals":[{{"pvs":[{{"cp":{cp},"line":"e2e4"}}],"knodes":1,"depth":10}}]}}"#
    )
    .into_bytes()
}

/// Helper: a collector wired to a generous accountant.
pub(crate) fn standalone_collector(dir: &Path) -> (ShardCollector, Arc<MemoryAccountant>) {
    let accountant = Arc::new(MemoryAccountant::new(1024));
    let collector = ShardCollector::new(0, dir.to_path_buf(), Arc::clone(&accountant));
    (collector, accountant)
}

/// Helper: decompress a shard file and return its non-empty lines.
pub(crate) fn read_shard_lines(path: &Path, codec: &dyn codec::Codec) -> Vec<String> {
    let compressed = std::fs::read(path).unwrap();
    let mut reader = codec.reader(Box::new(&compressed[..])).unwrap();
    let mut data = Vec::new();
    reader.read_to_end(&mut data).unwrap();
    String::from_utf8(data)
        .unwrap()
        .lines()
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect()
}
