use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use tokio_util::sync::CancellationToken;

use shard::Strategy;
use stockpile::Client;
use store::MemStore;

const N_RECORDS: usize = 10_000;

const STARTING_FP: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq -";

fn build_shard_data() -> Vec<u8> {
    let mut fps: Vec<String> = (0..N_RECORDS).map(|i| format!("fp-{i:06}")).collect();
    fps.sort();

    let mut out = Vec::new();
    for (i, fp) in fps.iter().enumerate() {
        out.extend_from_slice(
            format!(
                r#"{{"fen":"{fp}","evals":[{{"pvs":[{{"cp":{i},"line":"e2e4 e7e5 g1f3"}}],"knodes":5000,"depth":30}}]}}"#
            )
            .as_bytes(),
        );
        out.push(b'\n');
    }
    out
}

fn single_shard_client() -> Client {
    let store = MemStore::new();
    store.set_shard(0, build_shard_data());
    Client::builder()
        .store(Box::new(store))
        .total_shards(1)
        .build()
        .unwrap()
}

fn lookup_hit_benchmark(c: &mut Criterion) {
    let rt = tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap();
    let client = single_shard_client();
    let cancel = CancellationToken::new();

    c.bench_function("lookup_hit_10k_records", |b| {
        b.iter(|| {
            let eval = rt
                .block_on(client.lookup(&cancel, black_box("fp-005000")))
                .unwrap();
            black_box(eval);
        });
    });
}

fn lookup_miss_benchmark(c: &mut Criterion) {
    let rt = tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap();
    let client = single_shard_client();
    let cancel = CancellationToken::new();

    c.bench_function("lookup_miss_10k_records", |b| {
        b.iter(|| {
            let result = rt.block_on(client.lookup(&cancel, black_box("fp-999999")));
            black_box(result.is_err());
        });
    });
}

fn shard_id_benchmark(c: &mut Criterion) {
    let material = shard::MaterialStrategy;
    let fnv = shard::FnvStrategy;

    c.bench_function("shard_id_material", |b| {
        b.iter(|| black_box(material.shard_id(black_box(STARTING_FP), 32768)));
    });
    c.bench_function("shard_id_fnv32", |b| {
        b.iter(|| black_box(fnv.shard_id(black_box(STARTING_FP), 32768)));
    });
}

criterion_group!(
    benches,
    lookup_hit_benchmark,
    lookup_miss_benchmark,
    shard_id_benchmark
);
criterion_main!(benches);
