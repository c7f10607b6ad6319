use std::sync::Arc;

use bytes::Bytes;

use crate::{CacheBackend, CacheStats, EvictionPolicy, InvalidCapacity, LruPolicy, MemoryBackend};

fn payload(n: u8) -> Bytes {
    Bytes::from(vec![n; 8])
}

// -------------------- LruPolicy --------------------

#[test]
fn lru_rejects_zero_capacity() {
    assert_eq!(LruPolicy::new(0).unwrap_err(), InvalidCapacity);
}

#[test]
fn lru_get_and_add() {
    let mut lru = LruPolicy::new(4).unwrap();
    assert!(lru.get(1).is_none());
    assert!(!lru.add(1, payload(1)));
    assert_eq!(lru.get(1), Some(payload(1)));
    assert_eq!(lru.len(), 1);
}

#[test]
fn lru_evicts_oldest_beyond_capacity() {
    let k = 3;
    let mut lru = LruPolicy::new(k).unwrap();
    for id in 0..=k as u32 {
        lru.add(id, payload(id as u8));
    }

    // k+1 inserts: the first key is gone, the other k remain.
    assert!(lru.get(0).is_none());
    for id in 1..=k as u32 {
        assert!(lru.get(id).is_some(), "key {id} should survive");
    }
    assert_eq!(lru.len(), k);
}

#[test]
fn lru_add_reports_eviction() {
    let mut lru = LruPolicy::new(2).unwrap();
    assert!(!lru.add(1, payload(1)));
    assert!(!lru.add(2, payload(2)));
    assert!(lru.add(3, payload(3)));
    // Overwriting an existing key is not an eviction.
    assert!(!lru.add(3, payload(9)));
}

#[test]
fn lru_get_refreshes_recency() {
    let mut lru = LruPolicy::new(2).unwrap();
    lru.add(1, payload(1));
    lru.add(2, payload(2));
    lru.get(1);
    lru.add(3, payload(3));

    // 2 was least recently used, so it is the one evicted.
    assert!(lru.get(2).is_none());
    assert!(lru.get(1).is_some());
    assert!(lru.get(3).is_some());
}

// -------------------- MemoryBackend --------------------

#[test]
fn backend_counts_hits_and_misses() {
    let backend = MemoryBackend::new(Box::new(LruPolicy::new(4).unwrap()));

    assert!(backend.get(1).is_none());
    backend.set(1, payload(1));
    assert_eq!(backend.get(1), Some(payload(1)));
    assert_eq!(backend.get(1), Some(payload(1)));

    let stats = backend.stats();
    assert_eq!(stats.hits, 2);
    assert_eq!(stats.misses, 1);
    assert_eq!(stats.size, 1);
}

#[test]
fn backend_publishes_metrics() {
    let recorder = Arc::new(stats::Recorder::new());
    let backend = MemoryBackend::with_collector(
        Box::new(LruPolicy::new(4).unwrap()),
        Arc::clone(&recorder) as Arc<dyn stats::Collector>,
    );

    backend.get(1);
    backend.set(1, payload(1));
    backend.get(1);

    assert_eq!(recorder.counter(stats::METRIC_CACHE_HITS), 1);
    assert_eq!(recorder.counter(stats::METRIC_CACHE_MISSES), 1);
    assert_eq!(recorder.gauge(stats::METRIC_CACHE_SIZE), Some(1));
}

#[test]
fn backend_is_shareable_across_threads() {
    let backend = Arc::new(MemoryBackend::new(Box::new(LruPolicy::new(1024).unwrap())));

    let handles: Vec<_> = (0..4u32)
        .map(|t| {
            let backend = Arc::clone(&backend);
            std::thread::spawn(move || {
                for i in 0..100u32 {
                    let id = t * 100 + i;
                    backend.set(id, payload(t as u8));
                    assert!(backend.get(id).is_some());
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }

    let stats = backend.stats();
    assert_eq!(stats.hits, 400);
    assert_eq!(stats.size, 400);
}

// -------------------- CacheStats --------------------

#[test]
fn hit_rate_math() {
    let empty = CacheStats::default();
    assert_eq!(empty.hit_rate(), 0.0);

    let stats = CacheStats {
        hits: 3,
        misses: 1,
        size: 2,
    };
    assert!((stats.hit_rate() - 75.0).abs() < f64::EPSILON);
}
