//! # Stats — metrics collection interface
//!
//! The engine reports counters and gauges through the [`Collector`] trait and
//! never depends on a concrete metrics backend. Production deployments plug
//! in their own implementation; [`Noop`] is the default and [`LogCollector`]
//! routes observations to `tracing` for debugging.
//!
//! Implementations must tolerate concurrent calls and repeated registration
//! of the same metric name.

use std::collections::HashMap;
use std::sync::Mutex;

/// Total lookups attempted.
pub const METRIC_LOOKUPS: &str = "stockpile_lookups_total";
/// Lookups that found a record.
pub const METRIC_HITS: &str = "stockpile_hits_total";
/// Lookups whose position was absent.
pub const METRIC_MISSES: &str = "stockpile_misses_total";
/// Shard reads issued to the store.
pub const METRIC_SHARD_FETCHES: &str = "stockpile_shard_fetches_total";
/// Shard reads served from the cache.
pub const METRIC_CACHE_HITS: &str = "stockpile_cache_hits_total";
/// Shard reads that had to go to the backing store.
pub const METRIC_CACHE_MISSES: &str = "stockpile_cache_misses_total";
/// Current number of cached shards.
pub const METRIC_CACHE_SIZE: &str = "stockpile_cache_size";

/// A sink for metrics emitted by the engine.
pub trait Collector: Send + Sync {
    /// Increments a counter by `delta`.
    fn inc_counter(&self, name: &str, delta: i64);

    /// Sets a gauge to `value`.
    fn set_gauge(&self, name: &str, value: i64);

    /// Records a value in a histogram.
    fn observe_histogram(&self, name: &str, value: f64);
}

/// Discards all metrics.
#[derive(Debug, Clone, Copy, Default)]
pub struct Noop;

impl Collector for Noop {
    fn inc_counter(&self, _name: &str, _delta: i64) {}
    fn set_gauge(&self, _name: &str, _value: i64) {}
    fn observe_histogram(&self, _name: &str, _value: f64) {}
}

/// Emits every observation as a `tracing` debug event.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogCollector;

impl Collector for LogCollector {
    fn inc_counter(&self, name: &str, delta: i64) {
        tracing::debug!(metric = name, delta, "counter");
    }

    fn set_gauge(&self, name: &str, value: i64) {
        tracing::debug!(metric = name, value, "gauge");
    }

    fn observe_histogram(&self, name: &str, value: f64) {
        tracing::debug!(metric = name, value, "histogram");
    }
}

/// Accumulates metrics in memory. Intended for tests that assert on the
/// engine's counter behavior.
#[derive(Debug, Default)]
pub struct Recorder {
    inner: Mutex<RecorderState>,
}

#[derive(Debug, Default)]
struct RecorderState {
    counters: HashMap<String, i64>,
    gauges: HashMap<String, i64>,
}

impl Recorder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current value of a counter, 0 if never incremented.
    pub fn counter(&self, name: &str) -> i64 {
        self.inner
            .lock()
            .expect("recorder lock")
            .counters
            .get(name)
            .copied()
            .unwrap_or(0)
    }

    /// Last value written to a gauge, if any.
    pub fn gauge(&self, name: &str) -> Option<i64> {
        self.inner
            .lock()
            .expect("recorder lock")
            .gauges
            .get(name)
            .copied()
    }
}

impl Collector for Recorder {
    fn inc_counter(&self, name: &str, delta: i64) {
        let mut state = self.inner.lock().expect("recorder lock");
        *state.counters.entry(name.to_string()).or_insert(0) += delta;
    }

    fn set_gauge(&self, name: &str, value: i64) {
        let mut state = self.inner.lock().expect("recorder lock");
        state.gauges.insert(name.to_string(), value);
    }

    fn observe_histogram(&self, _name: &str, _value: f64) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recorder_accumulates_counters() {
        let r = Recorder::new();
        r.inc_counter(METRIC_LOOKUPS, 1);
        r.inc_counter(METRIC_LOOKUPS, 2);
        assert_eq!(r.counter(METRIC_LOOKUPS), 3);
        assert_eq!(r.counter(METRIC_HITS), 0);
    }

    #[test]
    fn recorder_tracks_gauges() {
        let r = Recorder::new();
        assert_eq!(r.gauge(METRIC_CACHE_SIZE), None);
        r.set_gauge(METRIC_CACHE_SIZE, 5);
        r.set_gauge(METRIC_CACHE_SIZE, 7);
        assert_eq!(r.gauge(METRIC_CACHE_SIZE), Some(7));
    }

    #[test]
    fn noop_accepts_everything() {
        let n = Noop;
        n.inc_counter(METRIC_HITS, 1);
        n.set_gauge(METRIC_CACHE_SIZE, 1);
        n.observe_histogram("stockpile_latency", 0.5);
    }
}
