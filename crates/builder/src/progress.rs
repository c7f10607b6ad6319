//! Build progress reporting.

use std::sync::Arc;
use std::time::Duration;

/// Which stage of the build a report describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Partitioning records into collectors.
    Sort,
    /// Writing shard files.
    Shard,
    /// Build finished.
    Done,
}

/// A point-in-time snapshot of build progress.
#[derive(Debug, Clone)]
pub struct Progress {
    pub phase: Phase,
    pub records_read: u64,
    pub records_written: u64,
    pub shards_created: u32,
    pub shards_total: u32,
    pub elapsed: Duration,
}

/// Callback invoked at coarse milestones during a build.
pub type ProgressFn = Arc<dyn Fn(&Progress) + Send + Sync>;

/// Default progress reporter: one tracing event per milestone.
pub fn log_progress(p: &Progress) {
    match p.phase {
        Phase::Sort => tracing::info!(records = p.records_read, "partitioning records"),
        Phase::Shard => tracing::info!(
            shards = p.shards_created,
            total = p.shards_total,
            records = p.records_written,
            "writing shards"
        ),
        Phase::Done => tracing::info!(
            records = p.records_written,
            shards = p.shards_created,
            elapsed = %format_duration(p.elapsed),
            "build complete"
        ),
    }
}

/// Formats a byte count as a human-readable string.
#[must_use]
pub fn format_bytes(bytes: u64) -> String {
    const UNIT: u64 = 1024;
    if bytes < UNIT {
        return format!("{bytes} B");
    }
    let mut div = UNIT;
    let mut exp = 0;
    let mut n = bytes / UNIT;
    while n >= UNIT {
        div *= UNIT;
        exp += 1;
        n /= UNIT;
    }
    format!("{:.1} {}B", bytes as f64 / div as f64, b"KMGTPE"[exp] as char)
}

/// Formats a duration as a human-readable string.
#[must_use]
pub fn format_duration(d: Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        return format!("{secs}s");
    }
    if secs < 3600 {
        return format!("{}m {}s", secs / 60, secs % 60);
    }
    format!("{}h {}m", secs / 3600, (secs % 3600) / 60)
}
