//! # Search — binary search within a decompressed shard
//!
//! A shard is newline-delimited JSON sorted ascending by the `fen` field
//! (byte-wise comparison, matching the sort order used at build time). A
//! point lookup therefore needs no index: binary-search the lines, parse only
//! the single matched line.
//!
//! During the descent the fingerprint is pulled out of each probed line with
//! a plain substring scan ([`extract_fen`]) instead of a JSON parse — only
//! ~log₂(lines) probes happen, and the one full parse is reserved for the
//! final match.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised by shard search.
#[derive(Debug, Error)]
pub enum SearchError {
    /// The position is not present in the shard.
    #[error("position not found")]
    NotFound,

    /// The matched line is not a valid evaluation record.
    #[error("parsing eval record: {0}")]
    Parse(#[from] serde_json::Error),
}

/// One evaluation record, as stored in the shard files.
///
/// Mirrors the Lichess evaluation database line format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvalRecord {
    pub fen: String,
    pub evals: Vec<EvalEntry>,
}

/// A single engine evaluation at some depth.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvalEntry {
    pub pvs: Vec<Pv>,
    pub knodes: i64,
    pub depth: i64,
}

/// A principal variation. Exactly one of `cp` and `mate` is present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pv {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cp: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mate: Option<i64>,
    pub line: String,
}

/// Searches sorted shard bytes for a fingerprint.
///
/// # Errors
///
/// [`SearchError::NotFound`] when the fingerprint is absent,
/// [`SearchError::Parse`] when the matched line is not valid JSON.
pub fn search(data: &[u8], target_fen: &str) -> Result<EvalRecord, SearchError> {
    let lines = split_lines(data);
    if lines.is_empty() {
        return Err(SearchError::NotFound);
    }

    // First index whose fingerprint is >= target.
    let idx = lines.partition_point(|line| extract_fen(line) < target_fen);
    if idx >= lines.len() || extract_fen(lines[idx]) != target_fen {
        return Err(SearchError::NotFound);
    }

    Ok(serde_json::from_slice(lines[idx])?)
}

/// Splits shard bytes into lines, dropping empty ones.
fn split_lines(data: &[u8]) -> Vec<&[u8]> {
    data.split(|&b| b == b'\n').filter(|l| !l.is_empty()).collect()
}

/// Extracts the `fen` field from a JSON line without parsing it.
///
/// Scans for the `"fen":"` marker and returns the bytes up to the next `"`.
/// Returns the empty string when the marker or closing quote is absent, which
/// sorts before every real fingerprint. The corpus never contains escaped
/// quotes inside a FEN, so a plain byte scan is exact.
#[must_use]
pub fn extract_fen(line: &[u8]) -> &str {
    const MARKER: &[u8] = b"\"fen\":\"";

    let Some(pos) = line.windows(MARKER.len()).position(|w| w == MARKER) else {
        return "";
    };
    let rest = &line[pos + MARKER.len()..];
    let Some(end) = rest.iter().position(|&b| b == b'"') else {
        return "";
    };
    std::str::from_utf8(&rest[..end]).unwrap_or("")
}
