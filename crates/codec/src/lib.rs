//! # Codec — streaming shard compression
//!
//! Shard files are written once and read whole, so the [`Codec`] contract is
//! a pair of stream adapters: [`Codec::reader`] wraps a byte source with a
//! decompressor and [`Codec::writer`] wraps a byte sink with a compressor.
//! Neither side buffers the full payload.
//!
//! Writers must be finalized with an explicit [`CodecWriter::finish`]; the
//! compressed stream is incomplete until then. Readers report end of stream
//! at the underlying EOF.

use std::io::{self, Read, Write};
use std::sync::Arc;

mod gzip;
mod noop;
mod zstd_codec;

pub use gzip::GzipCodec;
pub use noop::NoopCodec;
pub use zstd_codec::ZstdCodec;

/// A compressing writer that must be explicitly finalized.
pub trait CodecWriter: Write {
    /// Flushes remaining buffered data and writes the stream trailer.
    fn finish(self: Box<Self>) -> io::Result<()>;
}

/// Bidirectional stream compression.
pub trait Codec: Send + Sync {
    /// Wraps `r` so that reads yield decompressed bytes.
    fn reader<'r>(&self, r: Box<dyn Read + 'r>) -> io::Result<Box<dyn Read + 'r>>;

    /// Wraps `w` so that writes are compressed into it.
    fn writer<'w>(&self, w: Box<dyn Write + 'w>) -> io::Result<Box<dyn CodecWriter + 'w>>;

    /// File extension without the dot (e.g. `zst`, `gz`); empty for identity.
    fn extension(&self) -> &'static str;

    /// Stable codec name as persisted in the manifest `compression` field
    /// (e.g. `zstd`, `gzip`); empty for identity.
    fn token(&self) -> &'static str;
}

/// Resolves a codec from its manifest token.
pub fn codec_by_token(token: &str) -> Option<Arc<dyn Codec>> {
    match token {
        "zstd" => Some(Arc::new(ZstdCodec::new())),
        "gzip" => Some(Arc::new(GzipCodec::new())),
        "" => Some(Arc::new(NoopCodec)),
        _ => None,
    }
}

#[cfg(test)]
mod tests;
