//! zstd codec.

use std::io::{self, Read, Write};

use crate::{Codec, CodecWriter};

/// Streaming zstd compression.
///
/// The compression level only affects [`Codec::writer`]; decompression is
/// level-agnostic. [`ZstdCodec::best`] is what the build pipeline uses —
/// shards are written once and read many times, so encode time is cheap.
#[derive(Debug, Clone, Copy)]
pub struct ZstdCodec {
    level: i32,
}

impl ZstdCodec {
    /// Default compression level for ad-hoc writes.
    pub const DEFAULT_LEVEL: i32 = 3;
    /// Highest practical compression level, used for shard builds.
    pub const BEST_LEVEL: i32 = 19;

    /// Codec with the default compression level.
    #[must_use]
    pub fn new() -> Self {
        Self {
            level: Self::DEFAULT_LEVEL,
        }
    }

    /// Codec tuned for maximum compression.
    #[must_use]
    pub fn best() -> Self {
        Self {
            level: Self::BEST_LEVEL,
        }
    }
}

impl Default for ZstdCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Codec for ZstdCodec {
    fn reader<'r>(&self, r: Box<dyn Read + 'r>) -> io::Result<Box<dyn Read + 'r>> {
        Ok(Box::new(zstd::stream::read::Decoder::new(r)?))
    }

    fn writer<'w>(&self, w: Box<dyn Write + 'w>) -> io::Result<Box<dyn CodecWriter + 'w>> {
        Ok(Box::new(ZstdWriter(zstd::stream::write::Encoder::new(
            w, self.level,
        )?)))
    }

    fn extension(&self) -> &'static str {
        "zst"
    }

    fn token(&self) -> &'static str {
        "zstd"
    }
}

struct ZstdWriter<'w>(zstd::stream::write::Encoder<'static, Box<dyn Write + 'w>>);

impl Write for ZstdWriter<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.0.flush()
    }
}

impl CodecWriter for ZstdWriter<'_> {
    fn finish(self: Box<Self>) -> io::Result<()> {
        self.0.finish().map(|_| ())
    }
}
