//! gzip codec.

use std::io::{self, Read, Write};

use flate2::read::MultiGzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;

use crate::{Codec, CodecWriter};

/// Streaming gzip compression.
#[derive(Debug, Clone, Copy)]
pub struct GzipCodec {
    level: Compression,
}

impl GzipCodec {
    /// Codec with the default compression level.
    #[must_use]
    pub fn new() -> Self {
        Self {
            level: Compression::default(),
        }
    }

    /// Codec tuned for maximum compression.
    #[must_use]
    pub fn best() -> Self {
        Self {
            level: Compression::best(),
        }
    }
}

impl Default for GzipCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Codec for GzipCodec {
    fn reader<'r>(&self, r: Box<dyn Read + 'r>) -> io::Result<Box<dyn Read + 'r>> {
        Ok(Box::new(MultiGzDecoder::new(r)))
    }

    fn writer<'w>(&self, w: Box<dyn Write + 'w>) -> io::Result<Box<dyn CodecWriter + 'w>> {
        Ok(Box::new(GzipWriter(GzEncoder::new(w, self.level))))
    }

    fn extension(&self) -> &'static str {
        "gz"
    }

    fn token(&self) -> &'static str {
        "gzip"
    }
}

struct GzipWriter<'w>(GzEncoder<Box<dyn Write + 'w>>);

impl Write for GzipWriter<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.0.flush()
    }
}

impl CodecWriter for GzipWriter<'_> {
    fn finish(self: Box<Self>) -> io::Result<()> {
        self.0.finish().map(|_| ())
    }
}
