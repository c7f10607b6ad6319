//! Identity codec (no compression).

use std::io::{self, Read, Write};

use crate::{Codec, CodecWriter};

/// Passes bytes through unchanged. Useful for tests and for data that is
/// already compressed upstream.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopCodec;

impl Codec for NoopCodec {
    fn reader<'r>(&self, r: Box<dyn Read + 'r>) -> io::Result<Box<dyn Read + 'r>> {
        Ok(r)
    }

    fn writer<'w>(&self, w: Box<dyn Write + 'w>) -> io::Result<Box<dyn CodecWriter + 'w>> {
        Ok(Box::new(NoopWriter(w)))
    }

    fn extension(&self) -> &'static str {
        ""
    }

    fn token(&self) -> &'static str {
        ""
    }
}

struct NoopWriter<'w>(Box<dyn Write + 'w>);

impl Write for NoopWriter<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.0.flush()
    }
}

impl CodecWriter for NoopWriter<'_> {
    fn finish(mut self: Box<Self>) -> io::Result<()> {
        self.0.flush()
    }
}
