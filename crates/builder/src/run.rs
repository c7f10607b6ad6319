//! Spill run files.
//!
//! A run file is one sorted batch spilled from a collector: a flat sequence
//! of `[len: u32 BE][record bytes]` frames, no compression, no trailer. The
//! record bytes are the original JSON line without its newline.

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;

use anyhow::{Context, Result};
use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};

/// Writes a sorted batch of records as a run file.
pub(crate) fn write_run(path: &Path, records: &[Vec<u8>]) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("creating run file {}", path.display()))?;
    let mut writer = BufWriter::new(file);

    for record in records {
        writer.write_u32::<BigEndian>(record.len() as u32)?;
        writer.write_all(record)?;
    }

    writer.flush().context("flushing run file")?;
    Ok(())
}

/// Sequential reader over a run file's length-prefixed records.
pub(crate) struct RunFileReader {
    reader: BufReader<File>,
}

impl RunFileReader {
    pub(crate) fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("opening run file {}", path.display()))?;
        Ok(Self {
            reader: BufReader::new(file),
        })
    }

    /// Returns the next record, or `None` at end of file.
    pub(crate) fn next_record(&mut self) -> Result<Option<Vec<u8>>> {
        let len = match self.reader.read_u32::<BigEndian>() {
            Ok(len) => len as usize,
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => return Ok(None),
            Err(e) => return Err(e).context("reading run record length"),
        };

        let mut record = vec![0u8; len];
        self.reader
            .read_exact(&mut record)
            .context("reading run record")?;
        Ok(Some(record))
    }
}
