//! Append-only scratch store for reduced records.
//!
//! One file per capture session, created empty at session start and grown by
//! exactly one record per successful `process` call. The format is a raw
//! little-endian concatenation of fixed-width records: no header, no framing.
//! The file is read back once, sequentially, at finalization, and is left on
//! disk afterwards so a suspect capture can be inspected or re-derived.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// When appended records are pushed out of the writer's buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlushPolicy {
    /// Flush after every record. Each append is a complete, durable unit;
    /// a reader never observes a partial record.
    EveryRow,
    /// Leave records in the buffer until an explicit flush or finalization.
    /// Trades per-record durability for throughput at high frame rates.
    Batched,
}

/// Append-only byte store backing one capture session.
#[derive(Debug)]
pub struct ScratchStore {
    path: PathBuf,
    writer: BufWriter<File>,
    policy: FlushPolicy,
    bytes_written: u64,
}

impl ScratchStore {
    /// Create the store, truncating any previous file at `path`.
    pub fn create(path: impl Into<PathBuf>, policy: FlushPolicy) -> std::io::Result<Self> {
        let path = path.into();
        let file = File::create(&path)?;
        tracing::debug!(path = %path.display(), ?policy, "Initialized scratch store");
        Ok(Self {
            path,
            writer: BufWriter::new(file),
            policy,
            bytes_written: 0,
        })
    }

    /// Append one record's raw bytes.
    ///
    /// The write either lands completely or the store is considered failed;
    /// there is no partial-append recovery path.
    pub fn append(&mut self, record: &[u8]) -> std::io::Result<()> {
        self.writer.write_all(record)?;
        if self.policy == FlushPolicy::EveryRow {
            self.writer.flush()?;
        }
        self.bytes_written += record.len() as u64;
        Ok(())
    }

    /// Push any buffered bytes to the file.
    pub fn flush(&mut self) -> std::io::Result<()> {
        self.writer.flush()
    }

    /// Bytes appended so far.
    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    /// Location of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Flush, then read the entire store back from disk.
    pub fn read_all(&mut self) -> std::io::Result<Vec<u8>> {
        self.flush()?;
        fs::read(&self.path)
    }
}
