//! Store - Length-Prefixed Append-Only File
//!
//! This module implements `Store`, the lowest layer of a segment: a single
//! append-only file holding framed record payloads.
//!
//! ## File Format
//!
//! A store file is a sequence of frames with no header, trailer, padding,
//! or alignment:
//!
//! ```text
//! ┌─────────────┬──────────────┬─────────────┬──────────────┬────
//! │ Length      │ Payload      │ Length      │ Payload      │ ...
//! │ (8 bytes BE)│ (N bytes)    │ (8 bytes BE)│ (M bytes)    │
//! └─────────────┴──────────────┴─────────────┴──────────────┴────
//! ```
//!
//! ## Why a Buffered Writer?
//!
//! Appends go through a `BufWriter` so a burst of small records costs one
//! syscall per buffer window instead of one per record. The trade-off is
//! that a frame may still be sitting in the buffer when a read for it
//! arrives, so every read path flushes the writer first.
//!
//! ## Sizes
//!
//! `size` tracks the logical length of the stream (buffer + file). The
//! on-disk file lags behind by up to one buffer window until a flush;
//! positions handed out by `append` are logical and stay valid across
//! flushes and reopens.
//!
//! ## Thread Safety
//!
//! All state sits behind one mutex. This serializes appends against the
//! flush-before-read coupling, and lets the log-wide sequential reader
//! call [`read_at`](Store::read_at) while another thread appends.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::os::unix::fs::FileExt;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use bytes::Bytes;
use strata_core::Result;

/// Width of the big-endian length prefix on every frame.
pub const LEN_WIDTH: u64 = 8;

/// Append-only file of length-prefixed frames
#[derive(Debug)]
pub struct Store {
    path: PathBuf,
    inner: Mutex<StoreInner>,
}

#[derive(Debug)]
struct StoreInner {
    /// Handle used for positional reads
    file: File,

    /// Buffered writer over a clone of the same handle
    writer: BufWriter<File>,

    /// Logical size of the stream: all frames ever appended, including
    /// their 8-byte length prefixes
    size: u64,
}

impl Store {
    /// Open or create the store file at `path`. An existing file resumes
    /// appending where it left off: `size` starts at the file length.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&path)?;

        let size = file.metadata()?.len();
        let writer = BufWriter::new(file.try_clone()?);

        Ok(Self {
            path,
            inner: Mutex::new(StoreInner { file, writer, size }),
        })
    }

    /// Append a framed payload.
    ///
    /// Returns `(bytes_written, pos)` where `bytes_written` includes the
    /// length prefix and `pos` is the byte position at which the frame
    /// starts - the value the index records for this payload.
    pub fn append(&self, payload: &[u8]) -> Result<(u64, u64)> {
        let mut inner = self.inner.lock()?;

        let pos = inner.size;
        inner
            .writer
            .write_all(&(payload.len() as u64).to_be_bytes())?;
        inner.writer.write_all(payload)?;

        let written = LEN_WIDTH + payload.len() as u64;
        inner.size += written;
        Ok((written, pos))
    }

    /// Read the payload of the frame starting at `pos`.
    ///
    /// The writer is flushed first: the frame may still be buffered.
    pub fn read(&self, pos: u64) -> Result<Bytes> {
        let mut inner = self.inner.lock()?;
        inner.writer.flush()?;

        let mut len_buf = [0u8; LEN_WIDTH as usize];
        inner.file.read_exact_at(&mut len_buf, pos)?;
        let len = u64::from_be_bytes(len_buf);

        let mut payload = vec![0u8; len as usize];
        inner.file.read_exact_at(&mut payload, pos + LEN_WIDTH)?;
        Ok(Bytes::from(payload))
    }

    /// Positional read of up to `buf.len()` raw bytes starting at `pos`.
    ///
    /// Flushes the writer, then issues a single positional read. Returns
    /// the number of bytes read; 0 means end of file. This is the walk
    /// primitive behind [`LogReader`](crate::LogReader).
    pub fn read_at(&self, buf: &mut [u8], pos: u64) -> Result<usize> {
        let mut inner = self.inner.lock()?;
        inner.writer.flush()?;
        Ok(inner.file.read_at(buf, pos)?)
    }

    /// Logical size of the store in bytes (buffered writes included).
    pub fn size(&self) -> u64 {
        match self.inner.lock() {
            Ok(inner) => inner.size,
            // A poisoned lock still holds a consistent u64; report it.
            Err(poisoned) => poisoned.into_inner().size,
        }
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Flush buffered frames to the OS.
    pub fn flush(&self) -> Result<()> {
        let mut inner = self.inner.lock()?;
        inner.writer.flush()?;
        Ok(())
    }

    /// Flush buffered frames and sync the file to stable storage.
    pub fn close(&self) -> Result<()> {
        let mut inner = self.inner.lock()?;
        inner.writer.flush()?;
        inner.file.sync_all()?;
        Ok(())
    }
}
