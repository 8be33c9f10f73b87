//! Log - Ordered Collection of Segments
//!
//! This module implements `Log`, the public face of the storage layer. It
//! keeps segments sorted by base offset, appends through the last (active)
//! segment, rolls over when the active segment fills, routes reads to the
//! segment owning an offset, and truncates whole-segment prefixes.
//!
//! ## Invariants
//!
//! - The segment list is non-empty and sorted by base offset, and for
//!   adjacent segments the next one's base equals the previous one's
//!   `next_offset`.
//! - Only the last segment accepts appends.
//! - The set of readable offsets is `[lowest_offset, highest_offset]`.
//!
//! ## Recovery
//!
//! Opening a directory lists its files, parses the base offset out of
//! every `<base>.store` / `<base>.index` name, and reopens one segment
//! per distinct base in ascending order. Each base appears twice in the
//! listing (once per extension), so the scan deduplicates the parsed
//! offsets rather than stepping by twos - a missing file would silently
//! desynchronize a stride-two walk.
//!
//! ## Locking
//!
//! `append`, `truncate`, `close`, `remove`, and `reset` take the write
//! lock; `read`, `reader`, `lowest_offset`, and `highest_offset` take the
//! read lock. Appends are therefore totally ordered, and a read observes
//! either a fully appended record or none of it.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use tracing::{debug, error, info, warn};

use strata_core::{CommitLog, Error, Record, Result};

use crate::config::LogConfig;
use crate::reader::LogReader;
use crate::segment::Segment;

/// A durable, segmented, append-only record log over one directory
#[derive(Debug)]
pub struct Log {
    dir: PathBuf,
    config: LogConfig,
    segments: RwLock<Vec<Segment>>,
}

impl Log {
    /// Open the log at `dir`, creating the directory (and an initial
    /// segment at `config.segment.initial_offset`) if nothing is there
    /// yet. Zero-valued size limits in `config` fall back to defaults.
    pub fn open(dir: impl AsRef<Path>, mut config: LogConfig) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        config.segment.normalize();

        let segments = Self::load_segments(&dir, &config)?;
        info!(
            dir = %dir.display(),
            segments = segments.len(),
            "log opened"
        );

        Ok(Self {
            dir,
            config,
            segments: RwLock::new(segments),
        })
    }

    /// Scan `dir` and reopen every segment found there, oldest first.
    /// Creates the directory and, when it holds no segments, a fresh one
    /// at the configured initial offset.
    fn load_segments(dir: &Path, config: &LogConfig) -> Result<Vec<Segment>> {
        fs::create_dir_all(dir)?;

        // Each base offset names two files (.store and .index); the set
        // collapses the pairs and keeps the bases sorted.
        let mut base_offsets = BTreeSet::new();
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            let path = entry.path();
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            match stem.parse::<u64>() {
                Ok(base) => {
                    base_offsets.insert(base);
                }
                Err(_) => {
                    warn!(file = %path.display(), "skipping unrecognized file in log dir");
                }
            }
        }

        let mut segments = Vec::with_capacity(base_offsets.len().max(1));
        for base in base_offsets {
            segments.push(Segment::open(dir, base, config.segment.clone())?);
        }

        if segments.is_empty() {
            segments.push(Segment::open(
                dir,
                config.segment.initial_offset,
                config.segment.clone(),
            )?);
        }

        Ok(segments)
    }

    /// Append a record to the active segment, rolling over to a new
    /// segment when the active one reports itself full. Returns the
    /// offset assigned to the record.
    pub fn append(&self, record: Record) -> Result<u64> {
        let mut segments = self.segments.write()?;
        let active = segments.last_mut().ok_or(Error::LogClosed)?;

        let offset = active.append(record)?;

        if active.is_maxed() {
            let base = offset + 1;
            debug!(
                old_base = active.base_offset(),
                new_base = base,
                "rolling over to new segment"
            );
            segments.push(Segment::open(&self.dir, base, self.config.segment.clone())?);
        }

        Ok(offset)
    }

    /// Read the record stored at `offset`.
    pub fn read(&self, offset: u64) -> Result<Record> {
        let segments = self.segments.read()?;

        let owner = segments
            .iter()
            .find(|s| s.base_offset() <= offset && offset < s.next_offset());

        match owner {
            Some(segment) => segment.read(offset),
            None => Err(Error::OffsetOutOfRange(offset)),
        }
    }

    /// Oldest offset still retained by the log.
    pub fn lowest_offset(&self) -> Result<u64> {
        let segments = self.segments.read()?;
        let first = segments.first().ok_or(Error::LogClosed)?;
        Ok(first.base_offset())
    }

    /// Newest offset appended to the log, or 0 when the log is empty.
    pub fn highest_offset(&self) -> Result<u64> {
        let segments = self.segments.read()?;
        let last = segments.last().ok_or(Error::LogClosed)?;

        let next = last.next_offset();
        Ok(if next == 0 { 0 } else { next - 1 })
    }

    /// Drop every segment whose records all have offsets at or below
    /// `lowest`, deleting their files. Used to reclaim space once old
    /// records have been processed and are no longer needed.
    pub fn truncate(&self, lowest: u64) -> Result<()> {
        let mut segments = self.segments.write()?;

        // Where appends continue if truncation empties the log entirely.
        let resume_base = segments.last().map(Segment::next_offset);

        let mut retained = Vec::with_capacity(segments.len());
        let mut removed = 0usize;
        for segment in segments.drain(..) {
            if segment.next_offset() <= lowest.saturating_add(1) {
                segment.remove()?;
                removed += 1;
            } else {
                retained.push(segment);
            }
        }

        if retained.is_empty() {
            if let Some(base) = resume_base {
                retained.push(Segment::open(&self.dir, base, self.config.segment.clone())?);
            }
        }

        *segments = retained;
        info!(lowest, removed, "truncated log prefix");
        Ok(())
    }

    /// A sequential reader over the raw bytes of every store file, in
    /// segment order. The consumer sees the frames exactly as they sit on
    /// disk: `[length u64 BE][payload]`, back to back across segments.
    /// Useful for snapshotting or shipping the whole log elsewhere.
    pub fn reader(&self) -> Result<LogReader> {
        let segments = self.segments.read()?;
        Ok(LogReader::new(
            segments.iter().map(Segment::store).collect(),
        ))
    }

    /// Close every segment. Afterwards the log rejects further
    /// operations with [`Error::LogClosed`].
    pub fn close(&self) -> Result<()> {
        let mut segments = self.segments.write()?;
        for segment in segments.drain(..) {
            let base = segment.base_offset();
            if let Err(e) = segment.close() {
                error!(base, error = %e, "failed to close segment");
                return Err(e);
            }
        }
        Ok(())
    }

    /// Close the log and delete its directory.
    pub fn remove(&self) -> Result<()> {
        self.close()?;
        fs::remove_dir_all(&self.dir)?;
        info!(dir = %self.dir.display(), "log removed");
        Ok(())
    }

    /// Remove the log, then set it up again empty.
    pub fn reset(&self) -> Result<()> {
        self.remove()?;

        let mut segments = self.segments.write()?;
        *segments = Self::load_segments(&self.dir, &self.config)?;
        info!(dir = %self.dir.display(), "log reset");
        Ok(())
    }
}

impl CommitLog for Log {
    fn append(&self, record: Record) -> Result<u64> {
        Log::append(self, record)
    }

    fn read(&self, offset: u64) -> Result<Record> {
        Log::read(self, offset)
    }
}
