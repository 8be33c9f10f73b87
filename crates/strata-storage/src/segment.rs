//! Segment - A Store/Index Pair Under a Base Offset
//!
//! A segment owns one store and one index, named `<base_offset>.store`
//! and `<base_offset>.index` in the log directory. Records in a segment
//! have absolute offsets in `[base_offset, next_offset)`; the index keys
//! them by offset relative to the base so entries fit in 4 bytes.
//!
//! ## Lifecycle
//!
//! A segment is created on fresh log init (at the configured initial
//! offset), while recovering an existing directory, or on rollover. It is
//! closed when the log closes, or removed outright by prefix truncation.
//!
//! On open, `next_offset` is derived from the index alone: an empty index
//! means the segment holds nothing and the next record lands at
//! `base_offset`; otherwise it is `base_offset + last_relative + 1`.
//!
//! ## Rollover
//!
//! [`is_maxed`](Segment::is_maxed) reports when either file has reached
//! its configured cap. Payloads are variable length, so the store can
//! overshoot its cap by one record; the index never overshoots because
//! entries are fixed width and the capacity check runs before each write.

use std::path::Path;
use std::sync::Arc;

use bytes::BytesMut;
use strata_core::{Error, Record, Result};

use crate::config::SegmentConfig;
use crate::index::Index;
use crate::store::Store;

/// One (store, index) pair of the log
#[derive(Debug)]
pub struct Segment {
    store: Arc<Store>,
    index: Index,
    base_offset: u64,
    next_offset: u64,
    config: SegmentConfig,
}

impl Segment {
    /// Open or create the segment with the given base offset inside `dir`.
    pub fn open(dir: &Path, base_offset: u64, config: SegmentConfig) -> Result<Self> {
        let store = Arc::new(Store::open(dir.join(format!("{base_offset}.store")))?);
        let index = Index::open(
            dir.join(format!("{base_offset}.index")),
            config.max_index_bytes,
        )?;

        let next_offset = match index.read(-1) {
            Ok((rel, _)) => base_offset + u64::from(rel) + 1,
            Err(Error::EndOfIndex) => base_offset,
            Err(e) => return Err(e),
        };

        Ok(Self {
            store,
            index,
            base_offset,
            next_offset,
            config,
        })
    }

    /// Append a record, stamping it with this segment's next offset.
    ///
    /// The store write happens before the index write; an index failure
    /// leaves an orphan frame behind, which the log treats as fatal
    /// rather than attempting rollback.
    pub fn append(&mut self, mut record: Record) -> Result<u64> {
        let offset = self.next_offset;
        let rel = offset - self.base_offset;
        if rel > u64::from(u32::MAX) {
            return Err(Error::SegmentOverflow(offset));
        }

        record.offset = offset;
        let mut payload = BytesMut::with_capacity(record.encoded_len());
        record.encode(&mut payload);

        let (_, pos) = self.store.append(&payload)?;
        self.index.write(rel as u32, pos)?;

        self.next_offset += 1;
        Ok(offset)
    }

    /// Read the record at the given absolute offset.
    pub fn read(&self, offset: u64) -> Result<Record> {
        if offset < self.base_offset {
            return Err(Error::OffsetOutOfRange(offset));
        }
        // No record past the u32 relative width can exist; rejecting here
        // also keeps a huge relative offset from casting to the index's
        // read-last sentinel.
        let rel =
            u32::try_from(offset - self.base_offset).map_err(|_| Error::OffsetOutOfRange(offset))?;

        let (_, pos) = self.index.read(i64::from(rel)).map_err(|e| match e {
            Error::EndOfIndex => Error::OffsetOutOfRange(offset),
            other => other,
        })?;

        let payload = self.store.read(pos)?;
        Record::decode(payload)
    }

    /// Whether this segment has reached either of its size caps and the
    /// log should roll over to a fresh one.
    pub fn is_maxed(&self) -> bool {
        self.store.size() >= self.config.max_store_bytes
            || self.index.size() >= self.config.max_index_bytes
            || self.next_offset - self.base_offset > u64::from(u32::MAX)
    }

    /// First offset owned by this segment.
    pub fn base_offset(&self) -> u64 {
        self.base_offset
    }

    /// Offset the next appended record would receive. The segment holds
    /// exactly `next_offset - base_offset` records.
    pub fn next_offset(&self) -> u64 {
        self.next_offset
    }

    /// Shared handle to this segment's store, for the log-wide reader.
    pub(crate) fn store(&self) -> Arc<Store> {
        Arc::clone(&self.store)
    }

    /// Close the index (sync + shrink) and then the store (flush + sync).
    /// The ordering matters: the index truncation is what makes the
    /// segment recoverable on reopen.
    pub fn close(self) -> Result<()> {
        self.index.close()?;
        self.store.close()?;
        Ok(())
    }

    /// Close the segment and delete both files.
    pub fn remove(self) -> Result<()> {
        let Segment { store, index, .. } = self;

        index.remove()?;
        store.close()?;
        std::fs::remove_file(store.path())?;
        Ok(())
    }
}
