//! Strata Storage Layer
//!
//! This crate implements the storage layer for Strata - a durable,
//! segmented, append-only commit log over a local directory.
//!
//! ## What is the Storage Layer?
//!
//! The log assigns every appended record a monotonically increasing u64
//! offset and serves reads by offset. Three subsystems cooperate:
//!
//! 1. **Store**: length-prefixed, buffered, append-only data file
//! 2. **Index**: fixed-width, memory-mapped (offset → position) table
//! 3. **Log/Segment**: pairs of (store, index) files grouped under a base
//!    offset, rolled over when full, routed by offset range
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────┐
//! │  Producers  │
//! └──────┬──────┘
//!        │ append(record)
//!        ▼
//! ┌───────────────────┐
//! │ Log               │ routes to the active segment,
//! │  ├─ Segment 0     │ rolls over when a segment is full,
//! │  ├─ Segment 1     │ truncates whole-segment prefixes
//! │  └─ Segment N ◄───│── active (only this one accepts appends)
//! └──────┬────────────┘
//!        │ per segment
//!        ▼
//! ┌──────────────┐   ┌───────────────┐
//! │ Store        │   │ Index         │
//! │ <base>.store │   │ <base>.index  │
//! │ framed bytes │   │ mmap'd table  │
//! └──────────────┘   └───────────────┘
//! ```
//!
//! ## Data Flow
//!
//! **Append**: `Log` → active `Segment` → `Store::append` yields the byte
//! position → `Index::write` records (relative offset, position).
//!
//! **Read**: `Log` selects the segment owning the offset → `Index::read`
//! yields the position → `Store::read` returns the framed payload →
//! decode into a [`Record`](strata_core::Record).
//!
//! ## Usage Example
//!
//! ```ignore
//! use strata_core::Record;
//! use strata_storage::{Log, LogConfig};
//!
//! let log = Log::open("/var/lib/strata/orders-0", LogConfig::default())?;
//!
//! let offset = log.append(Record::new("hello world"))?;
//! let record = log.read(offset)?;
//! assert_eq!(&record.value[..], b"hello world");
//! ```
//!
//! ## Concurrency
//!
//! A `Log` is shared across native threads. Appends, truncation, and
//! teardown take its write lock; reads take the read lock. Each store
//! additionally guards its buffer and size with a mutex so the
//! concatenated [`LogReader`] can stream bytes while appends continue.
//!
//! A log directory is owned by at most one live `Log` instance;
//! cross-process sharing is not supported.

pub mod config;
pub mod index;
pub mod log;
pub mod reader;
pub mod segment;
pub mod store;

pub use config::{LogConfig, SegmentConfig};
pub use index::Index;
pub use log::Log;
pub use reader::LogReader;
pub use segment::Segment;
pub use store::Store;

pub use strata_core::{CommitLog, Error, Record, Result};
