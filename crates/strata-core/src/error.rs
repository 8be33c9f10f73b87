//! Error Types for Strata
//!
//! This module defines all error types that can occur in Strata operations.
//!
//! ## Error Categories
//!
//! ### I/O Errors
//! - `Io`: Any failure from the filesystem or the index memory map
//!
//! ### Domain Errors
//! - `OffsetOutOfRange`: The single user-visible domain error. Returned by
//!   `Log::read` when the requested offset precedes the lowest retained
//!   offset or exceeds the highest appended offset. Carries the offending
//!   offset so an RPC adapter can map it to an "out of range" status.
//!
//! ### Internal Sentinels
//! - `EndOfIndex`: Raised by index reads/writes when there is no such entry
//!   or no capacity remaining. Always translated by callers (segment
//!   recovery treats it as "empty segment"; rollover prevents it on the
//!   write path). It never escapes the public log operations.
//!
//! ### Guard Errors
//! - `SegmentOverflow`: A segment's relative offset would exceed the u32
//!   index entry width. Rollover caps segments far below this in practice.
//! - `TruncatedRecord`: A record payload too short to carry its offset
//!   header.
//! - `LogClosed`: An operation on a log whose segments have been closed or
//!   removed.
//! - `LockPoisoned`: A writer panicked while holding an internal lock.
//!
//! ## Usage
//!
//! All operations return `Result<T>`, aliased to `Result<T, Error>`, so
//! callers propagate with `?`.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("offset out of range: {0}")]
    OffsetOutOfRange(u64),

    #[error("end of index")]
    EndOfIndex,

    #[error("segment overflow: relative offset for {0} exceeds index entry width")]
    SegmentOverflow(u64),

    #[error("truncated record: {0} bytes is shorter than the offset header")]
    TruncatedRecord(usize),

    #[error("log is closed")]
    LogClosed,

    #[error("lock poisoned by a panicked writer")]
    LockPoisoned,
}

impl<T> From<std::sync::PoisonError<T>> for Error {
    fn from(_: std::sync::PoisonError<T>) -> Self {
        Error::LockPoisoned
    }
}
