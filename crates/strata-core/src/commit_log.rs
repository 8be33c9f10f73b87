//! Commit Log Capability
//!
//! The `CommitLog` trait is the contract a request/response layer (gRPC,
//! HTTP, replication) depends on. Serving code is written against this
//! trait so it can be handed the durable log in production and a cheap
//! in-memory fake in tests.
//!
//! The concrete implementation lives in `strata-storage`.

use crate::error::Result;
use crate::record::Record;

/// Append/read access to an ordered record log.
///
/// Implementations must be safe to share across threads: appends are
/// serialized internally, and reads may run concurrently with appends.
pub trait CommitLog: Send + Sync {
    /// Append a record, returning the offset the log assigned to it.
    fn append(&self, record: Record) -> Result<u64>;

    /// Read the record stored at `offset`.
    ///
    /// Returns [`Error::OffsetOutOfRange`](crate::Error::OffsetOutOfRange)
    /// when `offset` falls outside the retained range.
    fn read(&self, offset: u64) -> Result<Record>;
}
