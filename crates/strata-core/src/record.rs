//! Record Data Structure
//!
//! This module defines the core `Record` type - the fundamental unit of data in Strata.
//!
//! ## What is a Record?
//! A record is a single entry in the commit log, similar to:
//! - A Kafka message
//! - A WAL entry
//! - An event in an event stream
//!
//! ## Structure
//! Each record contains:
//! - **offset**: Unique, monotonically increasing ID assigned by the log at
//!   append time. Any caller-supplied value is overwritten.
//! - **value**: The actual payload (arbitrary bytes, opaque to the log)
//!
//! ## Wire Format
//! The store frames every payload with its own 8-byte big-endian length
//! prefix, so the record encoding does not need to be self-delimiting:
//!
//! ```text
//! ┌──────────────────┬──────────────────┐
//! │ Offset           │ Value            │
//! │ (8 bytes, BE)    │ (remaining bytes)│
//! └──────────────────┴──────────────────┘
//! ```
//!
//! ## Design Decisions
//! - Uses `bytes::Bytes` for zero-copy operations (no allocations when slicing)
//! - Implements `Serialize`/`Deserialize` for metadata and wire adapters
//! - Offset is u64 to support very large logs (18 quintillion records)
//!
//! ## Example
//! ```ignore
//! let record = Record::new(Bytes::from("hello world"));
//! let offset = log.append(record)?;       // offset assigned here
//! let read_back = log.read(offset)?;      // {offset, value: "hello world"}
//! ```

use bytes::{Buf, BufMut, Bytes, BytesMut};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Width of the offset header in the record wire format.
pub const OFFSET_WIDTH: usize = 8;

/// A single record in the commit log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Offset of this record in the log
    pub offset: u64,

    /// Value (payload)
    pub value: Bytes,
}

impl Record {
    /// Create a record carrying the given payload. The offset starts at zero
    /// and is stamped by the log when the record is appended.
    pub fn new(value: impl Into<Bytes>) -> Self {
        Self {
            offset: 0,
            value: value.into(),
        }
    }

    /// Create a record with an explicit offset (used when decoding).
    pub fn with_offset(offset: u64, value: impl Into<Bytes>) -> Self {
        Self {
            offset,
            value: value.into(),
        }
    }

    /// Exact size of the encoded record in bytes.
    pub fn encoded_len(&self) -> usize {
        OFFSET_WIDTH + self.value.len()
    }

    /// Encode this record into the provided buffer.
    pub fn encode(&self, buf: &mut impl BufMut) {
        buf.put_u64(self.offset);
        buf.put_slice(&self.value);
    }

    /// Encode this record into a freshly allocated buffer.
    pub fn to_bytes(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(self.encoded_len());
        self.encode(&mut buf);
        buf.freeze()
    }

    /// Decode a record from its wire form. The input must be exactly one
    /// encoded record; everything past the offset header is the value.
    pub fn decode(mut data: Bytes) -> Result<Self> {
        if data.len() < OFFSET_WIDTH {
            return Err(Error::TruncatedRecord(data.len()));
        }
        let offset = data.get_u64();
        Ok(Self {
            offset,
            value: data,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ---------------------------------------------------------------
    // Construction
    // ---------------------------------------------------------------

    #[test]
    fn test_new_starts_at_offset_zero() {
        let rec = Record::new(Bytes::from("hello world"));
        assert_eq!(rec.offset, 0);
        assert_eq!(rec.value, Bytes::from("hello world"));
    }

    #[test]
    fn test_with_offset() {
        let rec = Record::with_offset(42, Bytes::from("payload"));
        assert_eq!(rec.offset, 42);
        assert_eq!(rec.value, Bytes::from("payload"));
    }

    #[test]
    fn test_new_with_empty_value() {
        let rec = Record::new(Bytes::new());
        assert!(rec.value.is_empty());
    }

    #[test]
    fn test_new_from_static_str() {
        let rec = Record::new("static payload");
        assert_eq!(rec.value, Bytes::from("static payload"));
    }

    // ---------------------------------------------------------------
    // encoded_len
    // ---------------------------------------------------------------

    #[test]
    fn test_encoded_len() {
        let rec = Record::new(Bytes::from("hello world"));
        // 8 (offset) + 11 (value) = 19
        assert_eq!(rec.encoded_len(), 19);
    }

    #[test]
    fn test_encoded_len_empty_value() {
        let rec = Record::new(Bytes::new());
        assert_eq!(rec.encoded_len(), OFFSET_WIDTH);
    }

    // ---------------------------------------------------------------
    // Encode / decode round-trip
    // ---------------------------------------------------------------

    #[test]
    fn test_roundtrip() {
        let rec = Record::with_offset(7, Bytes::from("hello world"));
        let decoded = Record::decode(rec.to_bytes()).expect("decode");
        assert_eq!(decoded, rec);
    }

    #[test]
    fn test_roundtrip_empty_value() {
        let rec = Record::with_offset(3, Bytes::new());
        let decoded = Record::decode(rec.to_bytes()).expect("decode");
        assert_eq!(decoded.offset, 3);
        assert!(decoded.value.is_empty());
    }

    #[test]
    fn test_roundtrip_binary_value() {
        let rec = Record::with_offset(u64::MAX, Bytes::from(vec![0u8, 1, 2, 255, 254, 253]));
        let decoded = Record::decode(rec.to_bytes()).expect("decode");
        assert_eq!(decoded, rec);
    }

    #[test]
    fn test_roundtrip_large_value() {
        let rec = Record::with_offset(9, Bytes::from(vec![0xAB; 1_000_000]));
        let decoded = Record::decode(rec.to_bytes()).expect("decode");
        assert_eq!(decoded.value.len(), 1_000_000);
    }

    #[test]
    fn test_encode_layout_is_big_endian() {
        let rec = Record::with_offset(0x0102_0304_0506_0708, Bytes::from("x"));
        let bytes = rec.to_bytes();
        assert_eq!(&bytes[..8], &[1, 2, 3, 4, 5, 6, 7, 8]);
        assert_eq!(&bytes[8..], b"x");
    }

    #[test]
    fn test_decode_rejects_short_input() {
        let err = Record::decode(Bytes::from(vec![0u8; 7])).unwrap_err();
        assert!(matches!(err, Error::TruncatedRecord(7)));
    }

    #[test]
    fn test_decode_exact_header_is_empty_value() {
        let rec = Record::decode(Bytes::from(vec![0u8; 8])).expect("decode");
        assert_eq!(rec.offset, 0);
        assert!(rec.value.is_empty());
    }

    // ---------------------------------------------------------------
    // Serde round-trip (JSON)
    // ---------------------------------------------------------------

    #[test]
    fn test_serde_roundtrip() {
        let rec = Record::with_offset(100, Bytes::from(r#"{"action":"click"}"#));
        let json = serde_json::to_string(&rec).expect("serialize");
        let deserialized: Record = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(rec, deserialized);
    }

    #[test]
    fn test_serde_json_structure() {
        let rec = Record::with_offset(42, Bytes::from("hi"));
        let val: serde_json::Value = serde_json::to_value(&rec).expect("to_value");
        assert_eq!(val["offset"], 42);
    }
}
