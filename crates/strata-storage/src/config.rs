//! Log Configuration
//!
//! This module defines configuration for the segmented log.
//!
//! ## SegmentConfig
//!
//! Controls how segments are sized and where a fresh log starts:
//!
//! - **max_store_bytes**: Roll the active segment when its store reaches
//!   this size (default: 1024). Payloads are variable length, so the store
//!   may exceed the cap by one record before the roll happens.
//! - **max_index_bytes**: Roll when the index reaches this size
//!   (default: 1024). Index entries are a fixed 12 bytes, so choosing a
//!   multiple of 12 avoids wasted tail space.
//! - **initial_offset**: Base offset of the first segment of a fresh log
//!   (default: 0). Ignored when opening a directory that already holds
//!   segments.
//!
//! ## Usage
//!
//! ```ignore
//! use strata_storage::{LogConfig, SegmentConfig};
//!
//! // Production-ish config
//! let config = LogConfig {
//!     segment: SegmentConfig {
//!         max_store_bytes: 64 * 1024 * 1024,
//!         max_index_bytes: 12 * 1024 * 1024,
//!         ..Default::default()
//!     },
//! };
//!
//! // Tiny segments for tests (forces frequent rollover)
//! let config = LogConfig {
//!     segment: SegmentConfig {
//!         max_store_bytes: 32,
//!         ..Default::default()
//!     },
//! };
//! ```

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LogConfig {
    /// Segment sizing and placement
    #[serde(default)]
    pub segment: SegmentConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SegmentConfig {
    /// Maximum store file size in bytes before rolling (default: 1024)
    #[serde(default = "default_max_store_bytes")]
    pub max_store_bytes: u64,

    /// Maximum index file size in bytes before rolling (default: 1024)
    #[serde(default = "default_max_index_bytes")]
    pub max_index_bytes: u64,

    /// Base offset for the first segment of a fresh log (default: 0)
    #[serde(default)]
    pub initial_offset: u64,
}

impl Default for SegmentConfig {
    fn default() -> Self {
        Self {
            max_store_bytes: default_max_store_bytes(),
            max_index_bytes: default_max_index_bytes(),
            initial_offset: 0,
        }
    }
}

impl SegmentConfig {
    /// Replace zero-valued size limits with the defaults. Lets callers
    /// build a config from sparse sources (flags, env) without tripping
    /// over an unmappable zero-length index.
    pub(crate) fn normalize(&mut self) {
        if self.max_store_bytes == 0 {
            self.max_store_bytes = default_max_store_bytes();
        }
        if self.max_index_bytes == 0 {
            self.max_index_bytes = default_max_index_bytes();
        }
    }
}

fn default_max_store_bytes() -> u64 {
    1024
}

fn default_max_index_bytes() -> u64 {
    1024
}
