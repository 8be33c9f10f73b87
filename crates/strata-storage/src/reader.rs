//! LogReader - Sequential Byte Stream Over Every Segment
//!
//! `LogReader` implements [`std::io::Read`] over the concatenated store
//! files of a log, in segment order. Consumers see raw frames
//! (`[length u64 BE][payload]`) back to back, exactly as stored - the
//! shape needed to snapshot a log or ship it to another node wholesale.
//!
//! The reader holds shared handles to the stores it was created over, so
//! it keeps streaming consistently even if the log truncates or rolls
//! over behind it; segments created after the reader are not included.
//! Each positional read goes through the store's own mutex, which also
//! flushes any buffered frames first, so the stream never tears a frame
//! that a concurrent append already returned for.

use std::io::{self, Read};
use std::sync::Arc;

use crate::store::Store;

/// Sequential reader over the raw store bytes of a log
#[derive(Debug)]
pub struct LogReader {
    stores: Vec<Arc<Store>>,
    current: usize,
    pos: u64,
}

impl LogReader {
    pub(crate) fn new(stores: Vec<Arc<Store>>) -> Self {
        Self {
            stores,
            current: 0,
            pos: 0,
        }
    }
}

impl Read for LogReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }

        while let Some(store) = self.stores.get(self.current) {
            let n = store
                .read_at(buf, self.pos)
                .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;

            if n > 0 {
                self.pos += n as u64;
                return Ok(n);
            }

            // This store is exhausted; continue with the next segment.
            self.current += 1;
            self.pos = 0;
        }

        Ok(0)
    }
}
