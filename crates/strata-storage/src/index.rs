//! Index - Memory-Mapped Offset Table
//!
//! This module implements `Index`, the fixed-width table mapping a
//! record's offset (relative to its segment's base) to the byte position
//! of its frame in the store file.
//!
//! ## File Format
//!
//! A dense sequence of 12-byte entries, written in increasing relative
//! offset order starting at 0, with no gaps:
//!
//! ```text
//! ┌──────────────────┬──────────────────┐
//! │ Relative offset  │ Store position   │
//! │ (4 bytes BE)     │ (8 bytes BE)     │
//! └──────────────────┴──────────────────┘
//! ```
//!
//! The 4-byte relative offset keeps entries at 12 bytes instead of 16,
//! doubling index density; rollover keeps segments far below the 2^32
//! record cap this implies.
//!
//! ## Pre-Sizing and the Memory Map
//!
//! A memory map cannot grow, so on open the file is truncated *up* to
//! `max_index_bytes` before mapping. `size` tracks the bytes actually
//! populated. On close the file is shrunk back to `size`, which is how a
//! reopen recovers the entry count from the file length alone.
//!
//! After an unclean shutdown the file keeps its full pre-sized length and
//! a reopen will see trailing zero entries as populated. Scanning back to
//! the last non-zero entry (or journaling `size` elsewhere) would close
//! that gap; neither is implemented here.
//!
//! ## Thread Safety
//!
//! `Index` has no internal lock. Callers serialize through the owning
//! segment, which is only touched under the log's lock.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use memmap2::MmapMut;
use strata_core::{Error, Result};

/// Width of one index entry: 4-byte relative offset + 8-byte position.
pub const ENTRY_WIDTH: u64 = 12;

const REL_OFF_WIDTH: usize = 4;

/// Memory-mapped (relative offset → store position) table
#[derive(Debug)]
pub struct Index {
    file: File,
    path: PathBuf,
    mmap: MmapMut,
    size: u64,
}

impl Index {
    /// Open or create the index file at `path`, pre-sizing it to
    /// `max_index_bytes` and mapping it read-write.
    ///
    /// `size` starts at the file's length before pre-sizing, so a cleanly
    /// closed index resumes exactly after its last entry.
    pub fn open(path: impl AsRef<Path>, max_index_bytes: u64) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .open(&path)?;

        let size = file.metadata()?.len();
        file.set_len(max_index_bytes)?;

        // SAFETY: the file stays open and exclusively owned by this Index
        // for the lifetime of the map; all accesses are bounds-checked
        // against the mapped length.
        let mmap = unsafe { MmapMut::map_mut(&file)? };

        Ok(Self {
            file,
            path,
            mmap,
            size,
        })
    }

    /// Append an entry. Fails with [`Error::EndOfIndex`] when the mapped
    /// region has no room for another entry; the map never grows.
    pub fn write(&mut self, rel_off: u32, pos: u64) -> Result<()> {
        if (self.mmap.len() as u64) < self.size + ENTRY_WIDTH {
            return Err(Error::EndOfIndex);
        }

        let at = self.size as usize;
        self.mmap[at..at + REL_OFF_WIDTH].copy_from_slice(&rel_off.to_be_bytes());
        self.mmap[at + REL_OFF_WIDTH..at + ENTRY_WIDTH as usize]
            .copy_from_slice(&pos.to_be_bytes());

        self.size += ENTRY_WIDTH;
        Ok(())
    }

    /// Read the entry at position `at`, or the last entry when `at == -1`.
    ///
    /// Returns `(relative_offset, store_position)`, or
    /// [`Error::EndOfIndex`] when the index is empty or `at` lands past
    /// the populated region.
    pub fn read(&self, at: i64) -> Result<(u32, u64)> {
        if self.size == 0 {
            return Err(Error::EndOfIndex);
        }

        let entry = if at == -1 {
            self.size / ENTRY_WIDTH - 1
        } else {
            at as u64
        };

        let p = entry.checked_mul(ENTRY_WIDTH).ok_or(Error::EndOfIndex)?;
        let end = p.checked_add(ENTRY_WIDTH).ok_or(Error::EndOfIndex)?;
        if self.size < end {
            return Err(Error::EndOfIndex);
        }

        let p = p as usize;
        let rel_off = u32::from_be_bytes(
            self.mmap[p..p + REL_OFF_WIDTH]
                .try_into()
                .expect("slice is REL_OFF_WIDTH bytes"),
        );
        let pos = u64::from_be_bytes(
            self.mmap[p + REL_OFF_WIDTH..p + ENTRY_WIDTH as usize]
                .try_into()
                .expect("slice is 8 bytes"),
        );
        Ok((rel_off, pos))
    }

    /// Bytes of the index actually populated with entries.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Number of entries in the index.
    pub fn entries(&self) -> u64 {
        self.size / ENTRY_WIDTH
    }

    /// Sync the map and file, then shrink the file to the populated size
    /// so the entry count survives a reopen.
    pub fn close(self) -> Result<()> {
        let Index {
            file, mmap, size, ..
        } = self;

        mmap.flush()?;
        file.sync_all()?;
        // Unmap before shrinking the file underneath the mapping.
        drop(mmap);
        file.set_len(size)?;
        Ok(())
    }

    /// Close the index and delete its file.
    pub fn remove(self) -> Result<()> {
        let path = self.path.clone();
        self.close()?;
        std::fs::remove_file(path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const MAX_INDEX_BYTES: u64 = 1024;

    // ---------------------------------------------------------------
    // Empty index
    // ---------------------------------------------------------------

    #[test]
    fn test_read_empty_index() {
        let dir = TempDir::new().unwrap();
        let index = Index::open(dir.path().join("0.index"), MAX_INDEX_BYTES).unwrap();

        assert!(matches!(index.read(-1), Err(Error::EndOfIndex)));
        assert_eq!(index.entries(), 0);
    }

    // ---------------------------------------------------------------
    // Write / read entries
    // ---------------------------------------------------------------

    #[test]
    fn test_write_read_entries() {
        let dir = TempDir::new().unwrap();
        let mut index = Index::open(dir.path().join("0.index"), MAX_INDEX_BYTES).unwrap();

        let entries: &[(u32, u64)] = &[(0, 0), (1, 10)];
        for &(off, pos) in entries {
            index.write(off, pos).unwrap();

            let (read_off, read_pos) = index.read(off as i64).unwrap();
            assert_eq!(read_off, off);
            assert_eq!(read_pos, pos);
        }

        // Last-entry shorthand
        let (off, pos) = index.read(-1).unwrap();
        assert_eq!(off, 1);
        assert_eq!(pos, 10);

        // Past the populated region
        assert!(matches!(index.read(123), Err(Error::EndOfIndex)));
    }

    #[test]
    fn test_write_fails_when_full() {
        let dir = TempDir::new().unwrap();
        // Room for exactly two entries
        let mut index = Index::open(dir.path().join("0.index"), 2 * ENTRY_WIDTH).unwrap();

        index.write(0, 0).unwrap();
        index.write(1, 19).unwrap();
        assert!(matches!(index.write(2, 38), Err(Error::EndOfIndex)));
        assert_eq!(index.entries(), 2);
    }

    // ---------------------------------------------------------------
    // Close / reopen recoverability
    // ---------------------------------------------------------------

    #[test]
    fn test_close_truncates_and_reopen_recovers() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("0.index");

        let mut index = Index::open(&path, MAX_INDEX_BYTES).unwrap();
        index.write(0, 0).unwrap();
        index.write(1, 10).unwrap();
        index.close().unwrap();

        // A clean close shrinks the file to exactly the populated bytes.
        assert_eq!(std::fs::metadata(&path).unwrap().len(), 2 * ENTRY_WIDTH);

        let reopened = Index::open(&path, MAX_INDEX_BYTES).unwrap();
        let (off, pos) = reopened.read(-1).unwrap();
        assert_eq!(off, 1);
        assert_eq!(pos, 10);
        assert_eq!(reopened.entries(), 2);
    }

    #[test]
    fn test_reopen_continues_writing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("0.index");

        let mut index = Index::open(&path, MAX_INDEX_BYTES).unwrap();
        index.write(0, 0).unwrap();
        index.close().unwrap();

        let mut reopened = Index::open(&path, MAX_INDEX_BYTES).unwrap();
        reopened.write(1, 19).unwrap();

        let (off, pos) = reopened.read(-1).unwrap();
        assert_eq!(off, 1);
        assert_eq!(pos, 19);
    }

    // ---------------------------------------------------------------
    // Remove
    // ---------------------------------------------------------------

    #[test]
    fn test_remove_deletes_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("0.index");

        let mut index = Index::open(&path, MAX_INDEX_BYTES).unwrap();
        index.write(0, 0).unwrap();
        index.remove().unwrap();

        assert!(!path.exists());
    }
}
