//! Backing bytes for an open ROOT file.

use std::ops::Deref;

/// File bytes, either memory-mapped from disk or owned (in-memory files, tests).
pub enum DataSource {
    /// Owned buffer.
    Owned(Vec<u8>),
    /// Read-only memory map.
    Mmap(memmap2::Mmap),
}

impl Deref for DataSource {
    type Target = [u8];

    #[inline]
    fn deref(&self) -> &[u8] {
        match self {
            DataSource::Owned(v) => v,
            DataSource::Mmap(m) => m,
        }
    }
}
