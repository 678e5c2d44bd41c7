//! TDirectory streamers and key lists.

use crate::error::Result;
use crate::key::Key;
use crate::rbuffer::RBuffer;

/// Directory versions above this use 64-bit seek pointers.
const LARGE_DIR_VERSION: u16 = 1000;

/// The seek information carried by a TDirectory streamer.
#[derive(Debug, Clone, Copy)]
pub struct DirectoryHeader {
    /// Offset of the key list; 0 for an empty directory.
    pub seek_keys: u64,
    /// Size of the key list record.
    pub nbytes_keys: u32,
}

impl DirectoryHeader {
    /// Parse a TDirectory streamer at the cursor.
    pub fn read(r: &mut RBuffer<'_>) -> Result<Self> {
        let version = r.read_u16()?;
        let _datime_c = r.read_u32()?;
        let _datime_m = r.read_u32()?;
        let nbytes_keys = r.read_u32()?;
        let _nbytes_name = r.read_u32()?;
        let large = version > LARGE_DIR_VERSION;
        let _seek_dir = r.read_seek(large)?;
        let _seek_parent = r.read_seek(large)?;
        let seek_keys = r.read_seek(large)?;
        Ok(Self { seek_keys, nbytes_keys })
    }
}

/// The keys of one directory, in on-disk order.
#[derive(Debug, Clone, Default)]
pub struct Directory {
    keys: Vec<Key>,
}

impl Directory {
    /// Read the key list a directory header points at.
    ///
    /// The list is itself stored behind a TKey, followed by a u32 count and
    /// that many key headers.
    pub fn read(file: &[u8], header: DirectoryHeader, file_is_large: bool) -> Result<Self> {
        if header.seek_keys == 0 {
            return Ok(Self::default());
        }
        let mut r = RBuffer::at(file, header.seek_keys as usize);
        let _list_key = Key::read(&mut r, file_is_large)?;
        let n_keys = r.read_u32()? as usize;
        let keys =
            (0..n_keys).map(|_| Key::read(&mut r, file_is_large)).collect::<Result<Vec<_>>>()?;
        tracing::trace!(n_keys, seek = header.seek_keys, "read key list");
        Ok(Self { keys })
    }

    /// All keys, every cycle included.
    pub fn keys(&self) -> &[Key] {
        &self.keys
    }

    /// Highest cycle stored under `name`.
    pub fn find(&self, name: &str) -> Option<&Key> {
        self.keys.iter().filter(|k| k.name == name).max_by_key(|k| k.cycle)
    }
}
