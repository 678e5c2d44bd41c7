//! TKey records: the header ROOT writes in front of every stored object.

use crate::error::Result;
use crate::rbuffer::RBuffer;

/// Key versions above this use 64-bit seek pointers.
const LARGE_KEY_VERSION: u16 = 1000;

/// A parsed TKey header.
#[derive(Debug, Clone)]
pub struct Key {
    /// Bytes on disk: key header plus (possibly compressed) object.
    pub n_bytes: u32,
    /// Uncompressed object length.
    pub obj_len: u32,
    /// Length of the key header.
    pub key_len: u16,
    /// Cycle number; several cycles of one name may coexist.
    pub cycle: u16,
    /// Absolute offset of this key in the file.
    pub seek_key: u64,
    /// Class of the stored object, e.g. `TH1D`.
    pub class_name: String,
    /// Object name.
    pub name: String,
    /// Object title.
    pub title: String,
}

impl Key {
    /// Parse a key header at the cursor.
    pub fn read(r: &mut RBuffer<'_>, file_is_large: bool) -> Result<Self> {
        let n_bytes = r.read_u32()?;
        let version = r.read_u16()?;
        let obj_len = r.read_u32()?;
        let _datime = r.read_u32()?;
        let key_len = r.read_u16()?;
        let cycle = r.read_u16()?;
        let large = file_is_large || version > LARGE_KEY_VERSION;
        let seek_key = r.read_seek(large)?;
        let _seek_pdir = r.read_seek(large)?;
        let class_name = r.read_string()?;
        let name = r.read_string()?;
        let title = r.read_string()?;
        Ok(Self { n_bytes, obj_len, key_len, cycle, seek_key, class_name, name, title })
    }

    /// Whether the object payload is stored compressed.
    pub fn is_compressed(&self) -> bool {
        self.obj_len != self.n_bytes.saturating_sub(u32::from(self.key_len))
    }

    /// Whether this key points at a subdirectory.
    pub fn is_directory(&self) -> bool {
        matches!(self.class_name.as_str(), "TDirectoryFile" | "TDirectory")
    }
}

/// Public summary of a key, returned by directory listings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyInfo {
    /// Object name.
    pub name: String,
    /// Object class.
    pub class_name: String,
    /// Object title.
    pub title: String,
    /// Cycle number.
    pub cycle: u16,
}

impl From<&Key> for KeyInfo {
    fn from(key: &Key) -> Self {
        Self {
            name: key.name.clone(),
            class_name: key.class_name.clone(),
            title: key.title.clone(),
            cycle: key.cycle,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(version: u16, seek: u64) -> Vec<u8> {
        let mut b = Vec::new();
        b.extend_from_slice(&120u32.to_be_bytes());
        b.extend_from_slice(&version.to_be_bytes());
        b.extend_from_slice(&200u32.to_be_bytes());
        b.extend_from_slice(&0u32.to_be_bytes());
        b.extend_from_slice(&60u16.to_be_bytes());
        b.extend_from_slice(&2u16.to_be_bytes());
        if version > LARGE_KEY_VERSION {
            b.extend_from_slice(&seek.to_be_bytes());
            b.extend_from_slice(&0u64.to_be_bytes());
        } else {
            b.extend_from_slice(&(seek as u32).to_be_bytes());
            b.extend_from_slice(&0u32.to_be_bytes());
        }
        for s in ["TH1D", "HT_all", "H_{T}"] {
            b.push(s.len() as u8);
            b.extend_from_slice(s.as_bytes());
        }
        b
    }

    #[test]
    fn small_key() {
        let data = encode(4, 4096);
        let key = Key::read(&mut RBuffer::new(&data), false).unwrap();
        assert_eq!(key.seek_key, 4096);
        assert_eq!(key.cycle, 2);
        assert_eq!(key.class_name, "TH1D");
        assert_eq!(key.name, "HT_all");
        assert_eq!(key.title, "H_{T}");
        assert!(key.is_compressed());
        assert!(!key.is_directory());
    }

    #[test]
    fn large_key_uses_wide_seeks() {
        let data = encode(1004, 5_000_000_000);
        let key = Key::read(&mut RBuffer::new(&data), false).unwrap();
        assert_eq!(key.seek_key, 5_000_000_000);
    }
}
