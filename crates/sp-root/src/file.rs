//! TFile header parsing and path-based object lookup.

use std::fs;
use std::path::{Path, PathBuf};

use crate::datasource::DataSource;
use crate::decompress::decompress;
use crate::directory::{Directory, DirectoryHeader};
use crate::error::{Result, RootError};
use crate::histogram::Histogram;
use crate::key::{Key, KeyInfo};
use crate::objects;
use crate::rbuffer::RBuffer;

const ROOT_MAGIC: &[u8; 4] = b"root";
/// Smallest possible small-file header.
const MIN_HEADER_LEN: usize = 64;
/// File format versions at or above this use 64-bit seek pointers.
const LARGE_FILE_VERSION: u32 = 1_000_000;

/// The parts of the file header needed to reach the top directory.
#[derive(Debug, Clone, Copy)]
struct FileHeader {
    is_large: bool,
    top: DirectoryHeader,
}

/// A ROOT file opened for reading histograms.
pub struct RootFile {
    data: DataSource,
    header: FileHeader,
    path: PathBuf,
}

impl std::fmt::Debug for RootFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RootFile")
            .field("path", &self.path)
            .field("len", &self.data.len())
            .field("is_large", &self.header.is_large)
            .finish()
    }
}

impl RootFile {
    /// Memory-map and parse a file on disk.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = fs::File::open(&path).map_err(|e| {
            std::io::Error::new(e.kind(), format!("{}: {e}", path.display()))
        })?;
        // SAFETY: the mapping is read-only and lives as long as `self`; ROOT
        // inputs are not rewritten while a plotting run reads them.
        let mmap = unsafe { memmap2::Mmap::map(&file)? };
        tracing::debug!(path = %path.display(), bytes = mmap.len(), "opened ROOT file");
        Self::from_source(DataSource::Mmap(mmap), path)
    }

    /// Parse a file already held in memory.
    pub fn from_bytes(data: Vec<u8>, path: impl Into<PathBuf>) -> Result<Self> {
        Self::from_source(DataSource::Owned(data), path.into())
    }

    fn from_source(data: DataSource, path: PathBuf) -> Result<Self> {
        if data.len() < MIN_HEADER_LEN || &data[0..4] != ROOT_MAGIC {
            return Err(RootError::BadMagic);
        }
        let header = parse_header(&data)?;
        Ok(Self { data, header, path })
    }

    /// Path the file was opened from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// List the keys of the top directory (`dir = ""`) or of a subdirectory path.
    pub fn list_keys(&self, dir: &str) -> Result<Vec<KeyInfo>> {
        let directory = self.resolve_directory(split_path(dir))?;
        Ok(directory.keys().iter().map(KeyInfo::from).collect())
    }

    /// Read a histogram by slash-separated path, e.g. `"OneMuon_375_475/HT_le3j_eq0b"`.
    pub fn get_histogram(&self, path: &str) -> Result<Histogram> {
        let parts = split_path(path);
        let (name, dirs) =
            parts.split_last().ok_or_else(|| RootError::KeyNotFound(path.to_string()))?;
        let directory = self.resolve_directory(dirs.to_vec())?;
        let key = directory
            .find(name)
            .ok_or_else(|| RootError::KeyNotFound(format!("{path} in {}", self.path.display())))?;
        if !objects::is_histogram_class(&key.class_name) {
            return Err(RootError::UnsupportedClass(format!("{} ({path})", key.class_name)));
        }
        let payload = self.read_payload(key)?;
        objects::read_histogram(&payload, &key.class_name)
    }

    fn resolve_directory(&self, parts: Vec<&str>) -> Result<Directory> {
        let mut dir = Directory::read(&self.data, self.header.top, self.header.is_large)?;
        for (depth, part) in parts.iter().enumerate() {
            let key = dir.find(part).ok_or_else(|| {
                RootError::KeyNotFound(format!("directory '{}'", parts[..=depth].join("/")))
            })?;
            if !key.is_directory() {
                return Err(RootError::Deserialization(format!(
                    "'{part}' is a {}, not a directory",
                    key.class_name
                )));
            }
            let payload = self.read_payload(key)?;
            let header = DirectoryHeader::read(&mut RBuffer::new(&payload))?;
            dir = Directory::read(&self.data, header, self.header.is_large)?;
        }
        Ok(dir)
    }

    /// Object bytes behind a key, inflated when stored compressed.
    fn read_payload(&self, key: &Key) -> Result<Vec<u8>> {
        let start = usize::try_from(key.seek_key)
            .map_err(|_| RootError::Deserialization(format!("seek {} too large", key.seek_key)))?;
        let end = start + key.n_bytes as usize;
        let record = self.data.get(start..end).ok_or(RootError::BufferUnderflow {
            offset: start,
            need: key.n_bytes as usize,
            have: self.data.len().saturating_sub(start),
        })?;
        let body = record.get(usize::from(key.key_len)..).ok_or_else(|| {
            RootError::Deserialization(format!("key '{}' shorter than its header", key.name))
        })?;
        if key.is_compressed() {
            decompress(body, key.obj_len as usize)
        } else {
            Ok(body.to_vec())
        }
    }
}

/// File header layout (small files; seek fields widen to u64 for large files):
/// ```text
/// "root" fVersion fBEGIN fEND fSeekFree fNbytesFree nfree fNbytesName fUnits fCompress ...
/// ```
/// The top TDirectory streamer sits at `fBEGIN + fNbytesName`.
fn parse_header(data: &[u8]) -> Result<FileHeader> {
    let mut r = RBuffer::at(data, ROOT_MAGIC.len());
    let version = r.read_u32()?;
    let is_large = version >= LARGE_FILE_VERSION;
    let begin = r.read_u32()? as usize;
    let _end = r.read_seek(is_large)?;
    let _seek_free = r.read_seek(is_large)?;
    let _nbytes_free = r.read_u32()?;
    let _n_free = r.read_u32()?;
    let nbytes_name = r.read_u32()? as usize;

    let dir_offset = begin + nbytes_name;
    if dir_offset >= data.len() {
        return Err(RootError::Deserialization("top directory offset past end of file".into()));
    }
    let top = DirectoryHeader::read(&mut RBuffer::at(data, dir_offset))?;
    Ok(FileHeader { is_large, top })
}

fn split_path(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_root_bytes() {
        let result = RootFile::from_bytes(vec![0u8; 100], "zeros.root");
        assert!(matches!(result, Err(RootError::BadMagic)));
    }

    #[test]
    fn rejects_truncated_header() {
        let result = RootFile::from_bytes(b"root".to_vec(), "short.root");
        assert!(matches!(result, Err(RootError::BadMagic)));
    }

    #[test]
    fn path_splitting_ignores_empty_segments() {
        assert_eq!(split_path("/a//b/"), vec!["a", "b"]);
        assert!(split_path("").is_empty());
    }
}
