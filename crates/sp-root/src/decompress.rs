//! ROOT compressed-record inflation.
//!
//! A compressed object is a sequence of blocks, each with a 9-byte header:
//! ```text
//! 0..2  algorithm tag: "ZL" zlib, "L4" LZ4, "ZS" ZSTD, "XZ" LZMA
//! 2     method byte (unused here)
//! 3..6  compressed size, 24-bit little-endian
//! 6..9  uncompressed size, 24-bit little-endian
//! ```

use std::io::Read;

use crate::error::{Result, RootError};

const BLOCK_HEADER_LEN: usize = 9;
/// ROOT prefixes every LZ4 block with an xxhash64 of the payload.
const LZ4_CHECKSUM_LEN: usize = 8;

/// Compression algorithm named by a block tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Algorithm {
    /// zlib / deflate.
    Zlib,
    /// LZ4 with ROOT's checksum prefix.
    Lz4,
    /// Zstandard.
    Zstd,
    /// XZ / LZMA.
    Xz,
}

impl Algorithm {
    fn from_tag(tag: &[u8]) -> Result<Self> {
        match tag {
            b"ZL" => Ok(Self::Zlib),
            b"L4" => Ok(Self::Lz4),
            b"ZS" => Ok(Self::Zstd),
            b"XZ" => Ok(Self::Xz),
            other => Err(RootError::Decompression(format!(
                "unknown compression tag {:?}",
                String::from_utf8_lossy(other)
            ))),
        }
    }

    fn inflate(self, block: &[u8], expected: usize) -> Result<Vec<u8>> {
        match self {
            Self::Zlib => {
                let mut out = Vec::with_capacity(expected);
                flate2::read::ZlibDecoder::new(block)
                    .read_to_end(&mut out)
                    .map_err(|e| RootError::Decompression(format!("zlib: {e}")))?;
                Ok(out)
            }
            Self::Lz4 => {
                let payload = block.get(LZ4_CHECKSUM_LEN..).ok_or_else(|| {
                    RootError::Decompression("lz4 block shorter than its checksum".into())
                })?;
                lz4_flex::decompress(payload, expected)
                    .map_err(|e| RootError::Decompression(format!("lz4: {e}")))
            }
            Self::Zstd => {
                let mut out = vec![0u8; expected];
                let written = ruzstd::decoding::FrameDecoder::new()
                    .decode_all(block, &mut out)
                    .map_err(|e| RootError::Decompression(format!("zstd: {e}")))?;
                out.truncate(written);
                Ok(out)
            }
            Self::Xz => {
                let mut out = Vec::with_capacity(expected);
                lzma_rs::xz_decompress(&mut std::io::BufReader::new(block), &mut out)
                    .map_err(|e| RootError::Decompression(format!("xz: {e}")))?;
                Ok(out)
            }
        }
    }
}

/// Inflate a compressed object into exactly `expected_len` bytes.
pub fn decompress(src: &[u8], expected_len: usize) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(expected_len);
    let mut offset = 0;

    while out.len() < expected_len {
        let header = src.get(offset..offset + BLOCK_HEADER_LEN).ok_or_else(|| {
            RootError::Decompression(format!(
                "truncated block header at offset {offset} ({} of {expected_len} bytes inflated)",
                out.len()
            ))
        })?;
        let algorithm = Algorithm::from_tag(&header[0..2])?;
        let c_size = le24(&header[3..6]);
        let u_size = le24(&header[6..9]);
        offset += BLOCK_HEADER_LEN;

        let block = src.get(offset..offset + c_size).ok_or_else(|| {
            RootError::Decompression(format!(
                "block claims {c_size} compressed bytes, {} remain",
                src.len().saturating_sub(offset)
            ))
        })?;
        let inflated = algorithm.inflate(block, u_size)?;
        if inflated.len() != u_size {
            return Err(RootError::Decompression(format!(
                "{algorithm:?} block inflated to {} bytes, header says {u_size}",
                inflated.len()
            )));
        }
        out.extend_from_slice(&inflated);
        offset += c_size;
    }

    if out.len() != expected_len {
        return Err(RootError::Decompression(format!(
            "inflated {} bytes, expected {expected_len}",
            out.len()
        )));
    }
    Ok(out)
}

fn le24(b: &[u8]) -> usize {
    usize::from(b[0]) | usize::from(b[1]) << 8 | usize::from(b[2]) << 16
}
