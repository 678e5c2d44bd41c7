//! Minimal ROOT file writer for TH1D histograms in nested directories.
//!
//! Produces small-format (32-bit seek) files that [`RootFile`](crate::RootFile)
//! reads back. Only what the reader needs is written: histogram records,
//! directory streamers and key lists. Used to build test inputs and small
//! example files without a ROOT installation.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;

use crate::error::Result;
use crate::histogram::Histogram;

const FILE_VERSION: u32 = 62206;
const KEY_VERSION: u16 = 4;
const DIR_VERSION: u16 = 5;
const TOP_DIR_OFFSET: usize = 100;
const FIRST_RECORD: usize = 200;
const BYTE_COUNT_MASK: u32 = 0x4000_0000;

#[derive(Default)]
struct DirNode {
    dirs: BTreeMap<String, DirNode>,
    hists: Vec<Histogram>,
}

/// Accumulates histograms and serializes them into a ROOT file.
#[derive(Default)]
pub struct RootFileWriter {
    root: DirNode,
    zlib: bool,
}

struct WrittenKey {
    header: Vec<u8>,
}

impl RootFileWriter {
    /// Empty file; payloads stored uncompressed.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store object payloads zlib-compressed.
    pub fn with_zlib(mut self, zlib: bool) -> Self {
        self.zlib = zlib;
        self
    }

    /// Add a histogram under `dir` (slash-separated, `""` for the top directory).
    /// The key name is the histogram's `name`.
    pub fn add(&mut self, dir: &str, hist: Histogram) -> &mut Self {
        let mut node = &mut self.root;
        for part in dir.split('/').filter(|s| !s.is_empty()) {
            node = node.dirs.entry(part.to_string()).or_default();
        }
        node.hists.push(hist);
        self
    }

    /// Serialize the whole file.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = vec![0u8; FIRST_RECORD];
        let top_keys = self.write_dir(&mut out, &self.root, "");

        let mut head = Vec::with_capacity(TOP_DIR_OFFSET);
        head.extend_from_slice(b"root");
        put_u32(&mut head, FILE_VERSION);
        put_u32(&mut head, TOP_DIR_OFFSET as u32); // fBEGIN
        put_u32(&mut head, out.len() as u32); // fEND
        put_u32(&mut head, 0); // fSeekFree
        put_u32(&mut head, 0); // fNbytesFree
        put_u32(&mut head, 0); // nfree
        put_u32(&mut head, 0); // fNbytesName: directory streamer right at fBEGIN
        head.push(4); // fUnits
        put_u32(&mut head, if self.zlib { 101 } else { 0 });
        put_u32(&mut head, 0); // fSeekInfo
        put_u32(&mut head, 0); // fNbytesInfo
        head.extend_from_slice(&[0u8; 18]); // UUID
        out[..head.len()].copy_from_slice(&head);

        let streamer = dir_streamer(top_keys.0, top_keys.1);
        out[TOP_DIR_OFFSET..TOP_DIR_OFFSET + streamer.len()].copy_from_slice(&streamer);
        out
    }

    /// Serialize and write to `path`.
    pub fn write(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path, self.to_bytes())?;
        Ok(())
    }

    /// Write a directory's children and key list; returns (seek_keys, nbytes_keys).
    fn write_dir(&self, out: &mut Vec<u8>, node: &DirNode, name: &str) -> (u32, u32) {
        let mut keys = Vec::new();
        for (sub_name, sub) in &node.dirs {
            let (seek_keys, nbytes_keys) = self.write_dir(out, sub, sub_name);
            let payload = dir_streamer(seek_keys, nbytes_keys);
            keys.push(write_record(out, "TDirectoryFile", sub_name, sub_name, &payload, false));
        }
        for hist in &node.hists {
            let payload = th1d_payload(hist);
            keys.push(write_record(out, "TH1D", &hist.name, &hist.title, &payload, self.zlib));
        }

        let seek = out.len();
        let mut body = Vec::new();
        put_u32(&mut body, keys.len() as u32);
        for k in &keys {
            body.extend_from_slice(&k.header);
        }
        let header = key_header("TDirectory", name, "", body.len(), body.len(), seek);
        let n_bytes = header.len() + body.len();
        out.extend_from_slice(&header);
        out.extend_from_slice(&body);
        (seek as u32, n_bytes as u32)
    }
}

fn write_record(
    out: &mut Vec<u8>,
    class: &str,
    name: &str,
    title: &str,
    payload: &[u8],
    zlib: bool,
) -> WrittenKey {
    let stored = if zlib { zlib_block(payload) } else { payload.to_vec() };
    let seek = out.len();
    let header = key_header(class, name, title, payload.len(), stored.len(), seek);
    out.extend_from_slice(&header);
    out.extend_from_slice(&stored);
    WrittenKey { header }
}

fn key_header(
    class: &str,
    name: &str,
    title: &str,
    obj_len: usize,
    stored_len: usize,
    seek: usize,
) -> Vec<u8> {
    let mut strings = Vec::new();
    for s in [class, name, title] {
        put_string(&mut strings, s);
    }
    let key_len = 26 + strings.len();
    let mut h = Vec::with_capacity(key_len);
    put_u32(&mut h, (key_len + stored_len) as u32);
    put_u16(&mut h, KEY_VERSION);
    put_u32(&mut h, obj_len as u32);
    put_u32(&mut h, 0); // datime
    put_u16(&mut h, key_len as u16);
    put_u16(&mut h, 1); // cycle
    put_u32(&mut h, seek as u32);
    put_u32(&mut h, TOP_DIR_OFFSET as u32); // seek_pdir
    h.extend_from_slice(&strings);
    h
}

fn dir_streamer(seek_keys: u32, nbytes_keys: u32) -> Vec<u8> {
    let mut b = Vec::new();
    put_u16(&mut b, DIR_VERSION);
    put_u32(&mut b, 0); // fDatimeC
    put_u32(&mut b, 0); // fDatimeM
    put_u32(&mut b, nbytes_keys);
    put_u32(&mut b, 0); // fNbytesName
    put_u32(&mut b, 0); // fSeekDir
    put_u32(&mut b, 0); // fSeekParent
    put_u32(&mut b, seek_keys);
    b
}

fn zlib_block(payload: &[u8]) -> Vec<u8> {
    let mut enc = flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::default());
    // Writing into a Vec cannot fail.
    let _ = enc.write_all(payload);
    let compressed = enc.finish().unwrap_or_default();
    let mut b = b"ZL".to_vec();
    b.push(8);
    b.extend_from_slice(&(compressed.len() as u32).to_le_bytes()[..3]);
    b.extend_from_slice(&(payload.len() as u32).to_le_bytes()[..3]);
    b.extend_from_slice(&compressed);
    b
}

fn th1d_payload(h: &Histogram) -> Vec<u8> {
    let n = h.bin_content.len();
    let mut cells = Vec::with_capacity(n + 2);
    cells.push(0.0);
    cells.extend_from_slice(&h.bin_content);
    cells.push(0.0);
    let sumw2: Vec<f64> = match &h.sumw2 {
        Some(sw2) => std::iter::once(0.0).chain(sw2.iter().copied()).chain([0.0]).collect(),
        None => Vec::new(),
    };

    let mut out = Vec::new();
    versioned(&mut out, 3, |b| {
        versioned(b, 8, |b| {
            tnamed(b, &h.name, &h.title);
            versioned(b, 2, |b| b.extend_from_slice(&[0, 1, 0, 1, 0, 1])); // TAttLine
            versioned(b, 2, |b| b.extend_from_slice(&[0, 0, 3, 233])); // TAttFill
            versioned(b, 2, |b| b.extend_from_slice(&[0, 1, 0, 1, 63, 128, 0, 0])); // TAttMarker
            put_i32(b, (n + 2) as i32);
            taxis(b, "xaxis", &h.bin_edges);
            taxis(b, "yaxis", &[0.0, 1.0]);
            taxis(b, "zaxis", &[0.0, 1.0]);
            put_u16(b, 0); // fBarOffset
            put_u16(b, 1000); // fBarWidth
            put_f64(b, h.entries);
            for _ in 0..4 {
                put_f64(b, 0.0); // fTsumw, fTsumw2, fTsumwx, fTsumwx2
            }
            put_f64(b, -1111.0); // fMaximum
            put_f64(b, -1111.0); // fMinimum
            put_f64(b, 0.0); // fNormFactor
            tarray(b, &[]); // fContour
            tarray(b, &sumw2);
            put_string(b, ""); // fOption
            versioned(b, 5, |b| {
                // empty TList
                tnamed(b, "", "");
                put_i32(b, 0);
            });
            put_i32(b, 0); // fBufferSize
            put_i32(b, 0); // fBinStatErrOpt
            put_i32(b, 2); // fStatOverflows
        });
        tarray(b, &cells);
    });
    out
}

fn taxis(b: &mut Vec<u8>, name: &str, edges: &[f64]) {
    let n = edges.len().saturating_sub(1);
    let (lo, hi) = (edges.first().copied().unwrap_or(0.0), edges.last().copied().unwrap_or(1.0));
    let uniform = edges.windows(2).all(|w| ((w[1] - w[0]) - (hi - lo) / n as f64).abs() < 1e-12);
    versioned(b, 10, |b| {
        tnamed(b, name, "");
        versioned(b, 4, |b| b.extend_from_slice(&[0u8; 34])); // TAttAxis
        put_i32(b, n as i32);
        put_f64(b, lo);
        put_f64(b, hi);
        tarray(b, if uniform { &[] } else { edges });
        put_i32(b, 0); // fFirst
        put_i32(b, 0); // fLast
        put_u16(b, 0); // fBits2
        b.push(0); // fTimeDisplay
        put_string(b, ""); // fTimeFormat
    });
}

fn tnamed(b: &mut Vec<u8>, name: &str, title: &str) {
    versioned(b, 1, |b| {
        put_u16(b, 1);
        put_u32(b, 0);
        put_u32(b, 0x0300_0000);
        put_string(b, name);
        put_string(b, title);
    });
}

fn versioned(b: &mut Vec<u8>, version: u16, body: impl FnOnce(&mut Vec<u8>)) {
    let start = b.len();
    put_u32(b, 0);
    put_u16(b, version);
    body(b);
    let count = (b.len() - start - 4) as u32;
    b[start..start + 4].copy_from_slice(&(BYTE_COUNT_MASK | count).to_be_bytes());
}

fn tarray(b: &mut Vec<u8>, values: &[f64]) {
    put_u32(b, values.len() as u32);
    for v in values {
        put_f64(b, *v);
    }
}

fn put_string(b: &mut Vec<u8>, s: &str) {
    if s.len() < 255 {
        b.push(s.len() as u8);
    } else {
        b.push(255);
        put_u32(b, s.len() as u32);
    }
    b.extend_from_slice(s.as_bytes());
}

fn put_u16(b: &mut Vec<u8>, v: u16) {
    b.extend_from_slice(&v.to_be_bytes());
}

fn put_u32(b: &mut Vec<u8>, v: u32) {
    b.extend_from_slice(&v.to_be_bytes());
}

fn put_i32(b: &mut Vec<u8>, v: i32) {
    b.extend_from_slice(&v.to_be_bytes());
}

fn put_f64(b: &mut Vec<u8>, v: f64) {
    b.extend_from_slice(&v.to_be_bytes());
}
