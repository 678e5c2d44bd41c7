//! # sp-root
//!
//! Native reader for the ROOT files the shape plots are made from.
//!
//! Reads TH1D/TH1F histograms out of (nested) TDirectories without needing a
//! ROOT installation. Object records may be zlib, LZ4, ZSTD or XZ compressed.
//!
//! ```no_run
//! use sp_root::RootFile;
//!
//! let f = RootFile::open("Muon_Data.root").unwrap();
//! for key in f.list_keys("").unwrap() {
//!     println!("{} ({})", key.name, key.class_name);
//! }
//! let h = f.get_histogram("OneMuon_375_475/AlphaT_le3j_eq0b").unwrap();
//! println!("{} bins, {} entries", h.n_bins(), h.entries);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod datasource;
pub mod decompress;
pub mod directory;
pub mod error;
pub mod file;
pub mod histogram;
pub mod key;
pub mod objects;
pub mod rbuffer;
pub mod writer;

pub use error::{Result, RootError};
pub use file::RootFile;
pub use histogram::Histogram;
pub use key::KeyInfo;
pub use writer::RootFileWriter;
