//! Error types for ROOT file reading.

use thiserror::Error;

/// Errors raised while reading a ROOT file.
#[derive(Debug, Error)]
pub enum RootError {
    /// Underlying I/O failure (open, mmap).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// File does not start with the `root` magic or is too short to hold a header.
    #[error("not a ROOT file (bad magic or truncated header)")]
    BadMagic,

    /// A read ran past the end of the buffer.
    #[error("buffer underflow at offset {offset}: need {need} bytes, have {have}")]
    BufferUnderflow {
        /// Cursor position when the read was attempted.
        offset: usize,
        /// Bytes requested.
        need: usize,
        /// Bytes left in the buffer.
        have: usize,
    },

    /// A compressed block could not be inflated.
    #[error("decompression error: {0}")]
    Decompression(String),

    /// Structurally invalid object payload.
    #[error("deserialization error: {0}")]
    Deserialization(String),

    /// No key with this name in the directory being searched.
    #[error("key not found: {0}")]
    KeyNotFound(String),

    /// The key exists but its class cannot be read as a histogram.
    #[error("unsupported class: {0}")]
    UnsupportedClass(String),
}

/// Result alias for this crate.
pub type Result<T> = std::result::Result<T, RootError>;
