//! Error types for shape comparisons

use thiserror::Error;

/// Errors raised while building background estimates and comparisons.
#[derive(Error, Debug)]
pub enum Error {
    /// ROOT file could not be read
    #[error(transparent)]
    Root(#[from] sp_root::RootError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML configuration error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Two histograms combined bin-by-bin have different binning
    #[error("binning mismatch between '{left}' and '{right}': {detail}")]
    BinningMismatch {
        /// Left operand name
        left: String,
        /// Right operand name
        right: String,
        /// What differs
        detail: String,
    },

    /// Rebin factor of zero
    #[error("invalid rebin factor {factor} for '{name}'")]
    InvalidRebin {
        /// Histogram name
        name: String,
        /// Requested factor
        factor: usize,
    },

    /// A bin label or histogram definition could not be parsed
    #[error("invalid {kind} '{label}'")]
    InvalidLabel {
        /// What kind of label (jet bin, HT bin, ...)
        kind: &'static str,
        /// The offending text
        label: String,
    },

    /// No systematic uncertainty configured for a jet bin / HT bin pair
    #[error("no systematic configured for jet bin '{njet}', HT bin '{ht}'")]
    MissingSystematic {
        /// Jet bin label
        njet: String,
        /// HT bin label
        ht: String,
    },

    /// MC control-region yield is zero, so no transfer factor exists
    #[error("MC control yield is zero in region '{region}'")]
    ZeroControlYield {
        /// Control region name
        region: String,
    },

    /// Nothing to stack
    #[error("no background components for {0}")]
    NoComponents(String),

    /// Configuration is structurally valid YAML but semantically wrong
    #[error("invalid configuration: {0}")]
    Config(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
