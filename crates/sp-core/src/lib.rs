//! # sp-core
//!
//! Data-driven background estimates for data versus background shape plots.
//!
//! For each control region the data shape is scaled into the signal region by
//! a Monte-Carlo transfer factor; the estimates are stacked with cumulative
//! statistical and statistical+systematic bands and compared to the observed
//! signal-region data.
//!
//! ```no_run
//! use sp_core::{Analysis, AnalysisConfig, RootHistogramSource};
//!
//! let config = AnalysisConfig::default();
//! let mut analysis = Analysis::new(&config, RootHistogramSource::new(config.path_template()));
//! for bin in config.plot_bins().unwrap() {
//!     let cmp = analysis.compare(&bin).unwrap();
//!     println!("{bin}: {} components", cmp.components.len());
//! }
//! ```

#![warn(clippy::all)]

pub mod analysis;
pub mod artifact;
pub mod config;
pub mod error;
pub mod hist;
pub mod labels;
pub mod naming;
pub mod range;
pub mod source;
pub mod stack;
pub mod systematics;
pub mod transfer;

pub use analysis::{Analysis, BinResult};
pub use artifact::{ShapeComparison, YieldsReport};
pub use config::{AnalysisConfig, ControlRegion, VariableOptions};
pub use error::{Error, Result};
pub use hist::Hist1D;
pub use labels::{BtagBin, HtBin, HtScheme, JetBin, PlotBin};
pub use naming::output_path;
pub use source::{HistRequest, HistogramSource, MemorySource, PathTemplate, RootHistogramSource};
pub use stack::{Component, Ratio, Stack};
pub use systematics::SystematicsTable;
pub use transfer::{RegionEstimate, TransferMode, Yield};
