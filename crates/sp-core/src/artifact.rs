//! Plot-friendly, serializable results.
//!
//! [`ShapeComparison`] carries everything needed to draw one data versus
//! background plot; the renderer consumes it and `--emit-json` writes it
//! verbatim. [`YieldsReport`] is the integrated-yield summary printed by
//! `shapeplot yields`.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::hist::Hist1D;
use crate::labels::PlotBin;
use crate::transfer::Yield;

/// Schema tag of [`ShapeComparison`] documents.
pub const SHAPE_COMPARISON_SCHEMA: &str = "shapeplot_shape_comparison_v1";
/// Schema tag of [`YieldsReport`] documents.
pub const YIELDS_SCHEMA: &str = "shapeplot_yields_v1";

/// Provenance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactMeta {
    pub tool: String,
    pub tool_version: String,
    pub created_unix_ms: u128,
}

impl ArtifactMeta {
    /// Stamp with the current time.
    pub fn now() -> Self {
        let created_unix_ms =
            SystemTime::now().duration_since(UNIX_EPOCH).map_or(0, |d| d.as_millis());
        Self {
            tool: "shapeplot".into(),
            tool_version: env!("CARGO_PKG_VERSION").into(),
            created_unix_ms,
        }
    }
}

/// Which bin a document describes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinInfo {
    pub variable: String,
    pub njet: String,
    pub btag: String,
    pub ht: String,
    /// HT bins actually summed (more than one under the inclusive scheme).
    pub ht_bins_summed: Vec<String>,
    /// Display text, e.g. `≤ 3 jets, = 0 b-tag, HT bin 375_475`.
    pub text: String,
}

impl BinInfo {
    /// Describe `bin` summed over `ht_bins`.
    pub fn new(bin: &PlotBin, ht_bins: &[&str]) -> Self {
        Self {
            variable: bin.variable.clone(),
            njet: bin.njet.label().to_string(),
            btag: bin.btag.label().to_string(),
            ht: bin.ht.label().to_string(),
            ht_bins_summed: ht_bins.iter().map(|s| s.to_string()).collect(),
            text: bin.text(),
        }
    }
}

/// Values and symmetric errors per bin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    pub name: String,
    pub y: Vec<f64>,
    pub yerr: Vec<f64>,
}

impl From<&Hist1D> for Series {
    fn from(h: &Hist1D) -> Self {
        Self { name: h.name.clone(), y: h.values.clone(), yerr: h.errors.clone() }
    }
}

/// One stacked background component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentSeries {
    pub region: String,
    /// Legend title.
    pub title: String,
    pub color: String,
    pub transfer_factor: Yield,
    pub y: Vec<f64>,
    pub yerr: Vec<f64>,
}

/// Data / background ratio; `None` where the background is empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatioSeries {
    pub y: Vec<Option<f64>>,
    pub yerr: Vec<f64>,
}

/// Data versus stacked background estimate in one bin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeComparison {
    pub schema_version: String,
    pub meta: ArtifactMeta,
    pub bin: BinInfo,
    pub x_label: String,
    pub y_label: String,
    pub log_y: bool,
    /// Shared by every series below.
    pub bin_edges: Vec<f64>,
    pub x_range: [f64; 2],
    pub y_range: [f64; 2],
    pub ratio_range: [f64; 2],
    /// Transfer-factor systematic applied to the bands, in percent.
    pub systematic_percent: f64,
    pub data: Series,
    /// Bottom-up stacking order (ascending integral).
    pub components: Vec<ComponentSeries>,
    /// Cumulative sums with statistical errors, aligned with `components`.
    pub stat_bands: Vec<Series>,
    /// Cumulative sums with statistical and systematic errors.
    pub stat_syst_bands: Vec<Series>,
    pub ratio: RatioSeries,
}

impl ShapeComparison {
    /// Number of bins.
    pub fn n_bins(&self) -> usize {
        self.bin_edges.len().saturating_sub(1)
    }

    /// Pretty-printed JSON.
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse a JSON document.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Integrated yields of one control region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionYields {
    pub region: String,
    pub title: String,
    pub data_control: Yield,
    pub mc_signal: Yield,
    pub mc_control: Yield,
    pub transfer_factor: Yield,
    pub estimate: Yield,
}

/// Integrated yields of every control region in one bin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YieldsReport {
    pub schema_version: String,
    pub meta: ArtifactMeta,
    pub bin: BinInfo,
    pub data_signal: Yield,
    pub regions: Vec<RegionYields>,
    /// Control regions with no signal-region processes for this b-tag bin.
    pub skipped_regions: Vec<String>,
    pub systematic_percent: f64,
    /// Sum of estimates, statistical error only.
    pub total_estimate: Yield,
    /// Sum of estimates with the systematic added in quadrature.
    pub total_estimate_with_syst: Yield,
}

impl YieldsReport {
    /// Pretty-printed JSON.
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
