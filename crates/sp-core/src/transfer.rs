//! Transfer factors and data-driven background estimates.
//!
//! For one control region the estimate is the data control-region shape scaled
//! by `TF = MC(signal region) / MC(control region)`:
//!
//! ```text
//! estimate[i] = data_control[i] · TF
//! σ(TF)/TF    = sqrt((σS/S)² + (σC/C)²)
//! ```
//!
//! [`TransferMode::PerBin`] instead multiplies and divides bin-by-bin.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::hist::Hist1D;

/// How the MC ratio is applied to the data control-region shape.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransferMode {
    /// One factor from the integrated yields, broadcast to every bin.
    #[default]
    Integral,
    /// `data_control × mc_signal ÷ mc_control` bin-by-bin.
    PerBin,
}

/// An integrated yield with its uncertainty.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Yield {
    /// Sum of bin contents.
    pub value: f64,
    /// Uncertainty on the sum.
    pub error: f64,
}

impl Yield {
    /// Integral and error of a histogram.
    pub fn of(h: &Hist1D) -> Self {
        let (value, error) = h.integral_and_error();
        Self { value, error }
    }

    /// Relative uncertainty, zero for a zero yield.
    pub fn relative_error(&self) -> f64 {
        if self.value == 0.0 { 0.0 } else { self.error / self.value.abs() }
    }
}

/// `MC signal / MC control` with the relative errors added in quadrature.
pub fn transfer_factor(region: &str, mc_signal: Yield, mc_control: Yield) -> Result<Yield> {
    if mc_control.value == 0.0 {
        return Err(Error::ZeroControlYield { region: region.to_string() });
    }
    let value = mc_signal.value / mc_control.value;
    let rel = mc_signal.relative_error().hypot(mc_control.relative_error());
    Ok(Yield { value, error: value.abs() * rel })
}

/// The three histograms one control region contributes.
#[derive(Debug, Clone)]
pub struct RegionInputs {
    /// Data in the control region.
    pub data_control: Hist1D,
    /// MC summed over the signal-region process list.
    pub mc_signal: Hist1D,
    /// MC summed over the control-region process list.
    pub mc_control: Hist1D,
}

/// Background estimate from one control region.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegionEstimate {
    /// Control region name, e.g. `OneMuon`.
    pub region: String,
    /// Data control-region yield.
    pub data_control: Yield,
    /// MC signal-region yield.
    pub mc_signal: Yield,
    /// MC control-region yield.
    pub mc_control: Yield,
    /// Integrated transfer factor (also reported in per-bin mode).
    pub transfer_factor: Yield,
    /// Estimated shape in the signal region with statistical errors.
    pub estimate: Hist1D,
}

/// Build the estimate for one control region.
pub fn estimate_region(
    region: &str,
    inputs: RegionInputs,
    mode: TransferMode,
) -> Result<RegionEstimate> {
    let RegionInputs { data_control, mc_signal, mc_control } = inputs;
    let data_yield = Yield::of(&data_control);
    let signal_yield = Yield::of(&mc_signal);
    let control_yield = Yield::of(&mc_control);
    let tf = transfer_factor(region, signal_yield, control_yield)?;

    let mut estimate = data_control.with_name(region);
    match mode {
        TransferMode::Integral => estimate.scale_with_error(tf.value, tf.error),
        TransferMode::PerBin => {
            estimate.multiply(&mc_signal)?;
            estimate.divide(&mc_control)?;
        }
    }

    tracing::info!(
        region,
        data_control = data_yield.value,
        mc_signal = signal_yield.value,
        mc_control = control_yield.value,
        tf = tf.value,
        tf_err = tf.error,
        estimate = estimate.integral(),
        "control region estimate"
    );

    Ok(RegionEstimate {
        region: region.to_string(),
        data_control: data_yield,
        mc_signal: signal_yield,
        mc_control: control_yield,
        transfer_factor: tf,
        estimate,
    })
}
