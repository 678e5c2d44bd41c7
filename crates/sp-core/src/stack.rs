//! Background stacking, cumulative uncertainty bands and the data/background ratio.

use crate::error::{Error, Result};
use crate::hist::Hist1D;

/// A stacked background component.
#[derive(Debug, Clone)]
pub struct Component {
    /// Control region the estimate comes from.
    pub region: String,
    /// Legend title.
    pub title: String,
    /// Fill colour (`#rrggbb`).
    pub color: String,
    /// Estimated shape with statistical errors.
    pub hist: Hist1D,
}

/// Components in stacking order with their cumulative bands.
///
/// `stat[k]` is the sum of components `0..=k` with errors added in quadrature;
/// `stat_syst[k]` is `stat[k]` with the systematic percentage added in
/// quadrature on top.
#[derive(Debug, Clone)]
pub struct Stack {
    components: Vec<Component>,
    stat: Vec<Hist1D>,
    stat_syst: Vec<Hist1D>,
    syst_percent: f64,
}

impl Stack {
    /// Sort components ascending by integral and build the cumulative bands.
    ///
    /// The systematic is applied once to each cumulative level's content,
    /// starting again from `stat[k]`; it does not compound on the
    /// `stat_syst` band of the level below.
    pub fn build(mut components: Vec<Component>, syst_percent: f64) -> Result<Self> {
        if components.is_empty() {
            return Err(Error::NoComponents("stack".into()));
        }
        components.sort_by(|a, b| a.hist.integral().total_cmp(&b.hist.integral()));

        let mut stat: Vec<Hist1D> = Vec::with_capacity(components.len());
        for c in &components {
            let next = match stat.last() {
                Some(prev) => {
                    let mut sum = prev.clone();
                    sum.add(&c.hist)?;
                    sum
                }
                None => c.hist.clone(),
            };
            stat.push(next.with_name(format!("stat_{}", c.region)));
        }

        let stat_syst = stat
            .iter()
            .zip(&components)
            .map(|(h, c)| {
                let mut band = h.clone().with_name(format!("stat_syst_{}", c.region));
                band.add_relative_error(syst_percent);
                band
            })
            .collect();

        Ok(Self { components, stat, stat_syst, syst_percent })
    }

    /// Components bottom-up.
    pub fn components(&self) -> &[Component] {
        &self.components
    }

    /// Cumulative sums with statistical errors, bottom-up.
    pub fn stat_bands(&self) -> &[Hist1D] {
        &self.stat
    }

    /// Cumulative sums with statistical and systematic errors, bottom-up.
    pub fn stat_syst_bands(&self) -> &[Hist1D] {
        &self.stat_syst
    }

    /// Systematic applied to the bands, in percent.
    pub fn syst_percent(&self) -> f64 {
        self.syst_percent
    }

    /// Total background with statistical errors.
    pub fn total(&self) -> &Hist1D {
        // `build` guarantees at least one component.
        &self.stat[self.stat.len() - 1]
    }

    /// Total background with statistical and systematic errors.
    pub fn total_with_syst(&self) -> &Hist1D {
        &self.stat_syst[self.stat_syst.len() - 1]
    }
}

/// Data / background ratio. Bins with a zero denominator carry `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct Ratio {
    /// Ratio value per bin.
    pub values: Vec<Option<f64>>,
    /// Propagated uncertainty per bin (zero where undefined).
    pub errors: Vec<f64>,
}

/// `data / background` with uncorrelated error propagation.
pub fn ratio(data: &Hist1D, background: &Hist1D) -> Result<Ratio> {
    let mut quotient = data.clone();
    quotient.divide(background)?;
    let values = background
        .values
        .iter()
        .zip(&quotient.values)
        .map(|(den, q)| (*den != 0.0).then_some(*q))
        .collect();
    Ok(Ratio { values, errors: quotient.errors })
}
