//! One-dimensional binned histograms with per-bin uncertainties.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Relative tolerance when comparing bin edges of two histograms.
const EDGE_TOLERANCE: f64 = 1e-9;

/// A 1D histogram: `n` bins, `n + 1` edges, one value and one 1σ error per bin.
///
/// Under/overflow are not represented. Arithmetic follows ROOT's `TH1`
/// semantics with `Sumw2` enabled: errors of independent histograms combine
/// in quadrature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hist1D {
    /// Name, used in diagnostics and as the stack component key.
    pub name: String,
    /// Bin edges, strictly increasing.
    pub edges: Vec<f64>,
    /// Bin contents.
    pub values: Vec<f64>,
    /// Per-bin 1σ uncertainties (non-negative).
    pub errors: Vec<f64>,
}

impl Hist1D {
    /// Build a histogram, checking that the edges, values and errors agree.
    pub fn new(
        name: impl Into<String>,
        edges: Vec<f64>,
        values: Vec<f64>,
        errors: Vec<f64>,
    ) -> Result<Self> {
        let name = name.into();
        let invalid = |detail: String| Error::InvalidLabel {
            kind: "histogram",
            label: format!("{name}: {detail}"),
        };
        if edges.len() < 2 {
            return Err(invalid(format!("{} edges", edges.len())));
        }
        if edges.iter().any(|e| e.is_nan()) || edges.windows(2).any(|w| w[1] <= w[0]) {
            return Err(invalid("edges not strictly increasing".into()));
        }
        if values.len() != edges.len() - 1 || errors.len() != values.len() {
            return Err(invalid(format!(
                "{} edges, {} values, {} errors",
                edges.len(),
                values.len(),
                errors.len()
            )));
        }
        if errors.iter().any(|e| *e < 0.0) {
            return Err(invalid("negative error".into()));
        }
        Ok(Self { name, edges, values, errors })
    }

    /// Same histogram under a different name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Number of bins.
    pub fn n_bins(&self) -> usize {
        self.values.len()
    }

    /// Lower edge of bin `i`.
    pub fn low_edge(&self, i: usize) -> f64 {
        self.edges[i]
    }

    /// Upper edge of bin `i`.
    pub fn high_edge(&self, i: usize) -> f64 {
        self.edges[i + 1]
    }

    /// Centre of bin `i`.
    pub fn center(&self, i: usize) -> f64 {
        0.5 * (self.edges[i] + self.edges[i + 1])
    }

    /// Sum of bin contents.
    pub fn integral(&self) -> f64 {
        self.values.iter().sum()
    }

    /// Sum of bin contents and its uncertainty (errors in quadrature).
    pub fn integral_and_error(&self) -> (f64, f64) {
        let err2: f64 = self.errors.iter().map(|e| e * e).sum();
        (self.integral(), err2.sqrt())
    }

    /// Add `other` bin-by-bin; errors add in quadrature.
    pub fn add(&mut self, other: &Hist1D) -> Result<()> {
        self.check_compatible(other)?;
        for i in 0..self.n_bins() {
            self.values[i] += other.values[i];
            self.errors[i] = self.errors[i].hypot(other.errors[i]);
        }
        Ok(())
    }

    /// Multiply by `other` bin-by-bin, treating the operands as uncorrelated.
    pub fn multiply(&mut self, other: &Hist1D) -> Result<()> {
        self.check_compatible(other)?;
        for i in 0..self.n_bins() {
            let (a, ea) = (self.values[i], self.errors[i]);
            let (b, eb) = (other.values[i], other.errors[i]);
            self.values[i] = a * b;
            self.errors[i] = (ea * b).hypot(eb * a);
        }
        Ok(())
    }

    /// Divide by `other` bin-by-bin, treating the operands as uncorrelated.
    /// Bins where `other` is zero become 0 ± 0.
    pub fn divide(&mut self, other: &Hist1D) -> Result<()> {
        self.check_compatible(other)?;
        for i in 0..self.n_bins() {
            let (a, ea) = (self.values[i], self.errors[i]);
            let (b, eb) = (other.values[i], other.errors[i]);
            if b == 0.0 {
                self.values[i] = 0.0;
                self.errors[i] = 0.0;
                continue;
            }
            self.values[i] = a / b;
            self.errors[i] = (ea * b).hypot(eb * a) / (b * b);
        }
        Ok(())
    }

    /// Scale by a factor that carries its own uncertainty:
    /// `v → v·f`, `e → sqrt((e·f)² + (v·σf)²)`.
    pub fn scale_with_error(&mut self, factor: f64, factor_error: f64) {
        for (v, e) in self.values.iter_mut().zip(self.errors.iter_mut()) {
            *e = (*e * factor).hypot(*v * factor_error);
            *v *= factor;
        }
    }

    /// Add a flat percentage uncertainty in quadrature to every bin:
    /// `e → sqrt(e² + (v · percent / 100)²)`.
    pub fn add_relative_error(&mut self, percent: f64) {
        for (v, e) in self.values.iter().zip(self.errors.iter_mut()) {
            *e = combined_error(*e, *v, percent);
        }
    }

    /// Merge every `n` adjacent bins. Trailing bins that do not fill a whole
    /// group are dropped.
    pub fn rebin(&self, n: usize) -> Result<Hist1D> {
        if n == 0 {
            return Err(Error::InvalidRebin { name: self.name.clone(), factor: n });
        }
        if n == 1 {
            return Ok(self.clone());
        }
        let groups = self.n_bins() / n;
        if groups == 0 {
            return Err(Error::InvalidRebin { name: self.name.clone(), factor: n });
        }
        if self.n_bins() % n != 0 {
            tracing::debug!(
                name = %self.name,
                n_bins = self.n_bins(),
                factor = n,
                "rebin drops trailing bins"
            );
        }
        let edges = (0..=groups).map(|g| self.edges[g * n]).collect();
        let mut values = Vec::with_capacity(groups);
        let mut errors = Vec::with_capacity(groups);
        for g in 0..groups {
            let range = g * n..(g + 1) * n;
            values.push(self.values[range.clone()].iter().sum());
            errors.push(self.errors[range].iter().map(|e| e * e).sum::<f64>().sqrt());
        }
        Ok(Hist1D { name: self.name.clone(), edges, values, errors })
    }

    /// Index of the largest bin content (first one on ties), `None` when empty.
    pub fn maximum_bin(&self) -> Option<usize> {
        self.maximum_bin_in(0..self.n_bins())
    }

    /// Like [`maximum_bin`](Self::maximum_bin), restricted to a bin range.
    pub fn maximum_bin_in(&self, bins: std::ops::Range<usize>) -> Option<usize> {
        let end = bins.end.min(self.n_bins());
        (bins.start..end).fold(None, |best, i| match best {
            Some(b) if self.values[b] >= self.values[i] => Some(b),
            _ => Some(i),
        })
    }

    /// First bin with positive content.
    pub fn first_filled_bin(&self) -> Option<usize> {
        self.values.iter().position(|v| *v > 0.0)
    }

    /// Last bin with positive content.
    pub fn last_filled_bin(&self) -> Option<usize> {
        self.values.iter().rposition(|v| *v > 0.0)
    }

    /// Bins that overlap `[lo, hi]`.
    pub fn bins_within(&self, lo: f64, hi: f64) -> std::ops::Range<usize> {
        let start = (0..self.n_bins()).find(|&i| self.high_edge(i) > lo).unwrap_or(self.n_bins());
        let end = (0..self.n_bins()).rfind(|&i| self.low_edge(i) < hi).map_or(start, |i| i + 1);
        start..end.max(start)
    }

    fn check_compatible(&self, other: &Hist1D) -> Result<()> {
        let mismatch = |detail: String| Error::BinningMismatch {
            left: self.name.clone(),
            right: other.name.clone(),
            detail,
        };
        if self.n_bins() != other.n_bins() {
            return Err(mismatch(format!("{} vs {} bins", self.n_bins(), other.n_bins())));
        }
        for (i, (a, b)) in self.edges.iter().zip(&other.edges).enumerate() {
            let scale = a.abs().max(b.abs()).max(1.0);
            if (a - b).abs() > EDGE_TOLERANCE * scale {
                return Err(mismatch(format!("edge {i}: {a} vs {b}")));
            }
        }
        Ok(())
    }
}

/// Statistical error combined in quadrature with a percentage systematic on `value`.
pub fn combined_error(stat: f64, value: f64, percent: f64) -> f64 {
    stat.hypot(value * percent / 100.0)
}

/// Histograms read from files go through the same checks as [`Hist1D::new`].
impl TryFrom<sp_root::Histogram> for Hist1D {
    type Error = Error;

    fn try_from(h: sp_root::Histogram) -> Result<Self> {
        let errors = h.bin_errors();
        Self::new(h.name, h.bin_edges, h.bin_content, errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn h(name: &str, values: &[f64], errors: &[f64]) -> Hist1D {
        let edges = (0..=values.len()).map(|i| i as f64 * 10.0).collect();
        Hist1D::new(name, edges, values.to_vec(), errors.to_vec()).unwrap()
    }

    #[test]
    fn integral_and_error_sum_in_quadrature() {
        let a = h("a", &[1.0, 2.0, 3.0], &[3.0, 0.0, 4.0]);
        let (v, e) = a.integral_and_error();
        assert_relative_eq!(v, 6.0, epsilon = 1e-12);
        assert_relative_eq!(e, 5.0, epsilon = 1e-12);
    }

    #[test]
    fn add_sums_values_and_errors_in_quadrature() {
        let mut a = h("a", &[1.0, 2.0], &[3.0, 1.0]);
        a.add(&h("b", &[4.0, 0.5], &[4.0, 0.0])).unwrap();
        assert_eq!(a.values, vec![5.0, 2.5]);
        assert_relative_eq!(a.errors[0], 5.0, epsilon = 1e-12);
        assert_relative_eq!(a.errors[1], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn add_rejects_different_binning() {
        let mut a = h("a", &[1.0, 2.0], &[1.0, 1.0]);
        let b = h("b", &[1.0, 2.0, 3.0], &[1.0, 1.0, 1.0]);
        assert!(matches!(a.add(&b), Err(Error::BinningMismatch { .. })));

        let shifted =
            Hist1D::new("c", vec![0.0, 10.0, 25.0], vec![1.0, 1.0], vec![1.0, 1.0]).unwrap();
        assert!(matches!(a.add(&shifted), Err(Error::BinningMismatch { .. })));
    }

    #[test]
    fn multiply_and_divide_propagate_uncorrelated_errors() {
        let mut a = h("a", &[4.0], &[2.0]);
        a.multiply(&h("b", &[3.0], &[1.0])).unwrap();
        assert_relative_eq!(a.values[0], 12.0, epsilon = 1e-12);
        // sqrt((2·3)² + (1·4)²)
        assert_relative_eq!(a.errors[0], 52.0f64.sqrt(), epsilon = 1e-12);

        let mut c = h("c", &[6.0], &[3.0]);
        c.divide(&h("d", &[2.0], &[1.0])).unwrap();
        assert_relative_eq!(c.values[0], 3.0, epsilon = 1e-12);
        // sqrt((3·2)² + (1·6)²) / 4
        assert_relative_eq!(c.errors[0], 72.0f64.sqrt() / 4.0, epsilon = 1e-12);
    }

    #[test]
    fn divide_by_zero_bin_gives_zero() {
        let mut a = h("a", &[5.0, 4.0], &[1.0, 2.0]);
        a.divide(&h("b", &[0.0, 2.0], &[0.0, 0.0])).unwrap();
        assert_eq!(a.values[0], 0.0);
        assert_eq!(a.errors[0], 0.0);
        assert_relative_eq!(a.values[1], 2.0, epsilon = 1e-12);
    }

    #[test]
    fn scale_with_error_includes_factor_uncertainty() {
        let mut a = h("a", &[10.0, 0.0], &[3.0, 1.0]);
        a.scale_with_error(0.5, 0.1);
        assert_relative_eq!(a.values[0], 5.0, epsilon = 1e-12);
        // sqrt((3·0.5)² + (10·0.1)²)
        assert_relative_eq!(a.errors[0], (2.25f64 + 1.0).sqrt(), epsilon = 1e-12);
        assert_relative_eq!(a.errors[1], 0.5, epsilon = 1e-12);
    }

    #[test]
    fn relative_error_adds_in_quadrature() {
        let mut a = h("a", &[100.0], &[6.0]);
        a.add_relative_error(8.0);
        assert_relative_eq!(a.errors[0], 10.0, epsilon = 1e-12);
        assert_relative_eq!(combined_error(3.0, 40.0, 10.0), 5.0, epsilon = 1e-12);
    }

    #[test]
    fn rebin_merges_groups_and_drops_remainder() {
        let a = h("a", &[1.0, 2.0, 3.0, 4.0, 5.0], &[1.0, 1.0, 2.0, 2.0, 9.0]);
        let r = a.rebin(2).unwrap();
        assert_eq!(r.edges, vec![0.0, 20.0, 40.0]);
        assert_eq!(r.values, vec![3.0, 7.0]);
        assert_relative_eq!(r.errors[0], 2.0f64.sqrt(), epsilon = 1e-12);
        assert_relative_eq!(r.errors[1], 8.0f64.sqrt(), epsilon = 1e-12);
        assert_eq!(a.rebin(1).unwrap(), a);
    }

    #[test]
    fn rebin_rejects_zero_and_oversized_factors() {
        let a = h("a", &[1.0, 2.0], &[1.0, 1.0]);
        assert!(matches!(a.rebin(0), Err(Error::InvalidRebin { factor: 0, .. })));
        assert!(matches!(a.rebin(3), Err(Error::InvalidRebin { factor: 3, .. })));
    }

    #[test]
    fn maximum_and_filled_bins() {
        let a = h("a", &[0.0, 3.0, 7.0, 7.0, 0.0, 1.0, 0.0], &[0.0; 7]);
        assert_eq!(a.maximum_bin(), Some(2));
        assert_eq!(a.maximum_bin_in(3..10), Some(3));
        assert_eq!(a.first_filled_bin(), Some(1));
        assert_eq!(a.last_filled_bin(), Some(5));

        let empty = h("e", &[0.0, 0.0], &[0.0, 0.0]);
        assert_eq!(empty.first_filled_bin(), None);
        assert_eq!(empty.last_filled_bin(), None);
    }

    #[test]
    fn bins_within_range() {
        let a = h("a", &[1.0; 5], &[0.0; 5]);
        assert_eq!(a.bins_within(10.0, 30.0), 1..3);
        assert_eq!(a.bins_within(15.0, 35.0), 1..4);
        assert_eq!(a.bins_within(-5.0, 500.0), 0..5);
    }

    #[test]
    fn new_validates_shape() {
        assert!(Hist1D::new("x", vec![0.0], vec![], vec![]).is_err());
        assert!(Hist1D::new("x", vec![0.0, 1.0], vec![1.0, 2.0], vec![1.0, 1.0]).is_err());
        assert!(Hist1D::new("x", vec![1.0, 0.0], vec![1.0], vec![1.0]).is_err());
        assert!(Hist1D::new("x", vec![0.0, 1.0], vec![1.0], vec![-1.0]).is_err());
    }

    #[test]
    fn from_root_histogram_uses_sumw2() {
        let root = sp_root::Histogram {
            name: "HT_le3j_eq0b".into(),
            title: String::new(),
            bin_edges: vec![0.0, 1.0, 2.0],
            bin_content: vec![4.0, 9.0],
            sumw2: Some(vec![1.0, 4.0]),
            entries: 13.0,
        };
        let h = Hist1D::try_from(root).unwrap();
        assert_eq!(h.errors, vec![1.0, 2.0]);
    }

    #[test]
    fn root_histogram_with_bad_axis_is_rejected() {
        let root = |edges: Vec<f64>| sp_root::Histogram {
            name: "x".into(),
            title: String::new(),
            bin_edges: edges,
            bin_content: vec![1.0, 2.0],
            sumw2: None,
            entries: 3.0,
        };
        for edges in [vec![1.0, 1.0, 1.0], vec![0.0, 2.0, 1.0], vec![0.0, 1.0]] {
            let err = Hist1D::try_from(root(edges.clone())).unwrap_err();
            assert!(matches!(err, Error::InvalidLabel { kind: "histogram", .. }), "{edges:?}");
        }
    }
}
