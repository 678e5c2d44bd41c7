//! Histogram type returned by [`RootFile::get_histogram`](crate::RootFile::get_histogram).

/// A 1D histogram read from a ROOT file. Under/overflow bins are dropped.
#[derive(Debug, Clone)]
pub struct Histogram {
    /// Object name.
    pub name: String,
    /// Object title.
    pub title: String,
    /// Bin edges, `n_bins + 1` entries.
    pub bin_edges: Vec<f64>,
    /// Bin contents, `n_bins` entries.
    pub bin_content: Vec<f64>,
    /// Per-bin sum of squared weights, when the histogram was filled with Sumw2 enabled.
    pub sumw2: Option<Vec<f64>>,
    /// `fEntries` as stored.
    pub entries: f64,
}

impl Histogram {
    /// Number of in-range bins.
    pub fn n_bins(&self) -> usize {
        self.bin_content.len()
    }

    /// Per-bin statistical errors: `sqrt(sumw2)` when stored, otherwise `sqrt(|content|)`.
    pub fn bin_errors(&self) -> Vec<f64> {
        match &self.sumw2 {
            Some(sw2) => sw2.iter().map(|v| v.max(0.0).sqrt()).collect(),
            None => self.bin_content.iter().map(|v| v.abs().sqrt()).collect(),
        }
    }
}
