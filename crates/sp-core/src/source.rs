//! Where histograms come from.
//!
//! A [`HistogramSource`] resolves a [`HistRequest`] (file, selection region,
//! variable, jet bin, b-tag bin, HT bin) to a [`Hist1D`]. Production runs read
//! ROOT files through [`RootHistogramSource`]; tests use [`MemorySource`].

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::path::{Path, PathBuf};

use sp_root::RootFile;

use crate::error::{Error, Result};
use crate::hist::Hist1D;

/// Default in-file path template.
pub const DEFAULT_PATH_TEMPLATE: &str = "{sele}_{ht}/{var}_{njet}_{btag}";

/// One histogram lookup.
#[derive(Debug, Clone, Copy)]
pub struct HistRequest<'a> {
    /// ROOT file holding the histogram.
    pub file: &'a Path,
    /// Selection region, e.g. `OneMuon` or `Had`.
    pub selection: &'a str,
    /// Histogram title (plotted variable), e.g. `AlphaT`.
    pub variable: &'a str,
    /// Jet bin label.
    pub njet: &'a str,
    /// B-tag bin label.
    pub btag: &'a str,
    /// Single HT bin label.
    pub ht: &'a str,
}

impl<'a> HistRequest<'a> {
    /// Same request for a different HT bin.
    pub fn with_ht(self, ht: &'a str) -> Self {
        Self { ht, ..self }
    }
}

/// Resolves histogram requests.
pub trait HistogramSource {
    /// Fetch one histogram.
    fn fetch(&mut self, req: &HistRequest<'_>) -> Result<Hist1D>;

    /// Fetch the request for each HT bin in `ht_bins` and sum them.
    fn fetch_summed(&mut self, req: &HistRequest<'_>, ht_bins: &[&str]) -> Result<Hist1D> {
        let (first, rest) = ht_bins.split_first().ok_or_else(|| Error::InvalidLabel {
            kind: "HT bin list",
            label: format!("empty for {}", req.variable),
        })?;
        let mut total = self.fetch(&req.with_ht(*first))?;
        for ht in rest {
            total.add(&self.fetch(&req.with_ht(*ht))?)?;
        }
        Ok(total)
    }
}

/// In-file path template with `{sele}`, `{ht}`, `{var}`, `{njet}`, `{btag}` placeholders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathTemplate(String);

impl PathTemplate {
    /// Wrap a template string.
    pub fn new(template: impl Into<String>) -> Self {
        Self(template.into())
    }

    /// Object path for a request.
    pub fn render(&self, req: &HistRequest<'_>) -> String {
        self.0
            .replace("{sele}", req.selection)
            .replace("{ht}", req.ht)
            .replace("{var}", req.variable)
            .replace("{njet}", req.njet)
            .replace("{btag}", req.btag)
    }
}

impl Default for PathTemplate {
    fn default() -> Self {
        Self::new(DEFAULT_PATH_TEMPLATE)
    }
}

/// Reads histograms from ROOT files, keeping each file open for the whole run.
#[derive(Debug, Default)]
pub struct RootHistogramSource {
    template: PathTemplate,
    files: HashMap<PathBuf, RootFile>,
}

impl RootHistogramSource {
    /// Source using the given in-file path template.
    pub fn new(template: PathTemplate) -> Self {
        Self { template, files: HashMap::new() }
    }

    /// Number of files opened so far.
    pub fn open_files(&self) -> usize {
        self.files.len()
    }

    fn file(&mut self, path: &Path) -> Result<&RootFile> {
        match self.files.entry(path.to_path_buf()) {
            Entry::Occupied(e) => Ok(e.into_mut()),
            Entry::Vacant(e) => {
                let file = RootFile::open(path)?;
                tracing::debug!(path = %path.display(), "opened input");
                Ok(e.insert(file))
            }
        }
    }
}

impl HistogramSource for RootHistogramSource {
    fn fetch(&mut self, req: &HistRequest<'_>) -> Result<Hist1D> {
        let object = self.template.render(req);
        let hist = self.file(req.file)?.get_histogram(&object)?;
        tracing::trace!(
            file = %req.file.display(),
            object = %object,
            bins = hist.n_bins(),
            "fetched"
        );
        Hist1D::try_from(hist)
    }
}

/// In-memory histograms keyed by (file, object path). Object paths use the
/// same template as [`RootHistogramSource`].
#[derive(Debug, Default)]
pub struct MemorySource {
    template: PathTemplate,
    hists: HashMap<(PathBuf, String), Hist1D>,
}

impl MemorySource {
    /// Empty source with the default path template.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store the histogram that `req` should resolve to.
    pub fn insert(&mut self, req: &HistRequest<'_>, hist: Hist1D) {
        let key = (req.file.to_path_buf(), self.template.render(req));
        self.hists.insert(key, hist);
    }
}

impl HistogramSource for MemorySource {
    fn fetch(&mut self, req: &HistRequest<'_>) -> Result<Hist1D> {
        let object = self.template.render(req);
        self.hists.get(&(req.file.to_path_buf(), object.clone())).cloned().ok_or_else(|| {
            sp_root::RootError::KeyNotFound(format!("{object} in {}", req.file.display())).into()
        })
    }
}
