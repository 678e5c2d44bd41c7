//! The per-bin pipeline: fetch, estimate each control region, stack, compare.

use std::path::{Path, PathBuf};

use crate::artifact::{
    ArtifactMeta, BinInfo, ComponentSeries, RatioSeries, RegionYields, SHAPE_COMPARISON_SCHEMA,
    Series, ShapeComparison, YIELDS_SCHEMA, YieldsReport,
};
use crate::config::{AnalysisConfig, ControlRegion};
use crate::error::{Error, Result};
use crate::hist::Hist1D;
use crate::labels::PlotBin;
use crate::range::{autorange_x, y_range};
use crate::source::{HistRequest, HistogramSource};
use crate::stack::{Component, Stack, ratio};
use crate::transfer::{RegionEstimate, RegionInputs, Yield, estimate_region};

/// Everything computed for one bin before it is turned into an artifact.
#[derive(Debug, Clone)]
pub struct BinResult {
    /// HT bins summed.
    pub ht_bins: Vec<String>,
    /// Data in the signal region.
    pub data: Hist1D,
    /// One estimate per control region that contributed, in configuration order.
    pub estimates: Vec<RegionEstimate>,
    /// Control regions skipped for lack of signal-region processes.
    pub skipped: Vec<String>,
    /// Systematic for the bin in percent.
    pub syst_percent: f64,
}

/// Runs the estimate for each plot bin against a histogram source.
pub struct Analysis<'c, S> {
    config: &'c AnalysisConfig,
    source: S,
}

impl<'c, S: HistogramSource> Analysis<'c, S> {
    /// Pipeline over `source` configured by `config`.
    pub fn new(config: &'c AnalysisConfig, source: S) -> Self {
        Self { config, source }
    }

    /// The underlying source.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Fetch one selection, summed over `ht_bins` and rebinned for the variable.
    fn fetch(
        &mut self,
        file: &Path,
        selection: &str,
        bin: &PlotBin,
        ht_bins: &[&str],
    ) -> Result<Hist1D> {
        let req = HistRequest {
            file,
            selection,
            variable: &bin.variable,
            njet: bin.njet.label(),
            btag: bin.btag.label(),
            ht: bin.ht.label(),
        };
        let hist = self.source.fetch_summed(&req, ht_bins)?;
        hist.rebin(self.config.options_for(&bin.variable).rebin)
    }

    /// Sum one selection over a list of MC processes.
    fn sum_processes(
        &mut self,
        processes: &[String],
        file: impl Fn(&str) -> PathBuf,
        selection: &str,
        bin: &PlotBin,
        ht_bins: &[&str],
    ) -> Result<Hist1D> {
        let mut total: Option<Hist1D> = None;
        for process in processes {
            let h = self.fetch(&file(process.as_str()), selection, bin, ht_bins)?;
            tracing::debug!(process = %process, selection, integral = h.integral(), "MC yield");
            total = Some(match total.take() {
                Some(mut sum) => {
                    sum.add(&h)?;
                    sum
                }
                None => h,
            });
        }
        let total =
            total.ok_or_else(|| Error::NoComponents(format!("{selection} MC for {bin}")))?;
        tracing::debug!(selection, integral = total.integral(), "MC total");
        Ok(total)
    }

    fn estimate(
        &mut self,
        region: &ControlRegion,
        bin: &PlotBin,
        ht_bins: &[&str],
    ) -> Result<RegionEstimate> {
        let config = self.config;
        let data_control =
            self.fetch(&config.data_control_file(region), &region.name, bin, ht_bins)?;
        tracing::debug!(
            region = %region.name,
            integral = data_control.integral(),
            "data in control region"
        );

        let signal = config.mc_signal_processes.for_region(&bin.btag, &region.name);
        let mc_signal = self
            .sum_processes(
                signal,
                |p| config.mc_signal_file(p),
                &config.signal_selection,
                bin,
                ht_bins,
            )?
            .with_name("MC_signal");
        let mc_control = self
            .sum_processes(
                &config.mc_control_processes,
                |p| config.mc_control_file(region, p),
                &region.name,
                bin,
                ht_bins,
            )?
            .with_name("MC_control");

        estimate_region(
            &region.name,
            RegionInputs { data_control, mc_signal, mc_control },
            config.transfer_mode,
        )
    }

    /// Data and every control-region estimate for `bin`.
    pub fn run(&mut self, bin: &PlotBin) -> Result<BinResult> {
        let config = self.config;
        let ht_bins = config.ht_scheme.select(bin.ht.label(), &config.ht_bins);
        let syst_percent = config.systematics.percent(bin.njet.label(), bin.ht.label())?;

        let mut estimates = Vec::with_capacity(config.control_regions.len());
        let mut skipped = Vec::new();
        for region in &config.control_regions {
            if config.mc_signal_processes.for_region(&bin.btag, &region.name).is_empty() {
                tracing::warn!(
                    region = %region.name,
                    btag = %bin.btag,
                    "no signal-region processes, skipping"
                );
                skipped.push(region.name.clone());
                continue;
            }
            estimates.push(self.estimate(region, bin, &ht_bins)?);
        }
        if estimates.is_empty() {
            return Err(Error::NoComponents(bin.to_string()));
        }

        let data = self
            .fetch(&config.data_signal_file(), &config.signal_selection, bin, &ht_bins)?
            .with_name("Data");
        tracing::info!(%bin, data = data.integral(), "data in signal region");

        Ok(BinResult {
            ht_bins: ht_bins.iter().map(|s| s.to_string()).collect(),
            data,
            estimates,
            skipped,
            syst_percent,
        })
    }

    /// Build the full comparison for `bin`.
    pub fn compare(&mut self, bin: &PlotBin) -> Result<ShapeComparison> {
        let config = self.config;
        let result = self.run(bin)?;
        let stack = self.stack(&result)?;
        tracing::info!(
            %bin,
            background = stack.total().integral(),
            "background estimate from data"
        );

        let data = &result.data;
        let r = ratio(data, stack.total_with_syst())?;
        let options = config.options_for(&bin.variable);
        let x_range = autorange_x(data, stack.total(), config.right_padding);
        let y = y_range(&stack, data, x_range, options.log);

        let transfer_factor = |region: &str| {
            result
                .estimates
                .iter()
                .find(|e| e.region == region)
                .map_or(Yield { value: 0.0, error: 0.0 }, |e| e.transfer_factor)
        };
        let components = stack
            .components()
            .iter()
            .map(|c| ComponentSeries {
                region: c.region.clone(),
                title: c.title.clone(),
                color: c.color.clone(),
                transfer_factor: transfer_factor(&c.region),
                y: c.hist.values.clone(),
                yerr: c.hist.errors.clone(),
            })
            .collect();

        let ht_refs: Vec<&str> = result.ht_bins.iter().map(String::as_str).collect();
        Ok(ShapeComparison {
            schema_version: SHAPE_COMPARISON_SCHEMA.into(),
            meta: ArtifactMeta::now(),
            bin: BinInfo::new(bin, &ht_refs),
            x_label: config.x_label(&bin.variable),
            y_label: "Events".into(),
            log_y: options.log,
            bin_edges: data.edges.clone(),
            x_range: [x_range.0, x_range.1],
            y_range: [y.0, y.1],
            ratio_range: config.ratio_range,
            systematic_percent: stack.syst_percent(),
            data: Series::from(data),
            components,
            stat_bands: stack.stat_bands().iter().map(Series::from).collect(),
            stat_syst_bands: stack.stat_syst_bands().iter().map(Series::from).collect(),
            ratio: RatioSeries { y: r.values, yerr: r.errors },
        })
    }

    /// Integrated yields for `bin`.
    pub fn yields(&mut self, bin: &PlotBin) -> Result<YieldsReport> {
        let result = self.run(bin)?;
        let stack = self.stack(&result)?;

        let regions = result
            .estimates
            .iter()
            .map(|e| RegionYields {
                region: e.region.clone(),
                title: self.title(&e.region),
                data_control: e.data_control,
                mc_signal: e.mc_signal,
                mc_control: e.mc_control,
                transfer_factor: e.transfer_factor,
                estimate: Yield::of(&e.estimate),
            })
            .collect();

        let ht_refs: Vec<&str> = result.ht_bins.iter().map(String::as_str).collect();
        Ok(YieldsReport {
            schema_version: YIELDS_SCHEMA.into(),
            meta: ArtifactMeta::now(),
            bin: BinInfo::new(bin, &ht_refs),
            data_signal: Yield::of(&result.data),
            regions,
            skipped_regions: result.skipped,
            systematic_percent: result.syst_percent,
            total_estimate: Yield::of(stack.total()),
            total_estimate_with_syst: Yield::of(stack.total_with_syst()),
        })
    }

    fn title(&self, region: &str) -> String {
        self.config.control_region(region).map_or_else(|| region.to_string(), |r| r.title.clone())
    }

    fn stack(&self, result: &BinResult) -> Result<Stack> {
        let components = result
            .estimates
            .iter()
            .map(|e| {
                let color = self.config.control_region(&e.region).map(|r| r.color.clone());
                Component {
                    region: e.region.clone(),
                    title: self.title(&e.region),
                    color: color.unwrap_or_else(|| "#808080".into()),
                    hist: e.estimate.clone(),
                }
            })
            .collect();
        Stack::build(components, result.syst_percent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MemorySource;
    use crate::transfer::TransferMode;
    use approx::assert_relative_eq;

    const EDGES: [f64; 5] = [0.0, 1.0, 2.0, 3.0, 4.0];

    fn h(values: [f64; 4]) -> Hist1D {
        let errors = values.iter().map(|v| v.sqrt()).collect();
        Hist1D::new("h", EDGES.to_vec(), values.to_vec(), errors).unwrap()
    }

    /// Minimal config: one muon control region, one MC process per side, no rebinning.
    fn config(btag: &str) -> AnalysisConfig {
        let mut config = AnalysisConfig {
            input_dir: PathBuf::from("in"),
            variables: vec!["AlphaT".into()],
            ht_bins: vec!["375_475".into(), "1075".into()],
            njet_bins: vec!["le3j".into()],
            btag_bins: vec![btag.into()],
            mc_control_processes: vec!["TTbar".into()],
            ..Default::default()
        };
        config.variable_options.insert(
            "AlphaT".into(),
            crate::config::VariableOptions { rebin: 1, log: true, x_label: Some("α_T".into()) },
        );
        config.mc_signal_processes.low_btag.insert("OneMuon".into(), vec!["TTbar".into()]);
        config.mc_signal_processes.low_btag.insert("DiMuon".into(), vec!["Zinv".into()]);
        config
    }

    fn insert(src: &mut MemorySource, file: &str, sele: &str, ht: &str, values: [f64; 4]) {
        let req = HistRequest {
            file: Path::new(file),
            selection: sele,
            variable: "AlphaT",
            njet: "le3j",
            btag: "eq0b",
            ht,
        };
        src.insert(&req, h(values));
    }

    /// Every input for HT bins 375_475 and 1075.
    fn source() -> MemorySource {
        let mut src = MemorySource::new();
        for ht in ["375_475", "1075"] {
            insert(&mut src, "in/Muon_Data.root", "OneMuon", ht, [10.0, 20.0, 0.0, 0.0]);
            insert(&mut src, "in/Muon_Data.root", "DiMuon", ht, [2.0, 2.0, 0.0, 0.0]);
            insert(&mut src, "in/Muon_TTbar.root", "OneMuon", ht, [20.0, 20.0, 0.0, 0.0]);
            insert(&mut src, "in/Muon_TTbar.root", "DiMuon", ht, [4.0, 4.0, 0.0, 0.0]);
            insert(&mut src, "in/Had_TTbar.root", "Had", ht, [10.0, 10.0, 0.0, 0.0]);
            insert(&mut src, "in/Had_Zinv.root", "Had", ht, [8.0, 8.0, 0.0, 0.0]);
            insert(&mut src, "in/Had_Data.root", "Had", ht, [20.0, 22.0, 1.0, 0.0]);
        }
        src
    }

    #[test]
    fn inclusive_run_sums_ht_bins_and_estimates_each_region() {
        let config = config("eq0b");
        let mut analysis = Analysis::new(&config, source());
        let bin = PlotBin::parse("AlphaT", "le3j", "eq0b", "375_475").unwrap();
        let result = analysis.run(&bin).unwrap();

        assert_eq!(result.ht_bins, ["375_475", "1075"]);
        assert_eq!(result.data.values, vec![40.0, 44.0, 2.0, 0.0]);
        assert_eq!(result.syst_percent, 8.0);
        assert!(result.skipped.is_empty());

        let one_mu = &result.estimates[0];
        assert_eq!(one_mu.region, "OneMuon");
        // TF = 40 / 80, estimate = 60 · 0.5
        assert_relative_eq!(one_mu.transfer_factor.value, 0.5, epsilon = 1e-12);
        assert_relative_eq!(one_mu.estimate.integral(), 30.0, epsilon = 1e-12);

        let di_mu = &result.estimates[1];
        // TF = 32 / 16
        assert_relative_eq!(di_mu.transfer_factor.value, 2.0, epsilon = 1e-12);
        assert_relative_eq!(di_mu.estimate.integral(), 16.0, epsilon = 1e-12);
    }

    #[test]
    fn exclusive_run_uses_one_ht_bin() {
        let mut config = config("eq0b");
        config.ht_scheme = crate::labels::HtScheme::Exclusive;
        let mut analysis = Analysis::new(&config, source());
        let bin = PlotBin::parse("AlphaT", "le3j", "eq0b", "1075").unwrap();
        let result = analysis.run(&bin).unwrap();
        assert_eq!(result.ht_bins, ["1075"]);
        assert_eq!(result.data.values, vec![20.0, 22.0, 1.0, 0.0]);
        assert_eq!(result.syst_percent, 19.0);
    }

    #[test]
    fn per_bin_mode_changes_the_shape_not_the_inputs() {
        let mut config = config("eq0b");
        config.transfer_mode = TransferMode::PerBin;
        let mut analysis = Analysis::new(&config, source());
        let bin = PlotBin::parse("AlphaT", "le3j", "eq0b", "375_475").unwrap();
        let result = analysis.run(&bin).unwrap();
        // 20 · 20 / 40 and 40 · 20 / 40
        assert_eq!(result.estimates[0].estimate.values, vec![10.0, 20.0, 0.0, 0.0]);
    }

    #[test]
    fn region_without_signal_processes_is_skipped() {
        let mut config = config("eq0b");
        config.mc_signal_processes.low_btag.insert("DiMuon".into(), Vec::new());
        let mut analysis = Analysis::new(&config, source());
        let bin = PlotBin::parse("AlphaT", "le3j", "eq0b", "375_475").unwrap();
        let report = analysis.yields(&bin).unwrap();
        assert_eq!(report.skipped_regions, ["DiMuon"]);
        assert_eq!(report.regions.len(), 1);
        assert_eq!(report.regions[0].title, "Single μ BG");
        assert_relative_eq!(report.total_estimate.value, 30.0, epsilon = 1e-12);
        assert_relative_eq!(report.data_signal.value, 86.0, epsilon = 1e-12);
    }

    #[test]
    fn no_contributing_region_is_an_error() {
        let mut config = config("eq0b");
        config.mc_signal_processes.low_btag.clear();
        let mut analysis = Analysis::new(&config, source());
        let bin = PlotBin::parse("AlphaT", "le3j", "eq0b", "375_475").unwrap();
        assert!(matches!(analysis.compare(&bin), Err(Error::NoComponents(_))));
    }

    #[test]
    fn missing_input_is_reported() {
        let config = config("eq0b");
        let mut analysis = Analysis::new(&config, MemorySource::new());
        let bin = PlotBin::parse("AlphaT", "le3j", "eq0b", "375_475").unwrap();
        assert!(matches!(analysis.run(&bin), Err(Error::Root(_))));
    }

    #[test]
    fn comparison_stacks_ascending_and_ranges_fit() {
        let config = config("eq0b");
        let mut analysis = Analysis::new(&config, source());
        let bin = PlotBin::parse("AlphaT", "le3j", "eq0b", "375_475").unwrap();
        let cmp = analysis.compare(&bin).unwrap();

        assert_eq!(cmp.schema_version, SHAPE_COMPARISON_SCHEMA);
        assert_eq!(cmp.x_label, "α_T");
        assert!(cmp.log_y);
        assert_eq!(cmp.n_bins(), 4);
        let order: Vec<_> = cmp.components.iter().map(|c| c.region.as_str()).collect();
        assert_eq!(order, ["DiMuon", "OneMuon"]);
        assert_eq!(cmp.components[1].title, "Single μ BG");
        assert_relative_eq!(cmp.components[0].transfer_factor.value, 2.0, epsilon = 1e-12);

        // total background: DiMuon [8, 8] + OneMuon [10, 20]
        assert_eq!(cmp.stat_bands[1].y, vec![18.0, 28.0, 0.0, 0.0]);
        assert_eq!(cmp.systematic_percent, 8.0);
        assert_eq!(cmp.ratio.y[3], None);
        assert_eq!(cmp.ratio.y[2], None);
        assert_relative_eq!(cmp.ratio.y[0].unwrap(), 40.0 / 18.0, epsilon = 1e-12);

        // filled region is [0, 3), padded by 40% on the right
        assert_relative_eq!(cmp.x_range[0], 0.0, epsilon = 1e-12);
        assert_relative_eq!(cmp.x_range[1], 3.0 + 0.4 * 3.0, epsilon = 1e-12);
        assert!(cmp.y_range[1] > 44.0);
        assert_eq!(cmp.ratio_range, [0.0, 2.0]);

        let back = ShapeComparison::from_json(&cmp.to_json_pretty().unwrap()).unwrap();
        assert_eq!(back.bin, cmp.bin);
        assert_eq!(back.data.y, cmp.data.y);
        assert_eq!(back.ratio.y.len(), 4);
    }
}
