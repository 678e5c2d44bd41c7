//! Analysis configuration (YAML).
//!
//! Every field has a default reproducing the standard 8 TeV run, so an empty
//! document (or no file at all) is a complete configuration:
//!
//! ```yaml
//! input_dir: /data/root_files
//! variables: [AlphaT, HT]
//! ht_scheme: excl
//! variable_options:
//!   AlphaT: { rebin: 10, log: true, x_label: "α_T" }
//! output: { dir: plots, format: svg }
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::labels::{BtagBin, HtBin, HtScheme, JetBin, PlotBin};
use crate::range::DEFAULT_RIGHT_PADDING;
use crate::source::{DEFAULT_PATH_TEMPLATE, PathTemplate};
use crate::systematics::SystematicsTable;
use crate::transfer::TransferMode;

const DEFAULT_VARIABLES: [&str; 14] = [
    "AlphaT",
    "JetMultiplicity",
    "LeadJetPt",
    "LeadJetEta",
    "SecondJetPt",
    "SecondJetEta",
    "HT",
    "MHT",
    "MET_Corrected",
    "MHTovMET",
    "ComMinBiasDPhi_acceptedJets",
    "EffectiveMass",
    "Number_Btags",
    "Number_Good_verticies",
];

const DEFAULT_HT_BINS: [&str; 8] =
    ["375_475", "475_575", "575_675", "675_775", "775_875", "875_975", "975_1075", "1075"];

const MC_CONTROL_PROCESSES: [&str; 6] = ["DY", "DiBoson", "TTbar", "WJets", "Zinv", "SingleTop"];
const EWK_PROCESSES: [&str; 5] = ["DY", "DiBoson", "TTbar", "WJets", "SingleTop"];

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// A control region whose data shape becomes one background component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlRegion {
    /// Selection name used in histogram paths, e.g. `OneMuon`.
    pub name: String,
    /// Input file prefix, e.g. `Muon` for `Muon_Data.root`.
    pub file_prefix: String,
    /// Legend title.
    pub title: String,
    /// Fill colour.
    pub color: String,
}

impl ControlRegion {
    fn new(name: &str, file_prefix: &str, title: &str, color: &str) -> Self {
        Self {
            name: name.into(),
            file_prefix: file_prefix.into(),
            title: title.into(),
            color: color.into(),
        }
    }
}

/// MC processes summed in the signal region, per control region.
///
/// Two tables: one for b-tag bins with 0 or 1 b-tags, one for the rest.
/// A control region with no (or an empty) entry is skipped for that b-tag bin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignalProcesses {
    /// Used when [`BtagBin::uses_low_btag_processes`] holds.
    pub low_btag: BTreeMap<String, Vec<String>>,
    /// Used otherwise.
    pub high_btag: BTreeMap<String, Vec<String>>,
}

impl Default for SignalProcesses {
    fn default() -> Self {
        let mut all = strings(&EWK_PROCESSES);
        all.push("Zinv".into());
        Self {
            low_btag: BTreeMap::from([
                ("OneMuon".into(), strings(&EWK_PROCESSES)),
                ("DiMuon".into(), strings(&["Zinv"])),
            ]),
            high_btag: BTreeMap::from([
                ("OneMuon".into(), all),
                ("DiMuon".into(), Vec::new()),
            ]),
        }
    }
}

impl SignalProcesses {
    /// Signal-region processes for `region` in `btag`.
    pub fn for_region(&self, btag: &BtagBin, region: &str) -> &[String] {
        let table = if btag.uses_low_btag_processes() { &self.low_btag } else { &self.high_btag };
        table.get(region).map_or(&[], Vec::as_slice)
    }
}

/// Per-variable plotting options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VariableOptions {
    /// Adjacent bins merged after retrieval.
    pub rebin: usize,
    /// Log-scale y-axis on the main panel.
    pub log: bool,
    /// X-axis title; the variable name when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x_label: Option<String>,
}

impl Default for VariableOptions {
    fn default() -> Self {
        Self { rebin: 2, log: false, x_label: None }
    }
}

impl VariableOptions {
    fn with(rebin: usize, log: bool) -> Self {
        Self { rebin, log, x_label: None }
    }
}

fn default_variable_options() -> BTreeMap<String, VariableOptions> {
    BTreeMap::from([
        ("Number_Btags".into(), VariableOptions::with(1, false)),
        ("JetMultiplicity".into(), VariableOptions::with(1, false)),
        ("MHTovMET".into(), VariableOptions::with(1, false)),
        ("AlphaT".into(), VariableOptions::with(10, true)),
        ("ComMinBiasDPhi".into(), VariableOptions::with(10, true)),
        ("ComMinBiasDPhi_acceptedJets".into(), VariableOptions::with(10, true)),
        ("HT".into(), VariableOptions::with(2, true)),
    ])
}

/// Where and how plots are written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Output directory.
    pub dir: PathBuf,
    /// File name stem.
    pub stem: String,
    /// Image format (`pdf`, `svg`, `png`).
    pub format: String,
    /// Also write the comparison as JSON next to each image.
    pub emit_json: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("."),
            stem: "plot".into(),
            format: "pdf".into(),
            emit_json: false,
        }
    }
}

/// Full analysis configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Directory holding the input ROOT files.
    pub input_dir: PathBuf,
    /// In-file histogram path template.
    pub path_template: String,
    /// Signal-region selection name and file prefix.
    pub signal_selection: String,
    /// Sample name of the data files.
    pub data_sample: String,
    /// Variables (histogram titles) to plot.
    pub variables: Vec<String>,
    /// Options for variables that differ from the defaults.
    pub variable_options: BTreeMap<String, VariableOptions>,
    /// HT bin labels, ascending.
    pub ht_bins: Vec<String>,
    /// Whether an HT bin includes the bins above it.
    pub ht_scheme: HtScheme,
    /// Jet-multiplicity bin labels.
    pub njet_bins: Vec<String>,
    /// B-tag bin labels.
    pub btag_bins: Vec<String>,
    /// Control regions, one background component each.
    pub control_regions: Vec<ControlRegion>,
    /// MC processes summed in every control region.
    pub mc_control_processes: Vec<String>,
    /// MC processes summed in the signal region.
    pub mc_signal_processes: SignalProcesses,
    /// Transfer-factor systematics in percent.
    pub systematics: SystematicsTable,
    /// How the transfer factor is applied.
    pub transfer_mode: TransferMode,
    /// Fraction of the filled x-width added on the right.
    pub right_padding: f64,
    /// Y-range of the ratio panel.
    pub ratio_range: [f64; 2],
    /// Output settings.
    pub output: OutputConfig,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("."),
            path_template: DEFAULT_PATH_TEMPLATE.into(),
            signal_selection: "Had".into(),
            data_sample: "Data".into(),
            variables: strings(&DEFAULT_VARIABLES),
            variable_options: default_variable_options(),
            ht_bins: strings(&DEFAULT_HT_BINS),
            ht_scheme: HtScheme::Inclusive,
            njet_bins: strings(&["le3j", "ge4j"]),
            btag_bins: strings(&["eq0b", "eq1b"]),
            control_regions: vec![
                ControlRegion::new("OneMuon", "Muon", "Single μ BG", "#9933ff"),
                ControlRegion::new("DiMuon", "Muon", "μμ BG", "#ffcc00"),
            ],
            mc_control_processes: strings(&MC_CONTROL_PROCESSES),
            mc_signal_processes: SignalProcesses::default(),
            systematics: SystematicsTable::default(),
            transfer_mode: TransferMode::Integral,
            right_padding: DEFAULT_RIGHT_PADDING,
            ratio_range: [0.0, 2.0],
            output: OutputConfig::default(),
        }
    }
}

impl AnalysisConfig {
    /// Parse and validate a YAML document.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml_ng::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a YAML file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_yaml_str(&text)?;
        tracing::debug!(
            path = %path.display(),
            variables = config.variables.len(),
            "loaded config"
        );
        Ok(config)
    }

    /// Serialize to YAML.
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml_ng::to_string(self)?)
    }

    /// Check labels, ordering and that every plotted bin has a systematic.
    pub fn validate(&self) -> Result<()> {
        if self.control_regions.is_empty() {
            return Err(Error::Config("no control regions".into()));
        }
        let mut seen = BTreeSet::new();
        for region in &self.control_regions {
            if !seen.insert(region.name.as_str()) {
                return Err(Error::Config(format!("duplicate control region '{}'", region.name)));
            }
        }
        if self.mc_control_processes.is_empty() {
            return Err(Error::Config("no MC control-region processes".into()));
        }
        if let Some((var, _)) = self.variable_options.iter().find(|(_, o)| o.rebin == 0) {
            return Err(Error::InvalidRebin { name: var.clone(), factor: 0 });
        }
        if !self.right_padding.is_finite() || self.right_padding < 0.0 {
            return Err(Error::Config(format!(
                "right_padding {} must be finite and non-negative",
                self.right_padding
            )));
        }
        let [lo, hi] = self.ratio_range;
        if !(hi - lo).is_finite() || lo >= hi {
            return Err(Error::Config(format!("ratio_range [{lo}, {hi}] is empty or not finite")));
        }

        for label in &self.njet_bins {
            label.parse::<JetBin>()?;
        }
        for label in &self.btag_bins {
            label.parse::<BtagBin>()?;
        }
        let ht = self.ht_bins.iter().map(|l| l.parse::<HtBin>()).collect::<Result<Vec<_>>>()?;
        if let Some(w) = ht.windows(2).find(|w| w[1].low() <= w[0].low()) {
            return Err(Error::Config(format!(
                "HT bins must be ascending: '{}' follows '{}'",
                w[1].label(),
                w[0].label()
            )));
        }

        for njet in &self.njet_bins {
            for ht in &self.ht_bins {
                self.systematics.percent(njet, ht)?;
            }
        }
        Ok(())
    }

    /// Every (variable, jet bin, b-tag bin, HT bin) combination, variable outermost.
    pub fn plot_bins(&self) -> Result<Vec<PlotBin>> {
        let mut bins = Vec::with_capacity(
            self.variables.len() * self.njet_bins.len() * self.btag_bins.len() * self.ht_bins.len(),
        );
        for var in &self.variables {
            for njet in &self.njet_bins {
                for btag in &self.btag_bins {
                    for ht in &self.ht_bins {
                        bins.push(PlotBin::parse(var, njet, btag, ht)?);
                    }
                }
            }
        }
        Ok(bins)
    }

    /// Options for `variable`, falling back to the defaults.
    pub fn options_for(&self, variable: &str) -> VariableOptions {
        self.variable_options.get(variable).cloned().unwrap_or_default()
    }

    /// X-axis title for `variable`.
    pub fn x_label(&self, variable: &str) -> String {
        self.variable_options
            .get(variable)
            .and_then(|o| o.x_label.clone())
            .unwrap_or_else(|| variable.to_string())
    }

    /// Control region by name.
    pub fn control_region(&self, name: &str) -> Option<&ControlRegion> {
        self.control_regions.iter().find(|r| r.name == name)
    }

    /// In-file path template.
    pub fn path_template(&self) -> PathTemplate {
        PathTemplate::new(&self.path_template)
    }

    /// `<input_dir>/<prefix>_<data>.root`
    pub fn data_control_file(&self, region: &ControlRegion) -> PathBuf {
        self.input_dir.join(format!("{}_{}.root", region.file_prefix, self.data_sample))
    }

    /// `<input_dir>/<prefix>_<process>.root`
    pub fn mc_control_file(&self, region: &ControlRegion, process: &str) -> PathBuf {
        self.input_dir.join(format!("{}_{process}.root", region.file_prefix))
    }

    /// `<input_dir>/<signal>_<process>.root`
    pub fn mc_signal_file(&self, process: &str) -> PathBuf {
        self.input_dir.join(format!("{}_{process}.root", self.signal_selection))
    }

    /// `<input_dir>/<signal>_<data>.root`
    pub fn data_signal_file(&self) -> PathBuf {
        self.input_dir.join(format!("{}_{}.root", self.signal_selection, self.data_sample))
    }
}
