//! Jet-multiplicity, b-tag and HT bin labels as they appear in histogram names.
//!
//! Labels are kept verbatim (they are part of the on-disk paths and output file
//! names) alongside a parsed form used for display text.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Comparison encoded in a multiplicity label prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    /// `eq`
    Eq,
    /// `le`
    Le,
    /// `ge`
    Ge,
}

impl Comparison {
    fn symbol(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Le => "\u{2264}",
            Self::Ge => "\u{2265}",
        }
    }
}

/// Parse `<eq|le|ge><N><suffix>`, e.g. `le3j`, `eq0b`.
fn parse_multiplicity(label: &str, suffix: char) -> Option<(Comparison, u32)> {
    let body = label.strip_suffix(suffix)?;
    let (cmp, n) = if let Some(n) = body.strip_prefix("eq") {
        (Comparison::Eq, n)
    } else if let Some(n) = body.strip_prefix("le") {
        (Comparison::Le, n)
    } else if let Some(n) = body.strip_prefix("ge") {
        (Comparison::Ge, n)
    } else {
        return None;
    };
    Some((cmp, n.parse().ok()?))
}

/// Jet-multiplicity bin, e.g. `le3j`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JetBin {
    label: String,
    cmp: Comparison,
    n: u32,
}

impl JetBin {
    /// The label as written in histogram names.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Human-readable text, e.g. `≤ 3 jets`.
    pub fn text(&self) -> String {
        let noun = if self.n == 1 && self.cmp == Comparison::Eq { "jet" } else { "jets" };
        format!("{} {} {noun}", self.cmp.symbol(), self.n)
    }
}

impl FromStr for JetBin {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let (cmp, n) = parse_multiplicity(s, 'j')
            .ok_or_else(|| Error::InvalidLabel { kind: "jet bin", label: s.to_string() })?;
        Ok(Self { label: s.to_string(), cmp, n })
    }
}

impl fmt::Display for JetBin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label)
    }
}

/// B-tag multiplicity bin, e.g. `eq0b`.
///
/// Parsing never fails: labels outside the `eqNb`/`leNb`/`geNb` grammar are
/// kept for file lookup and displayed as `≥ 0 b-tag`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BtagBin {
    label: String,
    parsed: Option<(Comparison, u32)>,
}

impl BtagBin {
    /// The label as written in histogram names.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Human-readable text, e.g. `= 0 b-tag`.
    pub fn text(&self) -> String {
        match self.parsed {
            Some((cmp, n)) => format!("{} {n} b-tag", cmp.symbol()),
            None => format!("{} 0 b-tag", Comparison::Ge.symbol()),
        }
    }

    /// Whether the signal-region MC process table for low b-tag multiplicity
    /// applies: any label that mentions zero or one b-tag.
    pub fn uses_low_btag_processes(&self) -> bool {
        self.label.contains(['0', '1'])
    }
}

impl FromStr for BtagBin {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        if s.is_empty() {
            return Err(Error::InvalidLabel { kind: "b-tag bin", label: s.to_string() });
        }
        Ok(Self { label: s.to_string(), parsed: parse_multiplicity(s, 'b') })
    }
}

impl fmt::Display for BtagBin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label)
    }
}

/// HT bin in GeV: `375_475` (bounded) or `1075` (open-ended).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HtBin {
    label: String,
    low: u32,
    high: Option<u32>,
}

impl HtBin {
    /// The label as written in directory names.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Lower edge in GeV.
    pub fn low(&self) -> u32 {
        self.low
    }

    /// Upper edge in GeV, `None` for the last (open) bin.
    pub fn high(&self) -> Option<u32> {
        self.high
    }

    /// Human-readable text, e.g. `375-475 GeV`.
    pub fn text(&self) -> String {
        match self.high {
            Some(high) => format!("{}-{high} GeV", self.low),
            None => format!("> {} GeV", self.low),
        }
    }
}

impl FromStr for HtBin {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || Error::InvalidLabel { kind: "HT bin", label: s.to_string() };
        let (low, high) = match s.split_once('_') {
            Some((lo, hi)) => {
                let lo: u32 = lo.parse().map_err(|_| invalid())?;
                let hi: u32 = hi.parse().map_err(|_| invalid())?;
                if hi <= lo {
                    return Err(invalid());
                }
                (lo, Some(hi))
            }
            None => (s.parse().map_err(|_| invalid())?, None),
        };
        Ok(Self { label: s.to_string(), low, high })
    }
}

impl fmt::Display for HtBin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label)
    }
}

/// How an HT bin label selects histograms.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum HtScheme {
    /// The named bin plus every configured bin above it.
    #[default]
    #[serde(rename = "incl")]
    Inclusive,
    /// The named bin only.
    #[serde(rename = "excl")]
    Exclusive,
}

impl HtScheme {
    /// HT bin labels to sum for `ht`, given the configured bins in ascending order.
    ///
    /// A label that is not configured selects just itself.
    pub fn select<'a>(self, ht: &'a str, configured: &'a [String]) -> Vec<&'a str> {
        match self {
            Self::Exclusive => vec![ht],
            Self::Inclusive => match configured.iter().position(|b| b == ht) {
                Some(i) => configured[i..].iter().map(String::as_str).collect(),
                None => vec![ht],
            },
        }
    }
}

/// Text shown above the plot: `<jets>, <b-tags>, HT bin <label>`.
pub fn bin_text(njet: &JetBin, btag: &BtagBin, ht: &HtBin) -> String {
    format!("{}, {}, HT bin {}", njet.text(), btag.text(), ht.label())
}

/// One plot: a variable in one (jet, b-tag, HT) bin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlotBin {
    /// Histogram title.
    pub variable: String,
    /// Jet-multiplicity bin.
    pub njet: JetBin,
    /// B-tag bin.
    pub btag: BtagBin,
    /// HT bin (the lowest one summed under the inclusive scheme).
    pub ht: HtBin,
}

impl PlotBin {
    /// Parse the three bin labels.
    pub fn parse(variable: &str, njet: &str, btag: &str, ht: &str) -> Result<Self> {
        Ok(Self {
            variable: variable.to_string(),
            njet: njet.parse()?,
            btag: btag.parse()?,
            ht: ht.parse()?,
        })
    }

    /// Text shown above the plot.
    pub fn text(&self) -> String {
        bin_text(&self.njet, &self.btag, &self.ht)
    }
}

/// `<var>_<njet>_<btag>_<ht>`, the part of output file names after the stem.
impl fmt::Display for PlotBin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}_{}_{}", self.variable, self.njet, self.btag, self.ht)
    }
}
