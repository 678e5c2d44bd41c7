//! Transfer-factor systematic uncertainties from closure tests, in percent,
//! keyed by jet bin then HT bin.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

const HT_LABELS: [&str; 11] = [
    "200_275", "275_325", "325_375", "375_475", "475_575", "575_675", "675_775", "775_875",
    "875_975", "975_1075", "1075",
];
const LE3J_PERCENT: [f64; 11] = [4.0, 6.0, 6.0, 8.0, 8.0, 12.0, 12.0, 17.0, 17.0, 19.0, 19.0];
const GE4J_PERCENT: [f64; 11] = [6.0, 6.0, 11.0, 11.0, 11.0, 18.0, 18.0, 20.0, 20.0, 26.0, 26.0];

/// Lookup table `jet bin → HT bin → percent`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SystematicsTable(BTreeMap<String, BTreeMap<String, f64>>);

impl Default for SystematicsTable {
    fn default() -> Self {
        let row = |pct: [f64; 11]| -> BTreeMap<String, f64> {
            HT_LABELS.iter().zip(pct).map(|(ht, p)| (ht.to_string(), p)).collect()
        };
        Self(BTreeMap::from([
            ("le3j".to_string(), row(LE3J_PERCENT)),
            ("ge4j".to_string(), row(GE4J_PERCENT)),
        ]))
    }
}

impl SystematicsTable {
    /// Systematic in percent for a jet bin and HT bin. A miss is an error.
    pub fn percent(&self, njet: &str, ht: &str) -> Result<f64> {
        self.0.get(njet).and_then(|row| row.get(ht)).copied().ok_or_else(|| {
            Error::MissingSystematic { njet: njet.to_string(), ht: ht.to_string() }
        })
    }

    /// Set (or override) one entry.
    pub fn insert(&mut self, njet: impl Into<String>, ht: impl Into<String>, percent: f64) {
        self.0.entry(njet.into()).or_default().insert(ht.into(), percent);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_closure_tests() {
        let t = SystematicsTable::default();
        assert_eq!(t.percent("le3j", "200_275").unwrap(), 4.0);
        assert_eq!(t.percent("le3j", "375_475").unwrap(), 8.0);
        assert_eq!(t.percent("le3j", "1075").unwrap(), 19.0);
        assert_eq!(t.percent("ge4j", "325_375").unwrap(), 11.0);
        assert_eq!(t.percent("ge4j", "675_775").unwrap(), 18.0);
        assert_eq!(t.percent("ge4j", "975_1075").unwrap(), 26.0);
    }

    #[test]
    fn misses_are_errors() {
        let t = SystematicsTable::default();
        assert!(matches!(
            t.percent("ge2j", "375_475"),
            Err(Error::MissingSystematic { njet, ht }) if njet == "ge2j" && ht == "375_475"
        ));
        assert!(matches!(t.percent("le3j", "150_200"), Err(Error::MissingSystematic { .. })));
    }

    #[test]
    fn insert_overrides() {
        let mut t = SystematicsTable::default();
        t.insert("ge2j", "375_475", 9.5);
        t.insert("le3j", "375_475", 10.0);
        assert_eq!(t.percent("ge2j", "375_475").unwrap(), 9.5);
        assert_eq!(t.percent("le3j", "375_475").unwrap(), 10.0);
    }

    #[test]
    fn yaml_is_a_plain_nested_map() {
        let t: SystematicsTable = serde_yaml_ng::from_str("le3j:\n  375_475: 8\n").unwrap();
        assert_eq!(t.percent("le3j", "375_475").unwrap(), 8.0);
        assert!(t.percent("ge4j", "375_475").is_err());
    }
}
