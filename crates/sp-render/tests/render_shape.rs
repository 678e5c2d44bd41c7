//! Estimate a background from in-memory inputs and render it.

use std::path::{Path, PathBuf};

use sp_core::{
    Analysis, AnalysisConfig, HistRequest, Hist1D, MemorySource, PlotBin, VariableOptions,
};
use sp_render::{OutputFormat, ShapeRenderer, StyleConfig, resolve_style};

const HT_BINS: [&str; 2] = ["375_475", "1075"];

fn h(values: [f64; 4]) -> Hist1D {
    let errors = values.iter().map(|v| v.sqrt()).collect();
    Hist1D::new("h", vec![0.0, 0.5, 1.0, 1.5, 2.0], values.to_vec(), errors).unwrap()
}

fn source() -> MemorySource {
    let mut src = MemorySource::new();
    let inputs: [(&str, &str, [f64; 4]); 7] = [
        ("in/Muon_Data.root", "OneMuon", [12.0, 8.0, 3.0, 0.0]),
        ("in/Muon_Data.root", "DiMuon", [3.0, 2.0, 1.0, 0.0]),
        ("in/Muon_TTbar.root", "OneMuon", [20.0, 20.0, 5.0, 1.0]),
        ("in/Muon_TTbar.root", "DiMuon", [4.0, 4.0, 1.0, 0.0]),
        ("in/Had_TTbar.root", "Had", [10.0, 10.0, 2.0, 1.0]),
        ("in/Had_Zinv.root", "Had", [6.0, 4.0, 1.0, 0.0]),
        ("in/Had_Data.root", "Had", [14.0, 12.0, 3.0, 0.0]),
    ];
    for ht in HT_BINS {
        for (file, sele, values) in inputs {
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
    }
    src
}

fn config() -> AnalysisConfig {
    let mut config = AnalysisConfig {
        input_dir: PathBuf::from("in"),
        variables: vec!["AlphaT".into()],
        ht_bins: HT_BINS.iter().map(|s| s.to_string()).collect(),
        njet_bins: vec!["le3j".into()],
        btag_bins: vec!["eq0b".into()],
        mc_control_processes: vec!["TTbar".into()],
        ..Default::default()
    };
    config.mc_signal_processes.low_btag.insert("OneMuon".into(), vec!["TTbar".into()]);
    config.mc_signal_processes.low_btag.insert("DiMuon".into(), vec!["Zinv".into()]);
    config
        .variable_options
        .insert("AlphaT".into(), VariableOptions { rebin: 1, log: true, x_label: None });
    config.validate().unwrap();
    config
}

fn comparison() -> sp_core::ShapeComparison {
    let config = config();
    let mut analysis = Analysis::new(&config, source());
    let bin = PlotBin::parse("AlphaT", "le3j", "eq0b", "375_475").unwrap();
    analysis.compare(&bin).unwrap()
}

#[test]
fn svg_has_legend_header_and_ratio_panel() {
    let cmp = comparison();
    let renderer = ShapeRenderer::without_fonts(StyleConfig::default()).unwrap();
    let svg = String::from_utf8(renderer.to_bytes(&cmp, OutputFormat::Svg).unwrap()).unwrap();

    for text in [
        "Data + stat. error",
        "Single μ BG",
        "μμ BG",
        "Stat. error",
        "Stat. + syst. error",
        "CMS 2012, √s = 8 TeV",
        "∫L dt = 18.493 fb⁻¹",
        "≤ 3 jets, = 0 b-tag, HT bin 375_475",
        "Data/MC",
        "Events",
    ] {
        assert!(svg.contains(&format!(">{text}</text>")), "missing {text}");
    }
    assert!(svg.contains(r##"fill="#9933ff""##));
    assert!(svg.contains(r##"fill="#ffcc00""##));
}

#[test]
fn minimal_theme_drops_the_experiment_text() {
    let cmp = comparison();
    let style = resolve_style(Some("theme: minimal")).unwrap();
    let svg = ShapeRenderer::without_fonts(style).unwrap().svg(&cmp).unwrap();
    assert!(!svg.contains("CMS 2012"));
    assert!(svg.contains(">Data/MC</text>"));
}

#[cfg(feature = "pdf")]
#[test]
fn pdf_file_is_written() {
    let cmp = comparison();
    let renderer = ShapeRenderer::without_fonts(StyleConfig::default()).unwrap();
    let path = std::env::temp_dir().join(format!("sp_render_it_{}.pdf", std::process::id()));
    renderer.to_file(&cmp, &path).unwrap();
    let bytes = std::fs::read(&path).unwrap();
    assert!(bytes.starts_with(b"%PDF-"));
    let _ = std::fs::remove_file(&path);
}

#[test]
fn comparison_json_round_trips_into_the_renderer() {
    let cmp = comparison();
    let json = cmp.to_json_pretty().unwrap();
    let bytes = sp_render::render_json_to_bytes(&json, "svg", &StyleConfig::default()).unwrap();
    assert!(String::from_utf8(bytes).unwrap().contains(">Single μ BG</text>"));
}
