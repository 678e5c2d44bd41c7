use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::time::{SystemTime, UNIX_EPOCH};

use sp_core::AnalysisConfig;
use sp_root::{Histogram, RootFileWriter};

const HT_BINS: [&str; 2] = ["375_475", "1075"];

const CONFIG: &str = r#"
variables: [AlphaT]
ht_bins: ["375_475", "1075"]
njet_bins: [le3j]
btag_bins: [eq0b]
mc_control_processes: [TTbar]
mc_signal_processes:
  low_btag:
    OneMuon: [TTbar]
    DiMuon: [Zinv]
variable_options:
  AlphaT: {rebin: 1, log: true}
output:
  stem: shape
"#;

fn bin_path() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_shapeplot"))
}

fn tmp_dir(name: &str) -> PathBuf {
    let nanos = SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_nanos();
    let mut p = std::env::temp_dir();
    p.push(format!("shapeplot_cli_{}_{}_{}", std::process::id(), nanos, name));
    std::fs::create_dir_all(&p).unwrap();
    p
}

fn run(args: &[&str]) -> Output {
    Command::new(bin_path())
        .args(args)
        .output()
        .unwrap_or_else(|e| panic!("failed to run {:?} {:?}: {}", bin_path(), args, e))
}

fn assert_success(out: &Output, what: &str) {
    assert!(
        out.status.success(),
        "{what} should succeed, stderr={}",
        String::from_utf8_lossy(&out.stderr)
    );
}

fn alpha_t(content: [f64; 4]) -> Histogram {
    Histogram {
        name: "AlphaT_le3j_eq0b".into(),
        title: "AlphaT".into(),
        bin_edges: vec![0.0, 0.5, 1.0, 1.5, 2.0],
        bin_content: content.to_vec(),
        sumw2: None,
        entries: content.iter().sum(),
    }
}

fn write(dir: &Path, file: &str, selections: &[(&str, [f64; 4])]) {
    let mut w = RootFileWriter::new().with_zlib(true);
    for ht in HT_BINS {
        for (sele, content) in selections {
            w.add(&format!("{sele}_{ht}"), alpha_t(*content));
        }
    }
    w.write(dir.join(file)).unwrap();
}

/// Input ROOT files plus a config naming them.
fn workspace(name: &str) -> (PathBuf, PathBuf) {
    let dir = tmp_dir(name);
    write(
        &dir,
        "Muon_Data.root",
        &[("OneMuon", [3.0, 1.0, 2.0, 0.0]), ("DiMuon", [1.0, 1.0, 0.0, 0.0])],
    );
    write(
        &dir,
        "Muon_TTbar.root",
        &[("OneMuon", [4.0, 4.0, 2.0, 2.0]), ("DiMuon", [2.0, 2.0, 0.0, 0.0])],
    );
    write(&dir, "Had_TTbar.root", &[("Had", [2.0, 2.0, 1.0, 1.0])]);
    write(&dir, "Had_Zinv.root", &[("Had", [1.0, 1.0, 1.0, 1.0])]);
    write(&dir, "Had_Data.root", &[("Had", [5.0, 3.0, 2.0, 0.0])]);
    let config = dir.join("analysis.yaml");
    std::fs::write(&config, CONFIG).unwrap();
    (dir, config)
}

fn s(p: &Path) -> &str {
    p.to_str().unwrap()
}

#[test]
fn default_config_round_trips() {
    let out = run(&["default-config"]);
    assert_success(&out, "default-config");
    let yaml = String::from_utf8(out.stdout).unwrap();
    let parsed = AnalysisConfig::from_yaml_str(&yaml).unwrap();
    assert_eq!(parsed, AnalysisConfig::default());

    // the printed file is accepted by --config; only the inputs are missing
    let dir = tmp_dir("default_config");
    let config = dir.join("default.yaml");
    std::fs::write(&config, &yaml).unwrap();
    let out = run(&[
        "yields",
        "--config",
        s(&config),
        "--input-dir",
        s(&dir),
        "--var",
        "AlphaT",
        "--njet",
        "le3j",
        "--btag",
        "eq0b",
        "--ht",
        "1075",
    ]);
    assert!(!out.status.success());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains(".root: "), "stderr={stderr}");
}

#[test]
fn keys_lists_directories_and_histograms() {
    let (dir, _) = workspace("keys");
    let file = dir.join("Muon_Data.root");

    let out = run(&["keys", s(&file)]);
    assert_success(&out, "keys");
    let top = String::from_utf8(out.stdout).unwrap();
    assert_eq!(top.lines().count(), 4);
    assert!(top.contains("OneMuon_375_475;1\tTDirectory"));
    assert!(top.contains("DiMuon_1075;1\tTDirectory"));

    let out = run(&["keys", s(&file), "--dir", "OneMuon_1075"]);
    assert_success(&out, "keys --dir");
    let listing = String::from_utf8(out.stdout).unwrap();
    assert_eq!(listing.trim(), "AlphaT_le3j_eq0b;1\tTH1D\tAlphaT");

    let out = run(&["keys", s(&file), "--dir", "Nope"]);
    assert!(!out.status.success());
}

#[test]
fn yields_reports_transfer_factors() {
    let (dir, config) = workspace("yields");
    let out = run(&[
        "yields",
        "--config",
        s(&config),
        "--input-dir",
        s(&dir),
        "--var",
        "AlphaT",
        "--njet",
        "le3j",
        "--btag",
        "eq0b",
        "--ht",
        "1075",
    ]);
    assert_success(&out, "yields");

    let v: serde_json::Value = serde_json::from_slice(&out.stdout).expect("stdout is JSON");
    let regions = v["regions"].as_array().expect("regions array");
    let one_muon = regions.iter().find(|r| r["region"] == "OneMuon").expect("OneMuon region");
    // TTbar: 6 in the signal region over 12 in the control region
    let tf = one_muon["transfer_factor"]["value"].as_f64().unwrap();
    assert!((tf - 0.5).abs() < 1e-12, "tf={tf}");
    let estimate = one_muon["estimate"]["value"].as_f64().unwrap();
    assert!((estimate - 3.0).abs() < 1e-12, "estimate={estimate}");
    assert_eq!(v["data_signal"]["value"].as_f64().unwrap(), 10.0);
}

#[test]
fn plot_writes_one_image_per_bin() {
    let (dir, config) = workspace("plot");
    let out_dir = dir.join("plots");
    let out = run(&[
        "plot",
        "--config",
        s(&config),
        "--input-dir",
        s(&dir),
        "--out-dir",
        s(&out_dir),
        "--format",
        "svg",
        "--emit-json",
    ]);
    assert_success(&out, "plot");

    for ht in HT_BINS {
        let svg = out_dir.join(format!("shape_AlphaT_le3j_eq0b_{ht}.svg"));
        let text = std::fs::read_to_string(&svg)
            .unwrap_or_else(|e| panic!("missing {}: {e}", svg.display()));
        assert!(text.starts_with("<svg"));
        assert!(text.contains(&format!("HT bin {ht}</text>")));
        assert!(text.contains(">Data/MC</text>"));

        let json = out_dir.join(format!("shape_AlphaT_le3j_eq0b_{ht}.json"));
        let v: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&json).unwrap()).unwrap();
        assert_eq!(v["x_label"], "AlphaT");
        assert_eq!(v["log_y"], true);
    }

    // the JSON artifact renders on its own
    let json = out_dir.join("shape_AlphaT_le3j_eq0b_1075.json");
    let rerendered = out_dir.join("again.svg");
    let out = run(&["render", "--input", s(&json), "--output", s(&rerendered)]);
    assert_success(&out, "render");
    assert!(std::fs::read_to_string(&rerendered).unwrap().contains(">Single μ BG</text>"));
}

#[test]
fn plot_rejects_unknown_formats_and_styles() {
    let (dir, config) = workspace("bad_args");
    let out = run(&["plot", "--config", s(&config), "--input-dir", s(&dir), "--format", "gif"]);
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("unknown output format 'gif'"));

    let style = dir.join("style.yaml");
    std::fs::write(&style, "theme: bogus\n").unwrap();
    let out = run(&["plot", "--config", s(&config), "--style", s(&style), "--format", "svg"]);
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("unknown theme 'bogus'"));
}
