use sp_core::artifact::{
    ArtifactMeta, BinInfo, ComponentSeries, RatioSeries, SHAPE_COMPARISON_SCHEMA, Series,
};
use sp_core::{PlotBin, ShapeComparison, Yield};

fn series(name: &str, y: &[f64], yerr: &[f64]) -> Series {
    Series { name: name.into(), y: y.to_vec(), yerr: yerr.to_vec() }
}

/// Three bins; two components; data in the first two bins only.
pub fn comparison() -> ShapeComparison {
    let bin = PlotBin::parse("AlphaT", "le3j", "eq0b", "375_475").unwrap();
    let component = |region: &str, title: &str, color: &str, y: &[f64]| ComponentSeries {
        region: region.into(),
        title: title.into(),
        color: color.into(),
        transfer_factor: Yield { value: 0.5, error: 0.05 },
        y: y.to_vec(),
        yerr: y.iter().map(|v| v.sqrt()).collect(),
    };
    ShapeComparison {
        schema_version: SHAPE_COMPARISON_SCHEMA.into(),
        meta: ArtifactMeta::now(),
        bin: BinInfo::new(&bin, &["375_475", "1075"]),
        x_label: "AlphaT".into(),
        y_label: "Events".into(),
        log_y: false,
        bin_edges: vec![0.0, 1.0, 2.0, 3.0],
        x_range: [0.0, 3.0],
        y_range: [0.0, 20.0],
        ratio_range: [0.0, 2.0],
        systematic_percent: 10.0,
        data: series("Data", &[10.0, 5.0, 0.0], &[10f64.sqrt(), 5f64.sqrt(), 0.0]),
        components: vec![
            component("DiMuon", "μμ BG", "#ffcc00", &[2.0, 1.0, 0.0]),
            component("OneMuon", "Single μ BG", "#9933ff", &[6.0, 3.0, 0.0]),
        ],
        stat_bands: vec![
            series("DiMuon", &[2.0, 1.0, 0.0], &[1.4, 1.0, 0.0]),
            series("OneMuon", &[8.0, 4.0, 0.0], &[2.8, 2.0, 0.0]),
        ],
        stat_syst_bands: vec![
            series("DiMuon", &[2.0, 1.0, 0.0], &[1.5, 1.1, 0.0]),
            series("OneMuon", &[8.0, 4.0, 0.0], &[3.0, 2.1, 0.0]),
        ],
        ratio: RatioSeries { y: vec![Some(1.25), Some(1.25), None], yerr: vec![0.5, 0.7, 0.0] },
    }
}
