//! Output file names: `<dir>/<stem>_<var>_<njet>_<btag>_<ht>.<ext>`.

use std::path::{Path, PathBuf};

use crate::labels::PlotBin;

/// Path of the image (or JSON artifact) for one plot.
pub fn output_path(dir: &Path, stem: &str, bin: &PlotBin, ext: &str) -> PathBuf {
    dir.join(format!("{stem}_{bin}.{ext}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn follows_the_template() {
        let bin = PlotBin::parse("AlphaT", "le3j", "eq0b", "375_475").unwrap();
        assert_eq!(
            output_path(Path::new("out"), "plot", &bin, "pdf"),
            Path::new("out/plot_AlphaT_le3j_eq0b_375_475.pdf")
        );
        assert_eq!(
            output_path(Path::new("."), "shapes", &bin, "json"),
            Path::new("./shapes_AlphaT_le3j_eq0b_375_475.json")
        );
    }
}
