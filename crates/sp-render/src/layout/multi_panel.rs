use crate::layout::margins::PlotArea;

/// Main + ratio panel layout sharing one x axis.
#[derive(Debug, Clone)]
pub struct MainRatioLayout {
    pub main: PlotArea,
    pub ratio: PlotArea,
}

impl MainRatioLayout {
    /// `ratio_frac` of `total_height` goes to the ratio panel, the rest minus
    /// `gap` to the main panel above it.
    pub fn new(
        left: f64,
        top: f64,
        width: f64,
        total_height: f64,
        gap: f64,
        ratio_frac: f64,
    ) -> Self {
        let ratio_h = total_height * ratio_frac;
        let main_h = total_height - ratio_h - gap;

        Self {
            main: PlotArea::manual(left, top, width, main_h),
            ratio: PlotArea::manual(left, top + main_h + gap, width, ratio_h),
        }
    }

    /// The upper pad: full canvas width, from the canvas top down to the bottom
    /// of the main panel. Legend and text boxes are placed in its coordinates.
    pub fn upper_pad(&self, canvas_width: f64) -> PlotArea {
        PlotArea::manual(0.0, 0.0, canvas_width, self.main.bottom())
    }
}
