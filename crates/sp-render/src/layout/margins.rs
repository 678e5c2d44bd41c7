/// Rectangular area within the canvas, in points from the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlotArea {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl PlotArea {
    pub fn manual(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self { left, top, width, height }
    }

    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    /// Canvas point of normalized coordinates (0,0 = bottom-left, 1,1 = top-right).
    pub fn ndc(&self, x: f64, y: f64) -> (f64, f64) {
        (self.left + x * self.width, self.bottom() - y * self.height)
    }

    /// Sub-area spanned by a normalized `[x1, y1, x2, y2]` box.
    pub fn ndc_box(&self, b: [f64; 4]) -> PlotArea {
        let (left, bottom) = self.ndc(b[0], b[1]);
        let (right, top) = self.ndc(b[2], b[3]);
        Self { left, top, width: right - left, height: bottom - top }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn ndc_is_bottom_up() {
        let pad = PlotArea::manual(0.0, 10.0, 200.0, 100.0);
        assert_eq!(pad.ndc(0.0, 0.0), (0.0, 110.0));
        assert_eq!(pad.ndc(1.0, 1.0), (200.0, 10.0));

        let legend = pad.ndc_box([0.5, 0.25, 0.75, 0.5]);
        assert_relative_eq!(legend.left, 100.0);
        assert_relative_eq!(legend.top, 60.0);
        assert_relative_eq!(legend.width, 50.0);
        assert_relative_eq!(legend.height, 25.0);
        assert_relative_eq!(legend.bottom(), 85.0);
    }
}
