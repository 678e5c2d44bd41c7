use crate::canvas::Canvas;
use crate::color::Color;
use crate::layout::margins::PlotArea;
use crate::primitives::*;

pub struct LegendEntry {
    pub label: String,
    pub color: Color,
    pub kind: LegendKind,
}

pub enum LegendKind {
    /// Filled box with a dark outline (a stacked component).
    FilledRect,
    /// Marker with a vertical error bar (data points).
    Marker,
    /// Hatched box (an uncertainty band).
    Hatched(Hatch),
}

/// Draw `entries` top-down in `bbox`, one equal-height row each.
pub fn draw_legend(
    canvas: &mut Canvas,
    bbox: &PlotArea,
    entries: &[LegendEntry],
    font_size: f64,
    frame: bool,
) {
    if entries.is_empty() {
        return;
    }

    let row_height = bbox.height / entries.len() as f64;
    let swatch_w = (bbox.width * 0.22).min(24.0);
    let swatch_h = (row_height * 0.6).min(font_size);
    let gap = 5.0;

    let text_style = TextStyle {
        size: font_size.min(row_height * 0.8),
        baseline: TextBaseline::Central,
        ..Default::default()
    };

    if frame {
        canvas.rect(
            bbox.left,
            bbox.top,
            bbox.width,
            bbox.height,
            &Style::stroked(Color::BLACK, 0.5),
        );
    }

    for (i, entry) in entries.iter().enumerate() {
        let ey = bbox.top + (i as f64 + 0.5) * row_height;
        let sx = bbox.left + gap;
        let sy = ey - swatch_h / 2.0;

        match &entry.kind {
            LegendKind::FilledRect => {
                let style = Style::filled_outlined(entry.color, Color::BLACK, 0.5);
                canvas.rect(sx, sy, swatch_w, swatch_h, &style);
            }
            LegendKind::Marker => {
                let cx = sx + swatch_w / 2.0;
                canvas.line(cx, sy, cx, sy + swatch_h, &LineStyle::solid(entry.color, 1.0));
                canvas.marker(
                    cx,
                    ey,
                    &MarkerStyle::circle(entry.color, 3.0),
                );
            }
            LegendKind::Hatched(hatch) => {
                canvas.hatch_rect(sx, sy, swatch_w, swatch_h, hatch);
            }
        }

        canvas.text(sx + swatch_w + gap, ey, &entry.label, &text_style);
    }
}
