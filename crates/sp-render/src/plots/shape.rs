//! Data versus stacked background: main panel with uncertainty bands, ratio
//! panel below it, legend and header text in the upper pad.

use sp_core::ShapeComparison;

use crate::canvas::Canvas;
use crate::color::Color;
use crate::config::StyleConfig;
use crate::font::FontHandle;
use crate::header::{draw_bin_text, draw_standard_text};
use crate::layout::axes::Axis;
use crate::layout::legend::{self, LegendEntry, LegendKind};
use crate::layout::margins::PlotArea;
use crate::layout::multi_panel::MainRatioLayout;
use crate::plots::axes_draw::draw_axes;
use crate::primitives::*;

pub const DATA_LABEL: &str = "Data + stat. error";
pub const STAT_LABEL: &str = "Stat. error";
pub const STAT_SYST_LABEL: &str = "Stat. + syst. error";
pub const RATIO_LABEL: &str = "Data/MC";

/// Pixel mapping of one panel.
struct Panel<'a> {
    area: &'a PlotArea,
    x: &'a Axis,
    y: &'a Axis,
}

impl Panel<'_> {
    fn px(&self, x: f64) -> f64 {
        self.x.data_to_pixel(x, self.area.left, self.area.right())
    }

    /// Values outside the y range are clamped; the clip path hides the rest.
    fn py(&self, y: f64) -> f64 {
        self.y.data_to_pixel(self.y.clamp(y), self.area.bottom(), self.area.top)
    }

    /// Canvas rectangle spanning `[x_lo, x_hi] × [y_lo, y_hi]`.
    fn rect(&self, x_lo: f64, x_hi: f64, y_lo: f64, y_hi: f64) -> (f64, f64, f64, f64) {
        let (left, right) = (self.px(x_lo), self.px(x_hi));
        let (top, bottom) = (self.py(y_hi), self.py(y_lo));
        (left, top, right - left, bottom - top)
    }
}

pub fn render(
    cmp: &ShapeComparison,
    style: &StyleConfig,
    fonts: &FontHandle,
) -> crate::Result<String> {
    check(cmp)?;
    let n_bins = cmp.n_bins();
    let edges = &cmp.bin_edges;

    let fig_w = style.figure.width;
    let fig_h = style.figure.height;
    let lay = &style.layout;
    let mut canvas = Canvas::new(fig_w, fig_h, fonts);

    let left = fig_w * lay.margin_left;
    let top = fig_h * lay.margin_top;
    let content_w = fig_w * (1.0 - lay.margin_left - lay.margin_right);
    let content_h = fig_h * (1.0 - lay.margin_top - lay.margin_bottom);
    let layout =
        MainRatioLayout::new(left, top, content_w, content_h, lay.panel_gap, lay.ratio_fraction);

    let x_axis = Axis::linear(cmp.x_range[0], cmp.x_range[1], 6).with_label(&cmp.x_label);
    let x_axis_main = x_axis.clone().without_labels();
    let [y_lo, y_hi] = cmp.y_range;
    let y_axis_main =
        if cmp.log_y { Axis::log(y_lo, y_hi) } else { Axis::linear(y_lo, y_hi, 6) };
    let y_axis_main = y_axis_main.with_label(&cmp.y_label);
    let [r_lo, r_hi] = cmp.ratio_range;
    let y_axis_ratio = Axis::linear(r_lo, r_hi, 5).with_label(RATIO_LABEL);

    let stat_hatch = Hatch::diagonal("stat_band", style.colors.band, 5.0);
    let stat_syst_hatch = Hatch::cross("stat_syst_band", style.colors.band, 7.0);
    let data_color = style.colors.data;
    let component_colors: Vec<Color> = cmp
        .components
        .iter()
        .map(|c| Color::parse(&c.color).unwrap_or(style.colors.component_fallback))
        .collect();

    // --- Main panel ---
    let main = Panel { area: &layout.main, x: &x_axis_main, y: &y_axis_main };
    let m = main.area;
    canvas.push_clip(m.left, m.top, m.width, m.height);

    // Stacked components, bottom-up; each spans the previous cumulative to its own
    for (k, color) in component_colors.iter().enumerate() {
        let fill = Style::filled_outlined(*color, Color::BLACK, 0.5);
        for bi in 0..n_bins {
            let base = if k == 0 { 0.0 } else { cmp.stat_bands[k - 1].y[bi] };
            let cum = cmp.stat_bands[k].y[bi];
            if cum <= base {
                continue;
            }
            let (x, y, w, h) = main.rect(edges[bi], edges[bi + 1], base, cum);
            canvas.rect(x, y, w, h, &fill);
        }
    }

    let bands = [(&cmp.stat_bands, &stat_hatch), (&cmp.stat_syst_bands, &stat_syst_hatch)];
    for (bands, hatch) in bands {
        for band in bands {
            for bi in 0..n_bins {
                let (v, e) = (band.y[bi], band.yerr[bi]);
                if e <= 0.0 {
                    continue;
                }
                let (x, y, w, h) = main.rect(edges[bi], edges[bi + 1], v - e, v + e);
                canvas.hatch_rect(x, y, w, h, hatch);
            }
        }
    }

    // Data last, on top of everything
    let marker = MarkerStyle::circle(data_color, 3.0);
    let err_style = LineStyle::solid(data_color, 1.0);
    for bi in 0..n_bins {
        let (v, e) = (cmp.data.y[bi], cmp.data.yerr[bi]);
        if v == 0.0 && e == 0.0 {
            continue;
        }
        draw_point(&mut canvas, &main, edges[bi], edges[bi + 1], v, e, &marker, &err_style);
    }
    canvas.pop_clip();
    draw_axes(&mut canvas, m, &x_axis_main, &y_axis_main, style);

    // --- Ratio panel ---
    let ratio = Panel { area: &layout.ratio, x: &x_axis, y: &y_axis_ratio };
    let r = ratio.area;
    canvas.push_clip(r.left, r.top, r.width, r.height);
    let one = ratio.py(1.0);
    canvas.line(r.left, one, r.right(), one, &LineStyle::dashed(style.colors.ratio_line, 2.0));
    for bi in 0..n_bins {
        if let Some(v) = cmp.ratio.y[bi] {
            let e = cmp.ratio.yerr[bi];
            draw_point(&mut canvas, &ratio, edges[bi], edges[bi + 1], v, e, &marker, &err_style);
        }
    }
    canvas.pop_clip();
    draw_axes(&mut canvas, r, &x_axis, &y_axis_ratio, style);

    // --- Upper pad: header and legend ---
    let pad = layout.upper_pad(fig_w);
    draw_standard_text(&mut canvas, &pad, style);
    draw_bin_text(&mut canvas, &pad, &cmp.bin.text, style);

    let mut entries =
        vec![LegendEntry { label: DATA_LABEL.into(), color: data_color, kind: LegendKind::Marker }];
    entries.extend(cmp.components.iter().zip(&component_colors).rev().map(|(c, color)| {
        LegendEntry { label: c.title.clone(), color: *color, kind: LegendKind::FilledRect }
    }));
    entries.push(LegendEntry {
        label: STAT_LABEL.into(),
        color: stat_hatch.color,
        kind: LegendKind::Hatched(stat_hatch.clone()),
    });
    entries.push(LegendEntry {
        label: STAT_SYST_LABEL.into(),
        color: stat_syst_hatch.color,
        kind: LegendKind::Hatched(stat_syst_hatch.clone()),
    });
    let legend_box = pad.ndc_box(lay.legend_box);
    legend::draw_legend(&mut canvas, &legend_box, &entries, style.font.size, false);

    tracing::debug!(
        bin = %cmp.bin.text,
        n_bins,
        components = cmp.components.len(),
        "rendered shape plot"
    );
    Ok(canvas.finish_svg())
}

/// Marker at the bin center with a vertical error bar and a bar spanning the bin.
#[allow(clippy::too_many_arguments)]
fn draw_point(
    canvas: &mut Canvas,
    panel: &Panel<'_>,
    x_lo: f64,
    x_hi: f64,
    value: f64,
    error: f64,
    marker: &MarkerStyle,
    err_style: &LineStyle,
) {
    let px = panel.px(0.5 * (x_lo + x_hi));
    let py = panel.py(value);
    canvas.error_bar(px, panel.py(value - error), panel.py(value + error), 0.0, err_style);
    canvas.error_bar_h(panel.px(x_lo), panel.px(x_hi), py, 0.0, err_style);
    canvas.marker(px, py, marker);
}

/// Every series must have one entry per bin.
fn check(cmp: &ShapeComparison) -> crate::Result<()> {
    let n = cmp.n_bins();
    if n == 0 {
        return Err(crate::RenderError::Layout("comparison has no bins".into()));
    }
    if cmp.stat_bands.len() != cmp.components.len()
        || cmp.stat_syst_bands.len() != cmp.components.len()
    {
        return Err(crate::RenderError::Layout(format!(
            "{} components but {} stat and {} stat+syst bands",
            cmp.components.len(),
            cmp.stat_bands.len(),
            cmp.stat_syst_bands.len()
        )));
    }
    let lengths = [("data", cmp.data.y.len()), ("data errors", cmp.data.yerr.len())]
        .into_iter()
        .chain([("ratio", cmp.ratio.y.len()), ("ratio errors", cmp.ratio.yerr.len())])
        .chain(cmp.components.iter().map(|c| (c.region.as_str(), c.y.len())))
        .chain(cmp.stat_bands.iter().chain(&cmp.stat_syst_bands).flat_map(|b| {
            [(b.name.as_str(), b.y.len()), (b.name.as_str(), b.yerr.len())]
        }));
    for (name, len) in lengths {
        if len != n {
            return Err(crate::RenderError::Layout(format!(
                "series '{name}' has {len} entries, expected {n}"
            )));
        }
    }
    let drawable = |r: [f64; 2]| r[0] < r[1] && (r[1] - r[0]).is_finite();
    for (axis, range) in [("x", cmp.x_range), ("y", cmp.y_range), ("ratio", cmp.ratio_range)] {
        if !drawable(range) {
            return Err(crate::RenderError::Layout(format!(
                "{axis} range {range:?} is empty or not finite"
            )));
        }
    }
    Ok(())
}
