use crate::canvas::Canvas;
use crate::config::StyleConfig;
use crate::layout::margins::PlotArea;
use crate::primitives::*;

/// Experiment and luminosity lines, centered in the layout's text box of `pad`.
///
/// The box is split into three rows: label on top, luminosity at the bottom,
/// matching the spacing of a ROOT `TPaveText` with an empty middle line.
pub fn draw_standard_text(canvas: &mut Canvas, pad: &PlotArea, style: &StyleConfig) {
    let exp = &style.experiment;
    if exp.label.is_empty() && exp.lumi.is_empty() {
        return;
    }

    let b = pad.ndc_box(style.layout.text_box);
    let row = b.height / 3.0;
    let text = TextStyle::sized(style.font.size.min(row))
        .anchored(TextAnchor::Middle, TextBaseline::Central);
    let cx = b.left + b.width / 2.0;

    if !exp.label.is_empty() {
        canvas.text(cx, b.top + 0.5 * row, &exp.label, &text);
    }
    if !exp.lumi.is_empty() {
        canvas.text(cx, b.top + 2.5 * row, &exp.lumi, &text);
    }
}

/// Bin description, left-aligned in the layout's bin text box of `pad`.
pub fn draw_bin_text(canvas: &mut Canvas, pad: &PlotArea, text: &str, style: &StyleConfig) {
    if text.is_empty() {
        return;
    }
    let b = pad.ndc_box(style.layout.bin_text_box);
    let ts = TextStyle::sized(style.font.size.min(b.height.max(1.0) * 1.5))
        .anchored(TextAnchor::Start, TextBaseline::Central);
    canvas.text(b.left, b.top + b.height / 2.0, text, &ts);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::FontHandle;

    fn pad() -> PlotArea {
        PlotArea::manual(0.0, 0.0, 600.0, 450.0)
    }

    #[test]
    fn standard_text_lines() {
        let fonts = FontHandle::empty("sans-serif");
        let mut c = Canvas::new(600.0, 600.0, &fonts);
        let style = StyleConfig::default();
        draw_standard_text(&mut c, &pad(), &style);
        draw_bin_text(&mut c, &pad(), "≤ 3 jets, = 0 b-tag, HT bin 375_475", &style);
        let svg = c.finish_svg();
        assert!(svg.contains(">CMS 2012, √s = 8 TeV</text>"));
        assert!(svg.contains(">∫L dt = 18.493 fb⁻¹</text>"));
        assert!(svg.contains(">≤ 3 jets, = 0 b-tag, HT bin 375_475</text>"));
        // label above luminosity
        assert!(svg.find("CMS 2012").unwrap() < svg.find("∫L dt").unwrap());
    }

    #[test]
    fn empty_experiment_draws_nothing() {
        let fonts = FontHandle::empty("sans-serif");
        let mut c = Canvas::new(600.0, 600.0, &fonts);
        let mut style = StyleConfig::default();
        style.experiment.label.clear();
        style.experiment.lumi.clear();
        draw_standard_text(&mut c, &pad(), &style);
        draw_bin_text(&mut c, &pad(), "", &style);
        assert!(!c.finish_svg().contains("<text"));
    }
}
