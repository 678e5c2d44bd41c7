use crate::canvas::Canvas;
use crate::color::Color;
use crate::config::StyleConfig;
use crate::layout::axes::Axis;
use crate::layout::margins::PlotArea;
use crate::primitives::*;

/// Draw the frame of `area` with ticks, grid, tick labels and axis titles.
pub fn draw_axes(
    canvas: &mut Canvas,
    area: &PlotArea,
    x_axis: &Axis,
    y_axis: &Axis,
    style: &StyleConfig,
) {
    let frame_color = Color::BLACK;
    let lw = style.axes.line_width;
    let frame_style = LineStyle::solid(frame_color, lw);
    let major = LineStyle::solid(frame_color, 0.8 * lw);
    let minor = LineStyle::solid(frame_color, 0.6 * lw);

    // +1 points into the frame, -1 away from it
    let dir = if style.axes.tick_direction == "in" { 1.0 } else { -1.0 };
    let tl = style.axes.tick_length;
    let mtl = style.axes.minor_tick_length;
    let grid_style = LineStyle {
        color: style.grid.color.with_alpha(style.grid.alpha),
        width: 0.5,
        dash: Some("3 3".into()),
    };

    canvas.rect(area.left, area.top, area.width, area.height, &Style::stroked(frame_color, lw));

    let x_px = |v: f64| x_axis.data_to_pixel(v, area.left, area.right());
    let y_px = |v: f64| y_axis.data_to_pixel(v, area.bottom(), area.top);
    let inside_x = |px: f64| px >= area.left - 0.5 && px <= area.right() + 0.5;
    let inside_y = |py: f64| py >= area.top - 0.5 && py <= area.bottom() + 0.5;

    // --- X axis ---
    let x_label_style = TextStyle::sized(style.font.tick_size)
        .anchored(TextAnchor::Middle, TextBaseline::Hanging);
    for (i, &val) in x_axis.tick_positions.iter().enumerate() {
        let px = x_px(val);
        if !inside_x(px) {
            continue;
        }
        if style.grid.show {
            canvas.line(px, area.top, px, area.bottom(), &grid_style);
        }
        canvas.line(px, area.bottom(), px, area.bottom() - dir * tl, &major);
        if style.axes.show_top_ticks {
            canvas.line(px, area.top, px, area.top + dir * tl, &major);
        }
        if let Some(label) = x_axis.tick_labels.get(i).filter(|l| !l.is_empty()) {
            let label_y = area.bottom() + 4.0 + if dir < 0.0 { tl } else { 0.0 };
            canvas.text(px, label_y, label, &x_label_style);
        }
    }
    for &val in &x_axis.minor_ticks {
        let px = x_px(val);
        if !inside_x(px) {
            continue;
        }
        canvas.line(px, area.bottom(), px, area.bottom() - dir * mtl, &minor);
        if style.axes.show_top_ticks {
            canvas.line(px, area.top, px, area.top + dir * mtl, &minor);
        }
    }

    // --- Y axis ---
    let y_label_style =
        TextStyle::sized(style.font.tick_size).anchored(TextAnchor::End, TextBaseline::Central);
    let mut widest_label: f64 = 0.0;
    for (i, &val) in y_axis.tick_positions.iter().enumerate() {
        let py = y_px(val);
        if !inside_y(py) {
            continue;
        }
        if style.grid.show {
            canvas.line(area.left, py, area.right(), py, &grid_style);
        }
        canvas.line(area.left, py, area.left + dir * tl, py, &major);
        if style.axes.show_right_ticks {
            canvas.line(area.right(), py, area.right() - dir * tl, py, &major);
        }
        if let Some(label) = y_axis.tick_labels.get(i).filter(|l| !l.is_empty()) {
            let label_x = area.left - 4.0 - if dir < 0.0 { tl } else { 0.0 };
            canvas.text(label_x, py, label, &y_label_style);
            widest_label = widest_label.max(canvas.measure_text(label, &y_label_style).width);
        }
    }
    for &val in &y_axis.minor_ticks {
        let py = y_px(val);
        if !inside_y(py) {
            continue;
        }
        canvas.line(area.left, py, area.left + dir * mtl, py, &minor);
        if style.axes.show_right_ticks {
            canvas.line(area.right(), py, area.right() - dir * mtl, py, &minor);
        }
    }

    // --- Axis titles: right/top aligned, as ROOT does ---
    let title_style = TextStyle::sized(style.font.label_size);
    if !x_axis.label.is_empty() {
        let title_y = area.bottom()
            + style.font.tick_size
            + style.font.label_size
            + 8.0
            + if dir < 0.0 { tl } else { 0.0 };
        let ts = title_style.clone().anchored(TextAnchor::End, TextBaseline::Alphabetic);
        canvas.text(area.right(), title_y, &x_axis.label, &ts);
    }
    if !y_axis.label.is_empty() {
        let title_x = area.left
            - widest_label
            - 10.0
            - if dir < 0.0 { tl } else { 0.0 }
            - style.font.label_size * 0.3;
        let ts = title_style.anchored(TextAnchor::End, TextBaseline::Alphabetic);
        canvas.text_rotated(title_x, area.top, &y_axis.label, &ts, -90.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::FontHandle;

    fn draw(style: &StyleConfig, x: Axis, y: Axis) -> String {
        let fonts = FontHandle::empty("sans-serif");
        let mut c = Canvas::new(400.0, 300.0, &fonts);
        let area = PlotArea::manual(60.0, 20.0, 300.0, 220.0);
        draw_axes(&mut c, &area, &x, &y, style);
        c.finish_svg()
    }

    #[test]
    fn titles_and_tick_labels() {
        let svg = draw(
            &StyleConfig::default(),
            Axis::linear(0.0, 2.0, 5).with_label("AlphaT"),
            Axis::linear(0.0, 100.0, 6).with_label("Events"),
        );
        assert!(svg.contains(">AlphaT</text>"));
        assert!(svg.contains(">Events</text>"));
        assert!(svg.contains("rotate(-90.0"));
        assert!(svg.contains(">1.5</text>"));
        assert!(svg.contains(">80</text>"));
        assert!(!svg.contains("stroke-dasharray"));
    }

    #[test]
    fn hidden_x_labels_and_grid() {
        let mut style = StyleConfig::default();
        style.grid.show = true;
        let svg = draw(
            &style,
            Axis::linear(0.0, 2.0, 5).with_label("AlphaT").without_labels(),
            Axis::linear(0.0, 2.0, 5),
        );
        assert!(!svg.contains(">AlphaT</text>"));
        // only the y tick labels remain
        assert_eq!(svg.matches("<text").count(), 5);
        assert!(svg.contains(r#"stroke-dasharray="3 3""#));
    }
}
