use std::fmt::Write as FmtWrite;

use crate::font::FontHandle;
use crate::primitives::*;
use crate::text::{TextMetrics, measure_text};

/// An SVG element stored for deferred rendering.
#[derive(Debug, Clone)]
enum SvgElement {
    Rect {
        x: f64,
        y: f64,
        w: f64,
        h: f64,
        style: Style,
    },
    PatternRect {
        x: f64,
        y: f64,
        w: f64,
        h: f64,
        pattern_id: String,
    },
    Line {
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        style: LineStyle,
    },
    Text {
        x: f64,
        y: f64,
        content: String,
        style: TextStyle,
        rotate: Option<f64>,
    },
    Circle {
        cx: f64,
        cy: f64,
        r: f64,
        style: Style,
    },
    Group {
        clip_id: String,
        children: Vec<SvgElement>,
    },
}

/// Immediate-mode SVG canvas. Coordinates in points (1pt = 1/72").
pub struct Canvas<'f> {
    pub width: f64,
    pub height: f64,
    elements: Vec<SvgElement>,
    defs: Vec<String>,
    patterns: Vec<String>,
    /// Open clip groups, innermost last.
    clip_stack: Vec<(String, Vec<SvgElement>)>,
    next_clip_id: usize,
    fonts: &'f FontHandle,
}

impl<'f> Canvas<'f> {
    pub fn new(width: f64, height: f64, fonts: &'f FontHandle) -> Self {
        Self {
            width,
            height,
            elements: Vec::new(),
            defs: Vec::new(),
            patterns: Vec::new(),
            clip_stack: Vec::new(),
            next_clip_id: 0,
            fonts,
        }
    }

    // --- Drawing primitives ---

    pub fn rect(&mut self, x: f64, y: f64, w: f64, h: f64, style: &Style) {
        self.push(SvgElement::Rect { x, y, w, h, style: style.clone() });
    }

    pub fn line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, style: &LineStyle) {
        self.push(SvgElement::Line { x1, y1, x2, y2, style: style.clone() });
    }

    pub fn text(&mut self, x: f64, y: f64, content: &str, style: &TextStyle) {
        self.push(SvgElement::Text {
            x,
            y,
            content: content.to_string(),
            style: style.clone(),
            rotate: None,
        });
    }

    pub fn text_rotated(&mut self, x: f64, y: f64, content: &str, style: &TextStyle, angle: f64) {
        self.push(SvgElement::Text {
            x,
            y,
            content: content.to_string(),
            style: style.clone(),
            rotate: Some(angle),
        });
    }

    pub fn circle(&mut self, cx: f64, cy: f64, r: f64, style: &Style) {
        self.push(SvgElement::Circle { cx, cy, r, style: style.clone() });
    }

    /// Error bar: vertical line + optional horizontal caps.
    pub fn error_bar(&mut self, x: f64, y_lo: f64, y_hi: f64, cap_width: f64, style: &LineStyle) {
        self.line(x, y_lo, x, y_hi, style);
        if cap_width > 0.0 {
            let half = cap_width / 2.0;
            self.line(x - half, y_lo, x + half, y_lo, style);
            self.line(x - half, y_hi, x + half, y_hi, style);
        }
    }

    /// Horizontal error bar.
    pub fn error_bar_h(
        &mut self,
        x_lo: f64,
        x_hi: f64,
        y: f64,
        cap_height: f64,
        style: &LineStyle,
    ) {
        self.line(x_lo, y, x_hi, y, style);
        if cap_height > 0.0 {
            let half = cap_height / 2.0;
            self.line(x_lo, y - half, x_lo, y + half, style);
            self.line(x_hi, y - half, x_hi, y + half, style);
        }
    }

    /// Data marker.
    pub fn marker(&mut self, x: f64, y: f64, marker: &MarkerStyle) {
        let style = Style::filled_outlined(marker.color, marker.color, 0.5);
        self.circle(x, y, marker.size, &style);
    }

    /// Rectangle filled with a hatch pattern; the pattern is defined on first use.
    pub fn hatch_rect(&mut self, x: f64, y: f64, w: f64, h: f64, hatch: &Hatch) {
        if !self.patterns.iter().any(|id| id == &hatch.id) {
            self.defs.push(pattern_def(hatch));
            self.patterns.push(hatch.id.clone());
        }
        self.push(SvgElement::PatternRect { x, y, w, h, pattern_id: hatch.id.clone() });
    }

    // --- Clip paths ---

    /// Everything drawn until the matching [`Canvas::pop_clip`] is clipped to the rectangle.
    pub fn push_clip(&mut self, x: f64, y: f64, w: f64, h: f64) -> String {
        let id = format!("clip{}", self.next_clip_id);
        self.next_clip_id += 1;
        self.defs.push(format!(
            r#"<clipPath id="{id}"><rect x="{x:.2}" y="{y:.2}" width="{w:.2}" height="{h:.2}" /></clipPath>"#
        ));
        self.clip_stack.push((id.clone(), Vec::new()));
        id
    }

    pub fn pop_clip(&mut self) {
        if let Some((clip_id, children)) = self.clip_stack.pop() {
            self.push(SvgElement::Group { clip_id, children });
        }
    }

    // --- Text measurement ---

    pub fn measure_text(&self, content: &str, style: &TextStyle) -> TextMetrics {
        let font = self.fonts.face();
        measure_text(font, content, style.size)
    }

    // --- SVG output ---

    fn push(&mut self, elem: SvgElement) {
        match self.clip_stack.last_mut() {
            Some((_, children)) => children.push(elem),
            None => self.elements.push(elem),
        }
    }

    /// Serialize; clip groups still open are closed first.
    pub fn finish_svg(mut self) -> String {
        while !self.clip_stack.is_empty() {
            self.pop_clip();
        }

        let mut out = String::with_capacity(32 * 1024);
        let _ = writeln!(
            out,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
            w = self.width,
            h = self.height,
        );

        if !self.defs.is_empty() {
            out.push_str("<defs>\n");
            for d in &self.defs {
                out.push_str(d);
                out.push('\n');
            }
            out.push_str("</defs>\n");
        }

        let _ = writeln!(
            out,
            r#"<rect width="{}" height="{}" fill="white" />"#,
            self.width, self.height
        );

        let family = escape_xml(self.fonts.family());
        for elem in &self.elements {
            render_element(&mut out, elem, &family);
        }

        out.push_str("</svg>\n");
        out
    }
}

fn pattern_def(hatch: &Hatch) -> String {
    let sp = hatch.spacing;
    let half = sp / 2.0;
    let stroke = format!(
        r#"stroke="{}" stroke-width="{:.2}""#,
        hatch.color.to_svg_fill(),
        hatch.line_width
    );
    let mut lines = format!(r#"<line x1="{half}" y1="0" x2="{half}" y2="{sp}" {stroke}/>"#);
    if hatch.cross {
        let _ = write!(lines, r#"<line x1="0" y1="{half}" x2="{sp}" y2="{half}" {stroke}/>"#);
    }
    format!(
        r#"<pattern id="{id}" patternUnits="userSpaceOnUse" width="{sp}" height="{sp}" patternTransform="rotate(45)">{lines}</pattern>"#,
        id = hatch.id,
    )
}

fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
    out
}

fn render_element(out: &mut String, elem: &SvgElement, family: &str) {
    match elem {
        SvgElement::Rect { x, y, w, h, style } => {
            let _ = write!(out, r#"<rect x="{x:.2}" y="{y:.2}" width="{w:.2}" height="{h:.2}""#);
            write_style_attrs(out, style);
            out.push_str(" />\n");
        }
        SvgElement::PatternRect { x, y, w, h, pattern_id } => {
            let _ = writeln!(
                out,
                r#"<rect x="{x:.2}" y="{y:.2}" width="{w:.2}" height="{h:.2}" fill="url(#{pattern_id})" />"#
            );
        }
        SvgElement::Line { x1, y1, x2, y2, style } => {
            let _ = write!(out, r#"<line x1="{x1:.2}" y1="{y1:.2}" x2="{x2:.2}" y2="{y2:.2}""#);
            write_line_attrs(out, style);
            out.push_str(" />\n");
        }
        SvgElement::Text { x, y, content, style, rotate } => {
            let _ = write!(out, r#"<text x="{x:.2}" y="{y:.2}""#);
            let _ = write!(out, r#" font-family="{family}" font-size="{:.1}""#, style.size);
            let _ = write!(out, r#" fill="{}""#, style.color.to_svg_fill());
            let _ = write!(out, r#" text-anchor="{}""#, style.anchor.as_str());
            let _ = write!(out, r#" dominant-baseline="{}""#, style.baseline.as_str());
            if let Some(angle) = rotate {
                let _ = write!(out, r#" transform="rotate({angle:.1},{x:.2},{y:.2})""#);
            }
            out.push('>');
            out.push_str(&escape_xml(content));
            out.push_str("</text>\n");
        }
        SvgElement::Circle { cx, cy, r, style } => {
            let _ = write!(out, r#"<circle cx="{cx:.2}" cy="{cy:.2}" r="{r:.2}""#);
            write_style_attrs(out, style);
            out.push_str(" />\n");
        }
        SvgElement::Group { clip_id, children } => {
            let _ = writeln!(out, r#"<g clip-path="url(#{clip_id})">"#);
            for child in children {
                render_element(out, child, family);
            }
            out.push_str("</g>\n");
        }
    }
}

fn write_style_attrs(out: &mut String, style: &Style) {
    match &style.fill {
        Some(fill) => {
            let _ = write!(out, r#" fill="{}""#, fill.to_svg_fill());
        }
        None => out.push_str(r#" fill="none""#),
    }
    if let Some(stroke) = &style.stroke {
        let _ = write!(out, r#" stroke="{}""#, stroke.to_svg_fill());
        let _ = write!(out, r#" stroke-width="{:.2}""#, style.stroke_width);
    }
}

fn write_line_attrs(out: &mut String, style: &LineStyle) {
    let _ = write!(out, r#" stroke="{}""#, style.color.to_svg_fill());
    let _ = write!(out, r#" stroke-width="{:.2}""#, style.width);
    if let Some(dash) = &style.dash {
        let _ = write!(out, r#" stroke-dasharray="{dash}""#);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;

    fn fonts() -> FontHandle {
        FontHandle::empty("Helvetica, sans-serif")
    }

    #[test]
    fn empty_canvas() {
        let fonts = fonts();
        let svg = Canvas::new(100.0, 50.0, &fonts).finish_svg();
        assert!(svg.contains("width=\"100\""));
        assert!(svg.contains("height=\"50\""));
        assert!(svg.ends_with("</svg>\n"));
        assert!(!svg.contains("<defs>"));
    }

    #[test]
    fn rect_rendering() {
        let fonts = fonts();
        let mut c = Canvas::new(200.0, 100.0, &fonts);
        c.rect(10.0, 20.0, 50.0, 30.0, &Style::filled(Color::hex("#ff0000")));
        let svg = c.finish_svg();
        assert!(svg.contains(r##"fill="#ff0000""##));
        assert!(svg.contains("width=\"50.00\""));
    }

    #[test]
    fn text_is_escaped_and_uses_the_family() {
        let fonts = fonts();
        let mut c = Canvas::new(200.0, 100.0, &fonts);
        c.text(10.0, 20.0, "Data/MC <&>", &TextStyle::default());
        let svg = c.finish_svg();
        assert!(svg.contains("Data/MC &lt;&amp;&gt;</text>"));
        assert!(svg.contains(r#"font-family="Helvetica, sans-serif""#));
    }

    #[test]
    fn clipped_elements_are_grouped() {
        let fonts = fonts();
        let mut c = Canvas::new(200.0, 100.0, &fonts);
        let id = c.push_clip(0.0, 0.0, 50.0, 50.0);
        c.line(0.0, 0.0, 100.0, 100.0, &LineStyle::default());
        c.pop_clip();
        c.line(0.0, 100.0, 100.0, 0.0, &LineStyle::default());
        let svg = c.finish_svg();

        let group = svg.find(&format!(r#"<g clip-path="url(#{id})">"#)).unwrap();
        let end = svg.find("</g>").unwrap();
        let first = svg.find(r#"y2="100.00""#).unwrap();
        let second = svg.find(r#"y2="0.00""#).unwrap();
        assert!(group < first && first < end);
        assert!(second > end);
    }

    #[test]
    fn hatch_patterns_are_defined_once() {
        let fonts = fonts();
        let mut c = Canvas::new(200.0, 100.0, &fonts);
        let stat = Hatch::diagonal("stat", Color::rgb(51, 51, 51), 4.0);
        let syst = Hatch::cross("syst", Color::rgb(51, 51, 51), 6.0);
        c.hatch_rect(0.0, 0.0, 10.0, 10.0, &stat);
        c.hatch_rect(10.0, 0.0, 10.0, 10.0, &stat);
        c.hatch_rect(20.0, 0.0, 10.0, 10.0, &syst);
        let svg = c.finish_svg();
        assert_eq!(svg.matches(r#"<pattern id="stat""#).count(), 1);
        assert_eq!(svg.matches(r#"<pattern id="syst""#).count(), 1);
        assert_eq!(svg.matches("fill=\"url(#stat)\"").count(), 2);
        // the cross-hatch carries a second line
        let syst_def = &svg[svg.find(r#"<pattern id="syst""#).unwrap()..];
        assert_eq!(syst_def[..syst_def.find("</pattern>").unwrap()].matches("<line").count(), 2);
    }
}
