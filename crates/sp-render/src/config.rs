use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_yaml_ng::Value;

use crate::color::Color;
use crate::theme::BuiltinTheme;

/// Plot styling (YAML or programmatic). Independent from the analysis config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleConfig {
    pub theme: String,
    pub figure: FigureConfig,
    pub font: FontConfig,
    pub axes: AxesConfig,
    pub grid: GridConfig,
    pub experiment: ExperimentConfig,
    pub colors: ColorsConfig,
    pub layout: LayoutConfig,
    pub output: OutputConfig,
}

impl Default for StyleConfig {
    fn default() -> Self {
        BuiltinTheme::Cms2012.base_config()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FigureConfig {
    pub width: f64,
    pub height: f64,
}

impl Default for FigureConfig {
    fn default() -> Self {
        Self { width: 600.0, height: 600.0 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FontConfig {
    /// CSS-style family list, also used to pick faces for text measurement.
    pub family: String,
    /// Extra font files loaded next to the system fonts.
    pub files: Vec<PathBuf>,
    pub size: f64,
    pub label_size: f64,
    pub tick_size: f64,
}

impl Default for FontConfig {
    fn default() -> Self {
        Self {
            family: "Helvetica, Arial, Liberation Sans, sans-serif".into(),
            files: Vec::new(),
            size: 11.0,
            label_size: 13.0,
            tick_size: 11.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AxesConfig {
    /// `in` or `out`.
    pub tick_direction: String,
    pub show_top_ticks: bool,
    pub show_right_ticks: bool,
    pub tick_length: f64,
    pub minor_tick_length: f64,
    pub line_width: f64,
}

impl Default for AxesConfig {
    fn default() -> Self {
        Self {
            tick_direction: "in".into(),
            show_top_ticks: true,
            show_right_ticks: true,
            tick_length: 8.0,
            minor_tick_length: 4.0,
            line_width: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    pub show: bool,
    pub color: Color,
    pub alpha: f64,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self { show: false, color: Color::hex("#cbd5e1"), alpha: 0.55 }
    }
}

/// Free text drawn in the standard text box. Empty lines are skipped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperimentConfig {
    pub label: String,
    pub lumi: String,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            label: "CMS 2012, \u{221A}s = 8 TeV".into(),
            lumi: "\u{222B}L dt = 18.493 fb\u{207B}\u{00B9}".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorsConfig {
    pub data: Color,
    /// Hatching of the stat and stat+syst bands.
    pub band: Color,
    pub ratio_line: Color,
    /// Fallback for components whose color does not parse.
    pub component_fallback: Color,
}

impl Default for ColorsConfig {
    fn default() -> Self {
        Self {
            data: Color::BLACK,
            band: Color::hex("#333333"),
            ratio_line: Color::BLACK,
            component_fallback: Color::hex("#808080"),
        }
    }
}

/// Canvas layout. Boxes are `[x1, y1, x2, y2]` in normalized coordinates of
/// the upper pad (0 = left/bottom, 1 = right/top).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Share of the frame height given to the ratio panel.
    pub ratio_fraction: f64,
    /// Vertical gap between the two panels, in points.
    pub panel_gap: f64,
    /// Margins as fractions of the figure size.
    pub margin_left: f64,
    pub margin_right: f64,
    pub margin_top: f64,
    pub margin_bottom: f64,
    pub legend_box: [f64; 4],
    pub text_box: [f64; 4],
    pub bin_text_box: [f64; 4],
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            ratio_fraction: 0.25,
            panel_gap: 0.0,
            margin_left: 0.13,
            margin_right: 0.05,
            margin_top: 0.08,
            margin_bottom: 0.11,
            legend_box: [0.68, 0.49, 0.87, 0.72],
            text_box: [0.66, 0.73, 0.87, 0.87],
            bin_text_box: [0.1, 0.91, 0.5, 0.95],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// PNG resolution.
    pub dpi: u32,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { dpi: 220 }
    }
}

impl StyleConfig {
    pub fn validate(&self) -> crate::Result<()> {
        let bad = |msg: String| Err(crate::RenderError::Config(msg));
        let positive = |v: f64| v > 0.0;
        let ordered = |lo: f64, hi: f64| lo < hi;
        if !positive(self.figure.width) || !positive(self.figure.height) {
            return bad(format!(
                "figure size must be positive, got {}x{}",
                self.figure.width, self.figure.height
            ));
        }
        let l = &self.layout;
        if !positive(l.ratio_fraction) || !ordered(l.ratio_fraction, 1.0) {
            let f = l.ratio_fraction;
            return bad(format!("layout.ratio_fraction must be in (0, 1), got {f}"));
        }
        let margins = [l.margin_left, l.margin_right, l.margin_top, l.margin_bottom];
        if margins.iter().any(|m| !(0.0..0.5).contains(m)) {
            return bad(format!("layout margins must be in [0, 0.5), got {margins:?}"));
        }
        for (name, b) in [
            ("legend_box", l.legend_box),
            ("text_box", l.text_box),
            ("bin_text_box", l.bin_text_box),
        ] {
            if !ordered(b[0], b[2]) || !ordered(b[1], b[3]) {
                return bad(format!("layout.{name} must be [x1, y1, x2, y2], x1 < x2, y1 < y2"));
            }
        }
        if !matches!(self.axes.tick_direction.as_str(), "in" | "out") {
            return bad(format!(
                "axes.tick_direction must be 'in' or 'out', got '{}'",
                self.axes.tick_direction
            ));
        }
        Ok(())
    }
}

/// Resolve a style from optional YAML: user keys override the base config of
/// the theme the document names (`theme:`, default `cms2012`).
pub fn resolve_style(user_yaml: Option<&str>) -> crate::Result<StyleConfig> {
    let Some(yaml) = user_yaml else {
        return Ok(StyleConfig::default());
    };
    let cfg_err = |e: serde_yaml_ng::Error| crate::RenderError::Config(e.to_string());

    let overlay: Value = serde_yaml_ng::from_str(yaml).map_err(cfg_err)?;
    let theme = match &overlay {
        Value::Null => BuiltinTheme::Cms2012,
        Value::Mapping(m) => match m.get("theme") {
            None => BuiltinTheme::Cms2012,
            Some(v) => {
                let name = v.as_str().ok_or_else(|| {
                    crate::RenderError::Config("theme must be a string".into())
                })?;
                BuiltinTheme::parse(name)?
            }
        },
        _ => return Err(crate::RenderError::Config("style must be a YAML mapping".into())),
    };

    let mut merged = serde_yaml_ng::to_value(theme.base_config()).map_err(cfg_err)?;
    merge(&mut merged, overlay);
    let style: StyleConfig = serde_yaml_ng::from_value(merged).map_err(cfg_err)?;
    style.validate()?;
    Ok(style)
}

/// Deep-merge `overlay` into `base`; mappings merge key by key, anything else replaces.
fn merge(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Mapping(b), Value::Mapping(o)) => {
            for (k, v) in o {
                match b.get_mut(&k) {
                    Some(slot) => merge(slot, v),
                    None => {
                        b.insert(k, v);
                    }
                }
            }
        }
        (_, Value::Null) => {}
        (b, o) => *b = o,
    }
}
