use crate::config::*;

/// Built-in style presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltinTheme {
    /// ROOT-like: inward ticks on all four sides, experiment text box.
    Cms2012,
    /// Outward ticks on the left/bottom only, no experiment text.
    Minimal,
}

impl BuiltinTheme {
    pub fn parse(s: &str) -> crate::Result<Self> {
        match s.to_lowercase().as_str() {
            "cms2012" | "cms" => Ok(Self::Cms2012),
            "minimal" => Ok(Self::Minimal),
            other => Err(crate::RenderError::Config(format!(
                "unknown theme '{other}' (expected cms2012 or minimal)"
            ))),
        }
    }

    pub fn base_config(self) -> StyleConfig {
        match self {
            Self::Cms2012 => cms2012(),
            Self::Minimal => minimal(),
        }
    }
}

fn cms2012() -> StyleConfig {
    StyleConfig {
        theme: "cms2012".into(),
        figure: FigureConfig::default(),
        font: FontConfig::default(),
        axes: AxesConfig::default(),
        grid: GridConfig::default(),
        experiment: ExperimentConfig::default(),
        colors: ColorsConfig::default(),
        layout: LayoutConfig::default(),
        output: OutputConfig::default(),
    }
}

fn minimal() -> StyleConfig {
    StyleConfig {
        theme: "minimal".into(),
        figure: FigureConfig { width: 504.0, height: 432.0 },
        font: FontConfig {
            family: "Inter, DejaVu Sans, sans-serif".into(),
            size: 9.0,
            label_size: 10.0,
            tick_size: 8.5,
            ..FontConfig::default()
        },
        axes: AxesConfig {
            tick_direction: "out".into(),
            show_top_ticks: false,
            show_right_ticks: false,
            tick_length: 4.0,
            minor_tick_length: 2.0,
            line_width: 0.8,
        },
        grid: GridConfig { show: true, ..GridConfig::default() },
        experiment: ExperimentConfig { label: String::new(), lumi: String::new() },
        ..cms2012()
    }
}
