//! # sp-render
//!
//! Renders a [`ShapeComparison`] as a publication-style figure: stacked
//! background estimates with hatched uncertainty bands, data points, a
//! Data/MC ratio panel, legend and header text.
//!
//! Drawing happens on an SVG canvas; PDF (feature `pdf`, default) and PNG
//! (feature `png`) are converted from the SVG document.

pub mod canvas;
pub mod color;
pub mod config;
pub mod font;
pub mod header;
pub mod layout;
pub mod output;
pub mod plots;
pub mod primitives;
pub mod text;
pub mod theme;

#[cfg(test)]
mod test_fixtures;

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use sp_core::ShapeComparison;
use thiserror::Error;

pub use config::{StyleConfig, resolve_style};
use font::FontHandle;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("config error: {0}")]
    Config(String),
    #[error("font error: {0}")]
    Font(String),
    #[error("layout error: {0}")]
    Layout(String),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("unknown output format '{0}' (expected {expected})", expected = OutputFormat::AVAILABLE)]
    UnknownFormat(String),
    #[cfg(feature = "png")]
    #[error("PNG encoding error: {0}")]
    Png(String),
    #[cfg(feature = "pdf")]
    #[error("PDF conversion error: {0}")]
    Pdf(String),
}

pub type Result<T> = std::result::Result<T, RenderError>;

/// Image format; also the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Svg,
    #[cfg(feature = "pdf")]
    Pdf,
    #[cfg(feature = "png")]
    Png,
}

impl OutputFormat {
    /// Formats compiled into this build.
    pub const AVAILABLE: &'static str = if cfg!(all(feature = "pdf", feature = "png")) {
        "svg, pdf or png"
    } else if cfg!(feature = "pdf") {
        "svg or pdf"
    } else if cfg!(feature = "png") {
        "svg or png"
    } else {
        "svg"
    };

    pub fn extension(self) -> &'static str {
        match self {
            Self::Svg => "svg",
            #[cfg(feature = "pdf")]
            Self::Pdf => "pdf",
            #[cfg(feature = "png")]
            Self::Png => "png",
        }
    }

    /// Format named by the extension of `path`.
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or_default();
        ext.parse()
    }
}

impl FromStr for OutputFormat {
    type Err = RenderError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "svg" => Ok(Self::Svg),
            #[cfg(feature = "pdf")]
            "pdf" => Ok(Self::Pdf),
            #[cfg(feature = "png")]
            "png" => Ok(Self::Png),
            _ => Err(RenderError::UnknownFormat(s.to_string())),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// A style plus the fonts it resolves to, loaded once and reused for every plot.
pub struct ShapeRenderer {
    style: StyleConfig,
    fonts: FontHandle,
}

impl ShapeRenderer {
    /// Validates `style` and loads system fonts (plus `style.font.files`).
    pub fn new(style: StyleConfig) -> Result<Self> {
        style.validate()?;
        let fonts = FontHandle::system(&style.font.family, &style.font.files)?;
        Ok(Self { style, fonts })
    }

    /// Renderer that measures text approximately and embeds no fonts.
    pub fn without_fonts(style: StyleConfig) -> Result<Self> {
        style.validate()?;
        let fonts = FontHandle::empty(&style.font.family);
        Ok(Self { style, fonts })
    }

    pub fn style(&self) -> &StyleConfig {
        &self.style
    }

    pub fn svg(&self, cmp: &ShapeComparison) -> Result<String> {
        plots::shape::render(cmp, &self.style, &self.fonts)
    }

    pub fn to_bytes(&self, cmp: &ShapeComparison, format: OutputFormat) -> Result<Vec<u8>> {
        let svg = self.svg(cmp)?;
        match format {
            OutputFormat::Svg => Ok(svg.into_bytes()),
            #[cfg(feature = "pdf")]
            OutputFormat::Pdf => output::pdf::svg_to_pdf(&svg, &self.fonts),
            #[cfg(feature = "png")]
            OutputFormat::Png => output::png::svg_to_png(&svg, self.style.output.dpi, &self.fonts),
        }
    }

    /// Render to `path`; the format follows the extension.
    pub fn to_file(&self, cmp: &ShapeComparison, path: &Path) -> Result<()> {
        let format = OutputFormat::from_path(path)?;
        let bytes = self.to_bytes(cmp, format)?;
        let size = bytes.len();
        std::fs::write(path, bytes)?;
        tracing::info!(path = %path.display(), %format, bytes = size, "wrote plot");
        Ok(())
    }
}

/// Render a comparison to an SVG string.
pub fn render_svg(cmp: &ShapeComparison, style: &StyleConfig) -> Result<String> {
    ShapeRenderer::new(style.clone())?.svg(cmp)
}

/// Render a comparison JSON document (as written by `--emit-json`) to bytes.
pub fn render_json_to_bytes(json: &str, format: &str, style: &StyleConfig) -> Result<Vec<u8>> {
    let cmp: ShapeComparison = serde_json::from_str(json)?;
    render_to_bytes(&cmp, format, style)
}

/// Render a comparison to bytes in the named format.
pub fn render_to_bytes(
    cmp: &ShapeComparison,
    format: &str,
    style: &StyleConfig,
) -> Result<Vec<u8>> {
    let format: OutputFormat = format.parse()?;
    ShapeRenderer::new(style.clone())?.to_bytes(cmp, format)
}

/// Render a comparison to a file (format inferred from the extension).
pub fn render_to_file(cmp: &ShapeComparison, path: &Path, style: &StyleConfig) -> Result<()> {
    ShapeRenderer::new(style.clone())?.to_file(cmp, path)
}
