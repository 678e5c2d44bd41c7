#[cfg(feature = "pdf")]
pub mod pdf;
#[cfg(feature = "png")]
pub mod png;

/// Parse options resolving `font-family` against the same faces used for measurement.
#[cfg(any(feature = "pdf", feature = "png"))]
fn usvg_options(fonts: &crate::font::FontHandle) -> usvg::Options<'static> {
    let mut opt = usvg::Options::default();
    opt.fontdb = fonts.database();
    opt
}
