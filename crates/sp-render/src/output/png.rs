use crate::RenderError;
use crate::font::FontHandle;

/// Rasterize an SVG document to PNG bytes at `dpi` (72 dpi = 1 px per point).
pub fn svg_to_png(svg: &str, dpi: u32, fonts: &FontHandle) -> crate::Result<Vec<u8>> {
    let opt = super::usvg_options(fonts);
    let tree = usvg::Tree::from_str(svg, &opt).map_err(|e| RenderError::Png(e.to_string()))?;

    let scale = dpi as f32 / 72.0;
    let size = tree.size();
    let w = (size.width() * scale).ceil() as u32;
    let h = (size.height() * scale).ceil() as u32;

    let mut pixmap = tiny_skia::Pixmap::new(w, h)
        .ok_or_else(|| RenderError::Png(format!("cannot allocate a {w}x{h} pixmap")))?;
    pixmap.fill(tiny_skia::Color::WHITE);

    resvg::render(&tree, tiny_skia::Transform::from_scale(scale, scale), &mut pixmap.as_mut());

    pixmap.encode_png().map_err(|e| RenderError::Png(e.to_string()))
}
