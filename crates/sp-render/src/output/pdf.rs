use crate::RenderError;
use crate::font::FontHandle;

/// Convert an SVG document to PDF bytes; text is embedded from `fonts`.
pub fn svg_to_pdf(svg: &str, fonts: &FontHandle) -> crate::Result<Vec<u8>> {
    let opt = super::usvg_options(fonts);
    let tree = usvg::Tree::from_str(svg, &opt).map_err(|e| RenderError::Pdf(e.to_string()))?;

    svg2pdf::to_pdf(&tree, svg2pdf::ConversionOptions::default(), svg2pdf::PageOptions::default())
        .map_err(|e| RenderError::Pdf(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn produces_a_pdf_document() {
        let fonts = FontHandle::empty("sans-serif");
        let svg = r#"<svg xmlns="http://www.w3.org/2000/svg" width="100" height="50"><rect width="10" height="10" fill="black"/></svg>"#;
        let pdf = svg_to_pdf(svg, &fonts).unwrap();
        assert!(pdf.starts_with(b"%PDF-"));
    }

    #[test]
    fn malformed_svg_is_a_pdf_error() {
        let fonts = FontHandle::empty("sans-serif");
        let err = svg_to_pdf("<svg", &fonts).unwrap_err();
        assert!(matches!(err, RenderError::Pdf(_)));
    }
}
