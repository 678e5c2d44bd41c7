use ab_glyph::{Font, FontVec, ScaleFont};

/// Average advance of a sans-serif glyph, in ems, used without a font.
const FALLBACK_ADVANCE_EM: f64 = 0.55;
const FALLBACK_ASCENT_EM: f64 = 0.75;
const FALLBACK_HEIGHT_EM: f64 = 1.0;

#[derive(Debug, Clone, Copy)]
pub struct TextMetrics {
    pub width: f64,
    pub height: f64,
    pub ascent: f64,
}

/// Measure text width and height in points; approximated when `font` is `None`.
pub fn measure_text(font: Option<&FontVec>, text: &str, size_pt: f64) -> TextMetrics {
    let Some(font) = font else {
        return TextMetrics {
            width: text.chars().count() as f64 * FALLBACK_ADVANCE_EM * size_pt,
            height: FALLBACK_HEIGHT_EM * size_pt,
            ascent: FALLBACK_ASCENT_EM * size_pt,
        };
    };

    let scale = ab_glyph::PxScale::from(size_pt as f32);
    let scaled = font.as_scaled(scale);

    let mut width: f32 = 0.0;
    let mut prev_glyph_id = None;
    for ch in text.chars() {
        let glyph_id = font.glyph_id(ch);
        if let Some(prev) = prev_glyph_id {
            width += scaled.kern(prev, glyph_id);
        }
        width += scaled.h_advance(glyph_id);
        prev_glyph_id = Some(glyph_id);
    }

    let ascent = scaled.ascent();
    let height = ascent - scaled.descent();

    TextMetrics { width: width as f64, height: height as f64, ascent: ascent as f64 }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn fallback_scales_with_length_and_size() {
        let m = measure_text(None, "Events", 10.0);
        assert_relative_eq!(m.width, 33.0, epsilon = 1e-9);
        assert_relative_eq!(m.height, 10.0);
        assert_relative_eq!(m.ascent, 7.5);

        // counted in chars, not bytes
        let w = measure_text(None, "√s", 10.0).width;
        assert_relative_eq!(w, 11.0, epsilon = 1e-9);
    }
}
