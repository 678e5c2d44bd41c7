use std::path::PathBuf;
use std::sync::Arc;

use ab_glyph::FontVec;
use usvg::fontdb::{self, Database, Family, Query};

/// The face used for text measurement, plus the font database handed to the
/// SVG→PDF/PNG converters so both resolve `font-family` the same way.
pub struct FontHandle {
    db: Arc<Database>,
    family: String,
    regular: Option<FontVec>,
}

impl FontHandle {
    /// System fonts plus `extra_files`, matched against a CSS-style
    /// `family` list such as `"Helvetica, Arial, sans-serif"`.
    pub fn system(family: &str, extra_files: &[PathBuf]) -> crate::Result<Self> {
        let mut db = Database::new();
        db.load_system_fonts();
        for path in extra_files {
            db.load_font_file(path)
                .map_err(|e| crate::RenderError::Font(format!("{}: {e}", path.display())))?;
        }
        tracing::debug!(faces = db.len(), family, "font database loaded");

        let families = parse_families(family);
        let regular = load_face(&db, &families);
        if regular.is_none() {
            tracing::warn!(family, "no font matches; text widths are approximated");
        }

        Ok(Self { db: Arc::new(db), family: family.to_string(), regular })
    }

    /// No faces at all: every measurement falls back to the approximation.
    pub fn empty(family: &str) -> Self {
        Self { db: Arc::new(Database::new()), family: family.to_string(), regular: None }
    }

    /// Regular face of the first family that matched, if any.
    pub fn face(&self) -> Option<&FontVec> {
        self.regular.as_ref()
    }

    /// The `font-family` attribute written on every `<text>`.
    pub fn family(&self) -> &str {
        &self.family
    }

    pub fn database(&self) -> Arc<Database> {
        Arc::clone(&self.db)
    }
}

fn parse_families(list: &str) -> Vec<Family<'_>> {
    let mut out: Vec<Family<'_>> = list
        .split(',')
        .map(|f| f.trim().trim_matches(|c| c == '"' || c == '\''))
        .filter(|f| !f.is_empty())
        .map(|f| match f {
            "sans-serif" => Family::SansSerif,
            "serif" => Family::Serif,
            "monospace" => Family::Monospace,
            name => Family::Name(name),
        })
        .collect();
    if out.is_empty() {
        out.push(Family::SansSerif);
    }
    out
}

fn load_face(db: &Database, families: &[Family<'_>]) -> Option<FontVec> {
    let query = Query {
        families,
        weight: fontdb::Weight::NORMAL,
        stretch: fontdb::Stretch::Normal,
        style: fontdb::Style::Normal,
    };
    let id = db.query(&query)?;
    db.with_face_data(id, |data, index| FontVec::try_from_vec_and_index(data.to_vec(), index).ok())
        .flatten()
}
