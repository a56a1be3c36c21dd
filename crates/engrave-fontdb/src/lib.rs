//! Where fonts come from: discovery and family lookup for engrave
//!
//! [`FontLibrary`] wraps a [`fontdb::Database`] filled from the system and
//! any extra files the caller adds. Lookups never fail just because a
//! family name is unknown: the library walks a fallback chain and only
//! reports [`FontLoadError::NoFontsAvailable`] when no face exists at all.
//!
//! Resolved faces are copied out once and cached as [`Font`] values behind
//! an `Arc`, so repeated passes with the same family share the bytes.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use fontdb::{Database, Family, Query, Source, Stretch, Style, Weight, ID};
use parking_lot::Mutex;
use read_fonts::{FontRef as ReadFontRef, TableProvider};

use engrave_core::{
    error::{FontLoadError, Result},
    traits::FontRef,
    FontWeight,
};

/// One face, loaded into memory and ready to outline
#[derive(Clone)]
pub struct Font {
    data: Arc<Vec<u8>>,
    face_index: u32,
    units_per_em: u16,
    family: String,
}

impl Font {
    /// Parses raw font bytes and keeps the chosen face
    pub fn from_data_index(data: Vec<u8>, face_index: u32, family: impl Into<String>) -> Result<Self> {
        let font_ref =
            ReadFontRef::from_index(&data, face_index).map_err(|_| FontLoadError::InvalidData)?;

        let units_per_em = font_ref
            .head()
            .map(|head| head.units_per_em())
            .unwrap_or(1000);

        Ok(Font {
            data: Arc::new(data),
            face_index,
            units_per_em,
            family: family.into(),
        })
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read(path)
            .map_err(|_| FontLoadError::FileNotFound(path.display().to_string()))?;
        let family = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self::from_data_index(data, 0, family)
    }
}

impl FontRef for Font {
    fn data(&self) -> &[u8] {
        &self.data
    }

    fn face_index(&self) -> u32 {
        self.face_index
    }

    fn units_per_em(&self) -> u16 {
        self.units_per_em
    }

    fn family(&self) -> &str {
        &self.family
    }
}

impl std::fmt::Debug for Font {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Font")
            .field("family", &self.family)
            .field("face_index", &self.face_index)
            .field("units_per_em", &self.units_per_em)
            .field("bytes", &self.data.len())
            .finish()
    }
}

/// Font database with family fallback
///
/// Resolution order for `resolve(family, weight)`:
/// 1. the named family (or a CSS generic such as `sans-serif`)
/// 2. the generic sans-serif family
/// 3. the first face in the database
///
/// Steps 2 and 3 log a warning naming the family that was asked for.
pub struct FontLibrary {
    db: Database,
    /// Faces already copied out of the database
    loaded: Mutex<HashMap<ID, Arc<Font>>>,
}

impl FontLibrary {
    /// Starts with no fonts at all
    pub fn empty() -> Self {
        Self {
            db: Database::new(),
            loaded: Mutex::new(HashMap::new()),
        }
    }

    /// Loads every font the system knows about
    pub fn with_system_fonts() -> Self {
        let mut library = Self::empty();
        library.db.load_system_fonts();
        log::debug!("FontLibrary: {} system faces", library.db.len());
        library
    }

    /// Adds one font file; returns how many faces it contributed
    pub fn load_font_file(&mut self, path: impl AsRef<Path>) -> Result<usize> {
        let path = path.as_ref();
        let data = std::fs::read(path)
            .map_err(|_| FontLoadError::FileNotFound(path.display().to_string()))?;
        let count = self.load_font_data(data)?;
        log::debug!("FontLibrary: {} faces from {}", count, path.display());
        Ok(count)
    }

    /// Adds fonts from memory; data with no parseable face is rejected
    pub fn load_font_data(&mut self, data: Vec<u8>) -> Result<usize> {
        let ids = self.db.load_font_source(Source::Binary(Arc::new(data)));
        if ids.is_empty() {
            return Err(FontLoadError::InvalidData.into());
        }
        Ok(ids.len())
    }

    pub fn face_count(&self) -> usize {
        self.db.len()
    }

    pub fn is_empty(&self) -> bool {
        self.db.is_empty()
    }

    /// Sorted, deduplicated family names
    pub fn families(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .db
            .faces()
            .filter_map(|face| face.families.first().map(|(name, _)| name.clone()))
            .collect();
        names.sort_unstable();
        names.dedup();
        names
    }

    /// Finds the best face for `family` at `weight`, falling back as needed
    pub fn resolve(&self, family: &str, weight: FontWeight) -> Result<Arc<Font>> {
        let id = self
            .query(&[parse_family(family)], weight)
            .or_else(|| {
                let id = self.query(&[Family::SansSerif], weight);
                if id.is_some() {
                    log::warn!("FontLibrary: family '{}' not found, using sans-serif", family);
                }
                id
            })
            .or_else(|| {
                let id = self.db.faces().next().map(|face| face.id);
                if id.is_some() {
                    log::warn!(
                        "FontLibrary: family '{}' not found and no sans-serif, using first face",
                        family
                    );
                }
                id
            })
            .ok_or(FontLoadError::NoFontsAvailable)?;

        self.load(id)
    }

    fn query(&self, families: &[Family<'_>], weight: FontWeight) -> Option<ID> {
        self.db.query(&Query {
            families,
            weight: Weight(weight.0),
            stretch: Stretch::Normal,
            style: Style::Normal,
        })
    }

    fn load(&self, id: ID) -> Result<Arc<Font>> {
        if let Some(font) = self.loaded.lock().get(&id) {
            return Ok(Arc::clone(font));
        }

        let family = self
            .db
            .face(id)
            .and_then(|face| face.families.first().map(|(name, _)| name.clone()))
            .unwrap_or_default();

        let font = self
            .db
            .with_face_data(id, |data, face_index| {
                Font::from_data_index(data.to_vec(), face_index, family.clone())
            })
            .ok_or_else(|| FontLoadError::FaceUnavailable(family.clone()))??;

        let font = Arc::new(font);
        self.loaded.lock().insert(id, Arc::clone(&font));
        log::debug!("FontLibrary: loaded {:?}", font);
        Ok(font)
    }
}

impl Default for FontLibrary {
    fn default() -> Self {
        Self::with_system_fonts()
    }
}

/// CSS generic names map onto fontdb's generic families
fn parse_family(name: &str) -> Family<'_> {
    match name.trim().to_ascii_lowercase().as_str() {
        "serif" => Family::Serif,
        "sans-serif" | "system-ui" => Family::SansSerif,
        "monospace" => Family::Monospace,
        "cursive" => Family::Cursive,
        "fantasy" => Family::Fantasy,
        _ => Family::Name(name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_library_has_no_fonts() {
        let library = FontLibrary::empty();
        assert!(library.is_empty());
        assert!(library.families().is_empty());
        match library.resolve("Georgia", FontWeight::NORMAL) {
            Err(engrave_core::EngraveError::FontLoad(FontLoadError::NoFontsAvailable)) => {},
            other => panic!("expected NoFontsAvailable, got {:?}", other),
        }
    }

    #[test]
    fn garbage_data_is_rejected() {
        let mut library = FontLibrary::empty();
        assert!(library.load_font_data(vec![0; 100]).is_err());
        assert!(Font::from_data_index(vec![0; 100], 0, "x").is_err());
    }

    #[test]
    fn missing_file_is_reported() {
        let mut library = FontLibrary::empty();
        match library.load_font_file("/definitely/not/here.ttf") {
            Err(engrave_core::EngraveError::FontLoad(FontLoadError::FileNotFound(p))) => {
                assert!(p.contains("here.ttf"));
            },
            other => panic!("expected FileNotFound, got {:?}", other),
        }
    }

    #[test]
    fn generic_names_are_recognised() {
        assert_eq!(parse_family("Sans-Serif"), Family::SansSerif);
        assert_eq!(parse_family("serif"), Family::Serif);
        assert_eq!(parse_family("Georgia"), Family::Name("Georgia"));
    }

    #[test]
    fn unknown_family_falls_back() {
        let library = FontLibrary::with_system_fonts();
        if library.is_empty() {
            eprintln!("Skipping test: no system fonts installed");
            return;
        }

        let font = library
            .resolve("No Such Family 0xDEADBEEF", FontWeight::BOLD)
            .unwrap();
        assert!(!font.data().is_empty());
        assert!(font.units_per_em() > 0);
    }

    #[test]
    fn resolved_faces_are_shared() {
        let library = FontLibrary::with_system_fonts();
        if library.is_empty() {
            eprintln!("Skipping test: no system fonts installed");
            return;
        }

        let a = library.resolve("sans-serif", FontWeight::NORMAL).unwrap();
        let b = library.resolve("sans-serif", FontWeight::NORMAL).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }
}
