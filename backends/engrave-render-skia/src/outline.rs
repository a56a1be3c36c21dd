//! Text to path: single-line glyph placement with skrifa
//!
//! Glyphs are drawn unhinted at the requested pixel size, flipped from the
//! font's y-up space into canvas space, and collected into one kurbo path
//! before conversion to tiny-skia.

use std::sync::Arc;

use kurbo::{BezPath, PathEl};
use skrifa::{
    instance::{LocationRef, Size},
    outline::{DrawSettings, OutlinePen},
    GlyphId, MetadataProvider,
};
use tiny_skia::{Path, PathBuilder};

use engrave_core::{
    error::{RenderError, Result},
    traits::FontRef,
    TextSpec,
};
use engrave_fontdb::FontLibrary;

/// Turns a text spec into a canvas-space glyph path
///
/// `Ok(None)` means there is nothing to draw (empty or blank text).
pub trait Outliner: Send + Sync {
    fn outline(&self, spec: &TextSpec) -> Result<Option<Path>>;
}

/// Outliner backed by the installed fonts
pub struct TextOutliner {
    library: Arc<FontLibrary>,
}

impl TextOutliner {
    pub fn new(library: Arc<FontLibrary>) -> Self {
        Self { library }
    }

    pub fn library(&self) -> &Arc<FontLibrary> {
        &self.library
    }
}

impl Outliner for TextOutliner {
    fn outline(&self, spec: &TextSpec) -> Result<Option<Path>> {
        if spec.text.is_empty() {
            return Ok(None);
        }

        let font = self.library.resolve(&spec.font_family, spec.weight)?;
        let font_ref = skrifa::FontRef::from_index(font.data(), font.face_index())
            .map_err(|_| RenderError::InvalidFont)?;

        let size = Size::new(spec.font_size);
        let location = LocationRef::default();
        let charmap = font_ref.charmap();
        let glyph_metrics = font_ref.glyph_metrics(size, location);
        let outlines = font_ref.outline_glyphs();

        // Top of the line box sits at the origin
        let baseline = spec.origin.y + font_ref.metrics(size, location).ascent;
        let mut pen_x = spec.origin.x;
        let mut path = BezPath::new();

        for ch in spec.text.chars() {
            let glyph_id = charmap.map(ch).unwrap_or(GlyphId::NOTDEF);
            if let Some(glyph) = outlines.get(glyph_id) {
                let mut pen = PathPen {
                    path: &mut path,
                    x: pen_x as f64,
                    baseline: baseline as f64,
                };
                glyph
                    .draw(DrawSettings::unhinted(size, location), &mut pen)
                    .map_err(|_| RenderError::OutlineExtractionFailed(glyph_id.to_u32()))?;
            }
            pen_x += glyph_metrics.advance_width(glyph_id).unwrap_or(0.0);
        }

        log::debug!(
            "Outline: '{}' in {} at {}px, {} path elements, advance {:.1}",
            spec.text,
            font.family(),
            spec.font_size,
            path.elements().len(),
            pen_x - spec.origin.x
        );

        if path.elements().is_empty() {
            return Ok(None);
        }
        to_skia_path(&path).map(Some)
    }
}

/// Translates kurbo's path format into tiny-skia's native format
pub fn to_skia_path(path: &BezPath) -> Result<Path> {
    let mut builder = PathBuilder::new();
    for element in path.elements() {
        match *element {
            PathEl::MoveTo(p) => builder.move_to(p.x as f32, p.y as f32),
            PathEl::LineTo(p) => builder.line_to(p.x as f32, p.y as f32),
            PathEl::QuadTo(ctrl, end) => {
                builder.quad_to(ctrl.x as f32, ctrl.y as f32, end.x as f32, end.y as f32)
            },
            PathEl::CurveTo(c1, c2, end) => builder.cubic_to(
                c1.x as f32,
                c1.y as f32,
                c2.x as f32,
                c2.y as f32,
                end.x as f32,
                end.y as f32,
            ),
            PathEl::ClosePath => builder.close(),
        }
    }
    builder
        .finish()
        .ok_or_else(|| RenderError::PathBuildingFailed.into())
}

/// Receives skrifa's y-up outline commands and places them on the line
struct PathPen<'a> {
    path: &'a mut BezPath,
    x: f64,
    baseline: f64,
}

impl PathPen<'_> {
    fn place(&self, x: f32, y: f32) -> (f64, f64) {
        (self.x + x as f64, self.baseline - y as f64)
    }
}

impl OutlinePen for PathPen<'_> {
    fn move_to(&mut self, x: f32, y: f32) {
        let p = self.place(x, y);
        self.path.move_to(p);
    }

    fn line_to(&mut self, x: f32, y: f32) {
        let p = self.place(x, y);
        self.path.line_to(p);
    }

    fn quad_to(&mut self, cx0: f32, cy0: f32, x: f32, y: f32) {
        let c = self.place(cx0, cy0);
        let p = self.place(x, y);
        self.path.quad_to(c, p);
    }

    fn curve_to(&mut self, cx0: f32, cy0: f32, cx1: f32, cy1: f32, x: f32, y: f32) {
        let c0 = self.place(cx0, cy0);
        let c1 = self.place(cx1, cy1);
        let p = self.place(x, y);
        self.path.curve_to(c0, c1, p);
    }

    fn close(&mut self) {
        self.path.close_path();
    }
}
