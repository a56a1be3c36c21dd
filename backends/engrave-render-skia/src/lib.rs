//! tiny-skia backend: glyph outlines, ink masks and styled text
//!
//! Three jobs live here:
//!
//! - [`SkiaRasterizer`] fills the glyph outline into an isolated coverage
//!   mask. Nothing but the fill is drawn, so a fully covered pixel always
//!   means "inside a glyph".
//! - [`recipe`] paints the visible text layer in one of the styling looks.
//! - [`shadow`] blurs a layer's alpha into a drop shadow.
//!
//! Outlines come from an [`Outliner`]. The default [`TextOutliner`] reads
//! installed fonts through skrifa; tests plug in synthetic shapes.

use std::sync::Arc;

use tiny_skia::{FillRule, Mask, Paint, Path, PathBuilder, Pixmap, PremultipliedColorU8, Transform};

use engrave_core::{
    error::{RenderError, Result},
    traits::Rasterizer,
    types::{InkMask, Polygon},
    Color, RasterRequest,
};

pub mod outline;
pub mod recipe;
pub mod shadow;

pub use outline::{Outliner, TextOutliner};
pub use recipe::{recipe_for, EngravedRecipe, OutlinedRecipe, ReliefRecipe, TextRecipe};
pub use shadow::DropShadow;

/// Fills glyph outlines into a coverage mask
pub struct SkiaRasterizer {
    outliner: Arc<dyn Outliner>,
    /// Maximum canvas dimension to prevent memory exhaustion
    max_size: u32,
}

impl SkiaRasterizer {
    pub fn new(outliner: Arc<dyn Outliner>) -> Self {
        Self {
            outliner,
            max_size: 16384,
        }
    }

    pub fn outliner(&self) -> &Arc<dyn Outliner> {
        &self.outliner
    }
}

impl Rasterizer for SkiaRasterizer {
    fn name(&self) -> &'static str {
        "skia"
    }

    fn rasterize(&self, request: &RasterRequest) -> Result<InkMask> {
        let (width, height) = (request.width, request.height);
        if width == 0 || height == 0 || width > self.max_size || height > self.max_size {
            return Err(RenderError::InvalidDimensions { width, height }.into());
        }

        let Some(path) = self.outliner.outline(&request.text)? else {
            log::debug!("Skia: nothing to rasterize for {:?}", request.text.text);
            return Ok(InkMask::empty(width, height));
        };

        let mut mask = Mask::new(width, height).ok_or(RenderError::PixmapCreationFailed)?;
        mask.fill_path(&path, FillRule::Winding, true, Transform::identity());

        let mask = InkMask::from_coverage(width, height, mask.data().to_vec())?;
        log::debug!(
            "Skia: {}x{} ink mask, {} fully covered pixels",
            width,
            height,
            mask.ink_count()
        );
        Ok(mask)
    }
}

pub fn to_skia_color(color: Color) -> tiny_skia::Color {
    tiny_skia::Color::from_rgba8(color.r, color.g, color.b, color.a)
}

/// Anti-aliased solid paint
pub fn solid_paint(color: Color) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color_rgba8(color.r, color.g, color.b, color.a);
    paint.anti_alias = true;
    paint
}

/// Straight-line path through the polygon's vertices
///
/// `None` when the polygon cannot enclose any area.
pub fn polygon_path(polygon: &Polygon) -> Option<Path> {
    if polygon.is_degenerate() {
        return None;
    }
    let mut vertices = polygon.vertices().iter();
    let first = vertices.next()?;
    let mut builder = PathBuilder::new();
    builder.move_to(first.x as f32, first.y as f32);
    for v in vertices {
        builder.line_to(v.x as f32, v.y as f32);
    }
    builder.close();
    builder.finish()
}

/// Premultiplied pixmap to straight-alpha RGBA8
pub fn pixmap_to_rgba(pixmap: &Pixmap) -> Vec<u8> {
    let mut rgba = Vec::with_capacity(pixmap.data().len());
    for px in pixmap.pixels() {
        let c = px.demultiply();
        rgba.extend_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
    }
    rgba
}

/// Straight-alpha RGBA8 to a premultiplied pixmap
pub fn rgba_to_pixmap(width: u32, height: u32, rgba: &[u8]) -> Result<Pixmap> {
    let expected = width as usize * height as usize * 4;
    if rgba.len() != expected {
        return Err(RenderError::BufferSize {
            expected,
            actual: rgba.len(),
        }
        .into());
    }
    let mut pixmap = Pixmap::new(width, height).ok_or(RenderError::PixmapCreationFailed)?;
    for (dst, src) in pixmap.pixels_mut().iter_mut().zip(rgba.chunks_exact(4)) {
        let a = src[3] as u16;
        let premul = |c: u8| ((c as u16 * a + 127) / 255) as u8;
        if let Some(px) =
            PremultipliedColorU8::from_rgba(premul(src[0]), premul(src[1]), premul(src[2]), src[3])
        {
            *dst = px;
        }
    }
    Ok(pixmap)
}
