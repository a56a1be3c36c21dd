//! Flattening the three layers into one image
//!
//! Order is fixed: background, then the contour sticker, then the styled
//! text, each blended source-over onto what is below. A layer that is
//! missing or cannot be drawn is left out; the others still appear.

use std::sync::Arc;

use tiny_skia::{FillRule, LineCap, LineJoin, Pixmap, PixmapPaint, Stroke, Transform};

use engrave_core::{
    config::{CanvasSize, ContourStyle},
    error::{RenderError, Result},
    types::{CompositeImage, Polygon},
    PassId, TextSpec,
};
use engrave_render_skia::{pixmap_to_rgba, polygon_path, solid_paint, TextRecipe};

use crate::background::BackgroundImage;

/// The sticker polygon and how to paint it
#[derive(Debug, Clone)]
pub struct ContourLayer {
    pub polygon: Polygon,
    pub style: ContourStyle,
    /// Visible font size; the stroke width scales with it
    pub font_size: f32,
}

/// Glyph outline of the visible text, in canvas space
#[derive(Debug, Clone)]
pub struct TextLayer {
    pub glyphs: tiny_skia::Path,
    pub spec: TextSpec,
}

/// Everything one pass draws
#[derive(Debug, Clone, Default)]
pub struct LayerStack {
    pub background: Option<Arc<BackgroundImage>>,
    pub contour: Option<ContourLayer>,
    pub text: Option<TextLayer>,
}

pub struct LayerCompositor {
    canvas: CanvasSize,
    recipe: Box<dyn TextRecipe>,
}

impl LayerCompositor {
    pub fn new(canvas: CanvasSize, recipe: Box<dyn TextRecipe>) -> Self {
        Self { canvas, recipe }
    }

    pub fn canvas(&self) -> CanvasSize {
        self.canvas
    }

    pub fn recipe_name(&self) -> &'static str {
        self.recipe.name()
    }

    /// Draws `stack` bottom to top and tags the result with `pass`
    pub fn flatten(&self, stack: &LayerStack, pass: PassId) -> Result<CompositeImage> {
        let CanvasSize { width, height } = self.canvas;
        let mut canvas =
            Pixmap::new(width, height).ok_or(RenderError::InvalidDimensions { width, height })?;

        if let Some(background) = &stack.background {
            canvas.draw_pixmap(
                0,
                0,
                background.pixmap().as_ref(),
                &PixmapPaint::default(),
                Transform::identity(),
                None,
            );
        }

        if let Some(contour) = &stack.contour {
            if let Err(e) = draw_contour(&mut canvas, contour) {
                log::warn!("Compositor: contour layer skipped: {}", e);
            }
        }

        if let Some(text) = &stack.text {
            if let Err(e) = self.recipe.paint(&mut canvas, &text.glyphs, &text.spec) {
                log::warn!("Compositor: text layer skipped: {}", e);
            }
        }

        log::debug!(
            "Compositor: {} flattened (background: {}, contour: {}, text: {})",
            pass,
            stack.background.is_some(),
            stack.contour.is_some(),
            stack.text.is_some()
        );

        Ok(CompositeImage {
            width,
            height,
            pass,
            data: pixmap_to_rgba(&canvas),
        })
    }
}

/// Fill and stroke share one opacity, so they go through their own pixmap
fn draw_contour(canvas: &mut Pixmap, layer: &ContourLayer) -> Result<()> {
    let Some(path) = polygon_path(&layer.polygon) else {
        log::debug!(
            "Compositor: {}-vertex polygon has no area, contour skipped",
            layer.polygon.len()
        );
        return Ok(());
    };

    let mut sticker =
        Pixmap::new(canvas.width(), canvas.height()).ok_or(RenderError::PixmapCreationFailed)?;
    sticker.fill_path(
        &path,
        &solid_paint(layer.style.fill),
        FillRule::Winding,
        Transform::identity(),
        None,
    );
    let stroke = Stroke {
        width: layer.style.stroke_width(layer.font_size),
        line_cap: LineCap::Round,
        line_join: LineJoin::Round,
        ..Stroke::default()
    };
    sticker.stroke_path(
        &path,
        &solid_paint(layer.style.stroke),
        &stroke,
        Transform::identity(),
        None,
    );

    let paint = PixmapPaint {
        opacity: layer.style.effective_opacity(),
        ..PixmapPaint::default()
    };
    canvas.draw_pixmap(0, 0, sticker.as_ref(), &paint, Transform::identity(), None);
    Ok(())
}
