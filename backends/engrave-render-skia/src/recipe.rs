//! Text style recipes: how the top layer paints its glyphs
//!
//! Every recipe receives the same canvas-space glyph path. Recipes that
//! need a shadow or a clip draw into their own pixmap first and merge the
//! result onto the canvas, so nothing below the text is disturbed.

use tiny_skia::{
    FillRule, GradientStop, LinearGradient, Mask, Paint, Path, Pixmap, PixmapPaint, Point,
    SpreadMode, Stroke, Transform,
};

use engrave_core::{
    error::{RenderError, Result},
    Color, RecipeKind, TextSpec,
};

use crate::{shadow::DropShadow, solid_paint, to_skia_color};

/// A strategy for drawing the styled text layer
pub trait TextRecipe: Send + Sync {
    fn name(&self) -> &'static str;

    /// Paint `glyphs` onto `canvas` with source-over blending
    fn paint(&self, canvas: &mut Pixmap, glyphs: &Path, spec: &TextSpec) -> Result<()>;
}

/// Picks the recipe implementation for a configured kind
pub fn recipe_for(kind: RecipeKind) -> Box<dyn TextRecipe> {
    match kind {
        RecipeKind::Engraved => Box::new(EngravedRecipe::default()),
        RecipeKind::Relief => Box::new(ReliefRecipe::default()),
        RecipeKind::Outlined => Box::new(OutlinedRecipe::default()),
    }
}

fn stroke(width: f32) -> Stroke {
    Stroke {
        width,
        ..Stroke::default()
    }
}

fn blank_like(canvas: &Pixmap) -> Result<Pixmap> {
    Pixmap::new(canvas.width(), canvas.height())
        .ok_or_else(|| RenderError::PixmapCreationFailed.into())
}

/// Carved-in look: the shadow stroke only shows inside the glyph
#[derive(Debug, Clone)]
pub struct EngravedRecipe {
    pub fill: Color,
    pub gradient_top: Color,
    pub gradient_bottom: Color,
    /// Gradient length from the top of the line box
    pub gradient_span: f32,
    pub stroke_width: f32,
    pub inner_shadow: Color,
    pub inner_shadow_width: f32,
    pub drop_shadow: DropShadow,
}

impl Default for EngravedRecipe {
    fn default() -> Self {
        Self {
            fill: Color::rgba_f(0, 0, 0, 0.1),
            gradient_top: Color::black(),
            gradient_bottom: Color::rgba_f(255, 255, 255, 0.2),
            gradient_span: 100.0,
            stroke_width: 3.0,
            inner_shadow: Color::rgba_f(0, 0, 0, 0.4),
            inner_shadow_width: 8.0,
            drop_shadow: DropShadow::new(Color::rgba_f(0, 0, 0, 0.5), 15.0, 5.0, 5.0),
        }
    }
}

impl TextRecipe for EngravedRecipe {
    fn name(&self) -> &'static str {
        "engraved"
    }

    fn paint(&self, canvas: &mut Pixmap, glyphs: &Path, spec: &TextSpec) -> Result<()> {
        let mut group = blank_like(canvas)?;

        group.fill_path(
            glyphs,
            &solid_paint(self.fill),
            FillRule::Winding,
            Transform::identity(),
            None,
        );

        let top = spec.origin.y;
        let shader = LinearGradient::new(
            Point::from_xy(0.0, top),
            Point::from_xy(0.0, top + self.gradient_span),
            vec![
                GradientStop::new(0.0, to_skia_color(self.gradient_top)),
                GradientStop::new(1.0, to_skia_color(self.gradient_bottom)),
            ],
            SpreadMode::Pad,
            Transform::identity(),
        )
        .ok_or_else(|| RenderError::BackendError("degenerate stroke gradient".into()))?;
        let gradient = Paint {
            shader,
            anti_alias: true,
            ..Paint::default()
        };
        group.stroke_path(
            glyphs,
            &gradient,
            &stroke(self.stroke_width),
            Transform::identity(),
            None,
        );

        let mut clip =
            Mask::new(canvas.width(), canvas.height()).ok_or(RenderError::PixmapCreationFailed)?;
        clip.fill_path(glyphs, FillRule::Winding, true, Transform::identity());
        group.stroke_path(
            glyphs,
            &solid_paint(self.inner_shadow),
            &stroke(self.inner_shadow_width),
            Transform::identity(),
            Some(&clip),
        );

        self.drop_shadow.draw_with(canvas, &group)
    }
}

/// Raised look: the shadow stroke spills around the glyph
#[derive(Debug, Clone)]
pub struct ReliefRecipe {
    pub shadow_stroke: Color,
    pub shadow_width: f32,
    pub drop_shadow: DropShadow,
    pub fill: Color,
    pub highlight: Color,
    pub highlight_width: f32,
}

impl Default for ReliefRecipe {
    fn default() -> Self {
        Self {
            shadow_stroke: Color::rgba_f(0, 0, 0, 0.4),
            shadow_width: 8.0,
            drop_shadow: DropShadow::new(Color::rgba_f(0, 0, 0, 0.5), 15.0, 5.0, 5.0),
            fill: Color::rgba_f(0, 0, 0, 0.05),
            highlight: Color::rgba_f(255, 255, 255, 0.4),
            highlight_width: 1.0,
        }
    }
}

impl TextRecipe for ReliefRecipe {
    fn name(&self) -> &'static str {
        "relief"
    }

    fn paint(&self, canvas: &mut Pixmap, glyphs: &Path, _spec: &TextSpec) -> Result<()> {
        let mut outer = blank_like(canvas)?;
        outer.stroke_path(
            glyphs,
            &solid_paint(self.shadow_stroke),
            &stroke(self.shadow_width),
            Transform::identity(),
            None,
        );
        self.drop_shadow.draw_with(canvas, &outer)?;

        canvas.fill_path(
            glyphs,
            &solid_paint(self.fill),
            FillRule::Winding,
            Transform::identity(),
            None,
        );
        canvas.stroke_path(
            glyphs,
            &solid_paint(self.highlight),
            &stroke(self.highlight_width),
            Transform::identity(),
            None,
        );
        Ok(())
    }
}

/// Flat sticker lettering: white fill, thin accent outline
#[derive(Debug, Clone)]
pub struct OutlinedRecipe {
    pub fill: Color,
    pub stroke: Color,
    pub stroke_width: f32,
    pub opacity: f32,
}

impl Default for OutlinedRecipe {
    fn default() -> Self {
        Self {
            fill: Color::white(),
            stroke: Color::rgba(0x16, 0x77, 0xff, 0xff),
            stroke_width: 1.0,
            opacity: 0.8,
        }
    }
}

impl TextRecipe for OutlinedRecipe {
    fn name(&self) -> &'static str {
        "outlined"
    }

    fn paint(&self, canvas: &mut Pixmap, glyphs: &Path, _spec: &TextSpec) -> Result<()> {
        let mut layer = blank_like(canvas)?;
        layer.fill_path(
            glyphs,
            &solid_paint(self.fill),
            FillRule::Winding,
            Transform::identity(),
            None,
        );
        layer.stroke_path(
            glyphs,
            &solid_paint(self.stroke),
            &stroke(self.stroke_width),
            Transform::identity(),
            None,
        );

        let paint = PixmapPaint {
            opacity: self.opacity.clamp(0.0, 1.0),
            ..PixmapPaint::default()
        };
        canvas.draw_pixmap(0, 0, layer.as_ref(), &paint, Transform::identity(), None);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use engrave_core::{FontWeight, Origin};
    use tiny_skia::{PathBuilder, Rect};

    fn block() -> Path {
        PathBuilder::from_rect(Rect::from_xywh(40.0, 40.0, 60.0, 60.0).unwrap())
    }

    fn spec() -> TextSpec {
        TextSpec {
            text: "x".into(),
            font_family: "sans-serif".into(),
            font_size: 100.0,
            weight: FontWeight::BOLD,
            origin: Origin::new(40.0, 40.0),
        }
    }

    fn canvas() -> Pixmap {
        Pixmap::new(160, 160).unwrap()
    }

    #[test]
    fn kinds_map_to_recipes() {
        for kind in RecipeKind::ALL {
            assert_eq!(recipe_for(kind).name(), kind.as_str());
        }
    }

    #[test]
    fn outlined_is_translucent_white() {
        let mut canvas = canvas();
        OutlinedRecipe::default()
            .paint(&mut canvas, &block(), &spec())
            .unwrap();
        let px = canvas.pixel(70, 70).unwrap().demultiply();
        assert!((202..=206).contains(&px.alpha()), "{:?}", px);
        assert!(px.red() >= 250 && px.green() >= 250 && px.blue() >= 250);
        assert_eq!(canvas.pixel(5, 5).unwrap().alpha(), 0);
    }

    #[test]
    fn engraved_shadow_stays_inside_the_glyph() {
        let recipe = EngravedRecipe {
            drop_shadow: DropShadow::new(Color::rgba(0, 0, 0, 0), 0.0, 0.0, 0.0),
            ..EngravedRecipe::default()
        };
        let mut canvas = canvas();
        recipe.paint(&mut canvas, &block(), &spec()).unwrap();

        // 3px outside the edge: only the 3px gradient stroke could reach
        // 1.5px out, and the 8px shadow stroke is clipped to the glyph
        assert_eq!(canvas.pixel(70, 36).unwrap().alpha(), 0);
        // 3px inside: the clipped shadow stroke darkens it
        let inside = canvas.pixel(70, 43).unwrap();
        let deep = canvas.pixel(70, 70).unwrap();
        assert!(inside.alpha() > deep.alpha());
    }

    #[test]
    fn relief_shadow_spills_outside() {
        let recipe = ReliefRecipe {
            drop_shadow: DropShadow::new(Color::rgba(0, 0, 0, 0), 0.0, 0.0, 0.0),
            ..ReliefRecipe::default()
        };
        let mut canvas = canvas();
        recipe.paint(&mut canvas, &block(), &spec()).unwrap();
        assert!(canvas.pixel(70, 37).unwrap().alpha() > 0);
    }

    #[test]
    fn drop_shadow_is_offset() {
        let mut canvas = canvas();
        ReliefRecipe::default()
            .paint(&mut canvas, &block(), &spec())
            .unwrap();
        // Below-right of the glyph picks up the shadow, above-left much less
        let below = canvas.pixel(108, 108).unwrap().alpha();
        let above = canvas.pixel(32, 32).unwrap().alpha();
        assert!(below > above, "below {} above {}", below, above);
    }
}
