//! Effect configuration: canvas, layout, styling and limits
//!
//! A config usually starts from an [`EffectPreset`], may be loaded from a
//! JSON file, and is then tweaked by the caller. Every field has a default,
//! so a JSON file only needs the keys it wants to change.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{
    error::{EngraveError, Result},
    types::Stride,
    Color, EffectParameters, FontWeight, Origin, RasterRequest, TextSpec,
};

/// Which styling recipe draws the text layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecipeKind {
    /// Gradient-stroked glyph with a clipped heavy shadow stroke inside it
    #[default]
    Engraved,
    /// Heavy shadow glyph under a faint, thin-stroked glyph
    Relief,
    /// A single white glyph with a thin blue outline
    Outlined,
}

impl RecipeKind {
    pub const ALL: [RecipeKind; 3] = [RecipeKind::Engraved, RecipeKind::Relief, RecipeKind::Outlined];

    pub fn as_str(self) -> &'static str {
        match self {
            RecipeKind::Engraved => "engraved",
            RecipeKind::Relief => "relief",
            RecipeKind::Outlined => "outlined",
        }
    }

    /// The carved looks want heavy strokes, the outline does not
    pub fn font_weight(self) -> FontWeight {
        match self {
            RecipeKind::Engraved => FontWeight::EXTRA_BOLD,
            RecipeKind::Relief => FontWeight::BOLD,
            RecipeKind::Outlined => FontWeight::NORMAL,
        }
    }
}

impl fmt::Display for RecipeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecipeKind {
    type Err = EngraveError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "engraved" | "engrave" => Ok(RecipeKind::Engraved),
            "relief" | "emboss" | "embossed" => Ok(RecipeKind::Relief),
            "outlined" | "outline" => Ok(RecipeKind::Outlined),
            other => Err(EngraveError::Config(format!("unknown recipe: {other}"))),
        }
    }
}

/// Canvas/recipe/contour bundles matching the two effect screens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EffectPreset {
    /// 800x600 canvas, engraved text, no contour layer
    Engraved,
    /// Sticker canvas with the glyph-silhouette contour under outlined text
    Sticker,
}

impl EffectPreset {
    pub const ALL: [EffectPreset; 2] = [EffectPreset::Engraved, EffectPreset::Sticker];

    pub fn as_str(self) -> &'static str {
        match self {
            EffectPreset::Engraved => "engraved",
            EffectPreset::Sticker => "sticker",
        }
    }

    pub fn config(self) -> EffectConfig {
        match self {
            EffectPreset::Engraved => EffectConfig {
                canvas: CanvasSize::PRIMARY,
                origin: Origin::new(50.0, 100.0),
                recipe: RecipeKind::Engraved,
                contour: None,
                ..EffectConfig::default()
            },
            EffectPreset::Sticker => EffectConfig {
                canvas: CanvasSize::sticker(CanvasSize::PRIMARY.width * 2),
                origin: Origin::new(100.0, 200.0),
                recipe: RecipeKind::Outlined,
                contour: Some(ContourStyle::default()),
                ..EffectConfig::default()
            },
        }
    }
}

impl FromStr for EffectPreset {
    type Err = EngraveError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "engraved" => Ok(EffectPreset::Engraved),
            "sticker" | "strike" => Ok(EffectPreset::Sticker),
            other => Err(EngraveError::Config(format!("unknown preset: {other}"))),
        }
    }
}

/// Output dimensions in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanvasSize {
    pub width: u32,
    pub height: u32,
}

impl CanvasSize {
    pub const PRIMARY: CanvasSize = CanvasSize {
        width: 800,
        height: 600,
    };

    /// The secondary canvas spans half the viewport width
    pub fn sticker(viewport_width: u32) -> Self {
        CanvasSize {
            width: (viewport_width / 2).max(1),
            height: 600,
        }
    }
}

impl Default for CanvasSize {
    fn default() -> Self {
        Self::PRIMARY
    }
}

/// Allowed font size range; values outside are clamped
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FontSizeLimits {
    pub min: f32,
    pub max: f32,
}

impl FontSizeLimits {
    /// Non-finite sizes fall back to the minimum
    pub fn clamp(&self, size: f32) -> f32 {
        if !size.is_finite() {
            return self.min;
        }
        size.clamp(self.min, self.max.max(self.min))
    }
}

impl Default for FontSizeLimits {
    fn default() -> Self {
        Self {
            min: 100.0,
            max: 300.0,
        }
    }
}

/// Looks of the sticker polygon layer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContourStyle {
    pub fill: Color,
    pub stroke: Color,
    /// Stroke width as a fraction of the font size
    pub stroke_ratio: f32,
    /// Layer opacity, clamped to [`ContourStyle::OPACITY_RANGE`] when drawn
    pub opacity: f32,
}

impl ContourStyle {
    pub const OPACITY_RANGE: (f32, f32) = (0.3, 0.6);

    pub fn effective_opacity(&self) -> f32 {
        let (lo, hi) = Self::OPACITY_RANGE;
        if !self.opacity.is_finite() {
            return lo;
        }
        self.opacity.clamp(lo, hi)
    }

    pub fn stroke_width(&self, font_size: f32) -> f32 {
        (font_size * self.stroke_ratio).max(0.0)
    }
}

impl Default for ContourStyle {
    fn default() -> Self {
        Self {
            fill: Color::white(),
            stroke: Color::rgba(0x16, 0x77, 0xff, 255),
            stroke_ratio: 0.6,
            opacity: 0.4,
        }
    }
}

/// Where the silhouette sits relative to the visible text
///
/// The silhouette is drawn a little smaller and pushed inward so the
/// contour's thick stroke lands inside the full-size glyphs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SilhouetteLayout {
    pub scale: f32,
    pub inset: f32,
}

impl Default for SilhouetteLayout {
    fn default() -> Self {
        Self {
            scale: 0.9,
            inset: 0.1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageCacheConfig {
    pub enabled: bool,
    pub capacity: usize,
}

impl Default for ImageCacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            capacity: 8,
        }
    }
}

/// Everything a session needs besides the per-pass parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EffectConfig {
    pub canvas: CanvasSize,
    /// Top-left of the visible text line
    pub origin: Origin,
    pub stride: Stride,
    pub recipe: RecipeKind,
    /// None disables the sticker layer entirely
    pub contour: Option<ContourStyle>,
    pub silhouette: SilhouetteLayout,
    pub font_size: FontSizeLimits,
    pub image_cache: ImageCacheConfig,
}

impl Default for EffectConfig {
    fn default() -> Self {
        Self {
            canvas: CanvasSize::PRIMARY,
            origin: Origin::new(50.0, 100.0),
            stride: Stride::DEFAULT,
            recipe: RecipeKind::Engraved,
            contour: None,
            silhouette: SilhouetteLayout::default(),
            font_size: FontSizeLimits::default(),
            image_cache: ImageCacheConfig::default(),
        }
    }
}

impl EffectConfig {
    pub fn from_preset(preset: EffectPreset) -> Self {
        preset.config()
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| EngraveError::Config(format!("invalid config: {e}")))
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&json)?;
        log::debug!("Loaded effect config from {}", path.display());
        Ok(config)
    }

    /// The visible text line for these parameters
    pub fn text_spec(&self, params: &EffectParameters) -> TextSpec {
        TextSpec {
            text: params.text.clone(),
            font_family: params.font_family.clone(),
            font_size: self.font_size.clamp(params.font_size),
            weight: self.recipe.font_weight(),
            origin: self.origin,
        }
    }

    /// The silhouette request: same text, scaled and inset per the layout
    pub fn silhouette_request(&self, params: &EffectParameters) -> RasterRequest {
        let visible = self.text_spec(params);
        let offset = visible.font_size * self.silhouette.inset;
        RasterRequest {
            text: TextSpec {
                font_size: visible.font_size * self.silhouette.scale,
                origin: Origin::new(visible.origin.x + offset, visible.origin.y + offset),
                ..visible
            },
            width: self.canvas.width,
            height: self.canvas.height,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn font_size_is_clamped_to_bounds() {
        let limits = FontSizeLimits::default();
        assert_eq!(limits.clamp(50.0), 100.0);
        assert_eq!(limits.clamp(150.0), 150.0);
        assert_eq!(limits.clamp(900.0), 300.0);
        assert_eq!(limits.clamp(f32::NAN), 100.0);
    }

    #[test]
    fn contour_opacity_stays_subtle() {
        let mut style = ContourStyle::default();
        assert_eq!(style.effective_opacity(), 0.4);
        style.opacity = 1.0;
        assert_eq!(style.effective_opacity(), 0.6);
        style.opacity = 0.0;
        assert_eq!(style.effective_opacity(), 0.3);
        assert!((style.stroke_width(100.0) - 60.0).abs() < 1e-4);
        style.stroke_ratio = 0.5;
        assert_eq!(style.stroke_width(200.0), 100.0);
        style.stroke_ratio = -1.0;
        assert_eq!(style.stroke_width(200.0), 0.0);
    }

    #[test]
    fn sticker_preset_enables_contour() {
        let sticker = EffectPreset::Sticker.config();
        assert!(sticker.contour.is_some());
        assert_eq!(sticker.recipe, RecipeKind::Outlined);
        assert_eq!(sticker.canvas, CanvasSize { width: 800, height: 600 });

        let engraved = EffectPreset::Engraved.config();
        assert!(engraved.contour.is_none());
        assert_eq!(engraved.canvas, CanvasSize::PRIMARY);
    }

    #[test]
    fn silhouette_request_is_scaled_and_inset() {
        let config = EffectPreset::Sticker.config();
        let params = EffectParameters::new("AB", "Georgia", 100.0);
        let request = config.silhouette_request(&params);
        assert_eq!(request.text.font_size, 90.0);
        assert_eq!(request.text.origin, Origin::new(110.0, 210.0));
        assert_eq!((request.width, request.height), (800, 600));
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config =
            EffectConfig::from_json_str(r#"{"recipe":"relief","stride":3,"canvas":{"width":400,"height":600}}"#)
                .unwrap();
        assert_eq!(config.recipe, RecipeKind::Relief);
        assert_eq!(config.stride.get(), 3);
        assert_eq!(config.canvas.width, 400);
        assert_eq!(config.font_size, FontSizeLimits::default());
    }

    #[test]
    fn zero_stride_in_json_is_rejected() {
        assert!(EffectConfig::from_json_str(r#"{"stride":0}"#).is_err());
    }

    #[test]
    fn recipe_names_parse() {
        assert_eq!("Outline".parse::<RecipeKind>().unwrap(), RecipeKind::Outlined);
        assert!("sparkle".parse::<RecipeKind>().is_err());
    }
}
