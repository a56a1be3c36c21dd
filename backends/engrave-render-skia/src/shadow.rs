//! Blurred drop shadows for text layers

use image::{imageops, GrayImage, Luma};
use tiny_skia::{Pixmap, PixmapPaint, PremultipliedColorU8, Transform};

use engrave_core::{
    error::{RenderError, Result},
    Color,
};

/// Shadow cast by a whole layer, in canvas pixels
///
/// `blur` follows the canvas `shadowBlur` convention: the Gaussian sigma is
/// half of it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DropShadow {
    pub color: Color,
    pub blur: f32,
    pub offset_x: f32,
    pub offset_y: f32,
}

impl DropShadow {
    pub const fn new(color: Color, blur: f32, offset_x: f32, offset_y: f32) -> Self {
        Self {
            color,
            blur,
            offset_x,
            offset_y,
        }
    }

    /// The shadow alone: the layer's alpha, blurred and tinted
    pub fn render(&self, layer: &Pixmap) -> Result<Pixmap> {
        let (width, height) = (layer.width(), layer.height());
        let alpha: Vec<u8> = layer.pixels().iter().map(|px| px.alpha()).collect();
        let silhouette = GrayImage::from_raw(width, height, alpha).ok_or(RenderError::BufferSize {
            expected: (width * height) as usize,
            actual: layer.pixels().len(),
        })?;

        let blurred = if self.blur > 0.0 {
            imageops::blur(&silhouette, self.blur / 2.0)
        } else {
            silhouette
        };

        let mut shadow = Pixmap::new(width, height).ok_or(RenderError::PixmapCreationFailed)?;
        let Color { r, g, b, a } = self.color;
        for (dst, Luma([coverage])) in shadow.pixels_mut().iter_mut().zip(blurred.pixels()) {
            let alpha = mul_div255(*coverage, a);
            if alpha == 0 {
                continue;
            }
            if let Some(px) = PremultipliedColorU8::from_rgba(
                mul_div255(r, alpha),
                mul_div255(g, alpha),
                mul_div255(b, alpha),
                alpha,
            ) {
                *dst = px;
            }
        }
        Ok(shadow)
    }

    /// Draws the shadow of `layer` onto `canvas`, then the layer itself
    pub fn draw_with(&self, canvas: &mut Pixmap, layer: &Pixmap) -> Result<()> {
        let shadow = self.render(layer)?;
        canvas.draw_pixmap(
            0,
            0,
            shadow.as_ref(),
            &PixmapPaint::default(),
            Transform::from_translate(self.offset_x, self.offset_y),
            None,
        );
        canvas.draw_pixmap(
            0,
            0,
            layer.as_ref(),
            &PixmapPaint::default(),
            Transform::identity(),
            None,
        );
        Ok(())
    }
}

fn mul_div255(a: u8, b: u8) -> u8 {
    ((a as u16 * b as u16 + 127) / 255) as u8
}
