//! Fixed-stride ink sampling

use engrave_core::types::{InkMask, Point, PointSet, Stride};

/// Scans a silhouette on a coarse grid and keeps the ink hits
///
/// Cost is bounded by `(width / stride) * (height / stride)` pixel reads no
/// matter how much of the surface is covered. Only fully covered pixels
/// count, so the recovered shape is slightly eroded against the true glyph
/// edge.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilhouetteSampler;

impl SilhouetteSampler {
    pub fn new() -> Self {
        Self
    }

    /// Row-major scan, returned sorted by `(x, y)`
    ///
    /// An unreadable surface yields an empty set ("no contour to draw").
    pub fn sample(&self, surface: &InkMask, stride: Stride) -> PointSet {
        if !surface.is_readable() {
            log::warn!(
                "Sampler: surface {}x{} has no pixels to read",
                surface.width(),
                surface.height()
            );
            return PointSet::new();
        }

        let step = stride.get() as usize;
        let mut hits = Vec::new();
        for y in (0..surface.height()).step_by(step) {
            for x in (0..surface.width()).step_by(step) {
                if surface.is_ink(x, y) {
                    hits.push(Point::new(x, y));
                }
            }
        }

        let points = PointSet::from_points(hits);
        log::debug!(
            "Sampler: {} ink points on a {}x{} surface at stride {}",
            points.len(),
            surface.width(),
            surface.height(),
            stride.get()
        );
        points
    }

    /// Samples a raw RGBA buffer where only `(255, 255, 255, 255)` is ink
    ///
    /// A buffer too short for the stated dimensions is treated as unreadable.
    pub fn sample_rgba(&self, width: u32, height: u32, rgba: &[u8], stride: Stride) -> PointSet {
        match InkMask::from_rgba_exact_white(width, height, rgba) {
            Ok(mask) => self.sample(&mask, stride),
            Err(e) => {
                log::warn!("Sampler: cannot read RGBA surface: {}", e);
                PointSet::new()
            },
        }
    }
}
