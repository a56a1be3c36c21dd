//! The contracts between stages
//!
//! - [`Rasterizer`] - text becomes an isolated ink mask
//! - [`ImageSource`] - a background reference becomes encoded bytes
//! - [`Exporter`] - a finished composite becomes a file
//! - [`FontRef`] - your window into font data

use crate::{
    error::Result,
    types::{CompositeImage, InkMask},
    BackgroundRef, RasterRequest,
};

/// Where text becomes a silhouette
///
/// Implementations draw only the glyph fill. The sampler downstream trusts
/// that every fully covered pixel belongs to a glyph.
pub trait Rasterizer: Send + Sync {
    /// Used for debugging and logging
    fn name(&self) -> &'static str;

    /// Produce a `request.width` x `request.height` ink mask
    ///
    /// Empty text must yield a mask without ink, not an error.
    fn rasterize(&self, request: &RasterRequest) -> Result<InkMask>;
}

/// Turns a background reference into encoded image bytes
///
/// Called off the render thread; implementations must not assume they run
/// on the thread that created them.
pub trait ImageSource: Send + Sync {
    fn name(&self) -> &'static str;

    fn fetch(&self, reference: &BackgroundRef) -> Result<Vec<u8>>;
}

/// The final step: a composite becomes bytes on disk
pub trait Exporter: Send + Sync {
    fn name(&self) -> &'static str;

    /// Encode the composite as bytes
    fn export(&self, image: &CompositeImage) -> Result<Vec<u8>>;

    /// What file extension should be used?
    fn extension(&self) -> &'static str;

    /// What MIME type identifies your format?
    fn mime_type(&self) -> &'static str;
}

/// Raw access to a loaded font face
pub trait FontRef: Send + Sync {
    /// Font bytes as they live in the file
    fn data(&self) -> &[u8];

    /// Face index inside a collection (0 for single fonts)
    fn face_index(&self) -> u32 {
        0
    }

    /// The font's internal coordinate system scale
    fn units_per_em(&self) -> u16;

    /// Family name the face was resolved under
    fn family(&self) -> &str;
}
