//! Layering and render passes for engrave
//!
//! - [`LayerCompositor`] flattens background, contour and text in that order.
//! - [`BackgroundLoader`] fetches and decodes backgrounds off-thread.
//! - [`ImageCache`] keeps decoded backgrounds for later passes.
//! - [`EffectSession`] runs the whole pipeline one pass at a time and drops
//!   results that belong to superseded passes.

pub mod background;
pub mod cache;
pub mod compositor;
pub mod session;

pub use background::{
    decode_background, decode_data_uri, BackgroundImage, BackgroundLoader, LoadCompletion,
    LocalImageSource,
};
pub use cache::{CacheStats, ImageCache, ImageCacheKey};
pub use compositor::{ContourLayer, LayerCompositor, LayerStack, TextLayer};
pub use session::{EffectSession, EffectSessionBuilder};
