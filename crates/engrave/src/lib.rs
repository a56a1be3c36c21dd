//! engrave: text turned into an engraved or sticker-style picture
//!
//! One render pass takes an [`EffectParameters`](engrave_core::EffectParameters)
//! tuple and produces a [`CompositeImage`](engrave_core::types::CompositeImage):
//!
//! 1. The text is outlined with a real font and rasterized into an ink mask
//! 2. The mask is sampled on a coarse grid
//! 3. The samples are chained into a closed nearest-neighbor polygon
//! 4. Background, polygon sticker and styled text are layered in that order
//!
//! The background is loaded off-thread. A pass that is superseded before
//! its background arrives never shows it.
//!
//! # Example
//!
//! ```no_run
//! use engrave::prelude::*;
//! use std::time::Duration;
//!
//! let config = EffectConfig::from_preset(EffectPreset::Sticker);
//! let mut session = engrave::system_session(config)?;
//! let params = EffectParameters::new("abc", "Georgia", 120.0)
//!     .with_background(BackgroundRef::parse("metal.jpg"));
//! let image = session.render(&params, Duration::from_secs(2))?;
//! # Ok::<(), EngraveError>(())
//! ```
//!
//! # Feature Flags
//!
//! - `export-png` (default): [`export::PngExporter`]

use std::sync::Arc;

pub use engrave_composite as composite;
pub use engrave_contour as contour;
pub use engrave_core::{config, error, pass, traits, types};
pub use engrave_fontdb as fontdb;
pub use engrave_render_skia as render;

#[cfg(feature = "export-png")]
pub use engrave_export as export;

use engrave_composite::EffectSession;
use engrave_core::{config::EffectConfig, error::Result};
use engrave_fontdb::FontLibrary;
use engrave_render_skia::TextOutliner;

/// A session that draws with the fonts installed on this machine
pub fn system_session(config: EffectConfig) -> Result<EffectSession> {
    session_with_fonts(config, Arc::new(FontLibrary::with_system_fonts()))
}

/// A session that draws with `library`
///
/// Wires the default stages: a tiny-skia rasterizer over the library's
/// outlines, the local file and data-URI source, and the recipe named by
/// the configuration.
pub fn session_with_fonts(config: EffectConfig, library: Arc<FontLibrary>) -> Result<EffectSession> {
    log::debug!(
        "Building session over {} font faces ({} recipe)",
        library.face_count(),
        config.recipe.as_str()
    );
    EffectSession::builder()
        .config(config)
        .outliner(Arc::new(TextOutliner::new(library)))
        .build()
}

/// Common imports for typical usage
pub mod prelude {
    pub use engrave_composite::{EffectSession, EffectSessionBuilder, ImageCache};
    pub use engrave_contour::{ContourBuilder, SilhouetteSampler};
    pub use engrave_core::{
        config::{CanvasSize, ContourStyle, EffectConfig, EffectPreset, RecipeKind},
        error::{EngraveError, Result},
        traits::{Exporter, ImageSource, Rasterizer},
        types::{CompositeImage, InkMask, Point, PointSet, Polygon, Stride},
        BackgroundRef, Color, EffectParameters, PassId,
    };
    pub use engrave_fontdb::FontLibrary;

    #[cfg(feature = "export-png")]
    pub use engrave_export::PngExporter;
}
