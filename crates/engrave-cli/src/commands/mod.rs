//! Subcommand implementations

pub mod batch;
pub mod info;
pub mod render;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use engrave::composite::EffectSession;
use engrave_core::{config::EffectConfig, types::Stride};
use engrave_fontdb::FontLibrary;

use crate::cli::SessionArgs;

/// Preset or config file first, then the flag overrides
pub fn effect_config(args: &SessionArgs) -> Result<EffectConfig> {
    let mut config = match &args.config {
        Some(path) => EffectConfig::from_json_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => EffectConfig::from_preset(args.preset),
    };

    if let Some(recipe) = args.recipe {
        config.recipe = recipe;
    }
    if let Some(step) = args.stride {
        match Stride::new(step) {
            Some(stride) => config.stride = stride,
            None => bail!("--stride must be at least 1"),
        }
    }
    if let Some(width) = args.canvas_width {
        config.canvas.width = width;
    }
    if let Some(height) = args.canvas_height {
        config.canvas.height = height;
    }
    if args.no_image_cache {
        config.image_cache.enabled = false;
    }
    Ok(config)
}

/// System fonts plus any `--font-file`
pub fn font_library(args: &SessionArgs) -> Result<Arc<FontLibrary>> {
    let mut library = FontLibrary::with_system_fonts();
    for path in &args.font_files {
        let faces = library
            .load_font_file(path)
            .with_context(|| format!("loading font {}", path.display()))?;
        log::info!("Loaded {} faces from {}", faces, path.display());
    }
    if library.is_empty() {
        log::warn!("No fonts found; text layers will be left out");
    }
    Ok(Arc::new(library))
}

pub fn session(args: &SessionArgs) -> Result<(EffectSession, Duration)> {
    let config = effect_config(args)?;
    let library = font_library(args)?;
    let session = engrave::session_with_fonts(config, library).context("building session")?;
    Ok((session, Duration::from_millis(args.wait_ms)))
}
