//! Error types for engrave
//!
//! Most failures inside a render pass are absorbed by the session and turn
//! into a skipped layer. These types are what the individual stages report
//! before that policy is applied.

use thiserror::Error;

use crate::pass::PassId;

pub type Result<T> = std::result::Result<T, EngraveError>;

/// Main error type for engrave
#[derive(Debug, Error)]
pub enum EngraveError {
    #[error("Font loading failed: {0}")]
    FontLoad(#[from] FontLoadError),

    #[error("Rendering failed: {0}")]
    RenderingFailed(#[from] RenderError),

    #[error("Background unavailable: {0}")]
    Background(#[from] BackgroundError),

    #[error("Export failed: {0}")]
    ExportFailed(#[from] ExportError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Other error: {0}")]
    Other(String),
}

/// Font loading errors
#[derive(Debug, Error)]
pub enum FontLoadError {
    #[error("Font file not found: {0}")]
    FileNotFound(String),

    #[error("Invalid font data")]
    InvalidData,

    #[error("No fonts available")]
    NoFontsAvailable,

    #[error("Font face data unavailable for family {0}")]
    FaceUnavailable(String),
}

/// Rendering errors
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Invalid dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("Pixel buffer has {actual} bytes, expected {expected}")]
    BufferSize { expected: usize, actual: usize },

    #[error("Invalid font")]
    InvalidFont,

    #[error("Outline extraction failed for glyph {0}")]
    OutlineExtractionFailed(u32),

    #[error("Path building failed")]
    PathBuildingFailed,

    #[error("Pixmap creation failed")]
    PixmapCreationFailed,

    #[error("Backend error: {0}")]
    BackendError(String),
}

/// Background acquisition errors
#[derive(Debug, Error)]
pub enum BackgroundError {
    #[error("Unsupported image reference: {0}")]
    Unsupported(String),

    #[error("Invalid data URI: {0}")]
    InvalidDataUri(String),

    #[error("Could not read {path}: {reason}")]
    Read { path: String, reason: String },

    #[error("Image decoding failed: {0}")]
    Decode(String),

    #[error("Load superseded by a newer pass (was {0})")]
    Superseded(PassId),
}

/// Export errors
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Encoding failed: {0}")]
    EncodingFailed(String),

    #[error("Write failed: {0}")]
    WriteFailed(String),
}
