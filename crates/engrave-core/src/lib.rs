//! Engrave Core: from a parameter tuple to a layered sticker image
//!
//! Every render pass walks the same road:
//!
//! 1. **Rasterize** - the text becomes an isolated ink mask
//! 2. **Sample** - the mask is scanned on a coarse grid for ink pixels
//! 3. **Trace** - the samples are chained into one closed polygon
//! 4. **Composite** - background, polygon fill and styled text are layered
//!
//! This crate holds the vocabulary those stages share: the data model in
//! [`types`], the seams in [`traits`], the knobs in [`config`], and the
//! single "current pass" switch in [`pass`]. The stages themselves live in
//! their own crates so each can be swapped without touching the others.
//!
//! ```
//! use engrave_core::{EffectParameters, config::EffectConfig};
//!
//! let config = EffectConfig::default();
//! let params = EffectParameters::new("AB", "Georgia", 500.0);
//!
//! // Sizes outside the configured bound are clamped, never rejected
//! assert_eq!(config.font_size.clamp(params.font_size), 300.0);
//! ```

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub mod cache_config;
pub mod config;
pub mod error;
pub mod pass;
pub mod traits;

pub use config::{EffectConfig, EffectPreset, RecipeKind};
pub use error::{EngraveError, Result};
pub use pass::{PassId, PassToken, PassTracker};
pub use traits::{Exporter, FontRef, ImageSource, Rasterizer};

/// The data structures that travel between stages
pub mod types {
    use std::fmt;
    use std::num::NonZeroU32;

    use serde::{Deserialize, Serialize};

    use crate::error::{RenderError, Result};
    use crate::pass::PassId;

    /// Coverage value that marks a pixel as ink
    pub const FULL_COVERAGE: u8 = 255;

    /// A pixel-grid coordinate inside a sampled surface
    ///
    /// Ordering is lexicographic on `(x, y)`, which is the order a
    /// [`PointSet`] keeps its points in.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
    pub struct Point {
        pub x: u32,
        pub y: u32,
    }

    impl Point {
        pub const fn new(x: u32, y: u32) -> Self {
            Self { x, y }
        }

        /// Squared Euclidean distance, exact in integer arithmetic
        pub fn distance_squared(&self, other: &Point) -> u64 {
            let dx = u64::from(self.x.abs_diff(other.x));
            let dy = u64::from(self.y.abs_diff(other.y));
            dx * dx + dy * dy
        }
    }

    impl fmt::Display for Point {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "({}, {})", self.x, self.y)
        }
    }

    /// Grid spacing for silhouette sampling, never zero
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(try_from = "u32", into = "u32")]
    pub struct Stride(NonZeroU32);

    impl Stride {
        /// Five pixels: coarse enough to keep the contour pass cheap
        pub const DEFAULT: Stride = match NonZeroU32::new(5) {
            Some(v) => Stride(v),
            None => unreachable!(),
        };

        /// Returns None for a zero stride
        pub fn new(step: u32) -> Option<Self> {
            NonZeroU32::new(step).map(Self)
        }

        pub fn get(self) -> u32 {
            self.0.get()
        }
    }

    impl Default for Stride {
        fn default() -> Self {
            Self::DEFAULT
        }
    }

    impl TryFrom<u32> for Stride {
        type Error = String;

        fn try_from(value: u32) -> std::result::Result<Self, Self::Error> {
            Stride::new(value).ok_or_else(|| "stride must be strictly positive".to_string())
        }
    }

    impl From<Stride> for u32 {
        fn from(stride: Stride) -> Self {
            stride.get()
        }
    }

    /// Sampled ink coordinates, kept sorted by `(x, y)` without duplicates
    ///
    /// The sort order is what seeds the contour traversal, so two sets built
    /// from the same points always produce the same polygon.
    #[derive(Debug, Clone, Default, PartialEq, Eq)]
    pub struct PointSet {
        points: Vec<Point>,
    }

    impl PointSet {
        pub fn new() -> Self {
            Self::default()
        }

        /// Sorts and deduplicates whatever order the points arrive in
        pub fn from_points(points: impl IntoIterator<Item = Point>) -> Self {
            let mut points: Vec<Point> = points.into_iter().collect();
            points.sort_unstable();
            points.dedup();
            Self { points }
        }

        pub fn len(&self) -> usize {
            self.points.len()
        }

        pub fn is_empty(&self) -> bool {
            self.points.is_empty()
        }

        pub fn as_slice(&self) -> &[Point] {
            &self.points
        }

        pub fn iter(&self) -> std::slice::Iter<'_, Point> {
            self.points.iter()
        }

        /// The lexicographically smallest point, where traversal starts
        pub fn first(&self) -> Option<Point> {
            self.points.first().copied()
        }
    }

    impl FromIterator<Point> for PointSet {
        fn from_iter<I: IntoIterator<Item = Point>>(iter: I) -> Self {
            Self::from_points(iter)
        }
    }

    impl<'a> IntoIterator for &'a PointSet {
        type Item = &'a Point;
        type IntoIter = std::slice::Iter<'a, Point>;

        fn into_iter(self) -> Self::IntoIter {
            self.points.iter()
        }
    }

    /// A closed loop of points: the first vertex is repeated at the end
    #[derive(Debug, Clone, Default, PartialEq, Eq)]
    pub struct Polygon {
        vertices: Vec<Point>,
    }

    impl Polygon {
        /// Closes an open tour by repeating its first vertex
        ///
        /// An empty tour stays empty; a one-point tour becomes `[p, p]`.
        pub fn close(mut tour: Vec<Point>) -> Self {
            if let Some(&first) = tour.first() {
                tour.push(first);
            }
            Self { vertices: tour }
        }

        pub fn vertices(&self) -> &[Point] {
            &self.vertices
        }

        pub fn len(&self) -> usize {
            self.vertices.len()
        }

        pub fn is_empty(&self) -> bool {
            self.vertices.is_empty()
        }

        /// Empty or single-point loops enclose nothing worth drawing
        pub fn is_degenerate(&self) -> bool {
            self.vertices.len() < 3
        }
    }

    /// Isolated glyph coverage, one byte per pixel
    ///
    /// Only the glyph fill is ever drawn into a mask: no strokes, shadows or
    /// background. A pixel counts as ink when its coverage is exactly
    /// [`FULL_COVERAGE`], so anti-aliased edges fall outside the silhouette.
    #[derive(Clone, PartialEq, Eq)]
    pub struct InkMask {
        width: u32,
        height: u32,
        coverage: Vec<u8>,
    }

    impl InkMask {
        /// A mask with no ink at all
        pub fn empty(width: u32, height: u32) -> Self {
            Self {
                width,
                height,
                coverage: vec![0; width as usize * height as usize],
            }
        }

        /// Wraps a coverage buffer, rejecting buffers of the wrong size
        pub fn from_coverage(width: u32, height: u32, coverage: Vec<u8>) -> Result<Self> {
            let expected = width as usize * height as usize;
            if coverage.len() != expected {
                return Err(RenderError::BufferSize {
                    expected,
                    actual: coverage.len(),
                }
                .into());
            }
            Ok(Self {
                width,
                height,
                coverage,
            })
        }

        /// Builds a mask from an RGBA buffer: only pure opaque white is ink
        pub fn from_rgba_exact_white(width: u32, height: u32, rgba: &[u8]) -> Result<Self> {
            let expected = width as usize * height as usize * 4;
            if rgba.len() < expected {
                return Err(RenderError::BufferSize {
                    expected,
                    actual: rgba.len(),
                }
                .into());
            }
            let coverage = rgba[..expected]
                .chunks_exact(4)
                .map(|px| {
                    if px == [255, 255, 255, 255] {
                        FULL_COVERAGE
                    } else {
                        0
                    }
                })
                .collect();
            Ok(Self {
                width,
                height,
                coverage,
            })
        }

        pub fn width(&self) -> u32 {
            self.width
        }

        pub fn height(&self) -> u32 {
            self.height
        }

        pub fn coverage(&self) -> &[u8] {
            &self.coverage
        }

        /// A zero-sized mask has no pixels to read
        pub fn is_readable(&self) -> bool {
            self.width > 0 && self.height > 0
        }

        /// Out-of-bounds coordinates are never ink
        pub fn is_ink(&self, x: u32, y: u32) -> bool {
            if x >= self.width || y >= self.height {
                return false;
            }
            self.coverage[y as usize * self.width as usize + x as usize] == FULL_COVERAGE
        }

        pub fn ink_count(&self) -> usize {
            self.coverage.iter().filter(|&&c| c == FULL_COVERAGE).count()
        }
    }

    impl fmt::Debug for InkMask {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.debug_struct("InkMask")
                .field("width", &self.width)
                .field("height", &self.height)
                .field("ink", &self.ink_count())
                .finish()
        }
    }

    /// The finished picture of one pass, straight-alpha RGBA8
    #[derive(Clone, PartialEq, Eq)]
    pub struct CompositeImage {
        pub width: u32,
        pub height: u32,
        pub pass: PassId,
        pub data: Vec<u8>,
    }

    impl CompositeImage {
        /// RGBA at a pixel, None outside the canvas
        pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
            if x >= self.width || y >= self.height {
                return None;
            }
            let idx = (y as usize * self.width as usize + x as usize) * 4;
            let px = self.data.get(idx..idx + 4)?;
            Some([px[0], px[1], px[2], px[3]])
        }
    }

    impl fmt::Debug for CompositeImage {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.debug_struct("CompositeImage")
                .field("width", &self.width)
                .field("height", &self.height)
                .field("pass", &self.pass)
                .field("bytes", &self.data.len())
                .finish()
        }
    }
}

/// Where a background image comes from
///
/// Parsed from the string a caller hands over: `data:` URIs and
/// `http(s)://` URLs are recognised by prefix, anything else is a path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum BackgroundRef {
    Path(PathBuf),
    DataUri(String),
    Url(String),
}

impl BackgroundRef {
    pub fn parse(reference: &str) -> Self {
        let trimmed = reference.trim();
        if trimmed.starts_with("data:") {
            BackgroundRef::DataUri(trimmed.to_string())
        } else if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
            BackgroundRef::Url(trimmed.to_string())
        } else {
            BackgroundRef::Path(PathBuf::from(trimmed))
        }
    }

    /// Short label for logs; data URIs are not printed in full
    pub fn describe(&self) -> String {
        match self {
            BackgroundRef::Path(path) => path.display().to_string(),
            BackgroundRef::DataUri(uri) => format!("data URI ({} bytes)", uri.len()),
            BackgroundRef::Url(url) => url.clone(),
        }
    }
}

impl From<String> for BackgroundRef {
    fn from(value: String) -> Self {
        BackgroundRef::parse(&value)
    }
}

impl From<BackgroundRef> for String {
    fn from(value: BackgroundRef) -> Self {
        match value {
            BackgroundRef::Path(path) => path.display().to_string(),
            BackgroundRef::DataUri(uri) => uri,
            BackgroundRef::Url(url) => url,
        }
    }
}

impl FromStr for BackgroundRef {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(BackgroundRef::parse(s))
    }
}

/// The tuple the caller supplies for one render pass
///
/// Never patched in flight: a different value means a new pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectParameters {
    pub text: String,
    pub font_family: String,
    pub font_size: f32,
    #[serde(default)]
    pub background: Option<BackgroundRef>,
}

impl EffectParameters {
    pub fn new(text: impl Into<String>, font_family: impl Into<String>, font_size: f32) -> Self {
        Self {
            text: text.into(),
            font_family: font_family.into(),
            font_size,
            background: None,
        }
    }

    pub fn with_background(mut self, background: BackgroundRef) -> Self {
        self.background = Some(background);
        self
    }
}

impl Default for EffectParameters {
    fn default() -> Self {
        Self::new("abc", "Georgia", 100.0)
    }
}

/// CSS-like numeric font weight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FontWeight(pub u16);

impl FontWeight {
    pub const NORMAL: FontWeight = FontWeight(400);
    pub const BOLD: FontWeight = FontWeight(700);
    pub const EXTRA_BOLD: FontWeight = FontWeight(800);
}

impl Default for FontWeight {
    fn default() -> Self {
        Self::NORMAL
    }
}

/// Top-left corner of a text line box, in canvas pixels
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Origin {
    pub x: f32,
    pub y: f32,
}

impl Origin {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// One line of text, fully resolved for drawing
#[derive(Debug, Clone, PartialEq)]
pub struct TextSpec {
    pub text: String,
    pub font_family: String,
    /// Already clamped to the configured bounds
    pub font_size: f32,
    pub weight: FontWeight,
    pub origin: Origin,
}

/// What a [`Rasterizer`] is asked to produce
#[derive(Debug, Clone, PartialEq)]
pub struct RasterRequest {
    pub text: TextSpec,
    pub width: u32,
    pub height: u32,
}

/// Simple RGBA color that works everywhere
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn black() -> Self {
        Self::rgba(0, 0, 0, 255)
    }

    pub const fn white() -> Self {
        Self::rgba(255, 255, 255, 255)
    }

    /// Alpha given as a 0..=1 fraction, the way style sheets write it
    pub fn rgba_f(r: u8, g: u8, b: u8, alpha: f32) -> Self {
        Self::rgba(r, g, b, (alpha.clamp(0.0, 1.0) * 255.0).round() as u8)
    }

    /// Parses `RRGGBB` or `RRGGBBAA`, with or without a leading `#`
    pub fn from_hex(color_str: &str) -> Result<Self> {
        let hex = color_str.trim().trim_start_matches('#');
        if !(hex.len() == 6 || hex.len() == 8) || !hex.is_ascii() {
            return Err(EngraveError::Config(format!(
                "color must be RRGGBB or RRGGBBAA, got {color_str:?}"
            )));
        }
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&hex[range], 16)
                .map_err(|_| EngraveError::Config(format!("invalid color {color_str:?}")))
        };
        let a = if hex.len() == 8 { channel(6..8)? } else { 255 };
        Ok(Self::rgba(channel(0..2)?, channel(2..4)?, channel(4..6)?, a))
    }

    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
    }
}

impl TryFrom<String> for Color {
    type Error = EngraveError;

    fn try_from(value: String) -> Result<Self> {
        Color::from_hex(&value)
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_hex()
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}
