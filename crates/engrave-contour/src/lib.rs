//! Silhouette to contour: from ink pixels to one closed loop
//!
//! Two small stages sit between the rasterizer and the compositor:
//!
//! - [`SilhouetteSampler`] walks an ink mask on a fixed grid and collects
//!   the fully covered pixels it lands on.
//! - [`ContourBuilder`] chains those points into a single closed polygon by
//!   always stepping to the nearest point not yet visited.
//!
//! The result is not a boundary trace. It is a loop that visits every
//! sample once; filled and stroked thickly it reads as a soft sticker
//! silhouette of the text.
//!
//! ```
//! use engrave_contour::{ContourBuilder, SilhouetteSampler};
//! use engrave_core::types::{InkMask, Point, Stride};
//!
//! let mut coverage = vec![0u8; 20 * 20];
//! for y in 0..10 {
//!     for x in 0..10 {
//!         coverage[y * 20 + x] = 255;
//!     }
//! }
//! let mask = InkMask::from_coverage(20, 20, coverage)?;
//!
//! let points = SilhouetteSampler::new().sample(&mask, Stride::DEFAULT);
//! assert_eq!(points.len(), 4);
//!
//! let polygon = ContourBuilder::new().build(&points);
//! assert_eq!(polygon.len(), 5);
//! assert_eq!(polygon.vertices()[0], Point::new(0, 0));
//! # Ok::<(), engrave_core::EngraveError>(())
//! ```

mod builder;
mod sampler;

pub use builder::ContourBuilder;
pub use sampler::SilhouetteSampler;

#[cfg(test)]
mod proptests;
