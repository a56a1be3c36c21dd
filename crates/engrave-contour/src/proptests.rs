//! Property-based tests for sampling and contour building

use crate::{ContourBuilder, SilhouetteSampler};
use engrave_core::types::{InkMask, Point, PointSet, Stride};
use proptest::prelude::*;

fn arb_points() -> impl Strategy<Value = Vec<(u32, u32)>> {
    prop::collection::vec((0u32..400, 0u32..300), 0..120)
}

fn arb_mask() -> impl Strategy<Value = (u32, u32, Vec<u8>)> {
    (1u32..64, 1u32..64).prop_flat_map(|(w, h)| {
        let len = (w * h) as usize;
        (
            Just(w),
            Just(h),
            prop::collection::vec(prop_oneof![Just(0u8), Just(128u8), Just(255u8)], len),
        )
    })
}

proptest! {
    /// A closed tour has one more vertex than the set and ends where it starts
    #[test]
    fn tour_is_closed(coords in arb_points()) {
        let set = PointSet::from_points(coords.into_iter().map(|(x, y)| Point::new(x, y)));
        let polygon = ContourBuilder::new().build(&set);

        if set.is_empty() {
            prop_assert!(polygon.is_empty());
        } else {
            prop_assert_eq!(polygon.len(), set.len() + 1);
            let v = polygon.vertices();
            prop_assert_eq!(v[0], v[v.len() - 1]);
            prop_assert_eq!(Some(v[0]), set.first());
        }
    }

    /// Each sampled point appears exactly once before the closing vertex
    #[test]
    fn tour_is_a_permutation(coords in arb_points()) {
        let set = PointSet::from_points(coords.into_iter().map(|(x, y)| Point::new(x, y)));
        let polygon = ContourBuilder::new().build(&set);
        if !set.is_empty() {
            let mut open = polygon.vertices()[..set.len()].to_vec();
            open.sort_unstable();
            prop_assert_eq!(open.as_slice(), set.as_slice());
        }
    }

    /// Same input, same polygon
    #[test]
    fn build_is_deterministic(coords in arb_points()) {
        let set = PointSet::from_points(coords.into_iter().map(|(x, y)| Point::new(x, y)));
        let builder = ContourBuilder::new();
        prop_assert_eq!(builder.build(&set), builder.build(&set));
    }

    /// Sampling and tracing the same mask twice gives the same result
    #[test]
    fn sample_and_build_are_deterministic((w, h, coverage) in arb_mask(), step in 1u32..8) {
        let mask = InkMask::from_coverage(w, h, coverage).unwrap();
        let stride = Stride::new(step).unwrap();
        let sampler = SilhouetteSampler::new();
        let builder = ContourBuilder::new();

        let first = sampler.sample(&mask, stride);
        let second = sampler.sample(&mask, stride);
        prop_assert_eq!(&first, &second);
        prop_assert_eq!(builder.build(&first), builder.build(&second));
    }

    /// Every sample is on the stride grid, inside bounds, and fully covered
    #[test]
    fn samples_are_ink_on_grid((w, h, coverage) in arb_mask(), step in 1u32..8) {
        let mask = InkMask::from_coverage(w, h, coverage).unwrap();
        let stride = Stride::new(step).unwrap();
        let points = SilhouetteSampler::new().sample(&mask, stride);

        for p in &points {
            prop_assert!(p.x < w && p.y < h);
            prop_assert_eq!(p.x % step, 0);
            prop_assert_eq!(p.y % step, 0);
            prop_assert!(mask.is_ink(p.x, p.y));
        }
        let max = (w.div_ceil(step) * h.div_ceil(step)) as usize;
        prop_assert!(points.len() <= max);
    }

    /// Output is sorted by (x, y) without duplicates
    #[test]
    fn samples_are_sorted((w, h, coverage) in arb_mask()) {
        let mask = InkMask::from_coverage(w, h, coverage).unwrap();
        let points = SilhouetteSampler::new().sample(&mask, Stride::DEFAULT);
        prop_assert!(points.as_slice().windows(2).all(|pair| pair[0] < pair[1]));
    }
}
