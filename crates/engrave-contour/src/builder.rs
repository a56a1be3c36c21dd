//! Greedy nearest-neighbor tour, closed at the end

use engrave_core::types::{Point, PointSet, Polygon};

/// Orders sampled points into one closed loop
///
/// Starting from the lexicographically smallest point, each step moves to
/// the closest point not yet visited. Ties go to whichever candidate comes
/// first in the set's sorted order; distances are compared exactly as
/// integer squares, so the outcome is fully reproducible.
///
/// Every step scans all remaining points: O(n²) overall. The sampler's
/// coarse stride keeps n to a few hundred points for a short string.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContourBuilder;

impl ContourBuilder {
    pub fn new() -> Self {
        Self
    }

    pub fn build(&self, points: &PointSet) -> Polygon {
        let candidates = points.as_slice();
        let Some(&start) = candidates.first() else {
            return Polygon::default();
        };

        let mut visited = vec![false; candidates.len()];
        visited[0] = true;
        let mut tour = Vec::with_capacity(candidates.len() + 1);
        tour.push(start);

        let mut current = start;
        while let Some(next) = nearest_unvisited(current, candidates, &visited) {
            visited[next] = true;
            current = candidates[next];
            tour.push(current);
        }

        let polygon = Polygon::close(tour);
        log::debug!(
            "Contour: {} points -> {} vertices",
            candidates.len(),
            polygon.len()
        );
        polygon
    }
}

/// Index of the closest unvisited candidate; strict `<` keeps the first tie
fn nearest_unvisited(from: Point, candidates: &[Point], visited: &[bool]) -> Option<usize> {
    let mut best: Option<(usize, u64)> = None;
    for (idx, candidate) in candidates.iter().enumerate() {
        if visited[idx] {
            continue;
        }
        let dist = from.distance_squared(candidate);
        match best {
            Some((_, best_dist)) if dist >= best_dist => {},
            _ => best = Some((idx, dist)),
        }
    }
    best.map(|(idx, _)| idx)
}
