//! Point generation services.
//!
//! Waypoint sets never draw random numbers themselves: they ask a
//! [`PointSampler`] for raw points, so tests can inject a scripted sampler
//! and runs can be reproduced from a seed.

use rand::distributions::{Distribution, WeightedIndex};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::{BoxGeometry, LineGeometry, Point, Result, Shape, WaypointError};

/// Source of raw sample points and sample-count allocations.
pub trait PointSampler {
    /// `count` points distributed uniformly inside the rectangle.
    fn sample_box(&mut self, count: usize, geometry: &BoxGeometry) -> Vec<Point>;

    /// `count` points along the segment, each displaced perpendicular to it
    /// by at most `jitter`.
    fn sample_line(&mut self, count: usize, geometry: &LineGeometry, jitter: f64) -> Vec<Point>;

    /// Multinomial draw: split `total` samples across categories with the
    /// given probabilities. The returned counts always sum to `total`.
    fn allocate(&mut self, total: usize, weights: &[f64]) -> Result<Vec<usize>>;
}

/// [`PointSampler`] backed by a seedable `StdRng`.
///
/// # Example
/// ```
/// use waypoint_matcher::{BoxGeometry, PointSampler, RandomSampler};
///
/// let geometry = BoxGeometry::new(0.0, 0.0, 10.0, 5.0);
/// let a = RandomSampler::seeded(42).sample_box(3, &geometry);
/// let b = RandomSampler::seeded(42).sample_box(3, &geometry);
/// assert_eq!(a, b);
/// ```
#[derive(Debug, Clone)]
pub struct RandomSampler {
    rng: StdRng,
}

impl RandomSampler {
    /// Reproducible sampler.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Sampler seeded from OS entropy.
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }
}

impl PointSampler for RandomSampler {
    fn sample_box(&mut self, count: usize, geometry: &BoxGeometry) -> Vec<Point> {
        let (min, max) = (geometry.min(), geometry.max());
        (0..count)
            .map(|_| {
                Point::new(
                    self.rng.gen_range(min.x..=max.x),
                    self.rng.gen_range(min.y..=max.y),
                )
            })
            .collect()
    }

    fn sample_line(&mut self, count: usize, geometry: &LineGeometry, jitter: f64) -> Vec<Point> {
        let normal = geometry.unit_normal().unwrap_or(Point::new(0.0, 0.0));
        let jitter = jitter.abs();
        (0..count)
            .map(|_| {
                let t: f64 = self.rng.gen_range(0.0..=1.0);
                let offset: f64 = self.rng.gen_range(-jitter..=jitter);
                let on_line = geometry.point_at(t);
                Point::new(on_line.x + offset * normal.x, on_line.y + offset * normal.y)
            })
            .collect()
    }

    fn allocate(&mut self, total: usize, weights: &[f64]) -> Result<Vec<usize>> {
        let mut counts = vec![0usize; weights.len()];
        if total == 0 {
            return Ok(counts);
        }

        let dist = WeightedIndex::new(weights).map_err(|e| WaypointError::DegenerateGeometry {
            shape: Shape::Line,
            message: format!("cannot allocate {} samples: {}", total, e),
        })?;

        for _ in 0..total {
            counts[dist.sample(&mut self.rng)] += 1;
        }
        Ok(counts)
    }
}
