//! Shared test helpers.

#![allow(dead_code)]

use std::collections::VecDeque;

use waypoint_matcher::{BoxGeometry, LineGeometry, Point, PointSampler, Result};

/// Sampler that hands out pre-recorded point batches and allocations in
/// call order, so tests can assert exact ids.
#[derive(Debug, Default)]
pub struct ScriptedSampler {
    batches: VecDeque<Vec<Point>>,
    allocations: VecDeque<Vec<usize>>,
}

impl ScriptedSampler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the points returned by the next `sample_box`/`sample_line` call.
    pub fn then_points(mut self, points: &[(f64, f64)]) -> Self {
        self.batches
            .push_back(points.iter().map(|&(x, y)| Point::new(x, y)).collect());
        self
    }

    /// Queue the counts returned by the next `allocate` call.
    pub fn then_allocation(mut self, counts: &[usize]) -> Self {
        self.allocations.push_back(counts.to_vec());
        self
    }

    fn next_batch(&mut self, count: usize) -> Vec<Point> {
        if count == 0 {
            return Vec::new();
        }
        self.batches.pop_front().unwrap_or_default()
    }
}

impl PointSampler for ScriptedSampler {
    fn sample_box(&mut self, count: usize, _geometry: &BoxGeometry) -> Vec<Point> {
        self.next_batch(count)
    }

    fn sample_line(&mut self, count: usize, _geometry: &LineGeometry, _jitter: f64) -> Vec<Point> {
        self.next_batch(count)
    }

    fn allocate(&mut self, total: usize, weights: &[f64]) -> Result<Vec<usize>> {
        Ok(self.allocations.pop_front().unwrap_or_else(|| {
            let mut counts = vec![0; weights.len()];
            if let Some(first) = counts.first_mut() {
                *first = total;
            }
            counts
        }))
    }
}

/// Install a test logger (ignored if one is already set).
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}
