//! Waypoint sets over a single geometric domain.

use std::collections::BTreeMap;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::index::WaypointIndex;
use crate::matching::WaypointQuery;
use crate::sampler::PointSampler;
use crate::{BoxGeometry, LineGeometry, OptionExt, Point, Result, Shape, WaypointError, WaypointId};

/// Geometric domain a waypoint set samples from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Domain {
    /// Points along a segment, displaced sideways by at most `jitter`
    Line { geometry: LineGeometry, jitter: f64 },
    /// Points uniformly inside a rectangle
    Rectangle(BoxGeometry),
}

impl Domain {
    pub fn shape(&self) -> Shape {
        match self {
            Domain::Line { .. } => Shape::Line,
            Domain::Rectangle(_) => Shape::Rectangle,
        }
    }

    /// Zero-length line or zero-area rectangle.
    pub fn is_degenerate(&self) -> bool {
        match self {
            Domain::Line { geometry, .. } => geometry.is_degenerate(),
            Domain::Rectangle(geometry) => geometry.is_degenerate(),
        }
    }
}

/// A collection of waypoints over one line or rectangle.
///
/// Ids are handed out in generation order from the first id given to
/// [`WaypointSet::populate`], so several sets can be merged without
/// collisions when their id ranges are chosen back to back.
///
/// # Example
/// ```
/// use waypoint_matcher::{BoxGeometry, RandomSampler, WaypointSet};
///
/// let mut set = WaypointSet::rectangle(BoxGeometry::new(0.0, 0.0, 1.0, 1.0));
/// set.populate(&mut RandomSampler::seeded(1), 4, 10).unwrap();
/// assert_eq!(set.ids(), vec![10, 11, 12, 13]);
/// ```
#[derive(Debug, Clone)]
pub struct WaypointSet {
    domain: Domain,
    waypoints: BTreeMap<WaypointId, Point>,
    index: WaypointIndex,
}

impl WaypointSet {
    /// Empty set over a rectangle.
    pub fn rectangle(geometry: BoxGeometry) -> Self {
        Self::with_domain(Domain::Rectangle(geometry))
    }

    /// Empty set along a line with sideways jitter scale `jitter`.
    pub fn line(geometry: LineGeometry, jitter: f64) -> Self {
        Self::with_domain(Domain::Line { geometry, jitter })
    }

    fn with_domain(domain: Domain) -> Self {
        Self {
            domain,
            waypoints: BTreeMap::new(),
            index: WaypointIndex::new(),
        }
    }

    pub fn domain(&self) -> &Domain {
        &self.domain
    }

    /// Sample `count` waypoints with ids `first_id..first_id + count`,
    /// replacing whatever the set held before.
    pub fn populate<S: PointSampler + ?Sized>(
        &mut self,
        sampler: &mut S,
        count: usize,
        first_id: WaypointId,
    ) -> Result<()> {
        self.check_domain(count)?;

        let shape = self.shape();
        let fits = count == 0
            || u32::try_from(count - 1)
                .ok()
                .and_then(|span| first_id.checked_add(span))
                .is_some();
        if !fits {
            return Err(WaypointError::InvalidCount {
                context: format!("{} ids starting at {}", shape, first_id),
                count,
            });
        }

        let points = match &self.domain {
            Domain::Rectangle(geometry) => sampler.sample_box(count, geometry),
            Domain::Line { geometry, jitter } => sampler.sample_line(count, geometry, *jitter),
        };
        if points.len() != count {
            return Err(WaypointError::InvalidCount {
                context: format!("{} sampler returned {} points", shape, points.len()),
                count,
            });
        }

        self.waypoints = points
            .into_iter()
            .enumerate()
            .map(|(k, p)| (first_id + k as WaypointId, p))
            .collect();
        self.index = WaypointIndex::build(&self.waypoints);

        debug!(
            "[Waypoints] Populated {} set with {} waypoints from id {}",
            shape, count, first_id
        );
        Ok(())
    }

    fn check_domain(&self, count: usize) -> Result<()> {
        if let Domain::Line { jitter, .. } = self.domain {
            if !jitter.is_finite() || jitter < 0.0 {
                return Err(WaypointError::DegenerateGeometry {
                    shape: Shape::Line,
                    message: format!("jitter scale must be finite and >= 0, got {}", jitter),
                });
            }
        }

        if self.domain.is_degenerate() {
            if count > 0 {
                return Err(WaypointError::DegenerateGeometry {
                    shape: self.shape(),
                    message: format!("cannot place {} waypoints in {:?}", count, self.domain),
                });
            }
            warn!("[Waypoints] Degenerate {:?} registered without waypoints", self.domain);
        }
        Ok(())
    }

    /// Number of waypoints.
    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    pub fn get(&self, id: WaypointId) -> Option<Point> {
        self.waypoints.get(&id).copied()
    }

    /// Ids in ascending order.
    pub fn ids(&self) -> Vec<WaypointId> {
        self.waypoints.keys().copied().collect()
    }

    /// Points in ascending id order.
    pub fn points(&self) -> Vec<Point> {
        self.waypoints.values().copied().collect()
    }
}

impl WaypointQuery for WaypointSet {
    fn shape(&self) -> Shape {
        self.domain.shape()
    }

    fn waypoints(&self) -> &BTreeMap<WaypointId, Point> {
        &self.waypoints
    }

    fn closest_to_point(&self, point: &Point) -> Result<WaypointId> {
        self.index.nearest(point).ok_or_empty_set(self.shape())
    }
}
