//! R-tree indexed waypoints for nearest-waypoint queries.

use std::collections::BTreeMap;

use rstar::{PointDistance, RTree, RTreeObject, AABB};

use crate::{Point, WaypointId};

/// A waypoint with its id for R-tree queries
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndexedWaypoint {
    pub id: WaypointId,
    pub x: f64,
    pub y: f64,
}

impl RTreeObject for IndexedWaypoint {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point([self.x, self.y])
    }
}

impl PointDistance for IndexedWaypoint {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dx = self.x - point[0];
        let dy = self.y - point[1];
        dx * dx + dy * dy
    }
}

/// Nearest-waypoint index.
///
/// Answers exactly what an ascending-id linear scan would: among all
/// waypoints at the minimum distance, the smallest id wins.
#[derive(Debug, Clone)]
pub struct WaypointIndex {
    tree: RTree<IndexedWaypoint>,
}

impl Default for WaypointIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl WaypointIndex {
    /// Create a new empty index.
    pub fn new() -> Self {
        Self { tree: RTree::new() }
    }

    /// Bulk load an index from an id→point map.
    pub fn build(waypoints: &BTreeMap<WaypointId, Point>) -> Self {
        let indexed: Vec<IndexedWaypoint> = waypoints
            .iter()
            .map(|(&id, p)| IndexedWaypoint { id, x: p.x, y: p.y })
            .collect();
        Self {
            tree: RTree::bulk_load(indexed),
        }
    }

    /// Add one waypoint.
    pub fn insert(&mut self, id: WaypointId, point: Point) {
        self.tree.insert(IndexedWaypoint {
            id,
            x: point.x,
            y: point.y,
        });
    }

    /// Id of the nearest waypoint, `None` if the index is empty.
    pub fn nearest(&self, point: &Point) -> Option<WaypointId> {
        let query = [point.x, point.y];
        let mut candidates = self.tree.nearest_neighbor_iter_with_distance_2(&query);
        let (first, best_d2) = candidates.next()?;

        let mut best = first.id;
        for (candidate, d2) in candidates {
            if d2 > best_d2 {
                break;
            }
            best = best.min(candidate.id);
        }
        Some(best)
    }

    /// Get the number of indexed waypoints.
    pub fn len(&self) -> usize {
        self.tree.size()
    }

    /// Check if the index is empty.
    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture() -> BTreeMap<WaypointId, Point> {
        BTreeMap::from([
            (1, Point::new(0.0, 0.0)),
            (2, Point::new(10.0, 0.0)),
            (3, Point::new(5.0, 5.0)),
        ])
    }

    #[test]
    fn test_nearest() {
        let index = WaypointIndex::build(&fixture());
        assert_eq!(index.len(), 3);
        assert_eq!(index.nearest(&Point::new(4.0, 1.0)), Some(1));
        assert_eq!(index.nearest(&Point::new(9.0, 1.0)), Some(2));
        assert_eq!(index.nearest(&Point::new(5.0, 4.0)), Some(3));
    }

    #[test]
    fn test_tie_breaks_on_smallest_id() {
        let mut index = WaypointIndex::new();
        index.insert(9, Point::new(1.0, 0.0));
        index.insert(4, Point::new(-1.0, 0.0));
        index.insert(6, Point::new(0.0, 1.0));
        assert_eq!(index.nearest(&Point::new(0.0, 0.0)), Some(4));
    }

    #[test]
    fn test_empty_index() {
        let index = WaypointIndex::default();
        assert!(index.is_empty());
        assert_eq!(index.nearest(&Point::new(0.0, 0.0)), None);
    }
}
