//! Nearest-waypoint matching of points, lines, polylines and network paths.
//!
//! Line-like queries are discretized into evenly spaced samples, each sample
//! is matched to its nearest waypoint, and immediate repeats are dropped so
//! the result reads as the sequence of waypoints the query passes by.

use std::collections::BTreeMap;

use crate::network::{path_segments, Link, Network};
use crate::{LineGeometry, Point, Result, Shape, WaypointError, WaypointId};

/// Query surface shared by single-domain and composite waypoint sets.
pub trait WaypointQuery: Sync {
    /// Shape tag of the queried set (used in error context).
    fn shape(&self) -> Shape;

    /// All waypoints, in ascending id order.
    fn waypoints(&self) -> &BTreeMap<WaypointId, Point>;

    /// Id of the nearest waypoint. Ties go to the smallest id.
    fn closest_to_point(&self, point: &Point) -> Result<WaypointId>;

    /// Match `n` evenly spaced samples of a directed line
    /// (`t = 0, 1/(n-1), ..., 1`; a single sample sits at the start).
    ///
    /// Consecutive duplicates are collapsed; an id that comes back after a
    /// different one is kept.
    fn closest_to_line(&self, line: &LineGeometry, n: usize) -> Result<Vec<WaypointId>> {
        if n == 0 {
            return Err(WaypointError::InvalidCount {
                context: "samples per line query".to_string(),
                count: n,
            });
        }

        let samples = line_samples(line, n);

        #[cfg(feature = "parallel")]
        let matched: Vec<WaypointId> = {
            use rayon::prelude::*;
            samples
                .par_iter()
                .map(|p| self.closest_to_point(p))
                .collect::<Result<Vec<_>>>()?
        };

        #[cfg(not(feature = "parallel"))]
        let matched: Vec<WaypointId> = samples
            .iter()
            .map(|p| self.closest_to_point(p))
            .collect::<Result<Vec<_>>>()?;

        Ok(collapse_consecutive(matched))
    }

    /// Match each segment in order and join the results, dropping the
    /// duplicate at a junction where one segment ends on the waypoint the
    /// next one starts on.
    fn closest_to_polyline(&self, segments: &[LineGeometry], n: usize) -> Result<Vec<WaypointId>> {
        let mut ids = Vec::new();
        for segment in segments {
            let next = self.closest_to_line(segment, n)?;
            merge_junction(&mut ids, next);
        }
        Ok(ids)
    }

    /// Match a network path given as ordered directed links.
    fn closest_to_path<N: Network + ?Sized>(
        &self,
        network: &N,
        links: &[Link],
        n: usize,
    ) -> Result<Vec<WaypointId>> {
        let segments = path_segments(network, links)?;
        self.closest_to_polyline(&segments, n)
    }
}

/// The `n` evenly spaced sample points of a line query.
pub fn line_samples(line: &LineGeometry, n: usize) -> Vec<Point> {
    if n == 1 {
        return vec![line.start()];
    }
    let last = (n - 1) as f64;
    (0..n).map(|k| line.point_at(k as f64 / last)).collect()
}

/// Drop every id equal to the one right before it.
///
/// ```
/// use waypoint_matcher::collapse_consecutive;
/// assert_eq!(collapse_consecutive(vec![1, 1, 2, 2, 3]), vec![1, 2, 3]);
/// assert_eq!(collapse_consecutive(vec![1, 2, 1]), vec![1, 2, 1]);
/// ```
pub fn collapse_consecutive(mut ids: Vec<WaypointId>) -> Vec<WaypointId> {
    ids.dedup();
    ids
}

/// Append `next` to `acc`, skipping its first id when it repeats the last
/// id of `acc`.
pub fn merge_junction(acc: &mut Vec<WaypointId>, next: Vec<WaypointId>) {
    match (acc.last(), next.first()) {
        (Some(last), Some(first)) if last == first => acc.extend_from_slice(&next[1..]),
        _ => acc.extend(next),
    }
}

/// Reference linear scan in ascending id order (strictly closer wins).
pub fn nearest_by_scan(waypoints: &BTreeMap<WaypointId, Point>, point: &Point) -> Option<WaypointId> {
    let mut best: Option<(WaypointId, f64)> = None;
    for (&id, p) in waypoints {
        let d2 = p.distance_2(point);
        match best {
            Some((_, min)) if d2 >= min => {}
            _ => best = Some((id, d2)),
        }
    }
    best.map(|(id, _)| id)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Minimal query target backed by the linear scan only.
    struct ScanSet {
        waypoints: BTreeMap<WaypointId, Point>,
    }

    impl WaypointQuery for ScanSet {
        fn shape(&self) -> Shape {
            Shape::Rectangle
        }

        fn waypoints(&self) -> &BTreeMap<WaypointId, Point> {
            &self.waypoints
        }

        fn closest_to_point(&self, point: &Point) -> Result<WaypointId> {
            nearest_by_scan(&self.waypoints, point).ok_or(WaypointError::EmptySet {
                shape: Shape::Rectangle,
            })
        }
    }

    fn row(xs: &[f64]) -> ScanSet {
        ScanSet {
            waypoints: xs
                .iter()
                .enumerate()
                .map(|(i, &x)| (i as WaypointId + 1, Point::new(x, 0.0)))
                .collect(),
        }
    }

    #[test]
    fn test_line_samples() {
        let line = LineGeometry::new(0.0, 0.0, 4.0, 0.0);
        let xs: Vec<f64> = line_samples(&line, 5).iter().map(|p| p.x).collect();
        assert_eq!(xs, vec![0.0, 1.0, 2.0, 3.0, 4.0]);
        assert_eq!(line_samples(&line, 1), vec![Point::new(0.0, 0.0)]);
    }

    #[test]
    fn test_collapse_consecutive() {
        assert_eq!(collapse_consecutive(vec![1, 1, 2, 2, 3]), vec![1, 2, 3]);
        assert_eq!(collapse_consecutive(vec![1, 2, 1]), vec![1, 2, 1]);
        assert!(collapse_consecutive(vec![]).is_empty());
    }

    #[test]
    fn test_merge_junction() {
        let mut ids = vec![1, 2, 3];
        merge_junction(&mut ids, vec![3, 4, 5]);
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);

        let mut ids = vec![1, 2, 3];
        merge_junction(&mut ids, vec![4, 5]);
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);

        let mut ids = vec![];
        merge_junction(&mut ids, vec![7]);
        assert_eq!(ids, vec![7]);
    }

    #[test]
    fn test_closest_to_line_collapses_repeats() {
        // Samples at x = 0, 1, 2, 3, 4 map to ids 1, 1, 2, 2, 3
        let set = row(&[0.2, 2.4, 3.9]);
        let line = LineGeometry::new(0.0, 0.0, 4.0, 0.0);
        assert_eq!(set.closest_to_line(&line, 5).unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn test_closest_to_line_keeps_non_adjacent_repeats() {
        // Waypoint 2 sits off to the side of the midpoint only
        let set = ScanSet {
            waypoints: BTreeMap::from([
                (1, Point::new(0.0, 1.0)),
                (2, Point::new(2.0, -0.2)),
                (3, Point::new(4.0, 1.0)),
            ]),
        };
        let out_and_back = [
            LineGeometry::new(0.0, 0.0, 2.0, 0.0),
            LineGeometry::new(2.0, 0.0, 0.0, 0.0),
        ];
        assert_eq!(
            set.closest_to_polyline(&out_and_back, 3).unwrap(),
            vec![1, 2, 1]
        );
    }

    #[test]
    fn test_closest_to_line_single_sample() {
        let set = row(&[0.0, 10.0]);
        let line = LineGeometry::new(9.0, 0.0, 0.0, 0.0);
        assert_eq!(set.closest_to_line(&line, 1).unwrap(), vec![2]);
    }

    #[test]
    fn test_closest_to_line_zero_samples() {
        let set = row(&[0.0]);
        let line = LineGeometry::new(0.0, 0.0, 1.0, 0.0);
        assert!(matches!(
            set.closest_to_line(&line, 0),
            Err(WaypointError::InvalidCount { count: 0, .. })
        ));
    }

    #[test]
    fn test_closest_to_polyline_junction() {
        let set = row(&[0.0, 1.0, 2.0, 3.0, 4.0]);
        let polyline = [
            LineGeometry::new(0.0, 0.0, 2.0, 0.0),
            LineGeometry::new(2.0, 0.0, 4.0, 0.0),
        ];
        assert_eq!(
            set.closest_to_polyline(&polyline, 3).unwrap(),
            vec![1, 2, 3, 4, 5]
        );
        assert!(set.closest_to_polyline(&[], 3).unwrap().is_empty());
    }

    #[test]
    fn test_empty_set_fails() {
        let set = row(&[]);
        assert!(matches!(
            set.closest_to_point(&Point::new(0.0, 0.0)),
            Err(WaypointError::EmptySet { .. })
        ));
    }

    #[test]
    fn test_nearest_by_scan_tie_break() {
        let waypoints = BTreeMap::from([
            (1, Point::new(0.0, 0.0)),
            (2, Point::new(10.0, 0.0)),
            (3, Point::new(5.0, 5.0)),
        ]);
        // ids 1 and 3 are both sqrt(17) away; the smaller id wins
        assert_eq!(nearest_by_scan(&waypoints, &Point::new(4.0, 1.0)), Some(1));
        assert_eq!(nearest_by_scan(&BTreeMap::new(), &Point::new(0.0, 0.0)), None);
    }
}
