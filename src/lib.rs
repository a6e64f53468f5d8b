//! # Waypoint Matcher
//!
//! Waypoint sampling over planar transportation networks and nearest-waypoint
//! matching of points, lines, polylines and network paths.
//!
//! This library provides:
//! - Waypoint sets over a line or a rectangle, and a composite set combining a
//!   uniform background layer with per-link and per-region layers
//! - Nearest-waypoint search with consecutive-duplicate collapsing
//! - Conversion of solver path flows into waypoint-sequence flows
//!
//! ## Features
//!
//! - **`parallel`** - Enable parallel nearest-waypoint search with rayon
//!
//! ## Quick Start
//!
//! ```rust
//! use waypoint_matcher::{
//!     generate_waypoint_flows, sample_waypoints, Graph, Link, Point, RandomSampler,
//!     SamplingConfig,
//! };
//!
//! let mut graph = Graph::new();
//! graph.add_node(1, Point::new(0.0, 0.0));
//! graph.add_node(2, Point::new(4.0, 0.0));
//! graph.add_node(3, Point::new(4.0, 3.0));
//! graph.add_link(Link::new(1, 2));
//! graph.add_link(Link::new(2, 3));
//! graph.add_path(1, vec![Link::new(1, 2), Link::new(2, 3)], 5.0);
//!
//! let config = SamplingConfig {
//!     background_count: 20,
//!     link_count: 30,
//!     ..SamplingConfig::default()
//! };
//! let mut sampler = RandomSampler::seeded(7);
//! let waypoints = sample_waypoints(&graph, &config, &mut sampler).unwrap();
//! assert_eq!(waypoints.len(), 50);
//!
//! let flows = generate_waypoint_flows(&graph, &waypoints, 10, 1e-3).unwrap();
//! assert_eq!(flows[&1].flow, 5.0);
//! ```

use std::fmt;

use geo::{coord, Coord, Line, Rect};
use serde::{Deserialize, Serialize};

// Unified error handling
pub mod error;
pub use error::{OptionExt, Result, WaypointError};

// Point generation services (uniform box, jittered line, multinomial)
pub mod sampler;
pub use sampler::{PointSampler, RandomSampler};

// R-tree nearest-waypoint index
pub mod index;
pub use index::WaypointIndex;

// Closest-to-point/line/polyline/path queries
pub mod matching;
pub use matching::{collapse_consecutive, merge_junction, nearest_by_scan, WaypointQuery};

// Single-domain waypoint sets
pub mod waypoints;
pub use waypoints::{Domain, WaypointSet};

// Background + lines + regions aggregator
pub mod composite;
pub use composite::{merge_disjoint, CompositeWaypointSet, Layer};

// Consumed network model
pub mod network;
pub use network::{Graph, Link, Network, NodeId, Path, PathId};

// Path flows to waypoint flows
pub mod flows;
#[cfg(feature = "parallel")]
pub use flows::generate_waypoint_flows_parallel;
pub use flows::{generate_waypoint_flows, total_flow, FlowConfig, WaypointFlow};

// Waypoint placement over a network
pub mod sampling;
pub use sampling::{link_lines, link_weights, network_bounds, sample_waypoints, RegionSpec, SamplingConfig};

// Renderer-facing data (no drawing)
pub mod overlay;
pub use overlay::{Edge, Overlay, Scene};

// ============================================================================
// Core Types
// ============================================================================

/// Identifier of a waypoint, unique within its owning set.
pub type WaypointId = u32;

/// A planar coordinate.
///
/// # Example
/// ```
/// use waypoint_matcher::Point;
/// let a = Point::new(0.0, 0.0);
/// assert_eq!(a.distance(&Point::new(3.0, 4.0)), 5.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    /// Create a new point.
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    pub fn distance(&self, other: &Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Squared Euclidean distance (cheaper, same ordering).
    pub fn distance_2(&self, other: &Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    /// Check if both coordinates are finite.
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl From<Coord> for Point {
    fn from(c: Coord) -> Self {
        Point::new(c.x, c.y)
    }
}

impl From<Point> for Coord {
    fn from(p: Point) -> Self {
        coord! { x: p.x, y: p.y }
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Point::new(x, y)
    }
}

/// A directed segment from `(x1, y1)` to `(x2, y2)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LineGeometry {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

impl LineGeometry {
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Segment between two points.
    pub fn between(start: Point, end: Point) -> Self {
        Self::new(start.x, start.y, end.x, end.y)
    }

    pub fn start(&self) -> Point {
        Point::new(self.x1, self.y1)
    }

    pub fn end(&self) -> Point {
        Point::new(self.x2, self.y2)
    }

    /// As a `geo::Line`.
    pub fn to_line(&self) -> Line {
        Line::new(Coord::from(self.start()), Coord::from(self.end()))
    }

    /// Euclidean length of the segment.
    pub fn length(&self) -> f64 {
        let line = self.to_line();
        line.dx().hypot(line.dy())
    }

    /// Point at parameter `t` (0 = start, 1 = end).
    pub fn point_at(&self, t: f64) -> Point {
        Point::new(
            self.x1 + t * (self.x2 - self.x1),
            self.y1 + t * (self.y2 - self.y1),
        )
    }

    /// Unit normal (left of the direction of travel), `None` for zero length.
    pub fn unit_normal(&self) -> Option<Point> {
        let line = self.to_line();
        let len = self.length();
        if len == 0.0 || !len.is_finite() {
            return None;
        }
        Some(Point::new(-line.dy() / len, line.dx() / len))
    }

    /// Zero-length or non-finite segment.
    pub fn is_degenerate(&self) -> bool {
        let len = self.length();
        len == 0.0 || !len.is_finite()
    }
}

/// An axis-aligned rectangle given by two opposite corners in any order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoxGeometry {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

impl BoxGeometry {
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// As a normalized `geo::Rect`.
    pub fn to_rect(&self) -> Rect {
        Rect::new(
            coord! { x: self.x1, y: self.y1 },
            coord! { x: self.x2, y: self.y2 },
        )
    }

    pub fn min(&self) -> Point {
        self.to_rect().min().into()
    }

    pub fn max(&self) -> Point {
        self.to_rect().max().into()
    }

    pub fn width(&self) -> f64 {
        self.to_rect().width()
    }

    pub fn height(&self) -> f64 {
        self.to_rect().height()
    }

    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }

    /// Zero-width, zero-height or non-finite rectangle.
    pub fn is_degenerate(&self) -> bool {
        let (width, height) = (self.width(), self.height());
        !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0)
    }

    /// Check if the point lies inside (boundary included).
    pub fn contains(&self, p: &Point) -> bool {
        let (min, max) = (self.min(), self.max());
        p.x >= min.x && p.x <= max.x && p.y >= min.y && p.y <= max.y
    }

    /// Grow by `margin` times the width (height) on the left and right
    /// (bottom and top) sides.
    pub fn expand(&self, margin: f64) -> Self {
        let (min, max) = (self.min(), self.max());
        let dw = self.width() * margin;
        let dh = self.height() * margin;
        Self::new(min.x - dw, min.y - dh, max.x + dw, max.y + dh)
    }
}

impl From<Rect> for BoxGeometry {
    fn from(r: Rect) -> Self {
        Self::new(r.min().x, r.min().y, r.max().x, r.max().y)
    }
}

/// Geometric domain tag of a waypoint set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Shape {
    Line,
    Rectangle,
    BoundingBox,
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Shape::Line => write!(f, "line"),
            Shape::Rectangle => write!(f, "rectangle"),
            Shape::BoundingBox => write!(f, "bounding box"),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
