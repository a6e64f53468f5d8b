//! Renderer-facing data for waypoint plots.
//!
//! Nothing here draws. A [`Scene`] collects colored, labeled point series and
//! network edges that an external plotting tool can render; colors follow
//! the single-letter matlab colorspec (`"c"`, `"m"`, `"r"`, ...).
//!
//! Building a scene never fails: unknown ids, dangling links and empty
//! series are skipped with a log message.

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::composite::{CompositeWaypointSet, Layer};
use crate::matching::WaypointQuery;
use crate::network::{Link, Network, PathId};
use crate::waypoints::WaypointSet;
use crate::{Point, WaypointId};

/// A colored, labeled series of points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Overlay {
    pub color: String,
    pub label: String,
    pub points: Vec<Point>,
}

/// A drawable network edge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub from: Point,
    pub to: Point,
}

/// Everything a renderer needs for one waypoint plot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    /// Point series, in insertion order
    pub overlays: Vec<Overlay>,
    /// Network edges
    pub edges: Vec<Edge>,
    /// Edges of a highlighted path
    pub highlighted: Vec<Edge>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// One series per non-empty layer of a composite set.
    pub fn from_composite(set: &CompositeWaypointSet) -> Self {
        let mut scene = Self::new();
        for layer in Layer::ALL {
            scene.push(layer.color(), layer.label(), set.layer(layer));
        }
        scene
    }

    /// A single "uniform" series for a plain set.
    pub fn from_set(set: &WaypointSet) -> Self {
        let mut scene = Self::new();
        scene.push(Layer::Uniform.color(), Layer::Uniform.label(), set.points());
        scene
    }

    /// Add the waypoints with the given ids.
    pub fn with_waypoints<Q: WaypointQuery>(
        mut self,
        set: &Q,
        color: &str,
        ids: &[WaypointId],
        label: &str,
    ) -> Self {
        let points: Vec<Point> = ids
            .iter()
            .filter_map(|id| set.waypoints().get(id).copied())
            .collect();
        if points.len() < ids.len() {
            warn!(
                "[Overlay] '{}': skipped {} unknown waypoint ids",
                label,
                ids.len() - points.len()
            );
        }
        self.push(color, label, points);
        self
    }

    /// Add arbitrary points.
    pub fn with_points(mut self, color: &str, points: Vec<Point>, label: &str) -> Self {
        self.push(color, label, points);
        self
    }

    /// Add every link of the network as an edge.
    pub fn with_network<N: Network + ?Sized>(mut self, network: &N) -> Self {
        self.edges.extend(edges(network, network.links()));
        self
    }

    /// Highlight the links of one path.
    pub fn with_highlighted_path<N: Network + ?Sized>(mut self, network: &N, path_id: PathId) -> Self {
        match network.path(path_id) {
            Some(path) => self.highlighted.extend(edges(network, &path.links)),
            None => warn!("[Overlay] Path {} not found, nothing highlighted", path_id),
        }
        self
    }

    fn push(&mut self, color: &str, label: &str, points: Vec<Point>) {
        if points.is_empty() {
            debug!("[Overlay] Skipping empty series '{}'", label);
            return;
        }
        self.overlays.push(Overlay {
            color: color.to_string(),
            label: label.to_string(),
            points,
        });
    }

    /// Serialize the scene for an external renderer.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }
}

fn edges<N: Network + ?Sized>(network: &N, links: &[Link]) -> Vec<Edge> {
    links
        .iter()
        .filter_map(|link| match network.link_geometry(link) {
            Ok(line) => Some(Edge {
                from: line.start(),
                to: line.end(),
            }),
            Err(e) => {
                warn!("[Overlay] Skipping edge {:?}: {}", link, e);
                None
            }
        })
        .collect()
}
