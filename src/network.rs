//! Read-only view of the transportation network.
//!
//! The network and its path flows come from outside (typically a traffic
//! equilibrium solver run). [`Network`] is everything the waypoint code
//! reads from it; [`Graph`] is a plain in-memory implementation that can be
//! loaded from JSON.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{LineGeometry, OptionExt, Point, Result, WaypointError};

/// Identifier of a network node.
pub type NodeId = u32;

/// Identifier of a network path.
pub type PathId = u32;

/// A directed link between two nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Link {
    pub start: NodeId,
    pub end: NodeId,
}

impl Link {
    pub fn new(start: NodeId, end: NodeId) -> Self {
        Self { start, end }
    }
}

/// An ordered sequence of links carrying a flow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Path {
    pub links: Vec<Link>,
    /// Flow assigned by the solver (>= 0)
    #[serde(default)]
    pub flow: f64,
}

/// What the waypoint code needs from a network model.
pub trait Network {
    /// Position of a node, `None` if unknown.
    fn node_position(&self, node: NodeId) -> Option<Point>;

    /// All node positions.
    fn node_positions(&self) -> Box<dyn Iterator<Item = (NodeId, Point)> + '_>;

    /// All links, in a stable order.
    fn links(&self) -> &[Link];

    /// All paths with their flows.
    fn paths(&self) -> Box<dyn Iterator<Item = (PathId, &Path)> + '_>;

    /// Look up one path.
    fn path(&self, id: PathId) -> Option<&Path>;

    /// Segment geometry of a link.
    fn link_geometry(&self, link: &Link) -> Result<LineGeometry> {
        let start = self
            .node_position(link.start)
            .ok_or_invalid_network(|| format!("link start node {} has no position", link.start))?;
        let end = self
            .node_position(link.end)
            .ok_or_invalid_network(|| format!("link end node {} has no position", link.end))?;
        Ok(LineGeometry::between(start, end))
    }
}

/// Directed segments of a path, one per link.
pub fn path_segments<N: Network + ?Sized>(network: &N, links: &[Link]) -> Result<Vec<LineGeometry>> {
    links.iter().map(|link| network.link_geometry(link)).collect()
}

/// In-memory network with node positions, links and path flows.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Graph {
    #[serde(default)]
    pub nodes: BTreeMap<NodeId, Point>,
    #[serde(default)]
    pub links: Vec<Link>,
    #[serde(default)]
    pub paths: BTreeMap<PathId, Path>,
}

impl Graph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a graph from JSON and check that it is self-consistent.
    pub fn from_json(json: &str) -> Result<Self> {
        let graph: Graph = serde_json::from_str(json).map_err(|e| WaypointError::InvalidNetwork {
            message: format!("cannot parse graph JSON: {}", e),
        })?;
        graph.validate()?;
        Ok(graph)
    }

    /// Serialize to JSON.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }

    /// Add or move a node.
    pub fn add_node(&mut self, id: NodeId, position: Point) {
        self.nodes.insert(id, position);
    }

    pub fn add_link(&mut self, link: Link) {
        self.links.push(link);
    }

    /// Add or replace a path.
    pub fn add_path(&mut self, id: PathId, links: Vec<Link>, flow: f64) {
        self.paths.insert(id, Path { links, flow });
    }

    /// Store a solver flow on an existing path.
    pub fn set_path_flow(&mut self, id: PathId, flow: f64) -> Result<()> {
        let path = self
            .paths
            .get_mut(&id)
            .ok_or_invalid_network(|| format!("unknown path {}", id))?;
        path.flow = flow;
        Ok(())
    }

    /// Check that every link and path link references known nodes, and
    /// that flows are finite and nonnegative.
    pub fn validate(&self) -> Result<()> {
        for link in &self.links {
            self.link_geometry(link)?;
        }
        for (id, path) in &self.paths {
            path_segments(self, &path.links)?;
            if !path.flow.is_finite() || path.flow < 0.0 {
                return Err(WaypointError::InvalidNetwork {
                    message: format!("path {} has invalid flow {}", id, path.flow),
                });
            }
        }
        Ok(())
    }
}

impl Network for Graph {
    fn node_position(&self, node: NodeId) -> Option<Point> {
        self.nodes.get(&node).copied()
    }

    fn node_positions(&self) -> Box<dyn Iterator<Item = (NodeId, Point)> + '_> {
        Box::new(self.nodes.iter().map(|(&id, &p)| (id, p)))
    }

    fn links(&self) -> &[Link] {
        &self.links
    }

    fn paths(&self) -> Box<dyn Iterator<Item = (PathId, &Path)> + '_> {
        Box::new(self.paths.iter().map(|(&id, path)| (id, path)))
    }

    fn path(&self, id: PathId) -> Option<&Path> {
        self.paths.get(&id)
    }
}
