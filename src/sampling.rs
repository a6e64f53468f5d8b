//! Waypoint placement over a network.
//!
//! Builds a [`CompositeWaypointSet`] over the network's bounding box (grown
//! by a margin), with a uniform background layer, one line layer per link
//! sized by a length-weighted multinomial draw, and any extra regions the
//! caller asks for.

use geo::{BoundingRect, Coord, MultiPoint};
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::composite::CompositeWaypointSet;
use crate::network::Network;
use crate::sampler::PointSampler;
use crate::{BoxGeometry, LineGeometry, OptionExt, Result, Shape, WaypointError};

/// An extra rectangular region and how many waypoints to put in it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegionSpec {
    pub geometry: BoxGeometry,
    pub count: usize,
}

impl RegionSpec {
    pub fn new(geometry: BoxGeometry, count: usize) -> Self {
        Self { geometry, count }
    }
}

/// Configuration for waypoint placement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplingConfig {
    /// Uniform background waypoints over the bounding box (N0).
    /// Default: 100
    pub background_count: usize,

    /// Waypoints spread over all links, proportionally to length (N1).
    /// Default: 100
    pub link_count: usize,

    /// Extra regions, added after the links.
    /// Default: none
    pub regions: Vec<RegionSpec>,

    /// Fraction of the network width/height added on each side of the
    /// bounding box. Default: 0.1
    pub margin: f64,

    /// Sideways jitter of link waypoints, keeps them off one exact line.
    /// Default: 0.1
    pub line_jitter: f64,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            background_count: 100,
            link_count: 100,
            regions: Vec::new(),
            margin: 0.1,
            line_jitter: 0.1,
        }
    }
}

impl SamplingConfig {
    /// Reject margins and jitter scales that cannot describe a geometry.
    pub fn validate(&self) -> Result<()> {
        if !self.margin.is_finite() || self.margin < 0.0 {
            return Err(WaypointError::DegenerateGeometry {
                shape: Shape::BoundingBox,
                message: format!("margin must be finite and >= 0, got {}", self.margin),
            });
        }
        if !self.line_jitter.is_finite() || self.line_jitter < 0.0 {
            return Err(WaypointError::DegenerateGeometry {
                shape: Shape::Line,
                message: format!("jitter scale must be finite and >= 0, got {}", self.line_jitter),
            });
        }
        Ok(())
    }
}

/// Bounding box of all node positions, grown by `margin` of its width and
/// height on each side.
///
/// A flat axis (all nodes on one horizontal or vertical line) is first
/// opened up to the extent of the other axis, or to 1 when every node sits
/// on the same spot, so the box always has positive area.
pub fn network_bounds<N: Network + ?Sized>(network: &N, margin: f64) -> Result<BoxGeometry> {
    let coords: Vec<Coord> = network.node_positions().map(|(_, p)| p.into()).collect();
    let rect = MultiPoint::from(coords)
        .bounding_rect()
        .ok_or_invalid_network(|| "network has no nodes".to_string())?;

    let tight = BoxGeometry::from(rect);
    let (width, height) = (tight.width(), tight.height());
    if width > 0.0 && height > 0.0 {
        return Ok(tight.expand(margin));
    }

    let span = width.max(height);
    let span = if span > 0.0 { span } else { 1.0 };
    let pad_x = if width > 0.0 { 0.0 } else { span / 2.0 };
    let pad_y = if height > 0.0 { 0.0 } else { span / 2.0 };
    let (min, max) = (tight.min(), tight.max());
    debug!(
        "[Sampling] Flat network extent {}x{}, padding bounds by ({}, {})",
        width, height, pad_x, pad_y
    );
    Ok(BoxGeometry::new(min.x - pad_x, min.y - pad_y, max.x + pad_x, max.y + pad_y).expand(margin))
}

/// Segment geometry of every link, in link order.
pub fn link_lines<N: Network + ?Sized>(network: &N) -> Result<Vec<LineGeometry>> {
    network
        .links()
        .iter()
        .map(|link| network.link_geometry(link))
        .collect()
}

/// Length-proportional weights summing to 1.
pub fn link_weights(lines: &[LineGeometry]) -> Result<Vec<f64>> {
    let lengths: Vec<f64> = lines.iter().map(|l| l.length()).collect();
    let total: f64 = lengths.iter().sum();
    if total <= 0.0 || !total.is_finite() {
        return Err(WaypointError::DegenerateGeometry {
            shape: Shape::Line,
            message: format!("total link length is {}", total),
        });
    }
    Ok(lengths.into_iter().map(|len| len / total).collect())
}

/// Place waypoints over a network.
///
/// # Example
/// ```
/// use waypoint_matcher::{sample_waypoints, Graph, Link, Point, RandomSampler, SamplingConfig};
///
/// let mut graph = Graph::new();
/// graph.add_node(1, Point::new(0.0, 0.0));
/// graph.add_node(2, Point::new(10.0, 10.0));
/// graph.add_link(Link::new(1, 2));
///
/// let config = SamplingConfig { background_count: 5, link_count: 7, ..Default::default() };
/// let set = sample_waypoints(&graph, &config, &mut RandomSampler::seeded(3)).unwrap();
/// assert_eq!(set.len(), 12);
/// assert_eq!(set.lines().len(), 1);
/// ```
pub fn sample_waypoints<N, S>(
    network: &N,
    config: &SamplingConfig,
    sampler: &mut S,
) -> Result<CompositeWaypointSet>
where
    N: Network + ?Sized,
    S: PointSampler + ?Sized,
{
    let start = std::time::Instant::now();
    config.validate()?;

    if network.links().is_empty() {
        return Err(WaypointError::InvalidNetwork {
            message: "network has no links".to_string(),
        });
    }
    let bounds = network_bounds(network, config.margin)?;
    debug!("[Sampling] Bounding box {:?}", bounds);

    let mut set = CompositeWaypointSet::new(bounds);
    set.populate(sampler, config.background_count)?;

    let lines = link_lines(network)?;
    let counts = if config.link_count == 0 {
        vec![0; lines.len()]
    } else {
        sampler.allocate(config.link_count, &link_weights(&lines)?)?
    };

    let allocated: usize = counts.iter().sum();
    if counts.len() != lines.len() || allocated != config.link_count {
        return Err(WaypointError::InvalidCount {
            context: format!(
                "allocation of {} link samples over {} links",
                config.link_count,
                lines.len()
            ),
            count: allocated,
        });
    }

    for (line, count) in lines.iter().zip(counts) {
        set.add_line(sampler, *line, count, config.line_jitter)?;
    }
    for region in &config.regions {
        set.add_rectangle(sampler, region.geometry, region.count)?;
    }

    info!(
        "[Sampling] Placed {} waypoints ({} background, {} on {} links, {} regions) in {}ms",
        set.len(),
        set.background_count(),
        config.link_count,
        lines.len(),
        config.regions.len(),
        start.elapsed().as_millis()
    );
    Ok(set)
}
