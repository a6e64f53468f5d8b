//! Path flows to waypoint flows.
//!
//! Each path carrying more than a tolerance of flow is matched to the
//! sequence of waypoints it passes, and the flow is attached to that
//! sequence. Paths at or below the tolerance are left out entirely.

use std::collections::BTreeMap;

use log::info;
use serde::{Deserialize, Serialize};

use crate::matching::WaypointQuery;
use crate::network::{Network, PathId};
use crate::{Result, WaypointId};

/// Waypoint sequence of one path with the flow it carries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaypointFlow {
    /// Waypoints along the path, consecutive duplicates removed
    pub waypoints: Vec<WaypointId>,
    /// Path flow from the solver
    pub flow: f64,
}

/// Configuration for flow aggregation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlowConfig {
    /// Samples taken along each link of a path.
    /// Default: 20
    pub samples_per_link: usize,

    /// Paths need strictly more flow than this to be kept.
    /// Default: 1e-3
    pub tolerance: f64,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            samples_per_link: 20,
            tolerance: 1e-3,
        }
    }
}

impl FlowConfig {
    /// Aggregate with this configuration.
    pub fn apply<N, Q>(&self, network: &N, waypoints: &Q) -> Result<BTreeMap<PathId, WaypointFlow>>
    where
        N: Network + ?Sized,
        Q: WaypointQuery,
    {
        generate_waypoint_flows(network, waypoints, self.samples_per_link, self.tolerance)
    }
}

/// Waypoint flows for every path whose flow exceeds `tolerance`.
///
/// Does not modify the network or the waypoint set.
pub fn generate_waypoint_flows<N, Q>(
    network: &N,
    waypoints: &Q,
    samples_per_link: usize,
    tolerance: f64,
) -> Result<BTreeMap<PathId, WaypointFlow>>
where
    N: Network + ?Sized,
    Q: WaypointQuery,
{
    let start = std::time::Instant::now();
    let mut flows = BTreeMap::new();
    let mut path_count = 0;

    for (path_id, path) in network.paths() {
        path_count += 1;
        if path.flow > tolerance {
            let ids = waypoints.closest_to_path(network, &path.links, samples_per_link)?;
            flows.insert(
                path_id,
                WaypointFlow {
                    waypoints: ids,
                    flow: path.flow,
                },
            );
        }
    }

    info!(
        "[Flows] Kept {} of {} paths above tolerance {} (total flow {:.3}) in {}ms",
        flows.len(),
        path_count,
        tolerance,
        total_flow(&flows),
        start.elapsed().as_millis()
    );
    Ok(flows)
}

/// Same output as [`generate_waypoint_flows`], with paths matched on the
/// rayon pool.
#[cfg(feature = "parallel")]
pub fn generate_waypoint_flows_parallel<N, Q>(
    network: &N,
    waypoints: &Q,
    samples_per_link: usize,
    tolerance: f64,
) -> Result<BTreeMap<PathId, WaypointFlow>>
where
    N: Network + Sync + ?Sized,
    Q: WaypointQuery,
{
    use rayon::prelude::*;

    let start = std::time::Instant::now();
    let kept: Vec<_> = network
        .paths()
        .filter(|(_, path)| path.flow > tolerance)
        .collect();

    let flows = kept
        .par_iter()
        .map(|(path_id, path)| -> Result<(PathId, WaypointFlow)> {
            let ids = waypoints.closest_to_path(network, &path.links, samples_per_link)?;
            Ok((
                *path_id,
                WaypointFlow {
                    waypoints: ids,
                    flow: path.flow,
                },
            ))
        })
        .collect::<Result<BTreeMap<_, _>>>()?;

    info!(
        "[Flows] Matched {} paths in parallel in {}ms",
        flows.len(),
        start.elapsed().as_millis()
    );
    Ok(flows)
}

/// Total flow mass of a set of waypoint flows.
pub fn total_flow(flows: &BTreeMap<PathId, WaypointFlow>) -> f64 {
    flows.values().map(|f| f.flow).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BoxGeometry, CompositeWaypointSet, Graph, Link, Point, RandomSampler};

    fn corridor() -> Graph {
        let mut graph = Graph::new();
        graph.add_node(1, Point::new(0.0, 0.0));
        graph.add_node(2, Point::new(10.0, 0.0));
        graph.add_link(Link::new(1, 2));
        graph.add_link(Link::new(2, 1));
        graph.add_path(1, vec![Link::new(1, 2)], 0.0);
        graph.add_path(2, vec![Link::new(1, 2)], 0.0005);
        graph.add_path(3, vec![Link::new(2, 1)], 2.3);
        graph.add_path(4, vec![Link::new(1, 2)], 1e-3);
        graph
    }

    fn waypoints() -> CompositeWaypointSet {
        let mut set = CompositeWaypointSet::new(BoxGeometry::new(-1.0, -1.0, 11.0, 1.0));
        set.populate(&mut RandomSampler::seeded(31), 30).unwrap();
        set
    }

    #[test]
    fn test_tolerance_is_strict() {
        let flows = generate_waypoint_flows(&corridor(), &waypoints(), 5, 1e-3).unwrap();
        assert_eq!(flows.keys().copied().collect::<Vec<_>>(), vec![3]);
        assert_eq!(flows[&3].flow, 2.3);
        assert!(!flows[&3].waypoints.is_empty());
    }

    #[test]
    fn test_matches_path_query() {
        let graph = corridor();
        let set = waypoints();
        let flows = FlowConfig {
            samples_per_link: 8,
            tolerance: 0.0,
        }
        .apply(&graph, &set)
        .unwrap();

        assert_eq!(flows.len(), 3);
        let expected = set
            .closest_to_path(&graph, &graph.paths[&3].links, 8)
            .unwrap();
        assert_eq!(flows[&3].waypoints, expected);
        assert!((total_flow(&flows) - (0.0005 + 2.3 + 1e-3)).abs() < 1e-12);
    }

    #[test]
    fn test_config_default() {
        let config = FlowConfig::default();
        assert_eq!(config.tolerance, 1e-3);
        let parsed: FlowConfig = serde_json::from_str(r#"{"samples_per_link": 4}"#).unwrap();
        assert_eq!(parsed.samples_per_link, 4);
        assert_eq!(parsed.tolerance, 1e-3);
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn test_parallel_matches_sequential() {
        let graph = corridor();
        let set = waypoints();
        let sequential = generate_waypoint_flows(&graph, &set, 6, 0.0).unwrap();
        let parallel = generate_waypoint_flows_parallel(&graph, &set, 6, 0.0).unwrap();
        assert_eq!(sequential, parallel);
    }
}
