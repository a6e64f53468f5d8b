//! Composite waypoint set over a bounding box.
//!
//! Owns a uniform background layer plus any number of line and rectangle
//! layers, and keeps one merged id→point map (and index) over all of them so
//! queries see a single addressable set.

use std::collections::BTreeMap;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::index::WaypointIndex;
use crate::matching::WaypointQuery;
use crate::sampler::PointSampler;
use crate::waypoints::WaypointSet;
use crate::{
    BoxGeometry, LineGeometry, OptionExt, Point, Result, Shape, WaypointError, WaypointId,
};

/// Waypoint category inside a composite set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Layer {
    /// Background samples over the whole bounding box
    Uniform,
    /// Samples along network links
    Lines,
    /// Samples in user-specified regions
    Regions,
}

impl Layer {
    pub const ALL: [Layer; 3] = [Layer::Uniform, Layer::Lines, Layer::Regions];

    /// Default legend label.
    pub fn label(&self) -> &'static str {
        match self {
            Layer::Uniform => "uniform",
            Layer::Lines => "lines",
            Layer::Regions => "regions",
        }
    }

    /// Default color (matlab colorspec letter).
    pub fn color(&self) -> &'static str {
        match self {
            Layer::Uniform => "c",
            Layer::Lines => "m",
            Layer::Regions => "g",
        }
    }
}

/// Merge `source` into `target`, refusing to map an id to a second point.
///
/// Entries already present with the same point are left alone. On collision
/// `target` is not modified. Returns the entries actually inserted.
pub fn merge_disjoint(
    target: &mut BTreeMap<WaypointId, Point>,
    source: &BTreeMap<WaypointId, Point>,
) -> Result<Vec<(WaypointId, Point)>> {
    let mut added = Vec::with_capacity(source.len());
    for (&id, &point) in source {
        match target.get(&id) {
            Some(existing) if *existing != point => {
                return Err(WaypointError::IdCollision { id });
            }
            Some(_) => {}
            None => added.push((id, point)),
        }
    }
    target.extend(added.iter().copied());
    Ok(added)
}

/// Background, line and region waypoints under one id space.
///
/// Background waypoints take ids `1..=N0`; every added layer continues from
/// the current total, so the layers never share an id.
#[derive(Debug, Clone)]
pub struct CompositeWaypointSet {
    geometry: BoxGeometry,
    background: WaypointSet,
    regions: BTreeMap<usize, WaypointSet>,
    lines: BTreeMap<usize, WaypointSet>,
    waypoints: BTreeMap<WaypointId, Point>,
    index: WaypointIndex,
    background_count: usize,
    total: usize,
}

impl CompositeWaypointSet {
    /// Empty composite over a bounding box.
    pub fn new(geometry: BoxGeometry) -> Self {
        Self {
            geometry,
            background: WaypointSet::rectangle(geometry),
            regions: BTreeMap::new(),
            lines: BTreeMap::new(),
            waypoints: BTreeMap::new(),
            index: WaypointIndex::new(),
            background_count: 0,
            total: 0,
        }
    }

    /// Fill the background layer with `count` uniform samples (ids from 1).
    ///
    /// Previously added lines and regions are discarded, since their ids
    /// were allocated after the old background.
    pub fn populate<S: PointSampler + ?Sized>(&mut self, sampler: &mut S, count: usize) -> Result<()> {
        let mut background = WaypointSet::rectangle(self.geometry);
        background.populate(sampler, count, 1)?;

        if !self.regions.is_empty() || !self.lines.is_empty() {
            warn!(
                "[Composite] Re-populating background discards {} regions and {} lines",
                self.regions.len(),
                self.lines.len()
            );
        }

        self.waypoints = background.waypoints().clone();
        self.index = WaypointIndex::build(&self.waypoints);
        self.background = background;
        self.regions.clear();
        self.lines.clear();
        self.background_count = count;
        self.total = count;
        Ok(())
    }

    /// Add a rectangular region with `count` waypoints. Returns its region
    /// index (1-based, in insertion order).
    pub fn add_rectangle<S: PointSampler + ?Sized>(
        &mut self,
        sampler: &mut S,
        geometry: BoxGeometry,
        count: usize,
    ) -> Result<usize> {
        let mut region = WaypointSet::rectangle(geometry);
        region.populate(sampler, count, self.next_id(count)?)?;
        self.absorb(&region)?;

        let idx = self.regions.len() + 1;
        debug!("[Composite] Region {} added with {} waypoints", idx, count);
        self.regions.insert(idx, region);
        Ok(idx)
    }

    /// Add a line with `count` waypoints jittered sideways by up to
    /// `jitter`. Returns its line index (1-based, in insertion order).
    pub fn add_line<S: PointSampler + ?Sized>(
        &mut self,
        sampler: &mut S,
        geometry: LineGeometry,
        count: usize,
        jitter: f64,
    ) -> Result<usize> {
        let mut line = WaypointSet::line(geometry, jitter);
        line.populate(sampler, count, self.next_id(count)?)?;
        self.absorb(&line)?;

        let idx = self.lines.len() + 1;
        debug!("[Composite] Line {} added with {} waypoints", idx, count);
        self.lines.insert(idx, line);
        Ok(idx)
    }

    fn next_id(&self, count: usize) -> Result<WaypointId> {
        WaypointId::try_from(self.total + 1).map_err(|_| WaypointError::InvalidCount {
            context: format!("layer added after {} waypoints", self.total),
            count,
        })
    }

    fn absorb(&mut self, layer: &WaypointSet) -> Result<()> {
        let added = merge_disjoint(&mut self.waypoints, layer.waypoints())?;
        self.total += added.len();
        for (id, point) in added {
            self.index.insert(id, point);
        }
        Ok(())
    }

    /// The bounding box this set was built over.
    pub fn geometry(&self) -> BoxGeometry {
        self.geometry
    }

    pub fn background(&self) -> &WaypointSet {
        &self.background
    }

    /// Number of background waypoints (N0).
    pub fn background_count(&self) -> usize {
        self.background_count
    }

    pub fn regions(&self) -> &BTreeMap<usize, WaypointSet> {
        &self.regions
    }

    pub fn lines(&self) -> &BTreeMap<usize, WaypointSet> {
        &self.lines
    }

    pub fn region(&self, idx: usize) -> Option<&WaypointSet> {
        self.regions.get(&idx)
    }

    pub fn line(&self, idx: usize) -> Option<&WaypointSet> {
        self.lines.get(&idx)
    }

    /// Total number of waypoints (N).
    pub fn len(&self) -> usize {
        self.total
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    pub fn get(&self, id: WaypointId) -> Option<Point> {
        self.waypoints.get(&id).copied()
    }

    /// Points of one category, in layer then id order.
    pub fn layer(&self, layer: Layer) -> Vec<Point> {
        match layer {
            Layer::Uniform => self.background.points(),
            Layer::Lines => self.lines.values().flat_map(|l| l.points()).collect(),
            Layer::Regions => self.regions.values().flat_map(|r| r.points()).collect(),
        }
    }
}

impl WaypointQuery for CompositeWaypointSet {
    fn shape(&self) -> Shape {
        Shape::BoundingBox
    }

    fn waypoints(&self) -> &BTreeMap<WaypointId, Point> {
        &self.waypoints
    }

    fn closest_to_point(&self, point: &Point) -> Result<WaypointId> {
        self.index.nearest(point).ok_or_empty_set(Shape::BoundingBox)
    }
}
