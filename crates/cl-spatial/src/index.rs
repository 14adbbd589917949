//! R-tree over station cells.
//!
//! The station spawner must keep new stations a minimum distance away from
//! every existing one.  A nearest-neighbour query against an R-tree (via
//! `rstar`) answers that in O(log N) instead of scanning the station list.

use rstar::{PointDistance, RTree, RTreeObject, AABB};

use cl_core::{GridPoint, StationId};

// ── R-tree entry ──────────────────────────────────────────────────────────────

/// Entry stored in the R-tree: a station cell and its id.
#[derive(Clone, Debug, PartialEq)]
struct StationEntry {
    point: [i32; 2], // [x, y]
    id:    StationId,
}

impl RTreeObject for StationEntry {
    type Envelope = AABB<[i32; 2]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

impl PointDistance for StationEntry {
    /// Squared Euclidean distance in cells.  Board coordinates are small, so
    /// `i32` never overflows here.
    fn distance_2(&self, point: &[i32; 2]) -> i32 {
        let dx = self.point[0] - point[0];
        let dy = self.point[1] - point[1];
        dx * dx + dy * dy
    }
}

// ── StationIndex ──────────────────────────────────────────────────────────────

/// Spatial index of station positions.
#[derive(Clone, Debug, Default)]
pub struct StationIndex {
    tree: RTree<StationEntry>,
}

impl StationIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bulk-load an index from existing stations.
    pub fn from_stations<I>(stations: I) -> Self
    where
        I: IntoIterator<Item = (StationId, GridPoint)>,
    {
        let entries = stations
            .into_iter()
            .map(|(id, p)| StationEntry { point: [p.x, p.y], id })
            .collect();
        Self { tree: RTree::bulk_load(entries) }
    }

    pub fn insert(&mut self, id: StationId, position: GridPoint) {
        self.tree.insert(StationEntry { point: [position.x, position.y], id });
    }

    /// The station closest to `position` and its distance in cells.
    pub fn nearest(&self, position: GridPoint) -> Option<(StationId, f64)> {
        let query = [position.x, position.y];
        self.tree
            .nearest_neighbor(&query)
            .map(|e| (e.id, f64::from(e.distance_2(&query)).sqrt()))
    }

    /// `true` if no station lies closer than `min_spacing` cells to
    /// `position`.
    pub fn is_clear(&self, position: GridPoint, min_spacing: f64) -> bool {
        self.nearest(position).is_none_or(|(_, d)| d >= min_spacing)
    }

    /// Station occupying exactly `position`, if any.
    pub fn station_at(&self, position: GridPoint) -> Option<StationId> {
        self.tree
            .locate_at_point(&[position.x, position.y])
            .map(|e| e.id)
    }

    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }
}
