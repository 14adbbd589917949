//! Undirected routing graph over stations.
//!
//! Nodes are stations tagged with the cargo type they accept; edges are the
//! station adjacencies contributed by every line's consecutive stops,
//! deduplicated and independent of which line contributed them.
//!
//! Both maps are ordered (`BTreeMap` / `BTreeSet`) so neighbour iteration is
//! always in ascending `StationId` order.  Routing depends on that for
//! deterministic tie-breaking.
//!
//! Edges carry no per-line reference count, so removing a line cannot be
//! undone edge by edge; callers rebuild the whole graph with
//! [`RoutingGraph::from_topology`] instead.

use std::collections::{BTreeMap, BTreeSet};

use cl_core::{CargoType, StationId};

use crate::{SpatialError, SpatialResult};

/// Station adjacency graph used by the router.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RoutingGraph {
    nodes:     BTreeMap<StationId, CargoType>,
    adjacency: BTreeMap<StationId, BTreeSet<StationId>>,
}

impl RoutingGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a graph from scratch: every station, then every line's
    /// consecutive stop pairs.
    pub fn from_topology<'a, S, L>(stations: S, lines: L) -> SpatialResult<Self>
    where
        S: IntoIterator<Item = (StationId, CargoType)>,
        L: IntoIterator<Item = &'a [StationId]>,
    {
        let mut graph = Self::new();
        for (id, cargo_type) in stations {
            graph.add_station(id, cargo_type);
        }
        for stops in lines {
            graph.add_line(stops)?;
        }
        Ok(graph)
    }

    /// Register a station node.  Re-adding an existing station updates its
    /// type and keeps its edges.
    pub fn add_station(&mut self, id: StationId, cargo_type: CargoType) {
        self.nodes.insert(id, cargo_type);
        self.adjacency.entry(id).or_default();
    }

    /// Add one undirected edge.  Self-loops are ignored; duplicates collapse.
    pub fn add_segment(&mut self, a: StationId, b: StationId) {
        if a == b {
            return;
        }
        self.adjacency.entry(a).or_default().insert(b);
        self.adjacency.entry(b).or_default().insert(a);
    }

    /// Add every consecutive stop pair of a line.  Every stop must already
    /// be a node; nothing is added otherwise.
    pub fn add_line(&mut self, stops: &[StationId]) -> SpatialResult<()> {
        if let Some(&unknown) = stops.iter().find(|s| !self.contains(**s)) {
            return Err(SpatialError::UnknownStation(unknown));
        }
        for pair in stops.windows(2) {
            self.add_segment(pair[0], pair[1]);
        }
        Ok(())
    }

    // ── Queries ───────────────────────────────────────────────────────────

    pub fn contains(&self, id: StationId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn cargo_type(&self, id: StationId) -> Option<CargoType> {
        self.nodes.get(&id).copied()
    }

    /// Neighbours of `id` in ascending id order.  Empty for unknown stations.
    pub fn neighbors(&self, id: StationId) -> impl Iterator<Item = StationId> + '_ {
        self.adjacency.get(&id).into_iter().flatten().copied()
    }

    pub fn degree(&self, id: StationId) -> usize {
        self.adjacency.get(&id).map_or(0, BTreeSet::len)
    }

    pub fn has_segment(&self, a: StationId, b: StationId) -> bool {
        self.adjacency.get(&a).is_some_and(|n| n.contains(&b))
    }

    /// Stations accepting `cargo_type`, ascending.
    pub fn stations_accepting(&self, cargo_type: CargoType) -> impl Iterator<Item = StationId> + '_ {
        self.nodes
            .iter()
            .filter(move |&(_, &t)| t == cargo_type)
            .map(|(&id, _)| id)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of undirected edges.
    pub fn edge_count(&self) -> usize {
        self.adjacency.values().map(BTreeSet::len).sum::<usize>() / 2
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
