//! Routing trait and the default synthetic-sink BFS router.
//!
//! # Pluggability
//!
//! `cl-game` calls routing via the [`Router`] trait, so applications can
//! swap in a different search (weighted by path length, congestion-aware…)
//! without touching the driver.
//!
//! # Synthetic sink
//!
//! A cargo does not target one station but *any* station accepting its type.
//! [`BfsRouter`] adds one virtual sink node adjacent to every matching
//! station and searches from the source to the sink.  The sink exists only
//! for the duration of one query; the graph itself is never copied or
//! modified.  Stripping the source and the sink from the found path leaves
//! the hops still to visit, ending at the destination.

use std::collections::VecDeque;

use rustc_hash::FxHashMap;

use cl_core::{CargoType, StationId};

use crate::RoutingGraph;

// ── Route ─────────────────────────────────────────────────────────────────────

/// The stations a cargo must still visit, in order.  The last hop is the
/// destination; the source is not included.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Route {
    pub hops: Vec<StationId>,
}

impl Route {
    /// `true` if the source already accepts the cargo (nothing to travel).
    pub fn is_trivial(&self) -> bool {
        self.hops.is_empty()
    }

    pub fn destination(&self) -> Option<StationId> {
        self.hops.last().copied()
    }

    pub fn len(&self) -> usize {
        self.hops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hops.is_empty()
    }
}

// ── Router trait ──────────────────────────────────────────────────────────────

/// Pluggable cargo routing.
///
/// Implementations must be deterministic: the same graph, source, and cargo
/// type always yield the same route.
pub trait Router: Send + Sync {
    /// Route from `from` to the nearest station accepting `cargo_type`.
    ///
    /// Returns `None` when no such station is reachable (including when
    /// `from` is not in the graph).  A source that already accepts the type
    /// yields an empty route.
    fn route(&self, graph: &RoutingGraph, from: StationId, cargo_type: CargoType) -> Option<Route>;
}

// ── BfsRouter ─────────────────────────────────────────────────────────────────

/// Unweighted breadth-first search to the synthetic sink.
///
/// Every line segment counts as one hop regardless of its drawn length.
/// Neighbours are expanded in ascending id order, so among equally short
/// routes the one through lower station ids wins.
#[derive(Debug, Clone, Copy, Default)]
pub struct BfsRouter;

impl Router for BfsRouter {
    fn route(&self, graph: &RoutingGraph, from: StationId, cargo_type: CargoType) -> Option<Route> {
        bfs_to_sink(graph, from, cargo_type)
    }
}

/// A search node: a real station or the per-query sink.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
enum Node {
    Station(StationId),
    Sink,
}

fn bfs_to_sink(graph: &RoutingGraph, from: StationId, cargo_type: CargoType) -> Option<Route> {
    if !graph.contains(from) {
        return None;
    }

    // parent[v] = station that discovered v; the source maps to itself.
    let mut parent: FxHashMap<StationId, StationId> = FxHashMap::default();
    parent.insert(from, from);

    let mut queue: VecDeque<StationId> = VecDeque::new();
    queue.push_back(from);

    while let Some(station) = queue.pop_front() {
        for next in successors(graph, station, cargo_type) {
            match next {
                // All stations at this BFS depth were dequeued before any
                // deeper one, so the first sink hit is a shortest path.
                Node::Sink => return Some(reconstruct(&parent, from, station)),
                Node::Station(n) => {
                    if !parent.contains_key(&n) {
                        parent.insert(n, station);
                        queue.push_back(n);
                    }
                }
            }
        }
    }

    None
}

/// The sink if `station` accepts `cargo_type`, then station neighbours in
/// ascending order.
fn successors(
    graph:      &RoutingGraph,
    station:    StationId,
    cargo_type: CargoType,
) -> impl Iterator<Item = Node> + '_ {
    let sink = (graph.cargo_type(station) == Some(cargo_type)).then_some(Node::Sink);
    sink.into_iter().chain(graph.neighbors(station).map(Node::Station))
}

/// Walk parents back from the last station before the sink, then drop the
/// source.
fn reconstruct(parent: &FxHashMap<StationId, StationId>, from: StationId, last: StationId) -> Route {
    let mut hops = Vec::new();
    let mut cur = last;
    while cur != from {
        hops.push(cur);
        cur = parent[&cur];
    }
    hops.reverse();
    Route { hops }
}
