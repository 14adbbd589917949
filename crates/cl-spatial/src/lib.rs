//! `cl-spatial` — line geometry, routing graph, and cargo routing.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                    |
//! |--------------|-------------------------------------------------------------|
//! | [`geometry`] | `LineGeometry` (rectilinear path + progress table), `GeometryArena` |
//! | [`graph`]    | `RoutingGraph` — undirected station adjacency              |
//! | [`router`]   | `Router` trait, `Route`, `BfsRouter` (synthetic-sink BFS)  |
//! | [`index`]    | `StationIndex` — R-tree over station cells                 |
//! | [`error`]    | `SpatialError`, `SpatialResult<T>`                         |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                       |
//! |---------|--------------------------------------------------------------|
//! | `serde` | Derives `Serialize`/`Deserialize` on public value types.     |

pub mod error;
pub mod geometry;
pub mod graph;
pub mod index;
pub mod router;


pub use error::{SpatialError, SpatialResult};
pub use geometry::{GeometryArena, LineGeometry, StationProgress};
pub use graph::RoutingGraph;
pub use index::StationIndex;
pub use router::{BfsRouter, Route, Router};
