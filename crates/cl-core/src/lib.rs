//! `cl-core` — foundational types for the `cartlines` transit-logistics
//! simulation.
//!
//! This crate is a dependency of every other `cl-*` crate.  It has no `cl-*`
//! dependencies and minimal external ones (only `rand` and `thiserror`, plus
//! optional `serde`).
//!
//! # What lives here
//!
//! | Module           | Contents                                               |
//! |------------------|--------------------------------------------------------|
//! | [`ids`]          | `StationId`, `LineId`, `CartId`, `CargoId`, `GameId`   |
//! | [`geo`]          | `GridPoint` (board cells), `WorldPoint` (continuous)   |
//! | [`time`]         | `Tick`, `IntervalTimer`                                |
//! | [`rng`]          | `SimRng` (seeded spawner randomness)                   |
//! | [`cargo_type`]   | `CargoType` enum                                       |
//! | [`config`]       | `GameConfig`                                           |
//! | [`error`]        | `CoreError`, `CoreResult`                              |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public value types.  |

pub mod cargo_type;
pub mod config;
pub mod error;
pub mod geo;
pub mod ids;
pub mod rng;
pub mod time;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use cargo_type::CargoType;
pub use config::GameConfig;
pub use error::{CoreError, CoreResult};
pub use geo::{GridPoint, WorldPoint};
pub use ids::{CargoId, CartId, GameId, LineId, StationId};
pub use rng::SimRng;
pub use time::{IntervalTimer, Tick};
