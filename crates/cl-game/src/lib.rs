//! `cl-game` — the game-state reducer and the frame-driven game driver.
//!
//! # Crate layout
//!
//! | Module         | Contents                                                  |
//! |----------------|-----------------------------------------------------------|
//! | [`model`]      | `Station`, `Line`, `Cart`, `Cargo`, `Itinerary`           |
//! | [`state`]      | `GameState` (copy-on-write), `Credits`, `Census`          |
//! | [`action`]     | `GameAction`                                              |
//! | [`reducer`]    | `GameState::apply` — the single mutation authority        |
//! | [`transfer`]   | drop / deliver / load on arrival                          |
//! | [`spawner`]    | station sites and cargo picks                             |
//! | [`observer`]   | `GameObserver`, `NoopObserver`                            |
//! | [`game`]       | `Game` — reducer plus derived structures and timers       |
//! | [`builder`]    | `GameBuilder`                                             |
//! | [`error`]      | `GameError`, `GameResult<T>`                              |
//!
//! # Data flow
//!
//! ```text
//!   GameAction ──► GameState::apply ──► new GameState
//!                                          │ diff lines / carts / stations
//!                                          ▼
//!        GeometryArena · RoutingGraph · StationIndex · MovementEngine
//!                                          │ step(dt)
//!                                          ▼
//!                       Arrived ──► ArriveAtStation ──► transfer
//! ```
//!
//! # Cargo features
//!
//! | Feature    | Effect                                                 |
//! |------------|--------------------------------------------------------|
//! | `parallel` | Advances carts on Rayon's thread pool.                 |
//! | `serde`    | Serde derives on entities, actions, and counters.      |
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use cl_core::GameConfig;
//! use cl_game::{GameBuilder, NoopObserver};
//!
//! let mut game = GameBuilder::new(GameConfig::default()).build()?;
//! let stops: Vec<_> = game.state().stations.iter().map(|s| s.id).collect();
//! game.add_line(stops, &mut NoopObserver)?;
//! for _ in 0..600 {
//!     game.frame(1.0 / 60.0, &mut NoopObserver)?;
//! }
//! ```

pub mod action;
pub mod builder;
pub mod error;
pub mod game;
pub mod model;
pub mod observer;
pub mod reducer;
pub mod spawner;
pub mod state;
pub mod transfer;

#[cfg(test)]
mod tests;

pub use cl_mobility::Arrival;
pub use cl_spatial::{BfsRouter, Route, Router};

pub use action::GameAction;
pub use builder::GameBuilder;
pub use error::{GameError, GameResult};
pub use game::Game;
pub use model::{Cargo, CargoLocation, Cart, Itinerary, Line, Station};
pub use observer::{GameObserver, NoopObserver};
pub use state::{Census, CargoStats, CreditKind, Credits, GameState};
pub use transfer::{transfer, TransferOutcome};
