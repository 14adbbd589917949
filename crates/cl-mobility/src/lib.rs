//! `cl-mobility` — cart motion state and the movement engine.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                          |
//! |-------------|-------------------------------------------------------------------|
//! | [`state`]   | `CartMotion`, `Direction`, `Arrival` — per-cart progress state   |
//! | [`store`]   | `MotionStore` — all placed carts, ascending `CartId`             |
//! | [`engine`]  | `MovementEngine` — per-frame stepping, `MovementEvent`           |
//! | [`error`]   | `MobilityError`, `MobilityResult<T>`                              |
//!
//! # Movement model (progress shuttle)
//!
//! 1. A cart's position is a *progress* value along its line's cached
//!    [`LineGeometry`][cl_spatial::LineGeometry], advanced each frame by
//!    `direction × speed × dt`.
//! 2. Crossing the progress of the next stop is an **arrival**.  At either
//!    terminus the cart reverses immediately; it never stops.
//! 3. [`MovementEngine::step`] returns arrival and position events instead of
//!    calling back into the game, so stepping is testable in isolation and
//!    the caller decides how to apply arrivals.
//!
//! # Cargo features
//!
//! | Feature    | Effect                                                 |
//! |------------|--------------------------------------------------------|
//! | `parallel` | Advances carts on Rayon's thread pool.                 |

pub mod engine;
pub mod error;
pub mod state;
pub mod store;


pub use engine::{MovementEngine, MovementEvent};
pub use error::{MobilityError, MobilityResult};
pub use state::{Arrival, CartMotion, Direction};
pub use store::MotionStore;
