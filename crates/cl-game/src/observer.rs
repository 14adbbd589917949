//! Outbound game events.

use cl_core::{CargoId, CartId, WorldPoint};
use cl_mobility::Arrival;

use crate::model::{Cargo, Itinerary, Station};
use crate::GameState;

/// Callbacks invoked by [`Game`][crate::Game] as the game evolves.
///
/// All methods have default no-op implementations so implementors only need
/// to override what they care about.
///
/// # Example — score ticker
///
/// ```rust,ignore
/// struct ScoreTicker;
///
/// impl GameObserver for ScoreTicker {
///     fn on_cart_arrived(&mut self, arrival: &Arrival, delivered: u32) {
///         if delivered > 0 {
///             println!("{} delivered {delivered} at {}", arrival.cart, arrival.station);
///         }
///     }
/// }
/// ```
pub trait GameObserver {
    /// A cart's world position after a movement step.
    fn on_cart_moved(&mut self, _cart: CartId, _point: WorldPoint) {}

    /// A cart reached a stop; `delivered` cargo units completed there.
    fn on_cart_arrived(&mut self, _arrival: &Arrival, _delivered: u32) {}

    /// The cargo spawner created a cargo unit.
    fn on_cargo_spawned(&mut self, _cargo: &Cargo) {}

    /// A topology change gave a cargo a new itinerary.
    fn on_cargo_rerouted(&mut self, _cargo: CargoId, _itinerary: &Itinerary) {}

    /// The station spawner placed a station.
    fn on_station_spawned(&mut self, _station: &Station) {}

    /// The round counter moved to `round`.
    fn on_round_advanced(&mut self, _round: u32) {}

    /// A station overflowed.  Called once per game.
    fn on_game_lost(&mut self, _state: &GameState) {}
}

/// A [`GameObserver`] that does nothing.
pub struct NoopObserver;

impl GameObserver for NoopObserver {}
