//! Every mutation of the game goes through one of these.

use cl_core::{CargoId, CargoType, CartId, GridPoint, LineId, StationId};

use crate::model::Itinerary;

/// An action for [`GameState::apply`][crate::GameState::apply].
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum GameAction {
    /// Place a new station.  Its id is `GameState::next_station_id()`.
    AddStation { position: GridPoint, cargo_type: CargoType },

    /// Open a line on the lowest free slot.  Spends a line credit and grants
    /// one cart credit for the line's first cart.
    AddLine { stations: Vec<StationId> },

    /// Remove a line with every cart on it and every cargo on those carts.
    /// Refunds one line credit.
    RemoveLine { line: LineId },

    /// Put one more cart on `line`.  Spends a cart credit.
    AddCart { line: LineId },

    /// Multiply the station's capacity by the station factor.  Spends a
    /// station-upgrade credit.
    UpgradeStation { station: StationId },

    /// Multiply the cart's capacity by the cart factor.  Spends a cart
    /// credit.
    UpgradeCart { cart: CartId },

    /// Spawn a cargo waiting at `station`.  Its id is
    /// `GameState::next_cargo_id()`.
    AddCargo { cargo_type: CargoType, station: StationId, itinerary: Itinerary },

    /// Replace one cargo's remaining itinerary.
    RerouteCargo { cargo: CargoId, itinerary: Itinerary },

    /// `cart` reached `station` and now heads for `next_station`.
    ArriveAtStation { cart: CartId, station: StationId, next_station: StationId },

    /// Advance the round clock by one tick.
    TickClock,

    /// Enter (`true`) or leave (`false`) simulation mode.
    SetRunning(bool),

    /// Discard everything and start a fresh game with a new id.
    RestartGame,
}
