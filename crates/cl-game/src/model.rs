//! Canonical game entities.
//!
//! The reducer owns these; everything else (geometry, routing graph, cart
//! motion) is derived from them.

use cl_core::{CargoId, CargoType, CartId, GridPoint, LineId, StationId};
use cl_spatial::Route;

// ── Station ───────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Station {
    pub id:            StationId,
    pub position:      GridPoint,
    /// The cargo type this station accepts.
    pub cargo_type:    CargoType,
    /// Waiting cargo beyond this count loses the game.
    pub capacity:      u32,
    pub created_round: u32,
}

// ── Line ──────────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Line {
    pub id:       LineId,
    /// Stops in traversal order.  At least two, no two consecutive equal.
    pub stations: Vec<StationId>,
}

impl Line {
    pub fn serves(&self, station: StationId) -> bool {
        self.stations.contains(&station)
    }
}

// ── Cart ──────────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Cart {
    pub id:            CartId,
    pub line:          LineId,
    pub capacity:      u32,
    pub created_round: u32,
    /// Cargo units this cart has delivered.
    pub score:         u64,
}

// ── Cargo ─────────────────────────────────────────────────────────────────────

/// Where a cargo unit is right now: exactly one of a station or a cart.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CargoLocation {
    Station(StationId),
    Cart(CartId),
}

/// The stations a cargo still has to visit, or the "no route" sentinel.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Itinerary {
    /// Remaining hops; the last one accepts the cargo's type.  Empty means
    /// the cargo has arrived.
    Hops(Vec<StationId>),
    /// No station accepting the cargo is reachable.  The cargo waits.
    Unroutable,
}

impl Itinerary {
    /// `None` from the router becomes [`Itinerary::Unroutable`].
    pub fn from_route(route: Option<Route>) -> Self {
        match route {
            Some(r) => Itinerary::Hops(r.hops),
            None => Itinerary::Unroutable,
        }
    }

    pub fn next_hop(&self) -> Option<StationId> {
        match self {
            Itinerary::Hops(hops) => hops.first().copied(),
            Itinerary::Unroutable => None,
        }
    }

    /// `true` once every hop has been visited.
    pub fn is_complete(&self) -> bool {
        matches!(self, Itinerary::Hops(hops) if hops.is_empty())
    }

    pub fn is_unroutable(&self) -> bool {
        matches!(self, Itinerary::Unroutable)
    }

    /// Drop the first hop.  No-op when unroutable or complete.
    pub fn pop_hop(&mut self) {
        if let Itinerary::Hops(hops) = self {
            if !hops.is_empty() {
                hops.remove(0);
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Cargo {
    pub id:         CargoId,
    /// A station of this type is the destination.
    pub cargo_type: CargoType,
    pub location:   CargoLocation,
    pub itinerary:  Itinerary,
}

impl Cargo {
    #[inline]
    pub fn is_at(&self, station: StationId) -> bool {
        self.location == CargoLocation::Station(station)
    }

    #[inline]
    pub fn is_on(&self, cart: CartId) -> bool {
        self.location == CargoLocation::Cart(cart)
    }

    #[inline]
    pub fn next_hop(&self) -> Option<StationId> {
        self.itinerary.next_hop()
    }
}
