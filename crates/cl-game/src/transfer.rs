//! The cargo transfer protocol run when a cart reaches a stop.
//!
//! Three ordered passes over the cargo collection:
//!
//! 1. **Drop**: cargo on the cart whose next hop is the reached station
//!    moves to that station and pops the hop.
//! 2. **Deliver**: cargo dropped in pass 1 with no hops left is removed.
//! 3. **Load**: cargo waiting at the station whose next hop is the cart's
//!    new next station boards, while the cart has room.
//!
//! The function is pure: it reads a slice and returns a new collection, so
//! it can be tested without any game state around it.

use cl_core::{CargoId, StationId};

use crate::model::{Cargo, CargoLocation, Cart};

/// Result of one transfer.
#[derive(Clone, Debug, PartialEq)]
pub struct TransferOutcome {
    /// The updated cargo collection, input order preserved.
    pub cargo:     Vec<Cargo>,
    pub dropped:   u32,
    pub delivered: u32,
    pub loaded:    u32,
}

/// Apply drop, deliver, and load for `cart` reaching `station` and heading
/// on to `next_station`.
pub fn transfer(
    cargo:        &[Cargo],
    cart:         &Cart,
    station:      StationId,
    next_station: StationId,
) -> TransferOutcome {
    let mut out: Vec<Cargo> = cargo.to_vec();
    let mut dropped_here: Vec<CargoId> = Vec::new();

    // ── Drop ──────────────────────────────────────────────────────────────
    for c in out.iter_mut() {
        if c.is_on(cart.id) && c.next_hop() == Some(station) {
            c.location = CargoLocation::Station(station);
            c.itinerary.pop_hop();
            dropped_here.push(c.id);
        }
    }
    let dropped = dropped_here.len() as u32;

    // ── Deliver ───────────────────────────────────────────────────────────
    // Only this cart's drops count; nothing else is credited to it.
    let before = out.len();
    out.retain(|c| !(c.itinerary.is_complete() && dropped_here.contains(&c.id)));
    let delivered = (before - out.len()) as u32;

    // ── Load ──────────────────────────────────────────────────────────────
    let mut on_cart = out.iter().filter(|c| c.is_on(cart.id)).count() as u32;
    let mut loaded = 0;
    for c in out.iter_mut() {
        if on_cart >= cart.capacity {
            break;
        }
        if c.is_at(station) && c.next_hop() == Some(next_station) {
            c.location = CargoLocation::Cart(cart.id);
            on_cart += 1;
            loaded += 1;
        }
    }

    TransferOutcome { cargo: out, dropped, delivered, loaded }
}
