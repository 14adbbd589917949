//! Per-frame movement stepping.

use cl_core::{CartId, LineId, WorldPoint};
use cl_spatial::GeometryArena;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::{Arrival, CartMotion, MobilityResult, MotionStore};

/// One observable outcome of a movement step.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MovementEvent {
    /// A cart reached a stop.  Always precedes that cart's `Position`.
    Arrived(Arrival),
    /// A cart's world position after the step.
    Position { cart: CartId, point: WorldPoint },
}

/// Advances every placed cart along its line's cached geometry.
///
/// The engine never touches game state; [`step`](Self::step) returns events
/// and the caller applies arrivals.
#[derive(Clone, Debug, Default)]
pub struct MovementEngine {
    /// Motion state of every placed cart.
    pub store: MotionStore,
}

impl MovementEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start `cart` at the beginning of `line` (see [`MotionStore::place`]).
    pub fn place(&mut self, cart: CartId, line: LineId, arena: &GeometryArena) -> MobilityResult<()> {
        self.store.place(cart, line, arena)
    }

    pub fn remove_cart(&mut self, cart: CartId) -> Option<CartMotion> {
        self.store.remove_cart(cart)
    }

    pub fn remove_line(&mut self, line: LineId) -> Vec<CartId> {
        self.store.remove_line(line)
    }

    pub fn clear(&mut self) {
        self.store.clear();
    }

    /// Advance every cart by `dt` seconds.
    ///
    /// Events come out in ascending `CartId` order; for each cart an
    /// `Arrived` (if any) precedes its `Position`.  Carts whose line has no
    /// cached geometry are skipped.
    pub fn step(&mut self, arena: &GeometryArena, dt: f64) -> Vec<MovementEvent> {
        let motions = self.store.motions_mut();

        #[cfg(feature = "parallel")]
        let stepped: Vec<_> = motions.par_iter_mut().map(|m| step_one(m, arena, dt)).collect();
        #[cfg(not(feature = "parallel"))]
        let stepped: Vec<_> = motions.iter_mut().map(|m| step_one(m, arena, dt)).collect();

        let mut events = Vec::with_capacity(stepped.len() + stepped.len() / 4);
        for (arrival, position) in stepped {
            events.extend(arrival.map(MovementEvent::Arrived));
            events.extend(position);
        }
        events
    }

    /// Current world position of `cart`, or `None` if it is not placed or
    /// its line has no usable geometry.
    pub fn position(&self, cart: CartId, arena: &GeometryArena) -> Option<WorldPoint> {
        let motion = self.store.get(cart)?;
        arena.get(motion.line)?.point_at(motion.progress)
    }
}

fn step_one(
    motion: &mut CartMotion,
    arena:  &GeometryArena,
    dt:     f64,
) -> (Option<Arrival>, Option<MovementEvent>) {
    let Some(geometry) = arena.get(motion.line) else {
        return (None, None);
    };
    let arrival = motion.advance(geometry, dt);
    let position = geometry
        .point_at(motion.progress)
        .map(|point| MovementEvent::Position { cart: motion.cart, point });
    (arrival, position)
}
