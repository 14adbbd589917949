//! The `MotionStore` — motion state of every placed cart.

use tracing::debug;

use cl_core::{CartId, LineId};
use cl_spatial::{GeometryArena, SpatialError};

use crate::{CartMotion, MobilityError, MobilityResult};

/// Motion state for every cart currently running, kept sorted by ascending
/// `CartId` so stepping order (and therefore event order) is deterministic.
#[derive(Clone, Debug, Default)]
pub struct MotionStore {
    motions: Vec<CartMotion>,
}

impl MotionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Put `cart` at the start of `line`.
    ///
    /// # Errors
    ///
    /// - [`SpatialError::LineNotCached`] if the arena has no geometry for
    ///   `line`.
    /// - [`MobilityError::DegenerateLine`] if that geometry is degenerate.
    /// - [`MobilityError::AlreadyPlaced`] if `cart` already runs.
    pub fn place(&mut self, cart: CartId, line: LineId, arena: &GeometryArena) -> MobilityResult<()> {
        let geometry = arena.get(line).ok_or(SpatialError::LineNotCached(line))?;
        if geometry.is_degenerate() {
            return Err(MobilityError::DegenerateLine(line));
        }
        match self.motions.binary_search_by_key(&cart, |m| m.cart) {
            Ok(_) => Err(MobilityError::AlreadyPlaced(cart)),
            Err(at) => {
                self.motions.insert(at, CartMotion::at_line_start(cart, line));
                debug!(cart = %cart, line = %line, "cart placed");
                Ok(())
            }
        }
    }

    /// Stop tracking `cart`.
    pub fn remove_cart(&mut self, cart: CartId) -> Option<CartMotion> {
        let at = self.motions.binary_search_by_key(&cart, |m| m.cart).ok()?;
        Some(self.motions.remove(at))
    }

    /// Stop tracking every cart on `line`; returns their ids, ascending.
    pub fn remove_line(&mut self, line: LineId) -> Vec<CartId> {
        let mut removed = Vec::new();
        self.motions.retain(|m| {
            if m.line == line {
                removed.push(m.cart);
                false
            } else {
                true
            }
        });
        removed
    }

    pub fn get(&self, cart: CartId) -> Option<&CartMotion> {
        let at = self.motions.binary_search_by_key(&cart, |m| m.cart).ok()?;
        Some(&self.motions[at])
    }

    pub fn contains(&self, cart: CartId) -> bool {
        self.get(cart).is_some()
    }

    /// All motions, ascending `CartId`.
    pub fn iter(&self) -> impl Iterator<Item = &CartMotion> {
        self.motions.iter()
    }

    /// Carts currently running on `line`.
    pub fn carts_on(&self, line: LineId) -> impl Iterator<Item = CartId> + '_ {
        self.motions.iter().filter(move |m| m.line == line).map(|m| m.cart)
    }

    pub fn len(&self) -> usize {
        self.motions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.motions.is_empty()
    }

    pub fn clear(&mut self) {
        self.motions.clear();
    }

    pub(crate) fn motions_mut(&mut self) -> &mut [CartMotion] {
        &mut self.motions
    }
}
