//! Per-cart motion state.

use cl_core::{CartId, LineId, StationId};
use cl_spatial::LineGeometry;

// ── Direction ─────────────────────────────────────────────────────────────────

/// Travel direction along a line's progress axis.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Direction {
    /// Towards progress `1.0`.
    #[default]
    Forward,
    /// Towards progress `0.0`.
    Backward,
}

impl Direction {
    /// `+1.0` or `-1.0`.
    #[inline]
    pub fn sign(self) -> f64 {
        match self {
            Direction::Forward  => 1.0,
            Direction::Backward => -1.0,
        }
    }

    #[inline]
    pub fn reversed(self) -> Self {
        match self {
            Direction::Forward  => Direction::Backward,
            Direction::Backward => Direction::Forward,
        }
    }

    /// The table index one step from `index` in this direction, or `None`
    /// past either end of a table of `len` entries.
    #[inline]
    pub fn step(self, index: usize, len: usize) -> Option<usize> {
        match self {
            Direction::Forward  => index.checked_add(1).filter(|&i| i < len),
            Direction::Backward => index.checked_sub(1),
        }
    }

    /// `true` once `progress` has reached `target` travelling this way.
    #[inline]
    fn has_reached(self, progress: f64, target: f64) -> bool {
        match self {
            Direction::Forward  => progress >= target,
            Direction::Backward => progress <= target,
        }
    }
}

// ── Arrival ───────────────────────────────────────────────────────────────────

/// A cart reaching a stop during one movement step.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Arrival {
    pub cart:         CartId,
    pub line:         LineId,
    /// The stop just reached.
    pub station:      StationId,
    /// The stop the cart heads for next.
    pub next_station: StationId,
    /// `true` if the cart turned around at a terminus.
    pub reversed:     bool,
}

// ── CartMotion ────────────────────────────────────────────────────────────────

/// Progress-shuttle state of one cart.
///
/// `progress` is deliberately unclamped: a cart may overshoot a terminus by
/// up to one step before turning back.  Sampling clamps.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CartMotion {
    pub cart:       CartId,
    pub line:       LineId,
    pub progress:   f64,
    pub direction:  Direction,
    /// Index of the next stop in the line's progress table.
    pub next_index: usize,
}

impl CartMotion {
    /// A cart at the start of `line`, heading forward, whose first step
    /// reports arrival at the first stop.
    pub fn at_line_start(cart: CartId, line: LineId) -> Self {
        Self {
            cart,
            line,
            progress:   0.0,
            direction:  Direction::Forward,
            next_index: 0,
        }
    }

    /// Advance by `dt` seconds along `geometry`.
    ///
    /// Returns at most one arrival.  A degenerate or zero-speed line leaves
    /// the state unchanged.
    pub fn advance(&mut self, geometry: &LineGeometry, dt: f64) -> Option<Arrival> {
        let table = geometry.stations();
        if table.is_empty() || geometry.speed() <= 0.0 {
            return None;
        }
        let len = table.len();
        self.next_index = self.next_index.min(len - 1);

        self.progress += self.direction.sign() * geometry.speed() * dt;

        let target = table[self.next_index];
        if !self.direction.has_reached(self.progress, target.progress) {
            return None;
        }

        let reached = self.next_index;
        let mut reversed = false;
        self.next_index = match self.direction.step(reached, len) {
            Some(i) => i,
            None => {
                reversed = true;
                self.direction = self.direction.reversed();
                // Built tables have two or more entries.
                self.direction.step(reached, len).unwrap_or(reached)
            }
        };

        Some(Arrival {
            cart:         self.cart,
            line:         self.line,
            station:      target.station,
            next_station: table[self.next_index].station,
            reversed,
        })
    }
}
