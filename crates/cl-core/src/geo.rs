//! Board coordinates.
//!
//! Stations sit on integer board cells (`GridPoint`).  Carts travel along
//! continuous paths between them, so their sampled positions are
//! `WorldPoint`s in the same cell units.  `f64` keeps progress ratios exact
//! enough that sampling at progress 0 and 1 lands on the endpoints.

/// An integer cell on the game board.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GridPoint {
    pub x: i32,
    pub y: i32,
}

impl GridPoint {
    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Straight-line distance in cells.
    pub fn distance(self, other: GridPoint) -> f64 {
        let dx = f64::from(other.x - self.x);
        let dy = f64::from(other.y - self.y);
        (dx * dx + dy * dy).sqrt()
    }

    /// `true` when both coordinates differ, i.e. the straight segment to
    /// `other` is not axis-aligned.
    #[inline]
    pub fn is_diagonal_to(self, other: GridPoint) -> bool {
        self.x != other.x && self.y != other.y
    }

    #[inline]
    pub fn to_world(self) -> WorldPoint {
        WorldPoint::new(f64::from(self.x), f64::from(self.y))
    }
}

impl std::fmt::Display for GridPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {}]", self.x, self.y)
    }
}

/// A continuous position on the board, in cell units.
#[derive(Copy, Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WorldPoint {
    pub x: f64,
    pub y: f64,
}

impl WorldPoint {
    #[inline]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Linear interpolation; `t = 0` gives `self`, `t = 1` gives `other`.
    #[inline]
    pub fn lerp(self, other: WorldPoint, t: f64) -> WorldPoint {
        WorldPoint::new(
            self.x + (other.x - self.x) * t,
            self.y + (other.y - self.y) * t,
        )
    }
}

impl From<GridPoint> for WorldPoint {
    fn from(p: GridPoint) -> Self {
        p.to_world()
    }
}

impl std::fmt::Display for WorldPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.3}, {:.3})", self.x, self.y)
    }
}
