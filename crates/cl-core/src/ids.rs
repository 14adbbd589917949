//! Strongly typed, zero-cost identifier wrappers.
//!
//! All IDs are `Copy + Ord + Hash` so they can be used as map keys and sorted
//! collection elements without ceremony.  Ordering matters: routing and the
//! movement engine iterate in ascending id order to stay deterministic.

use std::fmt;

/// Generate a typed ID wrapper around a primitive integer.
macro_rules! typed_id {
    ($(#[$attr:meta])* $vis:vis struct $name:ident($inner:ty);) => {
        $(#[$attr])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        $vis struct $name(pub $inner);

        impl $name {
            /// Cast to `usize` for use as a slot or table index.
            #[inline(always)]
            pub fn index(self) -> usize {
                self.0 as usize
            }

            /// The id after `self`, used by sequential allocators.
            #[inline(always)]
            pub fn next(self) -> $name {
                $name(self.0.wrapping_add(1))
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl From<$name> for usize {
            #[inline(always)]
            fn from(id: $name) -> usize {
                id.0 as usize
            }
        }

        impl TryFrom<usize> for $name {
            type Error = std::num::TryFromIntError;
            fn try_from(n: usize) -> Result<$name, Self::Error> {
                <$inner>::try_from(n).map($name)
            }
        }
    };
}

typed_id! {
    /// A station on the board.  Allocated sequentially by the station spawner.
    pub struct StationId(u32);
}

typed_id! {
    /// A line slot.  Lines draw from a small fixed pool (`GameConfig::line_slots`)
    /// and a slot becomes free again once its line is removed.
    pub struct LineId(u8);
}

typed_id! {
    /// A cart shuttling along one line.
    pub struct CartId(u32);
}

typed_id! {
    /// A single cargo unit.
    pub struct CargoId(u32);
}

typed_id! {
    /// Identity of one game instance.  Changes on every restart so that
    /// presentation layers can tell a fresh game from the old one.
    pub struct GameId(u64);
}
