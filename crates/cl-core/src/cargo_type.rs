//! Cargo type enum shared by stations (what they accept) and cargo (where
//! it must go).

/// The kind of cargo a station accepts and a cargo unit must be delivered to.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CargoType {
    Circle,
    Triangle,
    Square,
    Diamond,
    Star,
}

impl CargoType {
    /// Every variant, in the order initial stations cycle through them.
    pub const ALL: [CargoType; 5] = [
        CargoType::Circle,
        CargoType::Triangle,
        CargoType::Square,
        CargoType::Diamond,
        CargoType::Star,
    ];

    /// The `n`-th type, wrapping around.
    #[inline]
    pub fn cycled(n: usize) -> CargoType {
        Self::ALL[n % Self::ALL.len()]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CargoType::Circle   => "circle",
            CargoType::Triangle => "triangle",
            CargoType::Square   => "square",
            CargoType::Diamond  => "diamond",
            CargoType::Star     => "star",
        }
    }
}

impl std::fmt::Display for CargoType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
