//! Station and cargo spawning rules.
//!
//! Both spawners only *choose*; the driver turns the choice into a reducer
//! action.  All randomness comes from the game's [`SimRng`], so a seed
//! replays the same board.

use std::collections::BTreeSet;

use cl_core::{CargoType, GameConfig, GridPoint, SimRng, StationId};
use cl_spatial::StationIndex;

use crate::model::Station;

/// Random draws per station before giving up on finding a free cell.
pub const MAX_SITE_ATTEMPTS: u32 = 200;

// ── StationSpawner ────────────────────────────────────────────────────────────

/// Chooses where the next station goes and what it accepts.
///
/// The first `initial_stations` stations cycle through the cargo types and
/// land in the top-left half of the board, so an opening board always
/// offers several types close together.  Later stations get a random type
/// anywhere on the board.
#[derive(Clone, Debug, Default)]
pub struct StationSpawner {
    placed: usize,
}

impl StationSpawner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stations placed by this spawner so far.
    pub fn placed(&self) -> usize {
        self.placed
    }

    /// Pick a site at least `min_station_spacing` away from every station in
    /// `index`, and a type.  `None` if no such cell turned up within
    /// [`MAX_SITE_ATTEMPTS`] draws.
    pub fn next_station(
        &mut self,
        config: &GameConfig,
        index:  &StationIndex,
        rng:    &mut SimRng,
    ) -> Option<(GridPoint, CargoType)> {
        let opening = self.placed < config.initial_stations;
        let range = if opening { (config.board_size / 2).max(3) } else { config.board_size };

        let position = (0..MAX_SITE_ATTEMPTS)
            .map(|_| GridPoint::new(rng.gen_range(1..range - 1), rng.gen_range(1..range - 1)))
            .find(|&p| index.is_clear(p, config.min_station_spacing))?;

        let cargo_type = if opening {
            CargoType::cycled(self.placed)
        } else {
            *rng.choose(&CargoType::ALL)?
        };
        self.placed += 1;
        Some((position, cargo_type))
    }
}

// ── Cargo ─────────────────────────────────────────────────────────────────────

/// Choose a cargo type among those present on the board and a home station
/// that does not accept it.
///
/// `None` when fewer than two distinct types are on the board, since then
/// every station would accept the cargo it spawned.
pub fn pick_cargo(stations: &[Station], rng: &mut SimRng) -> Option<(CargoType, StationId)> {
    let present: Vec<CargoType> = stations
        .iter()
        .map(|s| s.cargo_type)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    if present.len() < 2 {
        return None;
    }
    let cargo_type = *rng.choose(&present)?;
    let homes: Vec<StationId> = stations
        .iter()
        .filter(|s| s.cargo_type != cargo_type)
        .map(|s| s.id)
        .collect();
    let home = *rng.choose(&homes)?;
    Some((cargo_type, home))
}
