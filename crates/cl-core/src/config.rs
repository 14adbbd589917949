//! Top-level game configuration.
//!
//! Defaults are the standard game tuning.  Applications may
//! load a `GameConfig` from JSON (feature `serde`); missing fields fall back
//! to the defaults.

use crate::{CoreError, CoreResult, Tick};

/// Tuning knobs for one game instance.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct GameConfig {
    /// Linear cart speed in board cells per second.
    pub cart_speed: f64,

    /// Capacity of a freshly added cart.
    pub cart_capacity: u32,

    /// Capacity of a freshly spawned station.
    pub station_capacity: u32,

    /// Stations spawned when the game starts.
    pub initial_stations: usize,

    /// Starting credits.
    pub initial_available_lines: u32,
    pub initial_cart_credits:    u32,
    pub initial_station_upgrades: u32,

    /// Capacity multipliers applied by upgrades (result is floored).  At
    /// least 1, so an upgrade never shrinks a capacity.
    pub cart_upgrade_factor:    f64,
    pub station_upgrade_factor: f64,

    /// Clock ticks per round.  Each round boundary grants one of every credit.
    pub round_length_ticks: u64,

    /// Every this many clock ticks the cargo spawn interval is multiplied by
    /// `spawn_decay_factor`.
    pub spawn_decay_period_ticks: u64,
    pub spawn_decay_factor:       f64,

    /// Real-time periods of the three timers.
    pub clock_interval_ms:         f64,
    pub cargo_spawn_interval_ms:   f64,
    pub station_spawn_interval_ms: f64,

    /// Board edge length in cells.
    pub board_size: i32,

    /// Spawned stations keep at least this distance (cells) from each other.
    pub min_station_spacing: f64,

    /// Size of the line-slot pool.
    pub line_slots: u8,

    /// Master RNG seed.  The same seed always produces identical games.
    pub seed: u64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            cart_speed:                5.0,
            cart_capacity:             6,
            station_capacity:          20,
            initial_stations:          3,
            initial_available_lines:   2,
            initial_cart_credits:      0,
            initial_station_upgrades:  0,
            cart_upgrade_factor:       2.0,
            station_upgrade_factor:    1.2,
            round_length_ticks:        60,
            spawn_decay_period_ticks:  130,
            spawn_decay_factor:        0.9,
            clock_interval_ms:         1_000.0,
            cargo_spawn_interval_ms:   10_000.0,
            station_spawn_interval_ms: 35_000.0,
            board_size:                50,
            min_station_spacing:       4.0,
            line_slots:                10,
            seed:                      42,
        }
    }
}

impl GameConfig {
    /// Reject values that would stall or corrupt the simulation.
    pub fn validate(&self) -> CoreResult<()> {
        fn bad(msg: &str) -> CoreResult<()> {
            Err(CoreError::Config(msg.to_owned()))
        }

        if !(self.cart_speed > 0.0) {
            return bad("cart_speed must be positive");
        }
        if self.cart_capacity == 0 || self.station_capacity == 0 {
            return bad("capacities must be positive");
        }
        if !(self.cart_upgrade_factor >= 1.0) || !(self.station_upgrade_factor >= 1.0) {
            return bad("upgrade factors must be at least 1");
        }
        if self.round_length_ticks == 0 || self.spawn_decay_period_ticks == 0 {
            return bad("tick periods must be positive");
        }
        if !(self.spawn_decay_factor > 0.0 && self.spawn_decay_factor < 1.0) {
            return bad("spawn_decay_factor must be in (0, 1)");
        }
        if !(self.clock_interval_ms > 0.0)
            || !(self.cargo_spawn_interval_ms > 0.0)
            || !(self.station_spawn_interval_ms > 0.0)
        {
            return bad("timer intervals must be positive");
        }
        if self.board_size < 4 {
            return bad("board_size must be at least 4");
        }
        if self.line_slots == 0 {
            return bad("line_slots must be positive");
        }
        Ok(())
    }

    /// `true` when `tick` closes a round.
    #[inline]
    pub fn is_round_boundary(&self, tick: Tick) -> bool {
        tick.is_boundary(self.round_length_ticks)
    }

    /// `true` when `tick` triggers the spawn-interval decay.
    #[inline]
    pub fn is_decay_boundary(&self, tick: Tick) -> bool {
        tick.is_boundary(self.spawn_decay_period_ticks)
    }
}
