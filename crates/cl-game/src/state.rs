//! The authoritative game state.
//!
//! # Copy-on-write
//!
//! Entity collections sit behind `Arc<Vec<_>>`.  Cloning a `GameState` is
//! four reference-count bumps; the reducer calls `Arc::make_mut` only on the
//! collections an action touches, so a previously returned state stays
//! valid and unchanged.

use std::fmt;
use std::sync::Arc;

use cl_core::{
    CargoId, CartId, CoreError, CoreResult, GameConfig, GameId, LineId, StationId, Tick,
};

use crate::model::{Cargo, CargoLocation, Cart, Line, Station};

// ── Credits ───────────────────────────────────────────────────────────────────

/// The three spendable counters of the economy.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CreditKind {
    /// Shared by cart additions and cart upgrades.
    Cart,
    StationUpgrade,
    Line,
}

impl fmt::Display for CreditKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CreditKind::Cart           => "cart",
            CreditKind::StationUpgrade => "station-upgrade",
            CreditKind::Line           => "line",
        })
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Credits {
    pub carts:            u32,
    pub station_upgrades: u32,
    pub lines:            u32,
}

impl Credits {
    pub fn get(&self, kind: CreditKind) -> u32 {
        match kind {
            CreditKind::Cart           => self.carts,
            CreditKind::StationUpgrade => self.station_upgrades,
            CreditKind::Line           => self.lines,
        }
    }

    pub(crate) fn slot(&mut self, kind: CreditKind) -> &mut u32 {
        match kind {
            CreditKind::Cart           => &mut self.carts,
            CreditKind::StationUpgrade => &mut self.station_upgrades,
            CreditKind::Line           => &mut self.lines,
        }
    }

    /// One of each, granted at every round boundary.
    pub(crate) fn grant_round(&mut self) {
        self.carts += 1;
        self.station_upgrades += 1;
        self.lines += 1;
    }
}

// ── CargoStats ────────────────────────────────────────────────────────────────

/// Lifetime cargo counters, for conservation checks and summaries.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CargoStats {
    pub spawned:            u64,
    pub delivered:          u64,
    /// Cargo destroyed together with the cart carrying it.
    pub removed_with_lines: u64,
}

// ── GameState ─────────────────────────────────────────────────────────────────

/// One immutable snapshot of the game.  Produce the next one with
/// [`GameState::apply`][crate::GameState::apply].
#[derive(Clone, Debug)]
pub struct GameState {
    pub game_id: GameId,
    pub clock:   Tick,
    pub round:   u32,
    pub score:   u64,
    pub lost:    bool,
    /// Whether timers are driven.  `false` in edit mode and after a loss.
    pub running: bool,
    pub credits: Credits,
    /// Current cargo-spawner period; shrinks on every decay boundary.
    pub cargo_spawn_interval_ms: f64,
    pub stats:   CargoStats,

    pub stations: Arc<Vec<Station>>,
    pub lines:    Arc<Vec<Line>>,
    pub carts:    Arc<Vec<Cart>>,
    pub cargo:    Arc<Vec<Cargo>>,

    pub(crate) config:        Arc<GameConfig>,
    pub(crate) next_station:  StationId,
    pub(crate) next_cart:     CartId,
    pub(crate) next_cargo:    CargoId,
}

impl GameState {
    /// Empty board, starting credits, round 1, clock 1, running.
    pub fn new(config: Arc<GameConfig>, game_id: GameId) -> Self {
        Self {
            game_id,
            clock:   Tick::START,
            round:   1,
            score:   0,
            lost:    false,
            running: true,
            credits: Credits {
                carts:            config.initial_cart_credits,
                station_upgrades: config.initial_station_upgrades,
                lines:            config.initial_available_lines,
            },
            cargo_spawn_interval_ms: config.cargo_spawn_interval_ms,
            stats:    CargoStats::default(),
            stations: Arc::default(),
            lines:    Arc::default(),
            carts:    Arc::default(),
            cargo:    Arc::default(),
            config,
            next_station: StationId(0),
            next_cart:    CartId(0),
            next_cargo:   CargoId(0),
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    // ── Id allocation preview ─────────────────────────────────────────────

    /// The id the next `AddStation` will assign.
    pub fn next_station_id(&self) -> StationId {
        self.next_station
    }

    /// The id the next `AddCart` will assign.
    pub fn next_cart_id(&self) -> CartId {
        self.next_cart
    }

    /// The id the next `AddCargo` will assign.
    pub fn next_cargo_id(&self) -> CargoId {
        self.next_cargo
    }

    /// Lowest line slot not in use, if any.
    pub fn free_line_slot(&self) -> Option<LineId> {
        (0..self.config.line_slots)
            .map(LineId)
            .find(|id| self.lines.iter().all(|l| l.id != *id))
    }

    // ── Lookups ───────────────────────────────────────────────────────────

    pub fn station(&self, id: StationId) -> CoreResult<&Station> {
        self.stations
            .iter()
            .find(|s| s.id == id)
            .ok_or(CoreError::StationNotFound(id))
    }

    pub fn line(&self, id: LineId) -> CoreResult<&Line> {
        self.lines
            .iter()
            .find(|l| l.id == id)
            .ok_or(CoreError::LineNotFound(id))
    }

    pub fn cart(&self, id: CartId) -> CoreResult<&Cart> {
        self.carts
            .iter()
            .find(|c| c.id == id)
            .ok_or(CoreError::CartNotFound(id))
    }

    pub fn cargo_by_id(&self, id: CargoId) -> Option<&Cargo> {
        self.cargo.iter().find(|c| c.id == id)
    }

    pub fn carts_on(&self, line: LineId) -> impl Iterator<Item = &Cart> + '_ {
        self.carts.iter().filter(move |c| c.line == line)
    }

    /// Cargo units waiting at `station`, routable or not.
    pub fn waiting_at(&self, station: StationId) -> usize {
        self.cargo.iter().filter(|c| c.is_at(station)).count()
    }

    /// Cargo units riding `cart`.
    pub fn load_of(&self, cart: CartId) -> usize {
        self.cargo.iter().filter(|c| c.is_on(cart)).count()
    }

    // ── Census ────────────────────────────────────────────────────────────

    /// Where every cargo unit ever spawned has ended up.
    pub fn census(&self) -> Census {
        let mut census = Census {
            spawned:            self.stats.spawned,
            delivered:          self.stats.delivered,
            removed_with_lines: self.stats.removed_with_lines,
            ..Census::default()
        };
        for c in self.cargo.iter() {
            match c.location {
                CargoLocation::Cart(_) => census.on_carts += 1,
                CargoLocation::Station(_) if c.itinerary.is_unroutable() => census.unroutable += 1,
                CargoLocation::Station(_) => census.waiting += 1,
            }
        }
        census
    }
}

/// Cargo accounting snapshot.
///
/// Invariant: `delivered + on_carts + waiting + unroutable ==
/// spawned - removed_with_lines`.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Census {
    pub spawned:            u64,
    pub delivered:          u64,
    pub removed_with_lines: u64,
    pub on_carts:           u64,
    /// Waiting at a station with a route.
    pub waiting:            u64,
    /// Waiting at a station with no route.
    pub unroutable:         u64,
}

impl Census {
    /// `true` if no cargo unit was created or lost unaccounted.
    pub fn is_balanced(&self) -> bool {
        self.delivered + self.on_carts + self.waiting + self.unroutable
            == self.spawned - self.removed_with_lines
    }
}
