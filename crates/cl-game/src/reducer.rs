//! The game-state reducer.
//!
//! [`GameState::apply`] is the single authority over entities, credits, the
//! round clock, and the loss condition.  It never mutates `self`: the next
//! state is returned, sharing every collection the action did not touch.

use std::sync::Arc;

use tracing::{debug, info};

use cl_core::{CargoId, CartId, CoreError, LineId, StationId};

use crate::action::GameAction;
use crate::model::{Cargo, CargoLocation, Cart, Itinerary, Line, Station};
use crate::state::{CreditKind, GameState};
use crate::transfer::transfer;
use crate::{GameError, GameResult};

impl GameState {
    /// Apply `action` and return the resulting state.
    ///
    /// On error `self` is unchanged and no partial state escapes.
    pub fn apply(&self, action: GameAction) -> GameResult<GameState> {
        let mut next = self.clone();
        next.apply_in_place(action)?;
        Ok(next)
    }

    /// Apply several actions atomically: all succeed or `self` is returned
    /// untouched.  Collections are cloned at most once for the whole batch.
    pub fn apply_all<I>(&self, actions: I) -> GameResult<GameState>
    where
        I: IntoIterator<Item = GameAction>,
    {
        let mut next = self.clone();
        for action in actions {
            next.apply_in_place(action)?;
        }
        Ok(next)
    }

    fn apply_in_place(&mut self, action: GameAction) -> GameResult<()> {
        match action {
            GameAction::AddStation { position, cargo_type } => {
                let id = self.next_station;
                self.next_station = id.next();
                Arc::make_mut(&mut self.stations).push(Station {
                    id,
                    position,
                    cargo_type,
                    capacity:      self.config.station_capacity,
                    created_round: self.round,
                });
            }

            GameAction::AddLine { stations } => self.add_line(stations)?,

            GameAction::RemoveLine { line } => self.remove_line(line)?,

            GameAction::AddCart { line } => {
                self.line(line)?;
                self.spend(CreditKind::Cart)?;
                let id = self.next_cart;
                self.next_cart = id.next();
                Arc::make_mut(&mut self.carts).push(Cart {
                    id,
                    line,
                    capacity:      self.config.cart_capacity,
                    created_round: self.round,
                    score:         0,
                });
            }

            GameAction::UpgradeStation { station } => {
                let at = self.station_index(station)?;
                self.spend(CreditKind::StationUpgrade)?;
                let factor = self.config.station_upgrade_factor;
                let s = &mut Arc::make_mut(&mut self.stations)[at];
                s.capacity = scale(s.capacity, factor);
            }

            GameAction::UpgradeCart { cart } => {
                let at = self.cart_index(cart)?;
                self.spend(CreditKind::Cart)?;
                let factor = self.config.cart_upgrade_factor;
                let c = &mut Arc::make_mut(&mut self.carts)[at];
                c.capacity = scale(c.capacity, factor);
            }

            GameAction::AddCargo { cargo_type, station, itinerary } => {
                let capacity = self.station(station)?.capacity;
                let id = self.next_cargo;
                self.next_cargo = id.next();
                self.stats.spawned += 1;

                if itinerary.is_complete() {
                    self.stats.delivered += 1;
                } else {
                    Arc::make_mut(&mut self.cargo).push(Cargo {
                        id,
                        cargo_type,
                        location: CargoLocation::Station(station),
                        itinerary,
                    });
                }

                if self.waiting_at(station) > capacity as usize && !self.lost {
                    self.lost = true;
                    self.running = false;
                    info!(station = %station, capacity, score = self.score, "station overflowed; game lost");
                }
            }

            GameAction::RerouteCargo { cargo, itinerary } => self.reroute(cargo, itinerary),

            GameAction::ArriveAtStation { cart, station, next_station } => {
                self.arrive(cart, station, next_station)?;
            }

            GameAction::TickClock => {
                self.clock = self.clock + 1;
                if self.config.is_round_boundary(self.clock) {
                    self.round += 1;
                    self.credits.grant_round();
                    info!(round = self.round, clock = %self.clock, "round advanced");
                }
                if self.config.is_decay_boundary(self.clock) {
                    self.cargo_spawn_interval_ms *= self.config.spawn_decay_factor;
                    debug!(interval_ms = self.cargo_spawn_interval_ms, "cargo spawn interval shortened");
                }
            }

            GameAction::SetRunning(running) => self.running = running,

            GameAction::RestartGame => {
                let game_id = self.game_id.next();
                *self = GameState::new(Arc::clone(&self.config), game_id);
                info!(game = %game_id, "game restarted");
            }
        }
        Ok(())
    }

    // ── Helpers ───────────────────────────────────────────────────────────

    fn spend(&mut self, kind: CreditKind) -> GameResult<()> {
        let slot = self.credits.slot(kind);
        if *slot == 0 {
            return Err(GameError::NoCredit(kind));
        }
        *slot -= 1;
        Ok(())
    }

    fn station_index(&self, id: StationId) -> GameResult<usize> {
        self.stations
            .iter()
            .position(|s| s.id == id)
            .ok_or_else(|| CoreError::StationNotFound(id).into())
    }

    fn cart_index(&self, id: CartId) -> GameResult<usize> {
        self.carts
            .iter()
            .position(|c| c.id == id)
            .ok_or_else(|| CoreError::CartNotFound(id).into())
    }

    fn add_line(&mut self, stations: Vec<StationId>) -> GameResult<()> {
        if stations.len() < 2 {
            return Err(GameError::InvalidLine("a line needs at least two stations"));
        }
        let mut positions = Vec::with_capacity(stations.len());
        for &id in &stations {
            positions.push(self.station(id)?.position);
        }
        if stations.windows(2).any(|w| w[0] == w[1]) {
            return Err(GameError::InvalidLine("consecutive stations must differ"));
        }
        if positions.windows(2).any(|w| w[0] == w[1]) {
            return Err(GameError::InvalidLine("consecutive stations share a cell"));
        }
        let id = self.free_line_slot().ok_or(GameError::NoFreeLineSlot)?;
        self.spend(CreditKind::Line)?;
        self.credits.carts += 1;
        Arc::make_mut(&mut self.lines).push(Line { id, stations });
        Ok(())
    }

    fn remove_line(&mut self, line: LineId) -> GameResult<()> {
        self.line(line)?;
        let doomed: Vec<CartId> = self.carts_on(line).map(|c| c.id).collect();

        Arc::make_mut(&mut self.lines).retain(|l| l.id != line);
        if !doomed.is_empty() {
            Arc::make_mut(&mut self.carts).retain(|c| c.line != line);
            let before = self.cargo.len();
            let on_doomed = |c: &Cargo| matches!(c.location, CargoLocation::Cart(id) if doomed.contains(&id));
            if self.cargo.iter().any(on_doomed) {
                Arc::make_mut(&mut self.cargo).retain(|c| !on_doomed(c));
            }
            self.stats.removed_with_lines += (before - self.cargo.len()) as u64;
        }
        self.credits.lines += 1;
        Ok(())
    }

    fn reroute(&mut self, cargo: CargoId, itinerary: Itinerary) {
        let Some(at) = self.cargo.iter().position(|c| c.id == cargo) else {
            return;
        };
        let list = Arc::make_mut(&mut self.cargo);
        if itinerary.is_complete() {
            list.remove(at);
            self.stats.delivered += 1;
        } else {
            list[at].itinerary = itinerary;
        }
    }

    fn arrive(&mut self, cart: CartId, station: StationId, next_station: StationId) -> GameResult<()> {
        let at = self.cart_index(cart)?;
        let line = self.line(self.carts[at].line)?;
        if !line.serves(station) || !line.serves(next_station) {
            return Err(GameError::InvalidArrival { cart, station, next_station });
        }

        let outcome = transfer(&self.cargo, &self.carts[at], station, next_station);
        if outcome.dropped + outcome.loaded + outcome.delivered == 0 {
            return Ok(());
        }
        self.cargo = Arc::new(outcome.cargo);
        if outcome.delivered > 0 {
            let n = u64::from(outcome.delivered);
            Arc::make_mut(&mut self.carts)[at].score += n;
            self.score += n;
            self.stats.delivered += n;
        }
        Ok(())
    }
}

/// `⌊capacity × factor⌋`, never below 1.
fn scale(capacity: u32, factor: f64) -> u32 {
    ((f64::from(capacity) * factor).floor() as u32).max(1)
}
