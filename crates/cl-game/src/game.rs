//! The `Game` driver: reducer plus every derived structure, kept in step.

use std::sync::Arc;

use tracing::{debug, warn};

use cl_core::{
    CargoId, CargoType, CartId, GameConfig, GameId, GridPoint, IntervalTimer, LineId, SimRng, StationId,
    WorldPoint,
};
use cl_mobility::{MovementEngine, MovementEvent};
use cl_spatial::{GeometryArena, Router, RoutingGraph, StationIndex};

use crate::action::GameAction;
use crate::model::{CargoLocation, Cart, Itinerary, Line};
use crate::spawner::{pick_cargo, StationSpawner};
use crate::state::{Census, GameState};
use crate::{GameError, GameObserver, GameResult, NoopObserver};

/// Owns the authoritative [`GameState`] and everything derived from it.
///
/// # Frame loop
///
/// ```text
/// frame(dt):
///   ① Movement  — step every cart; dispatch arrivals through the reducer
///                 (drop / deliver / load) and report positions.
///   ② Clock     — TickClock per clock-timer fire (rounds, credits, decay).
///   ③ Cargo     — one cargo per station per cargo-timer fire.
///   ④ Stations  — one station per station-timer fire.
/// ```
///
/// Every mutation goes through [`dispatch`](Self::dispatch), which applies
/// the action and then brings the geometry arena, routing graph, station
/// index, cart motions, and timers in line with the new state.  Any line
/// added or removed reroutes all cargo.
///
/// Create via [`GameBuilder`][crate::GameBuilder].
pub struct Game<R: Router> {
    state:  GameState,
    config: Arc<GameConfig>,
    router: R,

    arena:    GeometryArena,
    graph:    RoutingGraph,
    index:    StationIndex,
    movement: MovementEngine,

    /// Lines and carts as last reflected in the derived structures.
    synced_lines: Arc<Vec<Line>>,
    synced_carts: Arc<Vec<Cart>>,

    clock_timer:   IntervalTimer,
    cargo_timer:   IntervalTimer,
    station_timer: IntervalTimer,

    stations: StationSpawner,
    rng:      SimRng,
}

impl<R: Router> Game<R> {
    pub(crate) fn new(config: GameConfig, router: R) -> Self {
        let config = Arc::new(config);
        let state = GameState::new(Arc::clone(&config), GameId(0));
        let mut game = Self {
            arena:         GeometryArena::new(config.cart_speed),
            graph:         RoutingGraph::new(),
            index:         StationIndex::new(),
            movement:      MovementEngine::new(),
            synced_lines:  Arc::default(),
            synced_carts:  Arc::default(),
            clock_timer:   IntervalTimer::new(config.clock_interval_ms),
            cargo_timer:   IntervalTimer::new(state.cargo_spawn_interval_ms),
            station_timer: IntervalTimer::new(config.station_spawn_interval_ms),
            stations:      StationSpawner::new(),
            rng:           SimRng::new(config.seed),
            router,
            config,
            state,
        };
        game.sync_timers();
        game
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    #[inline]
    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn arena(&self) -> &GeometryArena {
        &self.arena
    }

    pub fn graph(&self) -> &RoutingGraph {
        &self.graph
    }

    pub fn movement(&self) -> &MovementEngine {
        &self.movement
    }

    /// `(clock, cargo, station)` timers.
    pub fn timers(&self) -> (&IntervalTimer, &IntervalTimer, &IntervalTimer) {
        (&self.clock_timer, &self.cargo_timer, &self.station_timer)
    }

    pub fn cart_position(&self, cart: CartId) -> Option<WorldPoint> {
        self.movement.position(cart, &self.arena)
    }

    /// Cargo accounting for the current game.
    pub fn census(&self) -> Census {
        self.state.census()
    }

    // ── Frame loop ────────────────────────────────────────────────────────

    /// Advance the game by `dt_secs` of real time.
    ///
    /// Does nothing unless the game is running and not lost.
    ///
    /// # Errors
    ///
    /// [`GameError::InvalidArrival`] means the motion state and the line
    /// table disagree; the game cannot continue consistently.
    pub fn frame<O: GameObserver>(&mut self, dt_secs: f64, observer: &mut O) -> GameResult<()> {
        if !self.is_live() {
            return Ok(());
        }

        // ── ① Movement ────────────────────────────────────────────────────
        for event in self.movement.step(&self.arena, dt_secs) {
            match event {
                MovementEvent::Arrived(arrival) => {
                    let next = self.state.apply(GameAction::ArriveAtStation {
                        cart:         arrival.cart,
                        station:      arrival.station,
                        next_station: arrival.next_station,
                    })?;
                    let delivered = next.stats.delivered - self.state.stats.delivered;
                    self.state = next;
                    observer.on_cart_arrived(&arrival, delivered as u32);
                    self.reroute_stranded(arrival.station, observer)?;
                }
                MovementEvent::Position { cart, point } => observer.on_cart_moved(cart, point),
            }
        }

        // ── ② – ④ Timers ──────────────────────────────────────────────────
        let dt_ms = dt_secs * 1_000.0;
        for _ in 0..self.clock_timer.advance(dt_ms) {
            let round = self.state.round;
            self.dispatch(GameAction::TickClock, observer)?;
            if self.state.round != round {
                observer.on_round_advanced(self.state.round);
            }
        }
        for _ in 0..self.cargo_timer.advance(dt_ms) {
            if !self.is_live() {
                break;
            }
            self.spawn_cargo(observer)?;
        }
        for _ in 0..self.station_timer.advance(dt_ms) {
            if !self.is_live() {
                break;
            }
            self.spawn_station(observer)?;
        }
        Ok(())
    }

    fn is_live(&self) -> bool {
        self.state.running && !self.state.lost
    }

    // ── Actions ───────────────────────────────────────────────────────────

    /// Apply `action` and resynchronise every derived structure.
    pub fn dispatch<O: GameObserver>(&mut self, action: GameAction, observer: &mut O) -> GameResult<()> {
        let next = self.state.apply(action)?;
        self.commit(next, observer)
    }

    /// Place a station by hand.
    pub fn add_station(&mut self, position: GridPoint, cargo_type: CargoType) -> GameResult<StationId> {
        let id = self.state.next_station_id();
        self.dispatch(GameAction::AddStation { position, cargo_type }, &mut NoopObserver)?;
        Ok(id)
    }

    /// Open a line through `stations` with its first cart.
    pub fn add_line<O: GameObserver>(
        &mut self,
        stations: Vec<StationId>,
        observer: &mut O,
    ) -> GameResult<(LineId, CartId)> {
        let line = self.state.free_line_slot().ok_or(GameError::NoFreeLineSlot)?;
        let cart = self.state.next_cart_id();
        let next = self
            .state
            .apply_all([GameAction::AddLine { stations }, GameAction::AddCart { line }])?;
        self.commit(next, observer)?;
        Ok((line, cart))
    }

    pub fn remove_line<O: GameObserver>(&mut self, line: LineId, observer: &mut O) -> GameResult<()> {
        self.dispatch(GameAction::RemoveLine { line }, observer)
    }

    pub fn add_cart(&mut self, line: LineId) -> GameResult<CartId> {
        let id = self.state.next_cart_id();
        self.dispatch(GameAction::AddCart { line }, &mut NoopObserver)?;
        Ok(id)
    }

    pub fn upgrade_station(&mut self, station: StationId) -> GameResult<()> {
        self.dispatch(GameAction::UpgradeStation { station }, &mut NoopObserver)
    }

    pub fn upgrade_cart(&mut self, cart: CartId) -> GameResult<()> {
        self.dispatch(GameAction::UpgradeCart { cart }, &mut NoopObserver)
    }

    /// Enter or leave simulation mode.  Leaving stops every timer.
    pub fn set_running(&mut self, running: bool) -> GameResult<()> {
        self.dispatch(GameAction::SetRunning(running), &mut NoopObserver)
    }

    /// Start a fresh game with a new id and new opening stations.
    pub fn restart<O: GameObserver>(&mut self, observer: &mut O) -> GameResult<GameId> {
        self.dispatch(GameAction::RestartGame, observer)?;
        Ok(self.state.game_id)
    }

    // ── Synchronisation ───────────────────────────────────────────────────

    fn commit<O: GameObserver>(&mut self, next: GameState, observer: &mut O) -> GameResult<()> {
        let prev = std::mem::replace(&mut self.state, next);
        let restarted = prev.game_id != self.state.game_id;
        if restarted {
            self.reset_derived();
        }

        self.sync_stations();
        let lines_changed = self.sync_lines()?;
        self.sync_carts()?;
        if lines_changed {
            self.reroute_all(observer)?;
        }
        self.sync_timers();

        if self.state.lost && !prev.lost {
            observer.on_game_lost(&self.state);
        }
        if restarted {
            self.spawn_opening_stations(observer)?;
        }
        Ok(())
    }

    /// Forget everything derived from the previous game.
    fn reset_derived(&mut self) {
        self.arena.clear();
        self.graph = RoutingGraph::new();
        self.index = StationIndex::new();
        self.movement.clear();
        self.synced_lines = Arc::default();
        self.synced_carts = Arc::default();
        self.stations = StationSpawner::new();
        self.rng = self.rng.child(self.state.game_id.0);
        self.clock_timer.stop();
        self.cargo_timer.stop();
        self.station_timer.stop();
    }

    /// Stations are only ever added, so anything the graph lacks is new.
    fn sync_stations(&mut self) {
        if self.state.stations.len() == self.graph.node_count() {
            return;
        }
        for s in self.state.stations.iter() {
            if !self.graph.contains(s.id) {
                self.graph.add_station(s.id, s.cargo_type);
                self.index.insert(s.id, s.position);
            }
        }
    }

    /// Bring geometry and the routing graph in line with the line table.
    /// Returns `true` if any line was added or removed.
    fn sync_lines(&mut self) -> GameResult<bool> {
        if Arc::ptr_eq(&self.synced_lines, &self.state.lines) {
            return Ok(false);
        }
        let current = Arc::clone(&self.state.lines);
        let removed: Vec<LineId> = self
            .synced_lines
            .iter()
            .filter(|old| !current.contains(old))
            .map(|old| old.id)
            .collect();
        let added: Vec<&Line> = current
            .iter()
            .filter(|line| !self.synced_lines.contains(line))
            .collect();

        for &id in &removed {
            self.arena.remove(id);
            self.movement.remove_line(id);
        }
        for line in &added {
            let stops = line
                .stations
                .iter()
                .map(|&id| -> GameResult<_> { Ok((id, self.state.station(id)?.position)) })
                .collect::<GameResult<Vec<_>>>()?;
            self.arena.rebuild(line.id, &stops);
        }

        if removed.is_empty() {
            for line in &added {
                self.graph.add_line(&line.stations)?;
            }
        } else {
            self.graph = RoutingGraph::from_topology(
                self.state.stations.iter().map(|s| (s.id, s.cargo_type)),
                current.iter().map(|l| l.stations.as_slice()),
            )?;
        }

        debug!(
            added = added.len(),
            removed = removed.len(),
            segments = self.graph.edge_count(),
            "line topology synced"
        );
        let changed = !added.is_empty() || !removed.is_empty();
        self.synced_lines = current;
        Ok(changed)
    }

    /// Place new carts and drop motions of carts that no longer exist.
    fn sync_carts(&mut self) -> GameResult<()> {
        if Arc::ptr_eq(&self.synced_carts, &self.state.carts) {
            return Ok(());
        }
        let carts = Arc::clone(&self.state.carts);
        let stale: Vec<CartId> = self
            .movement
            .store
            .iter()
            .map(|m| m.cart)
            .filter(|id| carts.iter().all(|c| c.id != *id))
            .collect();
        for id in stale {
            self.movement.remove_cart(id);
        }
        for cart in carts.iter() {
            if !self.movement.store.contains(cart.id) {
                self.movement.place(cart.id, cart.line, &self.arena)?;
            }
        }
        self.synced_carts = carts;
        Ok(())
    }

    /// Recompute every cargo itinerary against the current graph.
    ///
    /// Waiting cargo is routed afresh from its station.  Cargo on a cart
    /// keeps its next hop and is routed onwards from there; without an
    /// onward route it keeps its old itinerary until it is dropped, where
    /// [`reroute_stranded`](Self::reroute_stranded) picks it up.
    fn reroute_all<O: GameObserver>(&mut self, observer: &mut O) -> GameResult<()> {
        let mut reroutes = Vec::new();
        for cargo in self.state.cargo.iter() {
            let itinerary = match cargo.location {
                CargoLocation::Station(at) => {
                    Itinerary::from_route(self.router.route(&self.graph, at, cargo.cargo_type))
                }
                CargoLocation::Cart(_) => {
                    let Some(hop) = cargo.next_hop() else { continue };
                    let Some(onward) = self.router.route(&self.graph, hop, cargo.cargo_type) else {
                        continue;
                    };
                    let mut hops = Vec::with_capacity(onward.len() + 1);
                    hops.push(hop);
                    hops.extend(onward.hops);
                    Itinerary::Hops(hops)
                }
            };
            if itinerary != cargo.itinerary {
                reroutes.push((cargo.id, itinerary));
            }
        }
        self.apply_reroutes(reroutes, observer)
    }

    /// Reroute cargo waiting at `station` whose next hop is no longer a
    /// neighbour of it.  This is cargo that boarded before its onward line
    /// was removed; with no route left it becomes `Unroutable`.
    fn reroute_stranded<O: GameObserver>(&mut self, station: StationId, observer: &mut O) -> GameResult<()> {
        let reroutes: Vec<_> = self
            .state
            .cargo
            .iter()
            .filter(|c| c.is_at(station))
            .filter(|c| c.next_hop().is_some_and(|hop| !self.graph.has_segment(station, hop)))
            .map(|c| {
                let route = self.router.route(&self.graph, station, c.cargo_type);
                (c.id, Itinerary::from_route(route))
            })
            .collect();
        self.apply_reroutes(reroutes, observer)
    }

    fn apply_reroutes<O: GameObserver>(
        &mut self,
        reroutes: Vec<(CargoId, Itinerary)>,
        observer: &mut O,
    ) -> GameResult<()> {
        if reroutes.is_empty() {
            return Ok(());
        }
        let actions = reroutes
            .iter()
            .map(|(cargo, itinerary)| GameAction::RerouteCargo { cargo: *cargo, itinerary: itinerary.clone() });
        self.state = self.state.apply_all(actions)?;
        debug!(rerouted = reroutes.len(), "cargo rerouted");
        for (cargo, itinerary) in &reroutes {
            observer.on_cargo_rerouted(*cargo, itinerary);
        }
        Ok(())
    }

    /// Timers run exactly while the game is live; the cargo timer follows
    /// the decaying spawn interval.
    fn sync_timers(&mut self) {
        if !self.is_live() {
            self.clock_timer.stop();
            self.cargo_timer.stop();
            self.station_timer.stop();
            return;
        }
        if !self.clock_timer.is_running() {
            self.clock_timer.start();
            self.cargo_timer.start();
            self.station_timer.start();
        }
        if self.cargo_timer.period_ms() != self.state.cargo_spawn_interval_ms {
            self.cargo_timer.set_period(self.state.cargo_spawn_interval_ms);
        }
    }

    // ── Spawning ──────────────────────────────────────────────────────────

    pub(crate) fn spawn_opening_stations<O: GameObserver>(&mut self, observer: &mut O) -> GameResult<()> {
        for _ in 0..self.config.initial_stations {
            self.spawn_station(observer)?;
        }
        Ok(())
    }

    fn spawn_station<O: GameObserver>(&mut self, observer: &mut O) -> GameResult<()> {
        let Some((position, cargo_type)) = self.stations.next_station(&self.config, &self.index, &mut self.rng)
        else {
            warn!(
                stations = self.state.stations.len(),
                attempts = crate::spawner::MAX_SITE_ATTEMPTS,
                "no free cell for a new station"
            );
            return Ok(());
        };
        let id = self.state.next_station_id();
        self.dispatch(GameAction::AddStation { position, cargo_type }, observer)?;
        if let Ok(station) = self.state.station(id) {
            observer.on_station_spawned(station);
        }
        Ok(())
    }

    /// One cargo per station, stopping early if the game is lost.
    fn spawn_cargo<O: GameObserver>(&mut self, observer: &mut O) -> GameResult<()> {
        for _ in 0..self.state.stations.len() {
            let Some((cargo_type, station)) = pick_cargo(&self.state.stations, &mut self.rng) else {
                return Ok(());
            };
            let itinerary = Itinerary::from_route(self.router.route(&self.graph, station, cargo_type));
            let id = self.state.next_cargo_id();
            self.dispatch(GameAction::AddCargo { cargo_type, station, itinerary }, observer)?;
            if let Some(cargo) = self.state.cargo_by_id(id) {
                observer.on_cargo_spawned(cargo);
            }
            if self.state.lost {
                break;
            }
        }
        Ok(())
    }
}
