//! Unit and scenario tests for cl-game.

use std::sync::Arc;

use cl_core::{
    CargoId, CargoType, CartId, CoreError, GameConfig, GameId, GridPoint, LineId, StationId,
    WorldPoint,
};
use cl_mobility::Arrival;
use cl_spatial::{BfsRouter, Router};

use crate::{
    Cargo, CargoLocation, Cart, CreditKind, GameAction, GameBuilder, GameError, GameObserver,
    GameState, Itinerary, NoopObserver, transfer,
};

// ── Helpers ───────────────────────────────────────────────────────────────────

const A: StationId = StationId(0);
const B: StationId = StationId(1);
const C: StationId = StationId(2);
const D: StationId = StationId(3);

/// No opening stations and no timed station spawns, so boards are built by
/// hand.
fn quiet_config() -> GameConfig {
    GameConfig {
        initial_stations:          0,
        station_spawn_interval_ms: 1.0e9,
        ..GameConfig::default()
    }
}

fn fresh_state(config: GameConfig) -> GameState {
    GameState::new(Arc::new(config), GameId(0))
}

fn apply_all(state: &GameState, actions: Vec<GameAction>) -> GameState {
    state.apply_all(actions).unwrap()
}

fn add_station(x: i32, y: i32, cargo_type: CargoType) -> GameAction {
    GameAction::AddStation { position: GridPoint::new(x, y), cargo_type }
}

fn hops(stops: &[StationId]) -> Itinerary {
    Itinerary::Hops(stops.to_vec())
}

/// A(0,0) circle, B(5,0) triangle, C(10,0) square.
fn abc_actions() -> Vec<GameAction> {
    vec![
        add_station(0, 0, CargoType::Circle),
        add_station(5, 0, CargoType::Triangle),
        add_station(10, 0, CargoType::Square),
    ]
}

/// A–B–C board with line 0 and its first cart 0.
fn abc_state(config: GameConfig) -> GameState {
    let mut actions = abc_actions();
    actions.push(GameAction::AddLine { stations: vec![A, B, C] });
    actions.push(GameAction::AddCart { line: LineId(0) });
    apply_all(&fresh_state(config), actions)
}

fn cart(id: u32, capacity: u32) -> Cart {
    Cart { id: CartId(id), line: LineId(0), capacity, created_round: 1, score: 0 }
}

fn cargo(id: u32, location: CargoLocation, itinerary: Itinerary) -> Cargo {
    Cargo { id: CargoId(id), cargo_type: CargoType::Square, location, itinerary }
}

#[derive(Default)]
struct Recorder {
    arrivals:  Vec<Arrival>,
    delivered: u32,
    moves:     usize,
    spawned:   Vec<CargoId>,
    rerouted:  Vec<(CargoId, Itinerary)>,
    stations:  Vec<StationId>,
    rounds:    Vec<u32>,
    losses:    usize,
}

impl GameObserver for Recorder {
    fn on_cart_moved(&mut self, _cart: CartId, _point: WorldPoint) {
        self.moves += 1;
    }
    fn on_cart_arrived(&mut self, arrival: &Arrival, delivered: u32) {
        self.arrivals.push(*arrival);
        self.delivered += delivered;
    }
    fn on_cargo_spawned(&mut self, cargo: &Cargo) {
        self.spawned.push(cargo.id);
    }
    fn on_cargo_rerouted(&mut self, cargo: CargoId, itinerary: &Itinerary) {
        self.rerouted.push((cargo, itinerary.clone()));
    }
    fn on_station_spawned(&mut self, station: &crate::Station) {
        self.stations.push(station.id);
    }
    fn on_round_advanced(&mut self, round: u32) {
        self.rounds.push(round);
    }
    fn on_game_lost(&mut self, _state: &GameState) {
        self.losses += 1;
    }
}

// ── Itinerary ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod itinerary {
    use super::*;

    #[test]
    fn no_route_becomes_unroutable() {
        assert_eq!(Itinerary::from_route(None), Itinerary::Unroutable);
        assert!(Itinerary::Unroutable.next_hop().is_none());
        assert!(!Itinerary::Unroutable.is_complete());
    }

    #[test]
    fn pop_hop_walks_to_completion() {
        let mut it = hops(&[B, C]);
        assert_eq!(it.next_hop(), Some(B));
        it.pop_hop();
        assert_eq!(it.next_hop(), Some(C));
        it.pop_hop();
        assert!(it.is_complete());
        it.pop_hop();
        assert!(it.is_complete());
    }
}

// ── Transfer protocol ─────────────────────────────────────────────────────────

#[cfg(test)]
mod transfer_protocol {
    use super::*;

    #[test]
    fn final_hop_is_delivered() {
        let list = vec![cargo(0, CargoLocation::Cart(CartId(0)), hops(&[C]))];
        let out = transfer(&list, &cart(0, 6), C, B);
        assert_eq!(out.dropped, 1);
        assert_eq!(out.delivered, 1);
        assert!(out.cargo.is_empty());
    }

    #[test]
    fn intermediate_hop_drops_and_waits() {
        let list = vec![cargo(0, CargoLocation::Cart(CartId(0)), hops(&[B, D]))];
        // Heading to C, but the cargo continues to D: it stays at B.
        let out = transfer(&list, &cart(0, 6), B, C);
        assert_eq!((out.dropped, out.delivered, out.loaded), (1, 0, 0));
        assert_eq!(out.cargo[0].location, CargoLocation::Station(B));
        assert_eq!(out.cargo[0].itinerary, hops(&[D]));
    }

    #[test]
    fn dropped_cargo_reboards_when_the_cart_continues_its_way() {
        let list = vec![cargo(0, CargoLocation::Cart(CartId(0)), hops(&[B, C]))];
        let out = transfer(&list, &cart(0, 6), B, C);
        assert_eq!((out.dropped, out.loaded), (1, 1));
        assert_eq!(out.cargo[0].location, CargoLocation::Cart(CartId(0)));
        assert_eq!(out.cargo[0].itinerary, hops(&[C]));
    }

    #[test]
    fn load_respects_capacity() {
        let list: Vec<_> = (0..3)
            .map(|i| cargo(i, CargoLocation::Station(A), hops(&[B, C])))
            .collect();
        let out = transfer(&list, &cart(0, 2), A, B);
        assert_eq!(out.loaded, 2);
        assert_eq!(out.cargo.iter().filter(|c| c.is_on(CartId(0))).count(), 2);
        assert_eq!(out.cargo.iter().filter(|c| c.is_at(A)).count(), 1);
        // Earlier cargo boards first.
        assert!(out.cargo[0].is_on(CartId(0)));
        assert!(out.cargo[2].is_at(A));
    }

    #[test]
    fn full_cart_loads_nothing() {
        let list = vec![
            cargo(0, CargoLocation::Cart(CartId(0)), hops(&[C])),
            cargo(1, CargoLocation::Station(A), hops(&[B])),
        ];
        let out = transfer(&list, &cart(0, 1), A, B);
        assert_eq!(out.loaded, 0);
        assert!(out.cargo[1].is_at(A));
    }

    #[test]
    fn only_cargo_heading_for_the_next_stop_boards() {
        let list = vec![
            cargo(0, CargoLocation::Station(B), hops(&[A])),
            cargo(1, CargoLocation::Station(B), Itinerary::Unroutable),
            cargo(2, CargoLocation::Station(B), hops(&[C])),
            cargo(3, CargoLocation::Station(A), hops(&[C])),
        ];
        let out = transfer(&list, &cart(0, 6), B, C);
        let boarded: Vec<_> = out.cargo.iter().filter(|c| c.is_on(CartId(0))).map(|c| c.id).collect();
        assert_eq!(boarded, vec![CargoId(2)]);
    }

    #[test]
    fn finished_cargo_not_dropped_by_this_cart_is_not_delivered() {
        let list = vec![
            cargo(0, CargoLocation::Station(C), hops(&[])),
            cargo(1, CargoLocation::Cart(CartId(7)), hops(&[])),
            cargo(2, CargoLocation::Cart(CartId(0)), hops(&[C])),
        ];
        let out = transfer(&list, &cart(0, 6), C, B);
        assert_eq!((out.dropped, out.delivered), (1, 1));
        let left: Vec<_> = out.cargo.iter().map(|c| c.id).collect();
        assert_eq!(left, vec![CargoId(0), CargoId(1)]);
    }

    #[test]
    fn other_carts_cargo_is_untouched() {
        let list = vec![cargo(0, CargoLocation::Cart(CartId(7)), hops(&[B]))];
        let out = transfer(&list, &cart(0, 6), B, C);
        assert_eq!(out.cargo, list);
        assert_eq!((out.dropped, out.delivered, out.loaded), (0, 0, 0));
    }
}

// ── Reducer ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod reducer {
    use super::*;

    #[test]
    fn initial_state() {
        let s = fresh_state(GameConfig::default());
        assert_eq!(s.clock.0, 1);
        assert_eq!(s.round, 1);
        assert!(s.running);
        assert!(!s.lost);
        assert_eq!(s.credits.lines, 2);
        assert_eq!(s.credits.carts, 0);
        assert_eq!(s.credits.station_upgrades, 0);
        assert!(s.stations.is_empty());
    }

    #[test]
    fn stations_get_sequential_ids_and_default_capacity() {
        let s = apply_all(&fresh_state(quiet_config()), abc_actions());
        let ids: Vec<_> = s.stations.iter().map(|st| st.id).collect();
        assert_eq!(ids, vec![A, B, C]);
        assert!(s.stations.iter().all(|st| st.capacity == 20 && st.created_round == 1));
        assert_eq!(s.next_station_id(), StationId(3));
    }

    #[test]
    fn add_line_spends_a_line_credit_and_grants_a_cart_credit() {
        let s = apply_all(&fresh_state(quiet_config()), abc_actions());
        let s = s.apply(GameAction::AddLine { stations: vec![A, B, C] }).unwrap();
        assert_eq!(s.lines[0].id, LineId(0));
        assert_eq!(s.credits.lines, 1);
        assert_eq!(s.credits.carts, 1);
    }

    #[test]
    fn add_line_validation() {
        let s = apply_all(&fresh_state(quiet_config()), abc_actions());
        assert!(matches!(
            s.apply(GameAction::AddLine { stations: vec![A] }),
            Err(GameError::InvalidLine(_))
        ));
        assert!(matches!(
            s.apply(GameAction::AddLine { stations: vec![A, A, B] }),
            Err(GameError::InvalidLine(_))
        ));
        assert_eq!(
            s.apply(GameAction::AddLine { stations: vec![A, StationId(9)] }).unwrap_err(),
            GameError::Core(CoreError::StationNotFound(StationId(9)))
        );
    }

    #[test]
    fn coincident_stations_cannot_be_consecutive() {
        let s = apply_all(
            &fresh_state(quiet_config()),
            vec![add_station(3, 3, CargoType::Circle), add_station(3, 3, CargoType::Star)],
        );
        assert!(matches!(
            s.apply(GameAction::AddLine { stations: vec![A, B] }),
            Err(GameError::InvalidLine(_))
        ));
    }

    #[test]
    fn add_line_without_credit_fails() {
        let s = apply_all(&fresh_state(quiet_config()), abc_actions());
        let s = apply_all(&s, vec![
            GameAction::AddLine { stations: vec![A, B] },
            GameAction::AddLine { stations: vec![B, C] },
        ]);
        assert_eq!(
            s.apply(GameAction::AddLine { stations: vec![A, C] }).unwrap_err(),
            GameError::NoCredit(CreditKind::Line)
        );
    }

    #[test]
    fn line_slots_run_out_and_are_reused() {
        let config = GameConfig { line_slots: 1, ..quiet_config() };
        let s = apply_all(&fresh_state(config), abc_actions());
        let s = s.apply(GameAction::AddLine { stations: vec![A, B] }).unwrap();
        assert_eq!(
            s.apply(GameAction::AddLine { stations: vec![B, C] }).unwrap_err(),
            GameError::NoFreeLineSlot
        );
        let s = s.apply(GameAction::RemoveLine { line: LineId(0) }).unwrap();
        let s = s.apply(GameAction::AddLine { stations: vec![B, C] }).unwrap();
        assert_eq!(s.lines[0].id, LineId(0));
        assert_eq!(s.lines[0].stations, vec![B, C]);
    }

    #[test]
    fn lowest_free_slot_is_taken() {
        let s = apply_all(&fresh_state(quiet_config()), abc_actions());
        let s = apply_all(&s, vec![
            GameAction::AddLine { stations: vec![A, B] },
            GameAction::AddLine { stations: vec![B, C] },
            GameAction::RemoveLine { line: LineId(0) },
        ]);
        assert_eq!(s.free_line_slot(), Some(LineId(0)));
    }

    #[test]
    fn add_cart_needs_a_line_and_a_credit() {
        let s = abc_state(quiet_config());
        assert_eq!(s.carts.len(), 1);
        assert_eq!(s.credits.carts, 0);
        assert_eq!(
            s.apply(GameAction::AddCart { line: LineId(0) }).unwrap_err(),
            GameError::NoCredit(CreditKind::Cart)
        );
        let rich = abc_state(GameConfig { initial_cart_credits: 1, ..quiet_config() });
        assert_eq!(
            rich.apply(GameAction::AddCart { line: LineId(5) }).unwrap_err(),
            GameError::Core(CoreError::LineNotFound(LineId(5)))
        );
        let s = rich.apply(GameAction::AddCart { line: LineId(0) }).unwrap();
        assert_eq!(s.carts_on(LineId(0)).count(), 2);
        assert_eq!(s.carts[1].capacity, 6);
    }

    #[test]
    fn upgrades_floor_and_spend_credits() {
        let config = GameConfig {
            initial_station_upgrades: 1,
            initial_cart_credits:     1,
            station_capacity:         7,
            ..quiet_config()
        };
        let s = abc_state(config);
        let s = s.apply(GameAction::UpgradeStation { station: B }).unwrap();
        // ⌊7 × 1.2⌋ = 8
        assert_eq!(s.station(B).unwrap().capacity, 8);
        assert_eq!(s.credits.station_upgrades, 0);
        assert_eq!(
            s.apply(GameAction::UpgradeStation { station: B }).unwrap_err(),
            GameError::NoCredit(CreditKind::StationUpgrade)
        );

        let s = s.apply(GameAction::UpgradeCart { cart: CartId(0) }).unwrap();
        assert_eq!(s.cart(CartId(0)).unwrap().capacity, 12);
        assert_eq!(
            s.apply(GameAction::UpgradeCart { cart: CartId(0) }).unwrap_err(),
            GameError::NoCredit(CreditKind::Cart)
        );
    }

    #[test]
    fn upgrade_never_drops_capacity_to_zero() {
        let config = GameConfig {
            initial_station_upgrades: 1,
            station_capacity:         1,
            station_upgrade_factor:   0.5,
            ..quiet_config()
        };
        let s = abc_state(config);
        let s = s.apply(GameAction::UpgradeStation { station: A }).unwrap();
        assert_eq!(s.station(A).unwrap().capacity, 1);
    }

    #[test]
    fn overflow_loses_the_game() {
        let config = GameConfig { station_capacity: 2, ..quiet_config() };
        let s = apply_all(&fresh_state(config), abc_actions());
        let spawn = || GameAction::AddCargo {
            cargo_type: CargoType::Square,
            station:    A,
            itinerary:  Itinerary::Unroutable,
        };
        let s = apply_all(&s, vec![spawn(), spawn()]);
        assert!(!s.lost);
        assert!(s.running);
        let s = s.apply(spawn()).unwrap();
        assert!(s.lost);
        assert!(!s.running);
        assert_eq!(s.waiting_at(A), 3);
    }

    #[test]
    fn cargo_with_nothing_left_to_visit_is_delivered_on_spawn() {
        let s = apply_all(&fresh_state(quiet_config()), abc_actions());
        let s = s
            .apply(GameAction::AddCargo { cargo_type: CargoType::Circle, station: A, itinerary: hops(&[]) })
            .unwrap();
        assert!(s.cargo.is_empty());
        assert_eq!(s.stats.spawned, 1);
        assert_eq!(s.stats.delivered, 1);
        assert_eq!(s.next_cargo_id(), CargoId(1));
    }

    #[test]
    fn arrival_applies_transfer_and_scores() {
        let s = abc_state(quiet_config());
        let s = apply_all(&s, vec![
            GameAction::AddCargo { cargo_type: CargoType::Square, station: A, itinerary: hops(&[B, C]) },
            GameAction::ArriveAtStation { cart: CartId(0), station: A, next_station: B },
        ]);
        assert_eq!(s.load_of(CartId(0)), 1);

        let s = apply_all(&s, vec![
            GameAction::ArriveAtStation { cart: CartId(0), station: B, next_station: C },
            GameAction::ArriveAtStation { cart: CartId(0), station: C, next_station: B },
        ]);
        assert!(s.cargo.is_empty());
        assert_eq!(s.score, 1);
        assert_eq!(s.cart(CartId(0)).unwrap().score, 1);
        assert!(s.census().is_balanced());
    }

    #[test]
    fn arrival_off_the_line_is_rejected() {
        let s = apply_all(&fresh_state(quiet_config()), abc_actions());
        let s = apply_all(&s, vec![
            add_station(20, 20, CargoType::Star),
            GameAction::AddLine { stations: vec![A, B] },
            GameAction::AddCart { line: LineId(0) },
        ]);
        assert_eq!(
            s.apply(GameAction::ArriveAtStation { cart: CartId(0), station: D, next_station: A })
                .unwrap_err(),
            GameError::InvalidArrival { cart: CartId(0), station: D, next_station: A }
        );
        assert!(matches!(
            s.apply(GameAction::ArriveAtStation { cart: CartId(0), station: A, next_station: C }),
            Err(GameError::InvalidArrival { .. })
        ));
    }

    #[test]
    fn remove_line_takes_its_carts_and_their_cargo() {
        let config = GameConfig { initial_cart_credits: 1, ..quiet_config() };
        let s = abc_state(config);
        let s = apply_all(&s, vec![
            GameAction::AddCart { line: LineId(0) },
            GameAction::AddCargo { cargo_type: CargoType::Square, station: A, itinerary: hops(&[B, C]) },
            GameAction::AddCargo { cargo_type: CargoType::Circle, station: C, itinerary: hops(&[B, A]) },
            GameAction::ArriveAtStation { cart: CartId(0), station: A, next_station: B },
        ]);
        assert_eq!(s.carts.len(), 2);
        assert_eq!(s.load_of(CartId(0)), 1);
        assert_eq!(s.credits.lines, 1);

        let s = s.apply(GameAction::RemoveLine { line: LineId(0) }).unwrap();
        assert!(s.lines.is_empty());
        assert!(s.carts.is_empty());
        // The waiting cargo stays; only the cargo on the cart goes.
        assert_eq!(s.cargo.len(), 1);
        assert!(s.cargo[0].is_at(C));
        assert_eq!(s.credits.lines, 2);
        assert_eq!(s.stats.removed_with_lines, 1);
        assert!(s.census().is_balanced());
    }

    #[test]
    fn reroute_replaces_or_delivers() {
        let s = apply_all(&fresh_state(quiet_config()), abc_actions());
        let s = s
            .apply(GameAction::AddCargo { cargo_type: CargoType::Square, station: A, itinerary: Itinerary::Unroutable })
            .unwrap();
        let s = s.apply(GameAction::RerouteCargo { cargo: CargoId(0), itinerary: hops(&[B, C]) }).unwrap();
        assert_eq!(s.cargo[0].itinerary, hops(&[B, C]));
        let s = s.apply(GameAction::RerouteCargo { cargo: CargoId(0), itinerary: hops(&[]) }).unwrap();
        assert!(s.cargo.is_empty());
        assert_eq!(s.stats.delivered, 1);
    }

    #[test]
    fn clock_rounds_and_credits() {
        let mut s = fresh_state(quiet_config());
        for _ in 0..58 {
            s = s.apply(GameAction::TickClock).unwrap();
        }
        assert_eq!(s.clock.0, 59);
        assert_eq!(s.round, 1);
        s = s.apply(GameAction::TickClock).unwrap();
        assert_eq!(s.clock.0, 60);
        assert_eq!(s.round, 2);
        assert_eq!(s.credits.lines, 3);
        assert_eq!(s.credits.carts, 1);
        assert_eq!(s.credits.station_upgrades, 1);
    }

    #[test]
    fn spawn_interval_decays_every_130_ticks() {
        let mut s = fresh_state(quiet_config());
        for _ in 0..129 {
            s = s.apply(GameAction::TickClock).unwrap();
        }
        assert_eq!(s.clock.0, 130);
        assert!((s.cargo_spawn_interval_ms - 9_000.0).abs() < 1e-6);
        assert_eq!(s.round, 3);
    }

    #[test]
    fn set_running_and_restart() {
        let s = abc_state(quiet_config());
        let paused = s.apply(GameAction::SetRunning(false)).unwrap();
        assert!(!paused.running);
        let fresh = paused.apply(GameAction::RestartGame).unwrap();
        assert_ne!(fresh.game_id, s.game_id);
        assert!(fresh.running);
        assert!(fresh.stations.is_empty() && fresh.lines.is_empty());
        assert_eq!(fresh.credits.lines, 2);
    }

    #[test]
    fn previous_state_is_left_intact() {
        let before = abc_state(quiet_config());
        let after = before.apply(add_station(30, 30, CargoType::Star)).unwrap();
        assert_eq!(before.stations.len(), 3);
        assert_eq!(after.stations.len(), 4);
        // Untouched collections are shared, not copied.
        assert!(Arc::ptr_eq(&before.lines, &after.lines));
        assert!(Arc::ptr_eq(&before.carts, &after.carts));
        assert!(!Arc::ptr_eq(&before.stations, &after.stations));
    }

    #[test]
    fn failed_batch_changes_nothing() {
        let s = abc_state(quiet_config());
        let err = s.apply_all(vec![
            add_station(30, 30, CargoType::Star),
            GameAction::AddCart { line: LineId(0) },
        ]);
        assert!(err.is_err());
        assert_eq!(s.stations.len(), 3);
    }
}

// ── Spawners ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod spawners {
    use cl_core::SimRng;
    use cl_spatial::StationIndex;

    use super::*;
    use crate::spawner::{StationSpawner, pick_cargo};

    #[test]
    fn opening_stations_cycle_types_in_the_half_board() {
        let config = GameConfig::default();
        let mut index = StationIndex::new();
        let mut rng = SimRng::new(7);
        let mut spawner = StationSpawner::new();
        let mut types = Vec::new();
        for i in 0..3u32 {
            let (p, t) = spawner.next_station(&config, &index, &mut rng).unwrap();
            assert!((1..24).contains(&p.x) && (1..24).contains(&p.y), "{p}");
            assert!(index.is_clear(p, config.min_station_spacing));
            index.insert(StationId(i), p);
            types.push(t);
        }
        assert_eq!(types, vec![CargoType::Circle, CargoType::Triangle, CargoType::Square]);
        assert_eq!(spawner.placed(), 3);
    }

    #[test]
    fn crowded_board_yields_no_site() {
        let config = GameConfig { board_size: 6, min_station_spacing: 10.0, ..GameConfig::default() };
        let mut index = StationIndex::new();
        index.insert(StationId(0), GridPoint::new(2, 2));
        let mut spawner = StationSpawner::new();
        assert!(spawner.next_station(&config, &index, &mut SimRng::new(1)).is_none());
        assert_eq!(spawner.placed(), 0);
    }

    #[test]
    fn cargo_needs_two_types_and_a_foreign_home() {
        let s = apply_all(&fresh_state(quiet_config()), vec![
            add_station(0, 0, CargoType::Circle),
            add_station(9, 9, CargoType::Circle),
        ]);
        let mut rng = SimRng::new(3);
        assert!(pick_cargo(&s.stations, &mut rng).is_none());

        let s = s.apply(add_station(20, 20, CargoType::Star)).unwrap();
        for _ in 0..50 {
            let (t, home) = pick_cargo(&s.stations, &mut rng).unwrap();
            assert_ne!(s.station(home).unwrap().cargo_type, t);
        }
    }
}

// ── Game driver ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod driver {
    use super::*;
    use crate::Game;

    fn quiet_game() -> Game<BfsRouter> {
        GameBuilder::new(quiet_config()).build().unwrap()
    }

    /// A–B–C board with line 0 and cart 0 under a driver.
    fn abc_game(config: GameConfig) -> Game<BfsRouter> {
        let mut game = GameBuilder::new(config).build().unwrap();
        game.add_station(GridPoint::new(0, 0), CargoType::Circle).unwrap();
        game.add_station(GridPoint::new(5, 0), CargoType::Triangle).unwrap();
        game.add_station(GridPoint::new(10, 0), CargoType::Square).unwrap();
        game.add_line(vec![A, B, C], &mut NoopObserver).unwrap();
        game
    }

    fn run(game: &mut Game<BfsRouter>, frames: usize, observer: &mut Recorder) {
        for _ in 0..frames {
            game.frame(1.0 / 60.0, observer).unwrap();
        }
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = GameConfig { cart_speed: 0.0, ..GameConfig::default() };
        assert!(matches!(
            GameBuilder::new(config).build(),
            Err(GameError::Core(CoreError::Config(_)))
        ));
    }

    #[test]
    fn opening_board_is_seeded() {
        let a = GameBuilder::new(GameConfig::default()).build().unwrap();
        let b = GameBuilder::new(GameConfig::default()).build().unwrap();
        assert_eq!(a.state().stations.len(), 3);
        assert_eq!(a.state().stations, b.state().stations);
        for s in a.state().stations.iter() {
            for t in a.state().stations.iter().filter(|t| t.id != s.id) {
                assert!(s.position.distance(t.position) >= 4.0);
            }
        }
        let (clock, cargo, stations) = a.timers();
        assert!(clock.is_running() && cargo.is_running() && stations.is_running());
    }

    #[test]
    fn custom_router_is_used() {
        struct Nowhere;
        impl Router for Nowhere {
            fn route(&self, _: &cl_spatial::RoutingGraph, _: StationId, _: CargoType) -> Option<cl_spatial::Route> {
                None
            }
        }
        let mut game = GameBuilder::new(quiet_config()).router(Nowhere).build().unwrap();
        game.add_station(GridPoint::new(0, 0), CargoType::Circle).unwrap();
        game.add_station(GridPoint::new(5, 0), CargoType::Square).unwrap();
        game.dispatch(
            GameAction::AddCargo { cargo_type: CargoType::Square, station: A, itinerary: hops(&[B]) },
            &mut NoopObserver,
        )
        .unwrap();
        game.add_line(vec![A, B], &mut NoopObserver).unwrap();
        assert_eq!(game.state().cargo[0].itinerary, Itinerary::Unroutable);
    }

    #[test]
    fn add_line_builds_geometry_graph_and_first_cart() {
        let game = abc_game(quiet_config());
        assert!(game.arena().contains(LineId(0)));
        assert_eq!(game.graph().edge_count(), 2);
        assert_eq!(game.movement().store.len(), 1);
        let p = game.cart_position(CartId(0)).unwrap();
        assert_eq!((p.x, p.y), (0.0, 0.0));
        assert_eq!(game.state().credits.carts, 0);
    }

    #[test]
    fn cargo_rides_from_a_to_c() {
        let mut game = abc_game(quiet_config());
        let route = BfsRouter.route(game.graph(), A, CargoType::Square).unwrap();
        assert_eq!(route.hops, vec![B, C]);
        game.dispatch(
            GameAction::AddCargo { cargo_type: CargoType::Square, station: A, itinerary: hops(&route.hops) },
            &mut NoopObserver,
        )
        .unwrap();

        let mut rec = Recorder::default();
        run(&mut game, 1, &mut rec);
        assert_eq!(game.state().load_of(CartId(0)), 1);

        run(&mut game, 149, &mut rec);
        let stops: Vec<_> = rec.arrivals.iter().map(|a| a.station).collect();
        assert_eq!(stops, vec![A, B, C]);
        assert_eq!(rec.delivered, 1);
        assert_eq!(game.state().score, 1);
        assert!(game.state().cargo.is_empty());
        assert_eq!(rec.moves, 150);
    }

    #[test]
    fn line_added_reroutes_stranded_cargo() {
        let mut game = quiet_game();
        game.add_station(GridPoint::new(0, 0), CargoType::Circle).unwrap();
        game.add_station(GridPoint::new(5, 0), CargoType::Triangle).unwrap();
        game.add_station(GridPoint::new(10, 0), CargoType::Square).unwrap();
        game.dispatch(
            GameAction::AddCargo { cargo_type: CargoType::Square, station: A, itinerary: Itinerary::Unroutable },
            &mut NoopObserver,
        )
        .unwrap();

        let mut rec = Recorder::default();
        game.add_line(vec![A, B, C], &mut rec).unwrap();
        assert_eq!(rec.rerouted, vec![(CargoId(0), hops(&[B, C]))]);
        assert_eq!(game.state().cargo[0].itinerary, hops(&[B, C]));

        game.remove_line(LineId(0), &mut rec).unwrap();
        assert_eq!(game.state().cargo[0].itinerary, Itinerary::Unroutable);
        assert_eq!(game.graph().edge_count(), 0);
    }

    #[test]
    fn riding_cargo_without_onward_route_becomes_unroutable_when_dropped() {
        let mut game = quiet_game();
        game.add_station(GridPoint::new(0, 0), CargoType::Circle).unwrap();
        game.add_station(GridPoint::new(5, 0), CargoType::Triangle).unwrap();
        game.add_station(GridPoint::new(10, 0), CargoType::Square).unwrap();
        let (ab, _) = game.add_line(vec![A, B], &mut NoopObserver).unwrap();
        let (bc, _) = game.add_line(vec![B, C], &mut NoopObserver).unwrap();
        assert_eq!((ab, bc), (LineId(0), LineId(1)));
        game.dispatch(
            GameAction::AddCargo { cargo_type: CargoType::Square, station: A, itinerary: hops(&[B, C]) },
            &mut NoopObserver,
        )
        .unwrap();
        game.frame(1.0 / 60.0, &mut NoopObserver).unwrap();
        assert!(game.state().cargo[0].is_on(CartId(0)));

        game.remove_line(bc, &mut NoopObserver).unwrap();
        let c = &game.state().cargo[0];
        assert!(c.is_on(CartId(0)));
        assert_eq!(c.itinerary, hops(&[B, C]));

        // A–B is 5 cells at 5 cells/s: the cart reaches B within a second.
        let mut rec = Recorder::default();
        for _ in 0..120 {
            game.frame(1.0 / 60.0, &mut rec).unwrap();
        }
        let c = &game.state().cargo[0];
        assert_eq!(c.location, CargoLocation::Station(B));
        assert_eq!(c.itinerary, Itinerary::Unroutable);
        assert!(rec.rerouted.contains(&(c.id, Itinerary::Unroutable)));
        let census = game.census();
        assert_eq!((census.waiting, census.unroutable), (0, 1));
        assert!(census.is_balanced());
    }

    #[test]
    fn remove_line_with_two_carts_one_loaded() {
        let mut game = abc_game(GameConfig { initial_cart_credits: 1, ..quiet_config() });
        let second = game.add_cart(LineId(0)).unwrap();
        assert_eq!(second, CartId(1));
        game.dispatch(
            GameAction::AddCargo { cargo_type: CargoType::Square, station: A, itinerary: hops(&[B, C]) },
            &mut NoopObserver,
        )
        .unwrap();
        game.frame(1.0 / 60.0, &mut NoopObserver).unwrap();
        assert_eq!(game.state().load_of(CartId(0)), 1);
        assert_eq!(game.state().load_of(CartId(1)), 0);

        game.remove_line(LineId(0), &mut NoopObserver).unwrap();
        let s = game.state();
        assert!(s.carts.is_empty());
        assert!(s.cargo.is_empty());
        assert_eq!(s.credits.lines, 2);
        assert!(game.movement().store.is_empty());
        assert!(!game.arena().contains(LineId(0)));
        let census = game.census();
        assert_eq!(census.removed_with_lines, 1);
        assert!(census.is_balanced());
    }

    #[test]
    fn overflow_stops_every_timer() {
        let config = GameConfig { station_capacity: 1, ..quiet_config() };
        let mut game = GameBuilder::new(config).build().unwrap();
        game.add_station(GridPoint::new(0, 0), CargoType::Circle).unwrap();
        game.add_station(GridPoint::new(10, 10), CargoType::Triangle).unwrap();

        let mut rec = Recorder::default();
        game.frame(20.0, &mut rec).unwrap();
        assert!(game.state().lost);
        assert!(!game.state().running);
        assert_eq!(rec.losses, 1);
        let (clock, cargo, stations) = game.timers();
        assert!(!clock.is_running() && !cargo.is_running() && !stations.is_running());

        let frozen = game.state().clock;
        game.frame(50.0, &mut rec).unwrap();
        assert_eq!(game.state().clock, frozen);
        assert_eq!(rec.losses, 1);
    }

    #[test]
    fn edit_mode_pauses_timers() {
        let mut game = quiet_game();
        game.set_running(false).unwrap();
        assert!(!game.timers().0.is_running());
        game.frame(100.0, &mut NoopObserver).unwrap();
        assert_eq!(game.state().clock.0, 1);

        game.set_running(true).unwrap();
        assert!(game.timers().0.is_running());
        game.frame(1.0, &mut NoopObserver).unwrap();
        assert_eq!(game.state().clock.0, 2);
    }

    #[test]
    fn rounds_and_decay_follow_the_clock() {
        let mut game = quiet_game();
        let mut rec = Recorder::default();
        game.frame(60.0, &mut rec).unwrap();
        assert_eq!(game.state().clock.0, 61);
        assert_eq!(rec.rounds, vec![2]);
        assert_eq!(game.state().credits.lines, 3);

        game.frame(70.0, &mut rec).unwrap();
        assert_eq!(game.state().clock.0, 131);
        assert!((game.timers().1.period_ms() - 9_000.0).abs() < 1e-6);
    }

    #[test]
    fn station_timer_spawns_stations() {
        let config = GameConfig { initial_stations: 0, ..GameConfig::default() };
        let mut game = GameBuilder::new(config).build().unwrap();
        let mut rec = Recorder::default();
        game.frame(35.0, &mut rec).unwrap();
        assert_eq!(rec.stations, vec![StationId(0)]);
        assert!(game.graph().contains(StationId(0)));
    }

    #[test]
    fn restart_gives_a_fresh_game() {
        let mut game = GameBuilder::new(GameConfig::default()).build().unwrap();
        let first = game.state().game_id;
        let stops: Vec<_> = game.state().stations.iter().map(|s| s.id).collect();
        game.add_line(stops, &mut NoopObserver).unwrap();
        game.frame(5.0, &mut NoopObserver).unwrap();

        let mut rec = Recorder::default();
        let id = game.restart(&mut rec).unwrap();
        assert_ne!(id, first);
        let s = game.state();
        assert_eq!(s.clock.0, 1);
        assert!(s.lines.is_empty() && s.carts.is_empty() && s.cargo.is_empty());
        assert_eq!(s.stations.len(), 3);
        assert_eq!(rec.stations.len(), 3);
        assert!(game.movement().store.is_empty());
        assert!(game.arena().is_empty());
        assert!(game.timers().0.is_running());
    }

    #[test]
    fn long_run_conserves_cargo_and_respects_capacity() {
        let mut game = GameBuilder::new(GameConfig::default()).build().unwrap();
        let stops: Vec<_> = game.state().stations.iter().map(|s| s.id).collect();
        game.add_line(stops, &mut NoopObserver).unwrap();

        let mut rec = Recorder::default();
        for frame in 0..60 * 120 {
            game.frame(1.0 / 60.0, &mut rec).unwrap();
            if frame % 30 == 0 {
                let s = game.state();
                for cart in s.carts.iter() {
                    assert!(s.load_of(cart.id) <= cart.capacity as usize);
                }
                assert!(s.census().is_balanced());
            }
        }
        let census = game.census();
        assert!(census.is_balanced());
        assert_eq!(census.spawned, rec.spawned.len() as u64);
        assert_eq!(census.delivered, u64::from(rec.delivered));
        assert!(census.spawned > 0);
    }
}
