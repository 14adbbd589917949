//! headless — runs a cartlines game without any front end.
//!
//! A greedy bot plays: it strings every new station onto the network as
//! soon as a line credit allows, spends cart credits on the busiest line,
//! and upgrades the most crowded station.  Frames are fed at a fixed 60 fps
//! until the time limit or until a station overflows.
//!
//! ```text
//! cargo run -p headless -- [config.json]
//! RUST_LOG=debug cargo run -p headless
//! ```

use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use tracing::info;

use cl_core::{CargoId, CartId, GameConfig, LineId, StationId};
use cl_game::{Arrival, BfsRouter, Game, GameBuilder, GameObserver, GameState, Itinerary, Station};

// ── Constants ─────────────────────────────────────────────────────────────────

const FPS:          u32 = 60;
const SIM_SECONDS:  u32 = 15 * 60;
/// The bot looks at the board once per this many frames.
const THINK_FRAMES: u32 = FPS / 2;

// ── Observer ──────────────────────────────────────────────────────────────────

#[derive(Default)]
struct Tally {
    arrivals:   u64,
    deliveries: u64,
    stations:   u64,
    reroutes:   u64,
}

impl GameObserver for Tally {
    fn on_cart_arrived(&mut self, _arrival: &Arrival, delivered: u32) {
        self.arrivals += 1;
        if delivered > 0 {
            self.deliveries += 1;
        }
    }

    fn on_cargo_rerouted(&mut self, _cargo: CargoId, _itinerary: &Itinerary) {
        self.reroutes += 1;
    }

    fn on_station_spawned(&mut self, station: &Station) {
        self.stations += 1;
        info!(station = %station.id, kind = %station.cargo_type, at = %station.position, "station opened");
    }

    fn on_round_advanced(&mut self, round: u32) {
        info!(round, "new round");
    }

    fn on_game_lost(&mut self, state: &GameState) {
        info!(score = state.score, round = state.round, "game over");
    }
}

// ── Bot ───────────────────────────────────────────────────────────────────────

fn is_served(state: &GameState, station: StationId) -> bool {
    state.lines.iter().any(|l| l.serves(station))
}

/// Connect the unserved station closest to the network with a two-stop
/// line.  With no network yet, chain every station in id order.
fn plan_line(state: &GameState) -> Option<Vec<StationId>> {
    if state.credits.lines == 0 {
        return None;
    }
    if state.lines.is_empty() {
        let all: Vec<_> = state.stations.iter().map(|s| s.id).collect();
        return (all.len() >= 2).then_some(all);
    }
    let served: Vec<&Station> = state.stations.iter().filter(|s| is_served(state, s.id)).collect();
    state
        .stations
        .iter()
        .filter(|s| !is_served(state, s.id))
        .filter_map(|s| {
            served
                .iter()
                .map(|t| (s.position.distance(t.position), t.id))
                .min_by(|a, b| a.0.total_cmp(&b.0))
                .map(|(d, t)| (d, vec![t, s.id]))
        })
        .min_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, stops)| stops)
}

/// The line whose stations hold the most waiting cargo.
fn busiest_line(state: &GameState) -> Option<LineId> {
    if state.credits.carts == 0 {
        return None;
    }
    state
        .lines
        .iter()
        .max_by_key(|l| l.stations.iter().map(|&s| state.waiting_at(s)).sum::<usize>())
        .map(|l| l.id)
}

/// Fullest station relative to its capacity.
fn most_crowded_station(state: &GameState) -> Option<StationId> {
    if state.credits.station_upgrades == 0 {
        return None;
    }
    state
        .stations
        .iter()
        .max_by_key(|s| state.waiting_at(s.id) * 100 / s.capacity.max(1) as usize)
        .map(|s| s.id)
}

fn think(game: &mut Game<BfsRouter>, tally: &mut Tally) -> Result<()> {
    if let Some(stops) = plan_line(game.state()) {
        let count = stops.len();
        let (line, cart) = game.add_line(stops, tally)?;
        info!(line = %line, cart = %cart, stops = count, "line opened");
    }
    if let Some(line) = busiest_line(game.state()) {
        let cart: CartId = game.add_cart(line)?;
        info!(line = %line, cart = %cart, "cart added");
    }
    if let Some(station) = most_crowded_station(game.state()) {
        game.upgrade_station(station)?;
        info!(station = %station, "station upgraded");
    }
    Ok(())
}

// ── main ──────────────────────────────────────────────────────────────────────

fn load_config(path: Option<&Path>) -> Result<GameConfig> {
    let Some(path) = path else {
        return Ok(GameConfig::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let arg = std::env::args().nth(1);
    let config = load_config(arg.as_deref().map(Path::new))?;

    println!("=== headless — cartlines ===");
    println!(
        "Seed: {}  |  Board: {}×{}  |  Limit: {} s at {FPS} fps",
        config.seed, config.board_size, config.board_size, SIM_SECONDS
    );
    println!();

    let mut game = GameBuilder::new(config).build()?;
    let mut tally = Tally::default();
    let dt = 1.0 / f64::from(FPS);

    let t0 = Instant::now();
    let mut frames = 0u32;
    while frames < SIM_SECONDS * FPS && !game.state().lost {
        if frames % THINK_FRAMES == 0 {
            think(&mut game, &mut tally)?;
        }
        game.frame(dt, &mut tally)?;
        frames += 1;
    }
    let elapsed = t0.elapsed();

    let state = game.state();
    let census = game.census();
    println!("Simulated {:.1} s in {:.3} s", f64::from(frames) / f64::from(FPS), elapsed.as_secs_f64());
    println!("  outcome    : {}", if state.lost { "lost" } else { "survived" });
    println!("  round      : {}", state.round);
    println!("  score      : {}", state.score);
    println!("  stations   : {} ({} spawned by timer)", state.stations.len(), tally.stations);
    println!("  lines      : {}", state.lines.len());
    println!("  carts      : {}", state.carts.len());
    println!("  arrivals   : {} ({} with deliveries)", tally.arrivals, tally.deliveries);
    println!("  reroutes   : {}", tally.reroutes);
    println!();
    println!("{:<12} {:>8}", "Cargo", "Count");
    println!("{}", "-".repeat(21));
    println!("{:<12} {:>8}", "spawned", census.spawned);
    println!("{:<12} {:>8}", "delivered", census.delivered);
    println!("{:<12} {:>8}", "on carts", census.on_carts);
    println!("{:<12} {:>8}", "waiting", census.waiting);
    println!("{:<12} {:>8}", "unroutable", census.unroutable);
    println!("{:<12} {:>8}", "lost w/ line", census.removed_with_lines);
    if !census.is_balanced() {
        anyhow::bail!("cargo census does not balance: {census:?}");
    }
    Ok(())
}
