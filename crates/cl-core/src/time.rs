//! Simulation time model.
//!
//! # Design
//!
//! Two kinds of time coexist:
//!
//! - **Frame time** — real elapsed seconds fed to the movement engine each
//!   frame, so cart motion is frame-rate independent.
//! - **Clock ticks** — a monotonically increasing `Tick` counter advanced by
//!   a fixed-period [`IntervalTimer`].  Rounds, credits, and the spawn-rate
//!   decay are all expressed in clock ticks, so economy arithmetic is exact.
//!
//! Every periodic source (clock, cargo spawner, station spawner) is an
//! `IntervalTimer` driven by the same frame delta.  A stopped timer never
//! fires, which is how edit mode, loss, and restarts cancel pending work.

use std::fmt;

// ── Tick ─────────────────────────────────────────────────────────────────────

/// An absolute clock tick counter.  The game starts at tick 1.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tick(pub u64);

impl Tick {
    pub const START: Tick = Tick(1);

    /// `true` when this tick lands on a boundary of a `period`-tick cycle.
    /// A zero period never matches.
    #[inline]
    pub fn is_boundary(self, period: u64) -> bool {
        period > 0 && self.0.is_multiple_of(period)
    }
}

impl std::ops::Add<u64> for Tick {
    type Output = Tick;
    #[inline]
    fn add(self, rhs: u64) -> Tick {
        Tick(self.0 + rhs)
    }
}

impl fmt::Display for Tick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T{}", self.0)
    }
}

// ── IntervalTimer ─────────────────────────────────────────────────────────────

/// A repeating timer advanced by explicit elapsed-time deltas.
///
/// Behaves like a cancellable interval: while running it fires once every
/// `period_ms` of accumulated time; while stopped it accumulates nothing and
/// never fires.  Changing the period restarts the interval from zero.
#[derive(Clone, Debug, PartialEq)]
pub struct IntervalTimer {
    period_ms:  f64,
    elapsed_ms: f64,
    running:    bool,
}

impl IntervalTimer {
    /// A stopped timer with the given period.
    pub fn new(period_ms: f64) -> Self {
        Self { period_ms, elapsed_ms: 0.0, running: false }
    }

    /// A timer that is already running.
    pub fn started(period_ms: f64) -> Self {
        let mut timer = Self::new(period_ms);
        timer.start();
        timer
    }

    /// Start (or restart) the interval from zero.
    pub fn start(&mut self) {
        self.elapsed_ms = 0.0;
        self.running = true;
    }

    /// Stop the timer and discard any partially elapsed interval.
    pub fn stop(&mut self) {
        self.elapsed_ms = 0.0;
        self.running = false;
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.running
    }

    #[inline]
    pub fn period_ms(&self) -> f64 {
        self.period_ms
    }

    /// Replace the period.  A running timer restarts its interval.
    pub fn set_period(&mut self, period_ms: f64) {
        self.period_ms = period_ms;
        if self.running {
            self.start();
        }
    }

    /// Accumulate `delta_ms` and return how many times the timer fired.
    ///
    /// Returns 0 when stopped or when the period is not positive.
    pub fn advance(&mut self, delta_ms: f64) -> u32 {
        if !self.running || self.period_ms <= 0.0 || delta_ms <= 0.0 {
            return 0;
        }
        self.elapsed_ms += delta_ms;
        let mut fired = 0;
        while self.elapsed_ms >= self.period_ms {
            self.elapsed_ms -= self.period_ms;
            fired += 1;
        }
        fired
    }
}
