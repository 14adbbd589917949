//! Line path geometry and the per-line geometry arena.
//!
//! # Path construction
//!
//! The board is grid-restricted: lines bend at right angles.  For every
//! consecutive pair of stops whose coordinates both differ, one pivot point
//! `(end.x, start.y)` is inserted so the polyline is made only of
//! axis-aligned sub-segments:
//!
//! ```text
//!   A ─────────┐ pivot
//!              │
//!              B ───── C
//! ```
//!
//! Cumulative length is accumulated point by point.  Each stop's *progress*
//! is its cumulative length divided by the total, so the first stop sits at
//! exactly `0.0`, the last at exactly `1.0`, and intermediate stops are
//! strictly increasing.  The movement engine relies on that ordering to
//! detect arrivals with a single comparison.
//!
//! # Arena
//!
//! [`GeometryArena`] maps `LineId → LineGeometry`.  Entries are immutable:
//! a changed station sequence replaces the whole entry, and other lines'
//! entries are never touched.

use rustc_hash::FxHashMap;
use tracing::debug;

use cl_core::{GridPoint, LineId, StationId, WorldPoint};

// ── StationProgress ───────────────────────────────────────────────────────────

/// One stop of a line and where along the path it sits.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StationProgress {
    pub station:  StationId,
    pub position: GridPoint,
    /// Normalised distance from the first stop, in `[0.0, 1.0]`.
    pub progress: f64,
}

// ── LineGeometry ──────────────────────────────────────────────────────────────

/// Cached rectilinear path of one line.
///
/// Do not construct directly; use [`LineGeometry::build`].
#[derive(Clone, Debug, PartialEq)]
pub struct LineGeometry {
    /// Polyline vertices: stops plus inserted pivots, in traversal order.
    points: Vec<WorldPoint>,

    /// Cumulative path length at each vertex.  Same length as `points`.
    cumulative: Vec<f64>,

    /// Total path length in cells.
    length: f64,

    /// Progress table, one entry per stop, ascending progress.
    stations: Vec<StationProgress>,

    /// Progress units per second: `linear_speed / length`.
    speed: f64,
}

impl LineGeometry {
    /// The zero-length geometry of a line with fewer than two usable stops.
    pub fn degenerate() -> Self {
        Self {
            points:     Vec::new(),
            cumulative: Vec::new(),
            length:     0.0,
            stations:   Vec::new(),
            speed:      0.0,
        }
    }

    /// Build the path for `stops` (in traversal order) travelled at
    /// `linear_speed` cells per second.
    ///
    /// Fewer than two stops, or a path of zero total length, yields
    /// [`LineGeometry::degenerate`].
    pub fn build(stops: &[(StationId, GridPoint)], linear_speed: f64) -> Self {
        if stops.len() < 2 {
            return Self::degenerate();
        }

        let (_, first) = stops[0];
        let mut points     = vec![first.to_world()];
        let mut cumulative = vec![0.0];
        let mut stop_lengths = Vec::with_capacity(stops.len());
        stop_lengths.push(0.0);

        for pair in stops.windows(2) {
            let (_, start) = pair[0];
            let (_, end)   = pair[1];
            if start.is_diagonal_to(end) {
                extend_path(&mut points, &mut cumulative, GridPoint::new(end.x, start.y));
            }
            let at = extend_path(&mut points, &mut cumulative, end);
            stop_lengths.push(at);
        }

        let length = cumulative[cumulative.len() - 1];
        if length <= 0.0 {
            return Self::degenerate();
        }

        let last = stops.len() - 1;
        let stations = stops
            .iter()
            .zip(&stop_lengths)
            .enumerate()
            .map(|(i, (&(station, position), &at))| StationProgress {
                station,
                position,
                progress: match i {
                    0 => 0.0,
                    i if i == last => 1.0,
                    _ => at / length,
                },
            })
            .collect();

        Self {
            points,
            cumulative,
            length,
            stations,
            speed: linear_speed / length,
        }
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    /// `true` for the zero-length geometry; carts must never run on it.
    #[inline]
    pub fn is_degenerate(&self) -> bool {
        self.stations.is_empty()
    }

    #[inline]
    pub fn length(&self) -> f64 {
        self.length
    }

    /// Progress units per second.
    #[inline]
    pub fn speed(&self) -> f64 {
        self.speed
    }

    /// The progress table in traversal order.
    #[inline]
    pub fn stations(&self) -> &[StationProgress] {
        &self.stations
    }

    /// Polyline vertices including pivots.
    #[inline]
    pub fn points(&self) -> &[WorldPoint] {
        &self.points
    }

    /// Index of `station` in the progress table (first occurrence).
    pub fn position_of(&self, station: StationId) -> Option<usize> {
        self.stations.iter().position(|s| s.station == station)
    }

    /// `true` if the line stops at `station`.
    pub fn serves(&self, station: StationId) -> bool {
        self.position_of(station).is_some()
    }

    // ── Sampling ──────────────────────────────────────────────────────────

    /// World position at `progress`, the inverse of the length-to-progress
    /// mapping.  Progress is clamped to `[0, 1]`; returns `None` for a
    /// degenerate line.
    pub fn point_at(&self, progress: f64) -> Option<WorldPoint> {
        if self.is_degenerate() {
            return None;
        }
        let p = progress.clamp(0.0, 1.0);
        if p <= 0.0 {
            return self.points.first().copied();
        }
        if p >= 1.0 {
            return self.points.last().copied();
        }

        let distance = p * self.length;
        // First vertex strictly past `distance`; the segment starts one before.
        let upper = self.cumulative.partition_point(|&c| c <= distance);
        let i = upper.saturating_sub(1).min(self.points.len() - 2);
        let seg = self.cumulative[i + 1] - self.cumulative[i];
        if seg <= 0.0 {
            return Some(self.points[i]);
        }
        let t = (distance - self.cumulative[i]) / seg;
        Some(self.points[i].lerp(self.points[i + 1], t))
    }
}

/// Append `p` to the polyline and return the cumulative length at it.
fn extend_path(points: &mut Vec<WorldPoint>, cumulative: &mut Vec<f64>, p: GridPoint) -> f64 {
    let prev = points[points.len() - 1];
    let here = p.to_world();
    // Sub-segments are axis-aligned: one of the deltas is zero.
    let step = (here.x - prev.x).abs() + (here.y - prev.y).abs();
    let total = cumulative[cumulative.len() - 1] + step;
    points.push(here);
    cumulative.push(total);
    total
}

// ── GeometryArena ─────────────────────────────────────────────────────────────

/// Per-line geometry cache keyed by `LineId`.
///
/// One arena belongs to one game instance; nothing is shared between
/// instances.
#[derive(Clone, Debug, Default)]
pub struct GeometryArena {
    lines:        FxHashMap<LineId, LineGeometry>,
    linear_speed: f64,
}

impl GeometryArena {
    /// An empty arena building geometry for carts moving at `linear_speed`
    /// cells per second.
    pub fn new(linear_speed: f64) -> Self {
        Self { lines: FxHashMap::default(), linear_speed }
    }

    /// (Re)build the geometry of `line` from its stops, replacing any
    /// previous entry.  Other lines are untouched.
    pub fn rebuild(&mut self, line: LineId, stops: &[(StationId, GridPoint)]) -> &LineGeometry {
        let geometry = LineGeometry::build(stops, self.linear_speed);
        debug!(
            line = %line,
            stops = stops.len(),
            length = geometry.length(),
            degenerate = geometry.is_degenerate(),
            "line geometry rebuilt"
        );
        self.lines.insert(line, geometry);
        &self.lines[&line]
    }

    /// Drop the geometry of a removed line.
    pub fn remove(&mut self, line: LineId) -> Option<LineGeometry> {
        self.lines.remove(&line)
    }

    #[inline]
    pub fn get(&self, line: LineId) -> Option<&LineGeometry> {
        self.lines.get(&line)
    }

    pub fn contains(&self, line: LineId) -> bool {
        self.lines.contains_key(&line)
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }
}
