// Core types shared across the hex snake core.
//
// Defines the cube coordinate (`CubeCoord`), the compact cell handle
// (`CellId`), and the cell state enum. Cube coordinates store only `r` and
// `q`; `s` is always derived as `-r - q`, so `r + q + s == 0` holds for every
// value that can be constructed.
//
// See also: `cell.rs` for the `Cell` record, `grid.rs` for the lattice that
// hands out `CellId`s.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Spatial types
// ---------------------------------------------------------------------------

/// A hex position in cube coordinates.
///
/// Pointy-top orientation: `q` runs along the horizontal axis, `r` along the
/// rows. The third axis `s` is implied.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CubeCoord {
    pub r: i32,
    pub q: i32,
}

impl CubeCoord {
    pub const ORIGIN: Self = Self::new(0, 0);

    /// Unit offsets to the six adjacent hexes, as `(r, q)` pairs.
    pub const DIRECTIONS: [(i32, i32); 6] = [(0, 1), (-1, 1), (-1, 0), (0, -1), (1, -1), (1, 0)];

    pub const fn new(r: i32, q: i32) -> Self {
        Self { r, q }
    }

    /// Wraps for coordinates whose `r + q` leaves the `i32` range; no map
    /// is that large.
    pub const fn s(self) -> i32 {
        self.r.wrapping_neg().wrapping_sub(self.q)
    }

    /// Step count between two hexes: the largest of the three axis deltas.
    /// Computed in `i64`, saturating at `u32::MAX`.
    pub fn distance(self, other: Self) -> u32 {
        let (r1, q1) = (i64::from(self.r), i64::from(self.q));
        let (r2, q2) = (i64::from(other.r), i64::from(other.q));
        let dr = (r1 - r2).unsigned_abs();
        let dq = (q1 - q2).unsigned_abs();
        let ds = ((r2 + q2) - (r1 + q1)).unsigned_abs();
        u32::try_from(dr.max(dq).max(ds)).unwrap_or(u32::MAX)
    }

    /// Distance from the origin. A cell lies on a radius-R map iff this is <= R.
    pub fn ring(self) -> u32 {
        self.distance(Self::ORIGIN)
    }

    pub fn offset(self, dr: i32, dq: i32) -> Self {
        Self::new(self.r.wrapping_add(dr), self.q.wrapping_add(dq))
    }

    /// The six adjacent coordinates, whether or not they are on any map.
    pub fn adjacent(self) -> [Self; 6] {
        Self::DIRECTIONS.map(|(dr, dq)| self.offset(dr, dq))
    }

    /// The `(r, q, s)` triple as a point, which is how cells are keyed in the
    /// spatial index.
    pub fn to_point(self) -> Vec3 {
        Vec3::new(self.r as f32, self.q as f32, self.s() as f32)
    }
}

impl fmt::Display for CubeCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.r, self.q, self.s())
    }
}

// ---------------------------------------------------------------------------
// Cell handles
// ---------------------------------------------------------------------------

/// Compact handle into a `HexGrid`'s cell arena. Only meaningful for the
/// grid that issued it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellId(pub u32);

impl CellId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for CellId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CellId({})", self.0)
    }
}

// ---------------------------------------------------------------------------
// Cell state
// ---------------------------------------------------------------------------

/// What currently occupies a cell. Walls and snake bodies are `Blocked`;
/// food and other goals are `Marked`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellState {
    #[default]
    Default,
    Blocked,
    Marked,
}

impl CellState {
    pub fn is_traversable(self) -> bool {
        !matches!(self, Self::Blocked)
    }
}
