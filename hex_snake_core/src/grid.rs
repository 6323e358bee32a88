// Hexagonal map in cube coordinates.
//
// `HexGrid` builds every cell of a radius-R hexagon once, stores them in a
// `Vec` indexed by `CellId` (construction order, stable), and indexes them in
// an `Octree` keyed by their `(r, q, s)` triple. Adjacency is resolved once,
// eagerly, by asking the octree for everything inside a unit box around each
// cell: on cube coordinates the only lattice points with every axis delta in
// {-1, 0, 1} are the cell itself and its six hex neighbors.
//
// The map surface the pathfinder needs is the `HexMap` trait, so searches can
// run over any map implementation. `HexGrid` is the one shipped here.
//
// Cell membership never changes after construction. Cell *state* changes go
// through `set_state`, which notifies observers and records the cell in the
// dirty list for consumers that poll.
//
// See also: `spatial.rs` for the octree, `cell.rs` for `Cell` and the
// observer registry, `pathfinding.rs` for A* over a `HexMap`.

use crate::cell::{Cell, Neighbors, StateCallback, StateChange, StateObservers, SubscriptionId};
use crate::config::{ConfigError, GridConfig};
use crate::spatial::{Aabb, Octree};
use crate::types::{CellId, CellState, CubeCoord};
use glam::{Vec2, Vec3};
use hex_snake_prng::SnakeRng;
use rustc_hash::FxHashMap;
use thiserror::Error;
use tracing::debug;

const SQRT_3: f32 = 1.732_050_8;

/// Edge length of the box used to collect a cell's neighbors from the index.
const NEIGHBOR_QUERY_SIZE: f32 = 2.0;

#[derive(Debug, Error)]
pub enum GridError {
    #[error("no cell at cube coordinate (r: {r}, q: {q})")]
    CoordinateNotFound { r: i32, q: i32 },
    #[error("location is not a finite point")]
    InvalidLocation,
    #[error("{0} does not belong to this grid")]
    UnknownCell(CellId),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// What a map must provide to be searched and rendered.
pub trait HexMap {
    fn cell_count(&self) -> usize;

    fn cell(&self, id: CellId) -> Option<&Cell>;

    /// World-space center of the hex at axial `(r, q)`.
    fn axis_to_world(&self, r: i32, q: i32) -> Vec2;

    /// The cell whose hex contains `location`.
    fn cell_at_location(&self, location: Vec2) -> Result<CellId, GridError>;

    /// Exact step count between two cells, ignoring obstacles.
    fn distance_between_cells(&self, a: &Cell, b: &Cell) -> u32 {
        a.coord().distance(b.coord())
    }
}

#[derive(Debug)]
pub struct HexGrid {
    radius: u32,
    cell_radius: f32,
    cells: Vec<Cell>,
    index: Octree<CellId>,
    by_coord: FxHashMap<CubeCoord, CellId>,
    observers: StateObservers,
    dirty: Vec<CellId>,
    dirty_flags: Vec<bool>,
}

impl HexGrid {
    pub fn new(radius: u32, cell_radius: f32) -> Result<Self, GridError> {
        Self::from_config(&GridConfig::with_radius(radius, cell_radius))
    }

    pub fn from_config(config: &GridConfig) -> Result<Self, GridError> {
        config.validate()?;

        let radius = config.map_radius as i32;
        let mut index = Octree::new(
            Vec3::ZERO,
            2.0 * radius as f32,
            config.octree_max_divisions,
            config.octree_node_capacity,
        );
        let mut cells = Vec::with_capacity(config.cell_count());
        let mut by_coord = FxHashMap::default();

        for q in -radius..=radius {
            let r_min = (-radius).max(-q - radius);
            let r_max = radius.min(-q + radius);
            for r in r_min..=r_max {
                let coord = CubeCoord::new(r, q);
                let id = CellId(cells.len() as u32);
                cells.push(Cell::new(id, coord));
                by_coord.insert(coord, id);
                index.insert(id, coord.to_point());
            }
        }

        let count = cells.len();
        let mut grid = Self {
            radius: config.map_radius,
            cell_radius: config.cell_radius,
            cells,
            index,
            by_coord,
            observers: StateObservers::new(),
            dirty: Vec::new(),
            dirty_flags: vec![false; count],
        };
        grid.compute_neighbors();

        debug!(
            radius = grid.radius,
            cells = count,
            index_nodes = grid.index.node_count(),
            "built hex grid"
        );
        Ok(grid)
    }

    /// Fill every cell's neighbor list from the spatial index.
    fn compute_neighbors(&mut self) {
        for i in 0..self.cells.len() {
            let cell = &self.cells[i];
            let area = Aabb::from_center_size(cell.coord().to_point(), Vec3::splat(NEIGHBOR_QUERY_SIZE));
            let mut neighbors: Neighbors = self
                .index
                .query(&area)
                .into_iter()
                .copied()
                .filter(|&id| id != cell.id())
                .collect();
            neighbors.sort_unstable();
            self.cells[i].set_neighbors(neighbors);
        }
    }

    pub fn radius(&self) -> u32 {
        self.radius
    }

    pub fn cell_radius(&self) -> f32 {
        self.cell_radius
    }

    /// All cells in construction order.
    pub fn cells(&self) -> impl Iterator<Item = &Cell> + '_ {
        self.cells.iter()
    }

    pub fn cell_at_coord(&self, coord: CubeCoord) -> Option<CellId> {
        self.by_coord.get(&coord).copied()
    }

    pub fn contains_coord(&self, coord: CubeCoord) -> bool {
        coord.ring() <= self.radius
    }

    /// The underlying spatial index, keyed by `(r, q, s)`.
    pub fn index(&self) -> &Octree<CellId> {
        &self.index
    }

    pub fn neighbors(&self, id: CellId) -> &[CellId] {
        self.cells.get(id.index()).map(Cell::neighbors).unwrap_or_default()
    }

    /// Change a cell's state. Observers and the dirty list only hear about
    /// actual changes. Returns the previous state.
    pub fn set_state(&mut self, id: CellId, state: CellState) -> Result<CellState, GridError> {
        if id.index() >= self.cells.len() {
            return Err(GridError::UnknownCell(id));
        }
        Ok(self.apply_state(id.index(), state))
    }

    /// Reset every cell to `CellState::Default`, notifying as usual.
    pub fn clear_states(&mut self) {
        for index in 0..self.cells.len() {
            self.apply_state(index, CellState::Default);
        }
    }

    /// `index` must be in bounds.
    fn apply_state(&mut self, index: usize, state: CellState) -> CellState {
        let cell = &mut self.cells[index];
        let previous = cell.replace_state(state);
        if previous != state {
            let change = StateChange {
                cell: cell.id(),
                coord: cell.coord(),
                previous,
                current: state,
            };
            if !self.dirty_flags[index] {
                self.dirty_flags[index] = true;
                self.dirty.push(change.cell);
            }
            self.observers.notify(&change);
        }
        previous
    }

    pub fn subscribe(&mut self, callback: StateCallback) -> SubscriptionId {
        self.observers.subscribe(callback)
    }

    pub fn subscribe_cell(&mut self, cell: CellId, callback: StateCallback) -> SubscriptionId {
        self.observers.subscribe_cell(cell, callback)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.observers.unsubscribe(id)
    }

    /// Cells whose state changed since the last call, in first-change order.
    pub fn take_dirty(&mut self) -> Vec<CellId> {
        for id in &self.dirty {
            self.dirty_flags[id.index()] = false;
        }
        std::mem::take(&mut self.dirty)
    }

    /// The first traversable cell of a cyclic scan that starts at a random
    /// cell. Not uniform over open cells: a cell right after a run of blocked
    /// ones is picked more often. `None` when every cell is blocked.
    pub fn random_traversable_cell(&self, rng: &mut SnakeRng) -> Option<CellId> {
        let all: Vec<CellId> = self.cells.iter().map(Cell::id).collect();
        self.first_traversable_from_random(&all, rng)
    }

    /// A traversable neighbor of `id`, scanning cyclically from a random
    /// start. `None` when the cell is boxed in. Used as a fallback step when
    /// no path exists.
    pub fn random_traversable_neighbor(&self, id: CellId, rng: &mut SnakeRng) -> Option<CellId> {
        self.first_traversable_from_random(self.neighbors(id), rng)
    }

    fn first_traversable_from_random(&self, ids: &[CellId], rng: &mut SnakeRng) -> Option<CellId> {
        let start = rng.index(ids.len())?;
        (0..ids.len())
            .map(|offset| ids[(start + offset) % ids.len()])
            .find(|&id| self.cells[id.index()].is_traversable())
    }
}

impl HexMap for HexGrid {
    fn cell_count(&self) -> usize {
        self.cells.len()
    }

    fn cell(&self, id: CellId) -> Option<&Cell> {
        self.cells.get(id.index())
    }

    fn axis_to_world(&self, r: i32, q: i32) -> Vec2 {
        let (r, q) = (r as f32, q as f32);
        Vec2::new(
            self.cell_radius * (SQRT_3 * q + SQRT_3 / 2.0 * r),
            self.cell_radius * (1.5 * r),
        )
    }

    fn cell_at_location(&self, location: Vec2) -> Result<CellId, GridError> {
        if !location.is_finite() {
            return Err(GridError::InvalidLocation);
        }
        let r = ((2.0 / 3.0 * location.y) / self.cell_radius).round() as i32;
        let q = ((SQRT_3 / 3.0 * location.x - 1.0 / 3.0 * location.y) / self.cell_radius).round() as i32;
        self.cell_at_coord(CubeCoord::new(r, q))
            .ok_or(GridError::CoordinateNotFound { r, q })
    }
}
