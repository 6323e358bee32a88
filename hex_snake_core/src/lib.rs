// hex_snake_core: hex-grid pathfinding for the hex snake game.
//
// This crate holds the data structures and search behind the game's snakes:
// a cube-coordinate hex map whose adjacency is resolved through a spatial
// index, an indexed binary heap with in-place key updates, and A* over the
// map. Rendering, timing, and the snake's own lifecycle live elsewhere; they
// call in here to build a map, flip cell states, and ask for paths.
//
// Module overview:
// - `types.rs`:       CubeCoord, CellId, CellState.
// - `cell.rs`:        Cell record + state-change observers.
// - `spatial.rs`:     Generic bounded point tree (Octree / Quadtree aliases).
// - `heap.rs`:        PriorityIndexHeap, fixed capacity, O(log n) update.
// - `grid.rs`:        HexMap trait + HexGrid (construction, neighbors, world transforms).
// - `pathfinding.rs`: A* over a HexMap.
// - `config.rs`:      GridConfig, loaded from JSON.
// - `prng`:           Re-exported from `hex_snake_prng`, the only randomness source.
//
// **Threading.** Everything here is synchronous. Neighbor lists are fixed
// after construction; cell state changes need `&mut HexGrid`, searches take
// `&HexGrid`, so the borrow checker keeps the two from overlapping.

pub mod cell;
pub mod config;
pub mod grid;
pub mod heap;
pub mod pathfinding;
pub use hex_snake_prng as prng;
pub mod spatial;
pub mod types;

pub use cell::{Cell, StateChange, SubscriptionId};
pub use config::GridConfig;
pub use grid::{GridError, HexGrid, HexMap};
pub use pathfinding::{PathError, PathResult, find_path, find_path_or_empty};
pub use types::{CellId, CellState, CubeCoord};
