// A* pathfinding over a hex map.
//
// Search nodes live in an arena (`Vec<SearchNode>`) for the duration of one
// search; parent links are arena indices and are dropped with the arena when
// the search returns. The open set is a `PriorityIndexHeap` over arena
// handles, ordered by lowest f = g + h, ties going to the lower h (the node
// nearer the goal). A `checked` map covers every node ever created, open or
// closed, and a `closed` set holds fully expanded cells.
//
// Edges are unit cost and the heuristic is the exact cube distance, which is
// admissible, so the first time the goal is popped its path is shortest.
// Relaxation of already-open nodes through `update_item` is still performed.
//
// See also: `grid.rs` for the `HexMap` trait and `HexGrid`, `heap.rs` for
// the indexed heap.
//
// **Determinism.** Neighbor order comes from the map and heap ties are broken
// by (f, h) only, so the same map state always yields the same path.

use crate::cell::Cell;
use crate::grid::HexMap;
use crate::heap::{HeapError, HeapItem, PriorityIndexHeap};
use crate::types::CellId;
use rustc_hash::{FxHashMap, FxHashSet};
use std::cmp::Ordering;
use thiserror::Error;
use tracing::{debug, trace};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PathError {
    #[error("{0} is not a cell of the searched map")]
    UnknownCell(CellId),
    #[error("no path from {start} to {goal}")]
    UnreachableGoal { start: CellId, goal: CellId },
    #[error("open set: {0}")]
    Heap(#[from] HeapError),
}

/// The result of a successful search.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PathResult {
    /// Cells from the step after `start` up to and including `goal`. Empty
    /// when start and goal are the same cell.
    pub cells: Vec<CellId>,
    /// Nodes popped from the open set before the goal was reached.
    pub expanded: usize,
}

impl PathResult {
    /// Steps to the goal. Equal to the path cost, since every step costs 1.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn first_step(&self) -> Option<CellId> {
        self.cells.first().copied()
    }
}

struct SearchNode {
    cell: CellId,
    g: u32,
    h: u32,
    parent: Option<usize>,
    heap_index: usize,
}

impl SearchNode {
    fn f(&self) -> u32 {
        self.g + self.h
    }
}

impl HeapItem for SearchNode {
    fn heap_index(&self) -> usize {
        self.heap_index
    }

    fn set_heap_index(&mut self, index: usize) {
        self.heap_index = index;
    }

    fn cmp_priority(&self, other: &Self) -> Ordering {
        // Reversed: the smaller (f, h) is the higher priority.
        other
            .f()
            .cmp(&self.f())
            .then_with(|| other.h.cmp(&self.h))
    }
}

/// Shortest path from `start` to `goal` through traversable cells.
pub fn find_path<M: HexMap + ?Sized>(
    map: &M,
    start: CellId,
    goal: CellId,
) -> Result<PathResult, PathError> {
    find_path_filtered(map, start, goal, Cell::is_traversable)
}

/// Like `find_path`, but collapses every failure into an empty path, which
/// is what a movement loop wants when it will fall back to a random step.
pub fn find_path_or_empty<M: HexMap + ?Sized>(map: &M, start: CellId, goal: CellId) -> Vec<CellId> {
    match find_path(map, start, goal) {
        Ok(path) => path.cells,
        Err(err) => {
            debug!(%err, "no path, returning empty");
            Vec::new()
        }
    }
}

/// Like `find_path`, but a neighbor is entered only if `passable` accepts it.
/// The start cell itself is never tested.
pub fn find_path_filtered<M, F>(
    map: &M,
    start: CellId,
    goal: CellId,
    passable: F,
) -> Result<PathResult, PathError>
where
    M: HexMap + ?Sized,
    F: Fn(&Cell) -> bool,
{
    let start_cell = map.cell(start).ok_or(PathError::UnknownCell(start))?;
    let goal_cell = map.cell(goal).ok_or(PathError::UnknownCell(goal))?;

    let mut arena: Vec<SearchNode> = Vec::new();
    let mut open = PriorityIndexHeap::with_capacity(map.cell_count());
    let mut checked: FxHashMap<CellId, usize> = FxHashMap::default();
    let mut closed: FxHashSet<CellId> = FxHashSet::default();

    arena.push(SearchNode {
        cell: start,
        g: 0,
        h: map.distance_between_cells(start_cell, goal_cell),
        parent: None,
        heap_index: 0,
    });
    checked.insert(start, 0);
    open.insert(&mut arena, 0)?;

    let mut expanded = 0;
    while !open.is_empty() {
        let current = open.pop(&mut arena)?;
        let current_cell = arena[current].cell;
        closed.insert(current_cell);
        expanded += 1;

        if arena[current].h == 0 {
            let cells = retrace(&arena, current);
            trace!(%start, %goal, steps = cells.len(), expanded, "path found");
            return Ok(PathResult { cells, expanded });
        }

        let Some(cell) = map.cell(current_cell) else {
            continue;
        };
        let tentative_g = arena[current].g + 1;

        for &neighbor in cell.neighbors() {
            let Some(neighbor_cell) = map.cell(neighbor) else {
                continue;
            };
            if !passable(neighbor_cell) || closed.contains(&neighbor) {
                continue;
            }

            if let Some(&existing) = checked.get(&neighbor) {
                if arena[existing].g > tentative_g {
                    arena[existing].g = tentative_g;
                    arena[existing].parent = Some(current);
                    open.update_item(&mut arena, existing)?;
                }
                continue;
            }

            // Every open node is registered in `checked`, so an unchecked
            // neighbor can never already be queued.
            debug_assert!(!open.iter().any(|h| arena[h].cell == neighbor));

            arena.push(SearchNode {
                cell: neighbor,
                g: tentative_g,
                h: map.distance_between_cells(neighbor_cell, goal_cell),
                parent: Some(current),
                heap_index: 0,
            });
            let handle = arena.len() - 1;
            checked.insert(neighbor, handle);
            open.insert(&mut arena, handle)?;
        }
    }

    debug!(%start, %goal, expanded, "goal unreachable");
    Err(PathError::UnreachableGoal { start, goal })
}

/// Walk parent links back from `end`, excluding the start node.
fn retrace(arena: &[SearchNode], end: usize) -> Vec<CellId> {
    let mut cells = Vec::new();
    let mut node = end;
    while let Some(parent) = arena[node].parent {
        cells.push(arena[node].cell);
        node = parent;
    }
    cells.reverse();
    cells
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::HexGrid;
    use crate::types::{CellState, CubeCoord};

    fn at(grid: &HexGrid, r: i32, q: i32) -> CellId {
        grid.cell_at_coord(CubeCoord::new(r, q)).unwrap()
    }

    fn assert_valid_path(grid: &HexGrid, start: CellId, path: &[CellId]) {
        let mut prev = start;
        for &step in path {
            assert!(grid.neighbors(prev).contains(&step), "{prev} -> {step} is not a step");
            assert!(grid.cell(step).unwrap().is_traversable(), "{step} is blocked");
            prev = step;
        }
    }

    #[test]
    fn same_start_and_goal_is_empty_path() {
        let grid = HexGrid::new(1, 1.0).unwrap();
        let origin = at(&grid, 0, 0);
        let path = find_path(&grid, origin, origin).unwrap();
        assert!(path.is_empty());
        assert_eq!(path.expanded, 1);
    }

    #[test]
    fn open_grid_path_length_equals_distance() {
        let grid = HexGrid::new(4, 1.0).unwrap();
        let cells: Vec<&Cell> = grid.cells().collect();
        for a in cells.iter().step_by(3) {
            for b in cells.iter().step_by(4) {
                let path = find_path(&grid, a.id(), b.id()).unwrap();
                assert_eq!(path.len() as u32, grid.distance_between_cells(a, b));
                assert_valid_path(&grid, a.id(), &path.cells);
                if !path.is_empty() {
                    assert_eq!(path.cells.last(), Some(&b.id()));
                }
            }
        }
    }

    #[test]
    fn routes_around_a_wall() {
        let mut grid = HexGrid::new(3, 1.0).unwrap();
        // Wall along q = 0 except the far end at r = 3.
        for r in -3..=2 {
            let id = at(&grid, r, 0);
            grid.set_state(id, CellState::Blocked).unwrap();
        }
        let start = at(&grid, 0, -2);
        let goal = at(&grid, 0, 2);
        let path = find_path(&grid, start, goal).unwrap();
        assert_valid_path(&grid, start, &path.cells);
        assert!(path.cells.contains(&at(&grid, 3, 0)));
        assert!(path.len() > 4);
    }

    #[test]
    fn walled_off_goal_is_unreachable() {
        let mut grid = HexGrid::new(3, 1.0).unwrap();
        let goal = at(&grid, 0, 0);
        for n in grid.neighbors(goal).to_vec() {
            grid.set_state(n, CellState::Blocked).unwrap();
        }
        let start = at(&grid, 3, -3);
        assert_eq!(
            find_path(&grid, start, goal),
            Err(PathError::UnreachableGoal { start, goal })
        );
        assert!(find_path_or_empty(&grid, start, goal).is_empty());
    }

    #[test]
    fn blocked_goal_is_unreachable() {
        let mut grid = HexGrid::new(2, 1.0).unwrap();
        let goal = at(&grid, 1, 1);
        grid.set_state(goal, CellState::Blocked).unwrap();
        let start = at(&grid, -1, 0);
        assert!(matches!(
            find_path(&grid, start, goal),
            Err(PathError::UnreachableGoal { .. })
        ));
    }

    #[test]
    fn marked_cells_are_walkable() {
        let mut grid = HexGrid::new(2, 1.0).unwrap();
        let start = at(&grid, 0, -2);
        let goal = at(&grid, 0, 2);
        for q in -1..=1 {
            let id = at(&grid, 0, q);
            grid.set_state(id, CellState::Marked).unwrap();
        }
        let path = find_path(&grid, start, goal).unwrap();
        assert_eq!(path.len(), 4);
    }

    #[test]
    fn unknown_cells_are_reported() {
        let grid = HexGrid::new(1, 1.0).unwrap();
        let origin = at(&grid, 0, 0);
        assert_eq!(
            find_path(&grid, CellId(500), origin),
            Err(PathError::UnknownCell(CellId(500)))
        );
        assert_eq!(
            find_path(&grid, origin, CellId(7)),
            Err(PathError::UnknownCell(CellId(7)))
        );
    }

    #[test]
    fn filtered_search_respects_predicate() {
        let grid = HexGrid::new(2, 1.0).unwrap();
        let start = at(&grid, 0, -1);
        let goal = at(&grid, 0, 1);
        let origin = at(&grid, 0, 0);
        let path = find_path_filtered(&grid, start, goal, |c| c.id() != origin).unwrap();
        assert!(!path.cells.contains(&origin));
        assert_eq!(path.len(), 3);
    }

    #[test]
    fn search_is_deterministic() {
        let mut grid = HexGrid::new(5, 1.0).unwrap();
        for (r, q) in [(0, 1), (1, 1), (-1, 2), (2, -1), (0, -3)] {
            let id = at(&grid, r, q);
            grid.set_state(id, CellState::Blocked).unwrap();
        }
        let start = at(&grid, -4, 2);
        let goal = at(&grid, 4, -1);
        let a = find_path(&grid, start, goal).unwrap();
        let b = find_path(&grid, start, goal).unwrap();
        assert_eq!(a, b);
    }
}
