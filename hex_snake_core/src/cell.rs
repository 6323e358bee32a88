// Grid cells and state-change notification.
//
// A `Cell` is a thin record: its handle, its cube coordinate, its current
// `CellState`, and the handles of its neighbors. Neighbors are filled in once
// by `HexGrid` after construction and never change afterward; only `state`
// is mutated, and only through `HexGrid::set_state` so that observers hear
// about it.
//
// Observers are boxed callbacks registered with `StateObservers::subscribe`
// (all cells) or `subscribe_cell` (one cell), and removed again with the
// returned `SubscriptionId`. Consumers that prefer polling can ignore the
// callbacks and drain `HexGrid::take_dirty` once per frame instead.
//
// See also: `grid.rs`, which owns the cells and the observer registry.

use crate::types::{CellId, CellState, CubeCoord};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;

/// Neighbor handles. A hex has at most six.
pub type Neighbors = SmallVec<[CellId; 6]>;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Cell {
    id: CellId,
    coord: CubeCoord,
    state: CellState,
    neighbors: Neighbors,
}

impl Cell {
    pub(crate) fn new(id: CellId, coord: CubeCoord) -> Self {
        Self {
            id,
            coord,
            state: CellState::Default,
            neighbors: Neighbors::new(),
        }
    }

    pub fn id(&self) -> CellId {
        self.id
    }

    pub fn coord(&self) -> CubeCoord {
        self.coord
    }

    pub fn r(&self) -> i32 {
        self.coord.r
    }

    pub fn q(&self) -> i32 {
        self.coord.q
    }

    pub fn s(&self) -> i32 {
        self.coord.s()
    }

    pub fn state(&self) -> CellState {
        self.state
    }

    pub fn is_traversable(&self) -> bool {
        self.state.is_traversable()
    }

    /// Food, or whatever else the consumer flags as a goal.
    pub fn is_marked(&self) -> bool {
        self.state == CellState::Marked
    }

    pub fn neighbors(&self) -> &[CellId] {
        &self.neighbors
    }

    pub(crate) fn set_neighbors(&mut self, neighbors: Neighbors) {
        self.neighbors = neighbors;
    }

    /// Returns the previous state.
    pub(crate) fn replace_state(&mut self, state: CellState) -> CellState {
        std::mem::replace(&mut self.state, state)
    }
}

// ---------------------------------------------------------------------------
// Observers
// ---------------------------------------------------------------------------

/// One state transition, delivered to observers after it has been applied.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StateChange {
    pub cell: CellId,
    pub coord: CubeCoord,
    pub previous: CellState,
    pub current: CellState,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

pub type StateCallback = Box<dyn FnMut(&StateChange) + Send + Sync>;

struct Subscriber {
    id: SubscriptionId,
    /// `None` listens to every cell.
    cell: Option<CellId>,
    callback: StateCallback,
}

/// Registry of state-change callbacks, invoked synchronously in
/// subscription order.
#[derive(Default)]
pub struct StateObservers {
    next_id: u64,
    subscribers: Vec<Subscriber>,
}

impl StateObservers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, callback: StateCallback) -> SubscriptionId {
        self.add(None, callback)
    }

    pub fn subscribe_cell(&mut self, cell: CellId, callback: StateCallback) -> SubscriptionId {
        self.add(Some(cell), callback)
    }

    /// Returns `false` if the id was never issued or is already gone.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|s| s.id != id);
        self.subscribers.len() != before
    }

    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }

    pub fn notify(&mut self, change: &StateChange) {
        for sub in &mut self.subscribers {
            if sub.cell.is_none_or(|c| c == change.cell) {
                (sub.callback)(change);
            }
        }
    }

    fn add(&mut self, cell: Option<CellId>, callback: StateCallback) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.subscribers.push(Subscriber { id, cell, callback });
        id
    }
}

impl fmt::Debug for StateObservers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateObservers")
            .field("subscribers", &self.subscribers.len())
            .field("next_id", &self.next_id)
            .finish()
    }
}
