// Fixed-capacity binary heap with in-place key updates.
//
// The heap orders *handles* into a caller-owned arena (`&mut [T]`). Every
// arena element implements `HeapItem`: it carries its own current slot in
// the heap array and knows how to compare its priority against another item.
// Because each item always knows where it sits, re-heapifying one item after
// its key changed is O(log n) with no position lookup.
//
// Invariants maintained by every operation:
// - `items[slots[i]].heap_index() == i` for every occupied slot `i`;
// - each handle occupies at most one slot;
// - no child outranks its parent;
// - `len() <= capacity()`, with capacity fixed at construction.
//
// See also: `pathfinding.rs`, which keeps its search nodes in an arena and
// uses this heap as the A* open set.

use std::cmp::Ordering;
use std::marker::PhantomData;
use thiserror::Error;

/// An arena element the heap can order.
pub trait HeapItem {
    /// The slot this item currently occupies in the heap array.
    fn heap_index(&self) -> usize;

    fn set_heap_index(&mut self, index: usize);

    /// `Ordering::Greater` when `self` should leave the heap before `other`.
    fn cmp_priority(&self, other: &Self) -> Ordering;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum HeapError {
    #[error("heap is full (capacity {capacity})")]
    CapacityExceeded { capacity: usize },
    #[error("pop from an empty heap")]
    Empty,
    #[error("handle {handle} does not refer to an arena item")]
    InvalidHandle { handle: usize },
    #[error("item {handle} is not currently queued")]
    NotQueued { handle: usize },
    #[error("item {handle} is already queued")]
    AlreadyQueued { handle: usize },
}

/// Array-backed max-priority heap of arena handles.
#[derive(Debug, Clone)]
pub struct PriorityIndexHeap<T> {
    slots: Vec<usize>,
    capacity: usize,
    _items: PhantomData<fn(&T)>,
}

impl<T: HeapItem> PriorityIndexHeap<T> {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            capacity,
            _items: PhantomData,
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Handles in slot order (root first). Not sorted beyond the heap property.
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.slots.iter().copied()
    }

    /// Handle of the highest-priority item without removing it.
    pub fn peek(&self) -> Option<usize> {
        self.slots.first().copied()
    }

    pub fn clear(&mut self) {
        self.slots.clear();
    }

    /// Queue `handle`. Fails without touching the heap if the handle is out
    /// of range for `items`, already queued, or the heap is full.
    pub fn insert(&mut self, items: &mut [T], handle: usize) -> Result<(), HeapError> {
        if handle >= items.len() {
            return Err(HeapError::InvalidHandle { handle });
        }
        if self.contains(items, handle) {
            return Err(HeapError::AlreadyQueued { handle });
        }
        if self.slots.len() >= self.capacity {
            return Err(HeapError::CapacityExceeded {
                capacity: self.capacity,
            });
        }
        let slot = self.slots.len();
        self.slots.push(handle);
        items[handle].set_heap_index(slot);
        self.sift_up(items, slot);
        Ok(())
    }

    /// Remove and return the highest-priority handle.
    pub fn pop(&mut self, items: &mut [T]) -> Result<usize, HeapError> {
        if self.slots.is_empty() {
            return Err(HeapError::Empty);
        }
        let top = self.slots.swap_remove(0);
        if let Some(&moved) = self.slots.first() {
            items[moved].set_heap_index(0);
            self.sift_down(items, 0);
        }
        Ok(top)
    }

    /// True iff the slot `items[handle]` claims to occupy actually holds it.
    /// Stale items (popped, or never inserted) report `false`.
    pub fn contains(&self, items: &[T], handle: usize) -> bool {
        items
            .get(handle)
            .is_some_and(|item| self.slots.get(item.heap_index()) == Some(&handle))
    }

    /// Restore the heap property after `items[handle]` changed priority in
    /// place. Only one of the two sifts will move it.
    pub fn update_item(&mut self, items: &mut [T], handle: usize) -> Result<(), HeapError> {
        if handle >= items.len() {
            return Err(HeapError::InvalidHandle { handle });
        }
        if !self.contains(items, handle) {
            return Err(HeapError::NotQueued { handle });
        }
        let slot = items[handle].heap_index();
        self.sift_up(items, slot);
        let slot = items[handle].heap_index();
        self.sift_down(items, slot);
        Ok(())
    }

    fn outranks(&self, items: &[T], a: usize, b: usize) -> bool {
        items[self.slots[a]].cmp_priority(&items[self.slots[b]]) == Ordering::Greater
    }

    fn sift_up(&mut self, items: &mut [T], mut slot: usize) {
        while slot > 0 {
            let parent = (slot - 1) / 2;
            if !self.outranks(items, slot, parent) {
                return;
            }
            self.swap(items, slot, parent);
            slot = parent;
        }
    }

    fn sift_down(&mut self, items: &mut [T], mut slot: usize) {
        loop {
            let left = slot * 2 + 1;
            let right = left + 1;
            if left >= self.slots.len() {
                return;
            }
            let mut child = left;
            if right < self.slots.len() && self.outranks(items, right, left) {
                child = right;
            }
            if !self.outranks(items, child, slot) {
                return;
            }
            self.swap(items, slot, child);
            slot = child;
        }
    }

    fn swap(&mut self, items: &mut [T], a: usize, b: usize) {
        self.slots.swap(a, b);
        items[self.slots[a]].set_heap_index(a);
        items[self.slots[b]].set_heap_index(b);
    }
}
