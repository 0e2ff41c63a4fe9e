//! Intrusive singly linked list backed by `SlotArena`.
//!
//! Stores list nodes in a `SlotArena` and links them by `SlotId`. Only one
//! forward link is kept per node: every mid-list mutation happens on the node a
//! [`CursorMut`] is positioned at, and the cursor remembers the predecessor, so
//! a back link would be dead weight.
//!
//! ## Architecture
//!
//! ```text
//!   arena (SlotArena<Node<T>>)
//!   ┌────────┬───────────────────────────────┐
//!   │ SlotId │ Node { value, next }          │
//!   ├────────┼───────────────────────────────┤
//!   │ id_1   │ { value: C, next: Some(id_2) }│
//!   │ id_2   │ { value: B, next: Some(id_3) }│
//!   │ id_3   │ { value: A, next: None }      │
//!   └────────┴───────────────────────────────┘
//!
//!   head ─► [id_1] ──► [id_2] ──► [id_3] ◄── tail
//! ```
//!
//! ## Cursor protocol
//!
//! ```text
//!   cursor_mut()            state = Start
//!   move_next() -> true     state = Current(id), prev = predecessor
//!   remove_current()        unlink id, state = Vacated (prev kept)
//!   move_current_to_front() unlink id, relink as head, state = Vacated
//!   move_next()             resumes at prev.next (or head when prev is None)
//! ```
//!
//! Mutations are only legal in the `Current` state; anything else returns a
//! [`CursorError`]. After a mutation the next `move_next` lands on the node that
//! followed the affected one, so a single pass can evict and promote.
//!
//! ## Performance
//! - `push_front`: O(1)
//! - `move_next` / `remove_current` / `move_current_to_front`: O(1)
//! - `iter`: O(n)
//!
//! `debug_validate_invariants()` is available in debug/test builds.

use crate::ds::slot_arena::{SlotArena, SlotId};
use crate::error::CursorError;

#[derive(Debug)]
struct Node<T> {
    value: T,
    next: Option<SlotId>,
}

/// Singly linked list that stores nodes in a `SlotArena` and links them via `SlotId`.
#[derive(Debug)]
pub struct IntrusiveList<T> {
    arena: SlotArena<Node<T>>,
    head: Option<SlotId>,
    tail: Option<SlotId>,
}

impl<T> IntrusiveList<T> {
    /// Creates an empty list.
    pub fn new() -> Self {
        Self {
            arena: SlotArena::new(),
            head: None,
            tail: None,
        }
    }

    /// Creates an empty list with reserved node capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            arena: SlotArena::with_capacity(capacity),
            head: None,
            tail: None,
        }
    }

    /// Returns the number of linked nodes.
    pub fn len(&self) -> usize {
        self.arena.len()
    }

    /// Returns `true` if the list is empty.
    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    /// Returns the value at the head of the list.
    pub fn front(&self) -> Option<&T> {
        self.head.and_then(|id| self.get(id))
    }

    /// Returns the value at the tail of the list.
    pub fn back(&self) -> Option<&T> {
        self.tail.and_then(|id| self.get(id))
    }

    /// Returns the value for a node id, if it is still linked.
    pub fn get(&self, id: SlotId) -> Option<&T> {
        self.arena.get(id).map(|node| &node.value)
    }

    /// Returns an iterator from head to tail.
    pub fn iter(&self) -> IntrusiveListIter<'_, T> {
        IntrusiveListIter {
            list: self,
            current: self.head,
        }
    }

    /// Inserts `value` as the new head and returns its `SlotId`.
    ///
    /// The first node pushed into an empty list is also the tail.
    pub fn push_front(&mut self, value: T) -> SlotId {
        let id = self.arena.insert(Node {
            value,
            next: self.head,
        });
        if self.tail.is_none() {
            self.tail = Some(id);
        }
        self.head = Some(id);
        id
    }

    /// Returns a cursor positioned before the head.
    pub fn cursor_mut(&mut self) -> CursorMut<'_, T> {
        CursorMut {
            list: self,
            prev: None,
            state: CursorState::Start,
        }
    }

    /// Unlinks every node and returns the values from head to tail.
    pub fn drain(&mut self) -> Vec<T> {
        let mut values = Vec::with_capacity(self.len());
        let mut current = self.head.take();
        self.tail = None;
        while let Some(id) = current {
            match self.arena.remove(id) {
                Some(node) => {
                    current = node.next;
                    values.push(node.value);
                },
                None => break,
            }
        }
        // unreachable nodes (none if the invariants hold) are dropped here
        self.arena.clear();
        values
    }

    /// Unlinks and drops every node.
    pub fn clear(&mut self) {
        self.arena.clear();
        self.head = None;
        self.tail = None;
    }

    fn next_of(&self, id: SlotId) -> Option<SlotId> {
        self.arena.get(id).and_then(|node| node.next)
    }

    fn set_next(&mut self, id: SlotId, next: Option<SlotId>) {
        if let Some(node) = self.arena.get_mut(id) {
            node.next = next;
        }
    }

    /// Unlinks `id`, whose predecessor is `prev`, without freeing its slot.
    fn unlink(&mut self, prev: Option<SlotId>, id: SlotId) {
        let next = self.next_of(id);
        match prev {
            Some(prev_id) => self.set_next(prev_id, next),
            None => self.head = next,
        }
        if self.tail == Some(id) {
            self.tail = prev;
        }
        self.set_next(id, None);
    }

    #[cfg(any(test, debug_assertions))]
    /// Returns the list order as SlotIds from head to tail.
    pub fn debug_snapshot_ids(&self) -> Vec<SlotId> {
        let mut ids = Vec::with_capacity(self.len());
        let mut current = self.head;
        while let Some(id) = current {
            ids.push(id);
            current = self.next_of(id);
        }
        ids
    }

    #[cfg(any(test, debug_assertions))]
    pub fn debug_validate_invariants(&self) {
        if self.head.is_none() || self.tail.is_none() {
            assert!(self.head.is_none());
            assert!(self.tail.is_none());
            assert_eq!(self.len(), 0);
            return;
        }

        let mut seen = std::collections::HashSet::new();
        let mut count = 0usize;
        let mut current = self.head;
        let mut last = None;

        while let Some(id) = current {
            assert!(seen.insert(id), "cycle at {id:?}");
            let node = self.arena.get(id).expect("linked node missing from arena");
            last = Some(id);
            current = node.next;
            count += 1;
            assert!(count <= self.len());
        }

        assert_eq!(last, self.tail);
        assert_eq!(count, self.len());
    }
}

impl<T> Default for IntrusiveList<T> {
    fn default() -> Self {
        Self::new()
    }
}

pub struct IntrusiveListIter<'a, T> {
    list: &'a IntrusiveList<T>,
    current: Option<SlotId>,
}

impl<'a, T> Iterator for IntrusiveListIter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.current?;
        let node = self.list.arena.get(id)?;
        self.current = node.next;
        Some(&node.value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CursorState {
    Start,
    Current(SlotId),
    Vacated,
    End,
}

/// Forward cursor that can unlink or promote the node it is positioned at.
///
/// `prev` always names the node linked before the current position (or
/// before the gap left by the last mutation), which is all a singly linked
/// list needs to splice in O(1).
pub struct CursorMut<'a, T> {
    list: &'a mut IntrusiveList<T>,
    prev: Option<SlotId>,
    state: CursorState,
}

impl<'a, T> CursorMut<'a, T> {
    /// Advances to the next node; returns `false` once past the tail.
    pub fn move_next(&mut self) -> bool {
        let next = match self.state {
            CursorState::Start => self.list.head,
            CursorState::Current(id) => {
                self.prev = Some(id);
                self.list.next_of(id)
            },
            CursorState::Vacated => match self.prev {
                Some(prev) => self.list.next_of(prev),
                None => self.list.head,
            },
            CursorState::End => None,
        };

        match next {
            Some(id) => {
                self.state = CursorState::Current(id);
                true
            },
            None => {
                self.state = CursorState::End;
                false
            },
        }
    }

    /// Returns the value the cursor is positioned at.
    pub fn current(&self) -> Option<&T> {
        match self.state {
            CursorState::Current(id) => self.list.get(id),
            _ => None,
        }
    }

    /// Returns the id of the node the cursor is positioned at.
    pub fn current_id(&self) -> Option<SlotId> {
        match self.state {
            CursorState::Current(id) => Some(id),
            _ => None,
        }
    }

    /// Unlinks the current node and returns its value.
    ///
    /// The following `move_next` lands on the node after the removed one.
    pub fn remove_current(&mut self) -> Result<T, CursorError> {
        let id = self.positioned()?;
        self.list.unlink(self.prev, id);
        self.state = CursorState::Vacated;
        match self.list.arena.remove(id) {
            Some(node) => Ok(node.value),
            None => Err(CursorError::Vacated),
        }
    }

    /// Relinks the current node as the head of the list.
    ///
    /// The following `move_next` lands on the node after the relocated one.
    /// A head node keeps its place in the list, but the cursor still leaves
    /// it, so a second mutation needs a `move_next` first.
    pub fn move_current_to_front(&mut self) -> Result<(), CursorError> {
        let id = self.positioned()?;
        if self.list.head == Some(id) {
            self.prev = Some(id);
            self.state = CursorState::Vacated;
            return Ok(());
        }
        self.list.unlink(self.prev, id);
        let old_head = self.list.head;
        self.list.set_next(id, old_head);
        self.list.head = Some(id);
        if self.list.tail.is_none() {
            self.list.tail = Some(id);
        }
        self.state = CursorState::Vacated;
        Ok(())
    }

    fn positioned(&self) -> Result<SlotId, CursorError> {
        match self.state {
            CursorState::Current(id) => Ok(id),
            CursorState::Start => Err(CursorError::NotStarted),
            CursorState::Vacated => Err(CursorError::Vacated),
            CursorState::End => Err(CursorError::Exhausted),
        }
    }
}
