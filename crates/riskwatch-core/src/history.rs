//! Bounded undo/redo over whole-record snapshots.
//!
//! Two bounded sequences: `applied` (most recent last) and `reverted` (most
//! recently undone last). The history owns its snapshots outright; callers
//! keep their live record separately. Access for a given record must be
//! serialized by the caller.

use std::collections::VecDeque;

use crate::config::RiskConfig;

/// Default number of snapshots kept on each side.
pub const DEFAULT_CAPACITY: usize = 100;

#[derive(Debug, Clone)]
pub struct EditHistory<T> {
    applied: VecDeque<T>,
    reverted: VecDeque<T>,
    capacity: usize,
}

impl<T: Clone> EditHistory<T> {
    /// Create a history holding at most `capacity` snapshots per side.
    /// A capacity of zero is treated as one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            applied: VecDeque::with_capacity(capacity),
            reverted: VecDeque::new(),
            capacity,
        }
    }

    /// History bounded by the configured `history_capacity`.
    pub fn from_config(config: &RiskConfig) -> Self {
        Self::new(config.history_capacity)
    }

    /// Record a new state. Clears any pending redo and evicts the oldest
    /// applied snapshot when over capacity.
    pub fn push(&mut self, snapshot: T) {
        push_bounded(&mut self.applied, snapshot, self.capacity);
        self.reverted.clear();
    }

    /// Undo the most recent state.
    ///
    /// The undone state moves to the redo side and the state before it is
    /// returned. Returns `None` when nothing was applied, and also when the
    /// only applied state was just undone (it is still recoverable with
    /// [`redo`](Self::redo)).
    pub fn undo(&mut self) -> Option<T> {
        let undone = self.applied.pop_back()?;
        push_bounded(&mut self.reverted, undone, self.capacity);
        self.applied.back().cloned()
    }

    /// Reapply the most recently undone state and return it.
    pub fn redo(&mut self) -> Option<T> {
        let state = self.reverted.pop_back()?;
        push_bounded(&mut self.applied, state.clone(), self.capacity);
        Some(state)
    }

    pub fn can_undo(&self) -> bool {
        !self.applied.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.reverted.is_empty()
    }

    /// Most recent applied state, without mutation.
    pub fn current_state(&self) -> Option<&T> {
        self.applied.back()
    }

    pub fn clear(&mut self) {
        self.applied.clear();
        self.reverted.clear();
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of applied snapshots.
    pub fn len(&self) -> usize {
        self.applied.len()
    }

    pub fn is_empty(&self) -> bool {
        self.applied.is_empty()
    }
}

impl<T: Clone> Default for EditHistory<T> {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

fn push_bounded<T>(seq: &mut VecDeque<T>, item: T, capacity: usize) {
    seq.push_back(item);
    while seq.len() > capacity {
        seq.pop_front();
    }
}
