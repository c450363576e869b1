//! Bounded undo/redo history over level snapshots
//!
//! The stack owns the current snapshot. Recording an edit pushes the state
//! being left onto the undo side and clears the redo side; undo/redo walk
//! between the two. Depth is bounded, dropping the oldest entries.

use std::collections::VecDeque;

use crate::level::LevelSnapshot;

#[derive(Debug, Clone)]
pub struct HistoryStack {
    current: LevelSnapshot,
    undo: VecDeque<LevelSnapshot>,
    redo: Vec<LevelSnapshot>,
    depth: usize,
}

impl HistoryStack {
    pub fn new(initial: LevelSnapshot, depth: usize) -> Self {
        Self {
            current: initial,
            undo: VecDeque::new(),
            redo: Vec::new(),
            depth: depth.max(1),
        }
    }

    /// The snapshot being edited
    #[inline]
    pub fn current(&self) -> &LevelSnapshot {
        &self.current
    }

    #[inline]
    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    #[inline]
    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    /// Make `next` the current snapshot, remembering the one being left.
    /// Any redo tail is invalidated.
    pub fn record(&mut self, next: LevelSnapshot) {
        let previous = std::mem::replace(&mut self.current, next);
        self.undo.push_back(previous);
        if self.undo.len() > self.depth {
            self.undo.pop_front();
        }
        self.redo.clear();
    }

    /// Step back one edit. No-op (None) when there is nothing to undo.
    pub fn undo(&mut self) -> Option<&LevelSnapshot> {
        let restored = self.undo.pop_back()?;
        let left = std::mem::replace(&mut self.current, restored);
        self.redo.push(left);
        Some(&self.current)
    }

    /// Mirror of [`HistoryStack::undo`]
    pub fn redo(&mut self) -> Option<&LevelSnapshot> {
        let restored = self.redo.pop()?;
        let left = std::mem::replace(&mut self.current, restored);
        self.undo.push_back(left);
        Some(&self.current)
    }

    /// Throw away all history, keeping only `snapshot` (used after loading
    /// a level from disk)
    pub fn reset(&mut self, snapshot: LevelSnapshot) {
        self.current = snapshot;
        self.undo.clear();
        self.redo.clear();
    }

    /// Swap the current snapshot without recording an edit. For
    /// bookkeeping-only adjustments (e.g. the id a save assigned) that
    /// must not appear as an undo step.
    pub fn replace_current(&mut self, snapshot: LevelSnapshot) {
        self.current = snapshot;
    }
}
