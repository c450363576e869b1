//! Level editor controller
//!
//! Owns the editable snapshot and its history; every edit derives a
//! successor snapshot and records the one being left. Persistence is
//! invoked explicitly here, never by the history stack.

pub mod history;

use glam::Vec2;

use crate::consts::HISTORY_DEPTH;
use crate::level::{BlockSpec, LevelSnapshot};
use crate::persistence::{LevelStore, StoreError};
use crate::sim::entity::EntityError;

use history::HistoryStack;

pub struct EditorController {
    history: HistoryStack,
}

impl EditorController {
    pub fn new() -> Self {
        Self::with_level(LevelSnapshot::empty("untitled"))
    }

    pub fn with_level(level: LevelSnapshot) -> Self {
        Self {
            history: HistoryStack::new(level, HISTORY_DEPTH),
        }
    }

    /// The snapshot being edited
    pub fn level(&self) -> &LevelSnapshot {
        self.history.current()
    }

    /// Add a block. Invalid geometry is rejected before anything is
    /// recorded.
    pub fn place_block(&mut self, spec: BlockSpec) -> Result<(), EntityError> {
        spec.build()?;
        self.history.record(self.level().with_block(spec));
        Ok(())
    }

    /// Remove every block covering `point`. Returns whether an edit
    /// happened.
    pub fn remove_blocks_at(&mut self, point: Vec2) -> bool {
        match self.level().without_blocks_at(point) {
            Some(next) => {
                self.history.record(next);
                true
            }
            None => false,
        }
    }

    pub fn rename(&mut self, name: &str) {
        self.history.record(self.level().renamed(name));
    }

    pub fn set_difficulty(&mut self, difficulty: u8) {
        self.history.record(self.level().with_difficulty(difficulty));
    }

    pub fn undo(&mut self) -> Option<&LevelSnapshot> {
        self.history.undo()
    }

    pub fn redo(&mut self) -> Option<&LevelSnapshot> {
        self.history.redo()
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Persist the current snapshot. The assigned record id is folded back
    /// into the working copy without consuming an undo step.
    pub fn save(&mut self, store: &mut dyn LevelStore) -> Result<u32, StoreError> {
        let id = store.save_level(self.level())?;
        if self.level().meta().id != id {
            self.history.replace_current(self.level().with_id(id));
        }
        Ok(id)
    }

    /// Load a record, replacing the working copy and all history
    pub fn load(&mut self, store: &dyn LevelStore, id: u32) -> Result<(), StoreError> {
        let level = store.load_level(id)?;
        self.history.reset(level);
        Ok(())
    }

    /// Load a record, falling back to the built-in layout when the record
    /// is corrupt or missing. Returns whether the stored level was used.
    pub fn load_or_default(&mut self, store: &dyn LevelStore, id: u32) -> bool {
        match self.load(store, id) {
            Ok(()) => true,
            Err(err) => {
                log::warn!("level {id} unavailable ({err}), using default layout");
                self.history.reset(LevelSnapshot::default_layout());
                false
            }
        }
    }
}

impl Default for EditorController {
    fn default() -> Self {
        Self::new()
    }
}
