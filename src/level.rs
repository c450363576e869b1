//! Level snapshot value types
//!
//! A [`LevelSnapshot`] is an immutable description of a block layout plus
//! its metadata. The editor history stores snapshots verbatim; the
//! simulation builds live [`Block`]s from one at load time. Editing never
//! mutates a snapshot, it derives a successor value.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::sim::entity::{Block, BlockKind, EntityError, Rect};

/// Level metadata carried alongside the layout
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelMeta {
    /// Persistent record id; 0 means not yet saved
    pub id: u32,
    pub name: String,
    pub difficulty: u8,
}

/// Value description of one block, the unit a layout is made of
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BlockSpec {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub kind: BlockKind,
    pub resistance: u8,
}

impl BlockSpec {
    pub fn new(x: f32, y: f32, width: f32, height: f32, kind: BlockKind) -> Self {
        Self {
            x,
            y,
            width,
            height,
            kind,
            resistance: kind.base_resistance(),
        }
    }

    /// Build the live entity, validating geometry
    pub fn build(&self) -> Result<Block, EntityError> {
        Block::with_resistance(
            Vec2::new(self.x, self.y),
            Vec2::new(self.width, self.height),
            self.kind,
            self.resistance,
        )
    }

    /// Whether the described footprint covers a point
    pub fn covers(&self, point: Vec2) -> bool {
        Rect::new(Vec2::new(self.x, self.y), Vec2::new(self.width, self.height)).contains(point)
    }
}

/// An immutable level layout: ordered block descriptions plus metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelSnapshot {
    meta: LevelMeta,
    blocks: Vec<BlockSpec>,
}

impl LevelSnapshot {
    pub fn new(meta: LevelMeta, blocks: Vec<BlockSpec>) -> Self {
        Self { meta, blocks }
    }

    /// Empty layout with placeholder metadata
    pub fn empty(name: &str) -> Self {
        Self {
            meta: LevelMeta {
                id: 0,
                name: name.to_string(),
                difficulty: 1,
            },
            blocks: Vec::new(),
        }
    }

    /// The built-in layout: a three-column mid-field wall with a tougher
    /// spine and bonus rows. Used as quick-start level and as the fallback
    /// when a persisted record cannot be loaded.
    pub fn default_layout() -> Self {
        let mut blocks = Vec::new();
        for row in 0..12u32 {
            // Keep a corridor clear at mid-height so the serve spot is open
            if row == 5 || row == 6 {
                continue;
            }
            for col in 0..3u32 {
                let kind = if col == 1 {
                    BlockKind::MultiHit
                } else if row % 5 == 0 {
                    BlockKind::Bonus
                } else {
                    BlockKind::Destructible
                };
                blocks.push(BlockSpec::new(
                    352.0 + col as f32 * 32.0,
                    90.0 + row as f32 * 36.0,
                    28.0,
                    24.0,
                    kind,
                ));
            }
        }
        Self {
            meta: LevelMeta {
                id: 0,
                name: "Mid-field Wall".to_string(),
                difficulty: 3,
            },
            blocks,
        }
    }

    #[inline]
    pub fn meta(&self) -> &LevelMeta {
        &self.meta
    }

    #[inline]
    pub fn blocks(&self) -> &[BlockSpec] {
        &self.blocks
    }

    /// Build the live entities for the whole layout
    pub fn spawn(&self) -> Result<Vec<Block>, EntityError> {
        self.blocks.iter().map(BlockSpec::build).collect()
    }

    /// Successor with one more block appended
    pub fn with_block(&self, spec: BlockSpec) -> Self {
        let mut next = self.clone();
        next.blocks.push(spec);
        next
    }

    /// Successor with every block covering `point` removed, or None when
    /// nothing was hit
    pub fn without_blocks_at(&self, point: Vec2) -> Option<Self> {
        if !self.blocks.iter().any(|b| b.covers(point)) {
            return None;
        }
        let mut next = self.clone();
        next.blocks.retain(|b| !b.covers(point));
        Some(next)
    }

    /// Successor with new metadata
    pub fn renamed(&self, name: &str) -> Self {
        let mut next = self.clone();
        next.meta.name = name.to_string();
        next
    }

    pub fn with_difficulty(&self, difficulty: u8) -> Self {
        let mut next = self.clone();
        next.meta.difficulty = difficulty;
        next
    }

    pub(crate) fn with_id(&self, id: u32) -> Self {
        let mut next = self.clone();
        next.meta.id = id;
        next
    }
}
