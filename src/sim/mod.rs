//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module is pure with respect to the
//! outside world: fixed inputs per tick, seeded RNG only, no rendering or
//! platform dependencies.

pub mod collision;
pub mod entity;
pub mod items;
pub mod state;
pub mod strategy;

pub use collision::{
    BlockImpact, Collider, circle_overlaps_rect, detect, resolve_ball_block, resolve_ball_paddle,
    resolve_ball_walls,
};
pub use entity::{
    Ball, Block, BlockKind, Color, EntityError, Item, ItemKind, Paddle, PaddleAttributes,
    PaddleConfig, Rect, Side,
};
pub use items::{EffectError, EffectTarget};
pub use state::{
    Command, GameMode, GameObserver, GameState, Phase, SceneView, Score, TickInput,
};
pub use strategy::{AiController, Driver, MoveContext, PaddleInput, predict_intercept_y};
