//! Item effect lifecycle
//!
//! Applying an item snapshots the target paddle's attributes, mutates them,
//! and arms the timer; expiry (or explicit deactivation) restores the
//! snapshot exactly. Re-applying an active item is a documented no-op.
//! Concurrent items on one paddle compose last-applied-wins: each restores
//! the state it found, so unwinding happens in reverse order without any
//! stacking arithmetic.

use thiserror::Error;

use super::entity::{Ball, Block, Item, ItemKind, Paddle};

/// Resize effect: paddle height multiplier
const RESIZE_FACTOR: f32 = 1.5;
/// Speed-boost effect: paddle speed multiplier
const SPEED_FACTOR: f32 = 1.4;

/// The entity an effect is asked to mutate
#[derive(Debug)]
pub enum EffectTarget<'a> {
    Paddle(&'a mut Paddle),
    Ball(&'a mut Ball),
    Block(&'a mut Block),
}

impl EffectTarget<'_> {
    fn kind_name(&self) -> &'static str {
        match self {
            EffectTarget::Paddle(_) => "paddle",
            EffectTarget::Ball(_) => "ball",
            EffectTarget::Block(_) => "block",
        }
    }
}

/// Rejected effect application
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EffectError {
    #[error("{item:?} effect cannot target a {target}")]
    IncompatibleTarget {
        item: ItemKind,
        target: &'static str,
    },
}

/// Apply an item's effect to its target.
///
/// No-op while the item is already active. An incompatible target is an
/// error and leaves both item and target untouched.
pub fn apply(item: &mut Item, target: EffectTarget<'_>) -> Result<(), EffectError> {
    let target_name = target.kind_name();
    let EffectTarget::Paddle(paddle) = target else {
        return Err(EffectError::IncompatibleTarget {
            item: item.kind,
            target: target_name,
        });
    };
    if item.active {
        return Ok(());
    }

    item.snapshot = Some(paddle.attributes());
    match item.kind {
        ItemKind::Resize => paddle.set_height(paddle.height() * RESIZE_FACTOR),
        ItemKind::SpeedBoost => paddle.set_speed(paddle.speed() * SPEED_FACTOR),
        ItemKind::Fog => paddle.set_fogged(true),
    }
    item.remaining = item.duration;
    item.active = true;
    Ok(())
}

/// Advance an active item's timer, deactivating on expiry
pub fn update(item: &mut Item, dt: f32, paddle: &mut Paddle) {
    if !item.active {
        return;
    }
    item.remaining -= dt;
    if item.remaining <= 0.0 {
        deactivate(item, paddle);
    }
}

/// Restore the pre-effect attributes exactly and retire the item
pub fn deactivate(item: &mut Item, paddle: &mut Paddle) {
    if let Some(snapshot) = item.snapshot.take() {
        paddle.restore_attributes(snapshot);
    }
    item.active = false;
    item.remaining = 0.0;
}
