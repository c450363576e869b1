//! Rally Pong - a two-paddle block-breaking arcade game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (entities, collisions, AI, game state)
//! - `level`: Level snapshot value types shared by the editor and the sim
//! - `editor`: Layout editor with bounded undo/redo history
//! - `persistence`: JSON level records on disk
//! - `config`: Application context (settings, paddle prototypes)

pub mod config;
pub mod editor;
pub mod level;
pub mod persistence;
pub mod sim;

pub use config::{AppContext, Settings};
pub use level::LevelSnapshot;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (120 Hz)
    pub const SIM_DT: f32 = 1.0 / 120.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Play field dimensions (y grows downward, origin top-left)
    pub const FIELD_WIDTH: f32 = 800.0;
    pub const FIELD_HEIGHT: f32 = 600.0;

    /// Paddle defaults
    pub const PADDLE_WIDTH: f32 = 14.0;
    pub const PADDLE_HEIGHT: f32 = 90.0;
    pub const PADDLE_SPEED: f32 = 420.0;
    /// Distance from the side wall to the paddle's collision plane
    pub const PADDLE_PLANE_INSET: f32 = 36.0;
    /// Maximum angular deflection added at the paddle edge (radians)
    pub const PADDLE_DEFLECTION_MAX: f32 = 0.9;
    /// Speed boost when ball hits a paddle (multiplicative, capped at max)
    pub const PADDLE_BOOST: f32 = 1.05;

    /// Ball defaults
    pub const BALL_RADIUS: f32 = 8.0;
    pub const BALL_START_SPEED: f32 = 300.0;
    pub const BALL_MAX_SPEED: f32 = 640.0;

    /// Half-amplitude of the random service cone (radians)
    pub const HALF_SERVICE_ANGLE: f32 = std::f32::consts::PI / 6.0;

    /// Chance a destroyed bonus block drops an item
    pub const ITEM_DROP_CHANCE: f32 = 0.35;
    /// Item footprint edge length
    pub const ITEM_SIZE: f32 = 20.0;

    /// Hits needed to break a multi-hit block
    pub const MULTI_HIT_RESISTANCE: u8 = 3;

    /// Points needed to win a match
    pub const WIN_SCORE: u32 = 11;
    /// Seconds the game-over screen stays up before returning to the menu
    pub const GAME_OVER_DISPLAY_SECS: f32 = 4.0;

    /// Maximum undo depth in the editor
    pub const HISTORY_DEPTH: usize = 32;
}

/// Normalize angle to [0, 2π)
#[inline]
pub fn normalize_angle(angle: f32) -> f32 {
    use std::f32::consts::TAU;
    let a = angle.rem_euclid(TAU);
    // rem_euclid rounding can land exactly on TAU for tiny negative inputs
    if a >= TAU { a - TAU } else { a }
}

/// Velocity vector for a speed and direction angle.
///
/// Screen space is y-down, so a positive angle points up on screen.
#[inline]
pub fn velocity_from_angle(speed: f32, angle: f32) -> Vec2 {
    Vec2::new(speed * angle.cos(), -speed * angle.sin())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::{FRAC_PI_2, PI, TAU};

    #[test]
    fn test_normalize_angle_range() {
        assert_eq!(normalize_angle(0.0), 0.0);
        assert!((normalize_angle(TAU + 0.5) - 0.5).abs() < 1e-6);
        assert!((normalize_angle(-FRAC_PI_2) - 3.0 * FRAC_PI_2).abs() < 1e-6);
        for a in [-10.0, -PI, 0.0, PI, 10.0, 100.0] {
            let n = normalize_angle(a);
            assert!((0.0..TAU).contains(&n), "angle {a} normalized to {n}");
        }
    }

    #[test]
    fn test_velocity_from_angle_is_y_down() {
        // Angle π/2 points up, which is negative y on screen
        let v = velocity_from_angle(100.0, FRAC_PI_2);
        assert!(v.x.abs() < 1e-4);
        assert!((v.y + 100.0).abs() < 1e-4);

        // Angle 0 points right
        let v = velocity_from_angle(100.0, 0.0);
        assert!((v.x - 100.0).abs() < 1e-4);
        assert!(v.y.abs() < 1e-4);
    }
}
