//! Application context: settings and paddle prototypes
//!
//! There is no ambient global configuration. The top-level controller owns
//! one [`AppContext`] and passes it by reference to whatever needs lookup;
//! the paddle registry is immutable after startup.

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::sim::entity::{Color, PaddleConfig, Side};

/// User-facing preferences
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub fullscreen: bool,
    pub muted: bool,
    /// Points needed to win a match
    pub win_score: u32,
    /// Optional match length in seconds; on expiry the leader wins and a
    /// tie is a draw
    pub time_limit: Option<f32>,
    /// Chance a destroyed bonus block drops an item
    pub item_drop_chance: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            fullscreen: false,
            muted: false,
            win_score: WIN_SCORE,
            time_limit: None,
            item_drop_chance: ITEM_DROP_CHANCE,
        }
    }
}

impl Settings {
    pub fn toggle_fullscreen(&mut self) {
        self.fullscreen = !self.fullscreen;
    }

    pub fn toggle_mute(&mut self) {
        self.muted = !self.muted;
    }
}

/// Paddle prototypes, one per side, constructed once at startup
#[derive(Debug, Clone)]
pub struct PaddleRegistry {
    left: PaddleConfig,
    right: PaddleConfig,
}

impl PaddleRegistry {
    /// The standard match setup: mirrored paddles at both field edges
    pub fn standard() -> Self {
        let base = |side: Side, plane_x: f32, primary: Color, secondary: Color| PaddleConfig {
            side,
            plane_x,
            center: FIELD_HEIGHT / 2.0,
            speed: PADDLE_SPEED,
            north: 0.0,
            south: FIELD_HEIGHT,
            width: PADDLE_WIDTH,
            height: PADDLE_HEIGHT,
            primary,
            secondary,
        };
        Self {
            left: base(
                Side::Left,
                PADDLE_PLANE_INSET,
                Color::rgb(235, 94, 78),
                Color::rgb(255, 190, 180),
            ),
            right: base(
                Side::Right,
                FIELD_WIDTH - PADDLE_PLANE_INSET,
                Color::rgb(82, 138, 235),
                Color::rgb(180, 205, 255),
            ),
        }
    }

    pub fn custom(left: PaddleConfig, right: PaddleConfig) -> Self {
        Self { left, right }
    }

    pub fn config_for(&self, side: Side) -> &PaddleConfig {
        match side {
            Side::Left => &self.left,
            Side::Right => &self.right,
        }
    }
}

/// Everything the top-level controller owns and passes down
#[derive(Debug, Clone)]
pub struct AppContext {
    pub settings: Settings,
    paddles: PaddleRegistry,
}

impl AppContext {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            paddles: PaddleRegistry::standard(),
        }
    }

    pub fn with_registry(settings: Settings, paddles: PaddleRegistry) -> Self {
        Self { settings, paddles }
    }

    pub fn paddles(&self) -> &PaddleRegistry {
        &self.paddles
    }
}
