//! Simulation entities and construction-time validation
//!
//! All invariant enforcement lives in the constructors here. The collision
//! and strategy code operates on pre-validated entities and never raises
//! domain errors during steady-state ticks.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;
use crate::{normalize_angle, velocity_from_angle};

/// Which side of the field a paddle defends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub fn opposite(self) -> Side {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}

/// An RGB color, consumed by the rendering collaborator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// Axis-aligned rectangle, top-left origin, y-down
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub pos: Vec2,
    pub size: Vec2,
}

impl Rect {
    pub fn new(pos: Vec2, size: Vec2) -> Self {
        Self { pos, size }
    }

    #[inline]
    pub fn min(&self) -> Vec2 {
        self.pos
    }

    #[inline]
    pub fn max(&self) -> Vec2 {
        self.pos + self.size
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        self.pos + self.size / 2.0
    }

    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.pos.x
            && point.x <= self.pos.x + self.size.x
            && point.y >= self.pos.y
            && point.y <= self.pos.y + self.size.y
    }
}

/// Rejected entity construction
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EntityError {
    #[error("{field} must be strictly positive, got {value}")]
    NonPositive { field: &'static str, value: f32 },
    #[error("paddle bounds invalid: south {south} must exceed north {north}")]
    InvalidBounds { north: f32, south: f32 },
    #[error("paddle center {center} with height {height} escapes bounds [{north}, {south}]")]
    CenterOutOfBounds {
        center: f32,
        height: f32,
        north: f32,
        south: f32,
    },
    #[error("ball speed {speed} exceeds maximum {max_speed}")]
    SpeedAboveMax { speed: f32, max_speed: f32 },
}

/// Immutable paddle prototype.
///
/// A config describes a paddle but enforces nothing; validation happens once
/// in [`Paddle::from_config`], the single enforcement point before an entity
/// enters the simulation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaddleConfig {
    pub side: Side,
    /// X coordinate of the face the ball bounces off
    pub plane_x: f32,
    pub center: f32,
    pub speed: f32,
    pub north: f32,
    pub south: f32,
    pub width: f32,
    pub height: f32,
    pub primary: Color,
    pub secondary: Color,
}

/// Attributes an item effect may mutate, snapshotted before application
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PaddleAttributes {
    pub size: Vec2,
    pub speed: f32,
    pub fogged: bool,
}

/// A player's paddle.
///
/// Fields are private; mutation goes through setters that keep the vertical
/// extent inside `[north, south]` and the height even.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paddle {
    side: Side,
    plane_x: f32,
    center: f32,
    speed: f32,
    north: f32,
    south: f32,
    size: Vec2,
    primary: Color,
    secondary: Color,
    fogged: bool,
    active: bool,
}

/// Round to the nearest even value, never below 2
fn even_height(height: f32) -> f32 {
    ((height / 2.0).round() * 2.0).max(2.0)
}

impl Paddle {
    /// Validate a config and build the live paddle from it
    pub fn from_config(config: &PaddleConfig) -> Result<Self, EntityError> {
        for (field, value) in [
            ("plane_x", config.plane_x),
            ("center", config.center),
            ("speed", config.speed),
            ("width", config.width),
            ("height", config.height),
        ] {
            if value <= 0.0 {
                return Err(EntityError::NonPositive { field, value });
            }
        }
        if config.south <= config.north {
            return Err(EntityError::InvalidBounds {
                north: config.north,
                south: config.south,
            });
        }
        let height = even_height(config.height);
        if config.center - height / 2.0 < config.north || config.center + height / 2.0 > config.south
        {
            return Err(EntityError::CenterOutOfBounds {
                center: config.center,
                height,
                north: config.north,
                south: config.south,
            });
        }
        Ok(Self {
            side: config.side,
            plane_x: config.plane_x,
            center: config.center,
            speed: config.speed,
            north: config.north,
            south: config.south,
            size: Vec2::new(config.width, height),
            primary: config.primary,
            secondary: config.secondary,
            fogged: false,
            active: true,
        })
    }

    #[inline]
    pub fn side(&self) -> Side {
        self.side
    }

    #[inline]
    pub fn plane_x(&self) -> f32 {
        self.plane_x
    }

    #[inline]
    pub fn center(&self) -> f32 {
        self.center
    }

    #[inline]
    pub fn speed(&self) -> f32 {
        self.speed
    }

    #[inline]
    pub fn height(&self) -> f32 {
        self.size.y
    }

    pub fn bounds(&self) -> (f32, f32) {
        (self.north, self.south)
    }

    pub fn primary(&self) -> Color {
        self.primary
    }

    pub fn secondary(&self) -> Color {
        self.secondary
    }

    #[inline]
    pub fn fogged(&self) -> bool {
        self.fogged
    }

    #[inline]
    pub fn active(&self) -> bool {
        self.active
    }

    /// Footprint rectangle. The collision plane is the face toward midfield,
    /// so the body extends away from it.
    pub fn rect(&self) -> Rect {
        let x = match self.side {
            Side::Left => self.plane_x - self.size.x,
            Side::Right => self.plane_x,
        };
        Rect::new(Vec2::new(x, self.center - self.size.y / 2.0), self.size)
    }

    /// Clamp a candidate center into the reachable band
    #[inline]
    pub fn clamp_center(&self, center: f32) -> f32 {
        center.clamp(self.north + self.size.y / 2.0, self.south - self.size.y / 2.0)
    }

    /// Move the paddle, clamped to bounds
    pub fn set_center(&mut self, center: f32) {
        self.center = self.clamp_center(center);
    }

    /// Resize the paddle height (even-normalized, capped to the bound span),
    /// re-clamping the center so the extent stays legal
    pub fn set_height(&mut self, height: f32) {
        let span_cap = ((self.south - self.north) / 2.0).floor() * 2.0;
        self.size.y = even_height(height).min(span_cap);
        self.center = self.clamp_center(self.center);
    }

    pub fn set_speed(&mut self, speed: f32) {
        self.speed = speed.max(f32::EPSILON);
    }

    pub fn set_fogged(&mut self, fogged: bool) {
        self.fogged = fogged;
    }

    /// Snapshot of the attributes item effects may touch
    pub fn attributes(&self) -> PaddleAttributes {
        PaddleAttributes {
            size: self.size,
            speed: self.speed,
            fogged: self.fogged,
        }
    }

    /// Restore a snapshot taken by [`Paddle::attributes`] exactly.
    ///
    /// Writes fields directly: the snapshot came from a valid paddle, so the
    /// setters' normalization must not alter it.
    pub fn restore_attributes(&mut self, attrs: PaddleAttributes) {
        self.size = attrs.size;
        self.speed = attrs.speed;
        self.fogged = attrs.fogged;
        self.center = self.clamp_center(self.center);
    }
}

/// The ball
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ball {
    pos: Vec2,
    radius: f32,
    speed: f32,
    max_speed: f32,
    angle: f32,
    active: bool,
}

impl Ball {
    pub fn new(
        pos: Vec2,
        radius: f32,
        speed: f32,
        max_speed: f32,
        angle: f32,
    ) -> Result<Self, EntityError> {
        if radius <= 0.0 {
            return Err(EntityError::NonPositive {
                field: "radius",
                value: radius,
            });
        }
        if max_speed <= 0.0 {
            return Err(EntityError::NonPositive {
                field: "max_speed",
                value: max_speed,
            });
        }
        if speed <= 0.0 {
            return Err(EntityError::NonPositive {
                field: "speed",
                value: speed,
            });
        }
        if speed > max_speed {
            return Err(EntityError::SpeedAboveMax { speed, max_speed });
        }
        Ok(Self {
            pos,
            radius,
            speed,
            max_speed,
            angle: normalize_angle(angle),
            active: true,
        })
    }

    #[inline]
    pub fn pos(&self) -> Vec2 {
        self.pos
    }

    #[inline]
    pub fn radius(&self) -> f32 {
        self.radius
    }

    #[inline]
    pub fn speed(&self) -> f32 {
        self.speed
    }

    #[inline]
    pub fn max_speed(&self) -> f32 {
        self.max_speed
    }

    #[inline]
    pub fn angle(&self) -> f32 {
        self.angle
    }

    #[inline]
    pub fn active(&self) -> bool {
        self.active
    }

    /// Velocity derived from speed and direction angle (y-down)
    #[inline]
    pub fn velocity(&self) -> Vec2 {
        velocity_from_angle(self.speed, self.angle)
    }

    pub fn set_pos(&mut self, pos: Vec2) {
        self.pos = pos;
    }

    pub fn set_angle(&mut self, angle: f32) {
        self.angle = normalize_angle(angle);
    }

    /// Reflect the horizontal velocity component
    pub fn reflect_x(&mut self) {
        self.angle = normalize_angle(std::f32::consts::PI - self.angle);
    }

    /// Reflect the vertical velocity component
    pub fn reflect_y(&mut self) {
        self.angle = normalize_angle(-self.angle);
    }

    /// Scale speed, capped at `max_speed`
    pub fn boost(&mut self, factor: f32) {
        self.speed = (self.speed * factor).clamp(f32::EPSILON, self.max_speed);
    }

    /// Integrate position over one step
    pub fn advance(&mut self, dt: f32) {
        self.pos += self.velocity() * dt;
    }

    /// Re-serve: move to `pos` heading at `angle` with a fresh speed
    pub fn reset(&mut self, pos: Vec2, speed: f32, angle: f32) {
        self.pos = pos;
        self.speed = speed.clamp(f32::EPSILON, self.max_speed);
        self.angle = normalize_angle(angle);
    }
}

/// Block varieties
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BlockKind {
    #[default]
    Destructible,
    Indestructible,
    Bonus,
    MultiHit,
}

impl BlockKind {
    /// Starting resistance for this kind
    pub fn base_resistance(self) -> u8 {
        match self {
            BlockKind::Destructible | BlockKind::Bonus => 1,
            BlockKind::MultiHit => MULTI_HIT_RESISTANCE,
            BlockKind::Indestructible => u8::MAX,
        }
    }
}

/// A breakable (or not) block in the mid-field
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Block {
    rect: Rect,
    kind: BlockKind,
    resistance: u8,
    active: bool,
}

impl Block {
    pub fn new(pos: Vec2, size: Vec2, kind: BlockKind) -> Result<Self, EntityError> {
        Self::with_resistance(pos, size, kind, kind.base_resistance())
    }

    pub fn with_resistance(
        pos: Vec2,
        size: Vec2,
        kind: BlockKind,
        resistance: u8,
    ) -> Result<Self, EntityError> {
        if size.x <= 0.0 {
            return Err(EntityError::NonPositive {
                field: "block width",
                value: size.x,
            });
        }
        if size.y <= 0.0 {
            return Err(EntityError::NonPositive {
                field: "block height",
                value: size.y,
            });
        }
        if resistance == 0 {
            return Err(EntityError::NonPositive {
                field: "resistance",
                value: 0.0,
            });
        }
        Ok(Self {
            rect: Rect::new(pos, size),
            kind,
            resistance,
            active: true,
        })
    }

    #[inline]
    pub fn rect(&self) -> Rect {
        self.rect
    }

    #[inline]
    pub fn kind(&self) -> BlockKind {
        self.kind
    }

    #[inline]
    pub fn resistance(&self) -> u8 {
        self.resistance
    }

    #[inline]
    pub fn active(&self) -> bool {
        self.active
    }

    /// Take one hit. Returns true when this hit destroyed the block.
    /// Indestructible blocks soak hits without losing resistance.
    pub fn hit(&mut self) -> bool {
        if self.kind == BlockKind::Indestructible || !self.active {
            return false;
        }
        self.resistance -= 1;
        if self.resistance == 0 {
            self.active = false;
            return true;
        }
        false
    }

    /// Whether this block must be destroyed to complete the level
    pub fn counts_for_clear(&self) -> bool {
        self.kind != BlockKind::Indestructible
    }
}

/// Power-up varieties
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemKind {
    Resize,
    SpeedBoost,
    Fog,
}

impl ItemKind {
    /// How long the effect lasts once applied
    pub fn duration(self) -> f32 {
        match self {
            ItemKind::Resize => 8.0,
            ItemKind::SpeedBoost => 6.0,
            ItemKind::Fog => 5.0,
        }
    }
}

/// A transient power-up dropped by a destroyed bonus block
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    pub(crate) kind: ItemKind,
    pub(crate) rect: Rect,
    pub(crate) duration: f32,
    pub(crate) remaining: f32,
    pub(crate) active: bool,
    pub(crate) target: Side,
    pub(crate) snapshot: Option<PaddleAttributes>,
}

impl Item {
    pub fn new(kind: ItemKind, pos: Vec2, target: Side) -> Self {
        let duration = kind.duration();
        Self {
            kind,
            rect: Rect::new(pos, Vec2::splat(ITEM_SIZE)),
            duration,
            remaining: duration,
            active: false,
            target,
            snapshot: None,
        }
    }

    #[inline]
    pub fn kind(&self) -> ItemKind {
        self.kind
    }

    #[inline]
    pub fn rect(&self) -> Rect {
        self.rect
    }

    #[inline]
    pub fn target(&self) -> Side {
        self.target
    }

    #[inline]
    pub fn active(&self) -> bool {
        self.active
    }

    #[inline]
    pub fn remaining(&self) -> f32 {
        self.remaining
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::f32::consts::{FRAC_PI_2, PI, TAU};

    fn test_config() -> PaddleConfig {
        PaddleConfig {
            side: Side::Left,
            plane_x: 50.0,
            center: 250.0,
            speed: 400.0,
            north: 50.0,
            south: 450.0,
            width: 14.0,
            height: 100.0,
            primary: Color::rgb(240, 80, 80),
            secondary: Color::rgb(255, 200, 200),
        }
    }

    #[test]
    fn test_paddle_from_valid_config() {
        let paddle = Paddle::from_config(&test_config()).unwrap();
        assert_eq!(paddle.center(), 250.0);
        assert_eq!(paddle.height(), 100.0);
        assert!(paddle.active());
        assert!(!paddle.fogged());
    }

    #[test]
    fn test_paddle_height_normalized_even() {
        let mut config = test_config();
        config.height = 91.0;
        let paddle = Paddle::from_config(&config).unwrap();
        assert_eq!(paddle.height(), 92.0);
    }

    #[test]
    fn test_paddle_rejects_bad_geometry() {
        let mut config = test_config();
        config.width = 0.0;
        assert!(matches!(
            Paddle::from_config(&config),
            Err(EntityError::NonPositive { field: "width", .. })
        ));

        let mut config = test_config();
        config.south = config.north;
        assert!(matches!(
            Paddle::from_config(&config),
            Err(EntityError::InvalidBounds { .. })
        ));

        let mut config = test_config();
        config.center = 60.0; // extent would poke above north
        assert!(matches!(
            Paddle::from_config(&config),
            Err(EntityError::CenterOutOfBounds { .. })
        ));
    }

    #[test]
    fn test_paddle_set_center_clamps() {
        let mut paddle = Paddle::from_config(&test_config()).unwrap();
        paddle.set_center(-1000.0);
        assert_eq!(paddle.center(), 100.0); // north + height/2
        paddle.set_center(1000.0);
        assert_eq!(paddle.center(), 400.0); // south - height/2
    }

    #[test]
    fn test_paddle_rect_extends_away_from_plane() {
        let paddle = Paddle::from_config(&test_config()).unwrap();
        let rect = paddle.rect();
        // Left paddle body sits behind its collision plane
        assert_eq!(rect.max().x, 50.0);
        assert_eq!(rect.min().x, 36.0);
    }

    #[test]
    fn test_ball_construction_validation() {
        let pos = Vec2::new(100.0, 100.0);
        assert!(Ball::new(pos, 8.0, 300.0, 640.0, 0.0).is_ok());
        assert!(matches!(
            Ball::new(pos, 0.0, 300.0, 640.0, 0.0),
            Err(EntityError::NonPositive { field: "radius", .. })
        ));
        assert!(matches!(
            Ball::new(pos, 8.0, 0.0, 640.0, 0.0),
            Err(EntityError::NonPositive { field: "speed", .. })
        ));
        assert!(matches!(
            Ball::new(pos, 8.0, 700.0, 640.0, 0.0),
            Err(EntityError::SpeedAboveMax { .. })
        ));
    }

    #[test]
    fn test_ball_angle_normalized() {
        let ball = Ball::new(Vec2::ZERO, 8.0, 300.0, 640.0, -FRAC_PI_2).unwrap();
        assert!((ball.angle() - 3.0 * FRAC_PI_2).abs() < 1e-6);
    }

    #[test]
    fn test_ball_reflections() {
        let mut ball = Ball::new(Vec2::ZERO, 8.0, 300.0, 640.0, 0.5).unwrap();
        ball.reflect_x();
        assert!((ball.angle() - (PI - 0.5)).abs() < 1e-6);
        let mut ball = Ball::new(Vec2::ZERO, 8.0, 300.0, 640.0, 0.5).unwrap();
        ball.reflect_y();
        assert!((ball.angle() - (TAU - 0.5)).abs() < 1e-6);
    }

    #[test]
    fn test_ball_boost_caps_at_max() {
        let mut ball = Ball::new(Vec2::ZERO, 8.0, 600.0, 640.0, 0.0).unwrap();
        ball.boost(2.0);
        assert_eq!(ball.speed(), 640.0);
    }

    #[test]
    fn test_block_hit_lifecycle() {
        let mut block =
            Block::new(Vec2::ZERO, Vec2::new(40.0, 20.0), BlockKind::MultiHit).unwrap();
        assert!(!block.hit());
        assert!(!block.hit());
        assert!(block.hit()); // third hit destroys
        assert!(!block.active());
        assert_eq!(block.resistance(), 0);
        // Further hits are no-ops
        assert!(!block.hit());
        assert_eq!(block.resistance(), 0);
    }

    #[test]
    fn test_indestructible_block_never_breaks() {
        let mut block =
            Block::new(Vec2::ZERO, Vec2::new(40.0, 20.0), BlockKind::Indestructible).unwrap();
        for _ in 0..1000 {
            assert!(!block.hit());
        }
        assert!(block.active());
        assert!(!block.counts_for_clear());
    }

    #[test]
    fn test_block_rejects_degenerate_size() {
        assert!(Block::new(Vec2::ZERO, Vec2::new(0.0, 20.0), BlockKind::Destructible).is_err());
        assert!(Block::new(Vec2::ZERO, Vec2::new(40.0, -1.0), BlockKind::Destructible).is_err());
    }

    proptest! {
        /// Speed and angle invariants survive arbitrary reflect/boost runs
        #[test]
        fn prop_ball_invariants_hold(
            angle in 0.0f32..TAU,
            ops in proptest::collection::vec(0u8..3, 0..64),
            factor in 0.5f32..2.0,
        ) {
            let mut ball = Ball::new(Vec2::ZERO, 8.0, 300.0, 640.0, angle).unwrap();
            for op in ops {
                match op {
                    0 => ball.reflect_x(),
                    1 => ball.reflect_y(),
                    _ => ball.boost(factor),
                }
                prop_assert!(ball.speed() > 0.0);
                prop_assert!(ball.speed() <= ball.max_speed());
                prop_assert!((0.0..TAU).contains(&ball.angle()));
            }
        }
    }
}
