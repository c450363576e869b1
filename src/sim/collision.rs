//! Collision detection and resolution
//!
//! Detection is side-effect-free and symmetric per pair; resolution mutates
//! the entities it is given and reports what the caller must act on (block
//! destruction, item drops, goal crossings). The engine assumes validated
//! entities: malformed geometry is rejected at construction, never here.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;

use super::entity::{Ball, Block, BlockKind, Item, ItemKind, Paddle, Rect, Side};
use crate::consts::*;

/// A reference to anything the engine can test pairwise
#[derive(Debug, Clone, Copy)]
pub enum Collider<'a> {
    Ball(&'a Ball),
    Paddle(&'a Paddle),
    Block(&'a Block),
}

/// Circle-vs-rectangle axis-aligned overlap test
#[inline]
pub fn circle_overlaps_rect(center: Vec2, radius: f32, rect: &Rect) -> bool {
    let min = rect.min();
    let max = rect.max();
    center.x + radius >= min.x
        && center.x - radius <= max.x
        && center.y + radius >= min.y
        && center.y - radius <= max.y
}

/// Pairwise detection. Inactive entities never collide; pairs the engine
/// does not arbitrate (block-block, paddle-paddle, ball-ball) report false.
pub fn detect(a: Collider<'_>, b: Collider<'_>) -> bool {
    match (a, b) {
        (Collider::Ball(ball), Collider::Block(block))
        | (Collider::Block(block), Collider::Ball(ball)) => {
            ball.active() && block.active() && circle_overlaps_rect(ball.pos(), ball.radius(), &block.rect())
        }
        (Collider::Ball(ball), Collider::Paddle(paddle))
        | (Collider::Paddle(paddle), Collider::Ball(ball)) => {
            ball.active()
                && paddle.active()
                && circle_overlaps_rect(ball.pos(), ball.radius(), &paddle.rect())
        }
        _ => false,
    }
}

/// Outcome of a resolved ball-block contact
#[derive(Debug)]
pub struct BlockImpact {
    /// The hit exhausted the block's resistance
    pub destroyed: bool,
    /// Item dropped by a destroyed bonus block, for the caller to spawn
    pub item: Option<Item>,
}

#[inline]
fn axis_sign(v: f32) -> f32 {
    if v >= 0.0 { 1.0 } else { -1.0 }
}

/// Resolve a ball-block contact.
///
/// The dominant center-to-center displacement axis picks the reflection
/// axis, and the ball is separated along it so one contact costs exactly
/// one resistance point. A destroyed bonus block rolls `drop_chance` and
/// hands any spawned item back to the caller, targeted at `item_target`.
pub fn resolve_ball_block(
    ball: &mut Ball,
    block: &mut Block,
    item_target: Side,
    rng: &mut Pcg32,
    drop_chance: f32,
) -> BlockImpact {
    let rect = block.rect();
    let block_center = rect.center();
    let delta = ball.pos() - block_center;

    if delta.x.abs() >= delta.y.abs() {
        ball.reflect_x();
        let x = block_center.x + axis_sign(delta.x) * (rect.size.x / 2.0 + ball.radius());
        ball.set_pos(Vec2::new(x, ball.pos().y));
    } else {
        ball.reflect_y();
        let y = block_center.y + axis_sign(delta.y) * (rect.size.y / 2.0 + ball.radius());
        ball.set_pos(Vec2::new(ball.pos().x, y));
    }

    let destroyed = block.hit();
    let item = if destroyed && block.kind() == BlockKind::Bonus && rng.random::<f32>() < drop_chance
    {
        let kind = match rng.random_range(0..3) {
            0 => ItemKind::Resize,
            1 => ItemKind::SpeedBoost,
            _ => ItemKind::Fog,
        };
        let pos = block_center - Vec2::splat(ITEM_SIZE / 2.0);
        Some(Item::new(kind, pos, item_target))
    } else {
        None
    };

    BlockImpact { destroyed, item }
}

/// Resolve a ball-paddle contact. Returns whether the ball actually
/// bounced.
///
/// Reflects the horizontal velocity and deflects the exit angle in
/// proportion to the impact offset from the paddle center, so edge hits
/// leave steeper than center hits. A ball already moving away from the
/// plane is left alone, preventing sticky re-captures.
pub fn resolve_ball_paddle(ball: &mut Ball, paddle: &Paddle) -> bool {
    let vx = ball.velocity().x;
    match paddle.side() {
        Side::Left if vx >= 0.0 => return false,
        Side::Right if vx <= 0.0 => return false,
        _ => {}
    }

    let half = paddle.height() / 2.0;
    let offset = ((ball.pos().y - paddle.center()) / half).clamp(-1.0, 1.0);
    let deflection = offset * PADDLE_DEFLECTION_MAX;
    // vy = -speed*sin(angle): a hit above center (negative offset) must
    // send the ball upward on screen
    let angle = match paddle.side() {
        Side::Left => -deflection,
        Side::Right => std::f32::consts::PI + deflection,
    };
    ball.set_angle(angle);
    ball.boost(PADDLE_BOOST);

    let x = match paddle.side() {
        Side::Left => paddle.plane_x() + ball.radius(),
        Side::Right => paddle.plane_x() - ball.radius(),
    };
    ball.set_pos(Vec2::new(x, ball.pos().y));
    true
}

/// Resolve wall contacts: bounce off top/bottom, report a goal when the
/// ball has fully crossed the left or right boundary.
pub fn resolve_ball_walls(ball: &mut Ball, field_width: f32, field_height: f32) -> Option<Side> {
    let r = ball.radius();
    let pos = ball.pos();
    let vy = ball.velocity().y;

    if pos.y - r <= 0.0 && vy < 0.0 {
        ball.reflect_y();
        ball.set_pos(Vec2::new(pos.x, r));
    } else if pos.y + r >= field_height && vy > 0.0 {
        ball.reflect_y();
        ball.set_pos(Vec2::new(pos.x, field_height - r));
    }

    let pos = ball.pos();
    if pos.x + r < 0.0 {
        Some(Side::Left)
    } else if pos.x - r > field_width {
        Some(Side::Right)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::entity::{Color, PaddleConfig};
    use proptest::prelude::*;
    use rand::SeedableRng;
    use std::f32::consts::PI;

    fn ball_at(x: f32, y: f32, angle: f32) -> Ball {
        Ball::new(Vec2::new(x, y), 10.0, 300.0, 640.0, angle).unwrap()
    }

    fn block_at(x: f32, y: f32, w: f32, h: f32, kind: BlockKind) -> Block {
        Block::new(Vec2::new(x, y), Vec2::new(w, h), kind).unwrap()
    }

    fn paddle(side: Side) -> Paddle {
        let plane_x = match side {
            Side::Left => 50.0,
            Side::Right => 750.0,
        };
        Paddle::from_config(&PaddleConfig {
            side,
            plane_x,
            center: 300.0,
            speed: 420.0,
            north: 0.0,
            south: 600.0,
            width: 14.0,
            height: 100.0,
            primary: Color::rgb(200, 200, 200),
            secondary: Color::rgb(90, 90, 90),
        })
        .unwrap()
    }

    #[test]
    fn test_overlap_scenario_from_both_axes() {
        // Ball at (100,100) radius 10, block at (90,95) size 20x20
        let ball = ball_at(100.0, 100.0, 0.0);
        let block = block_at(90.0, 95.0, 20.0, 20.0, BlockKind::Destructible);
        assert!(detect(Collider::Ball(&ball), Collider::Block(&block)));
    }

    #[test]
    fn test_detection_is_symmetric() {
        let ball = ball_at(100.0, 100.0, 0.0);
        let near = block_at(90.0, 95.0, 20.0, 20.0, BlockKind::Destructible);
        let far = block_at(500.0, 500.0, 20.0, 20.0, BlockKind::Destructible);
        assert_eq!(
            detect(Collider::Ball(&ball), Collider::Block(&near)),
            detect(Collider::Block(&near), Collider::Ball(&ball)),
        );
        assert_eq!(
            detect(Collider::Ball(&ball), Collider::Block(&far)),
            detect(Collider::Block(&far), Collider::Ball(&ball)),
        );
    }

    #[test]
    fn test_inactive_block_excluded() {
        let ball = ball_at(100.0, 100.0, 0.0);
        let mut block = block_at(90.0, 95.0, 20.0, 20.0, BlockKind::Destructible);
        assert!(detect(Collider::Ball(&ball), Collider::Block(&block)));
        block.hit();
        assert!(!block.active());
        assert!(!detect(Collider::Ball(&ball), Collider::Block(&block)));
    }

    #[test]
    fn test_block_resolution_decrements_exactly_one() {
        let mut rng = Pcg32::seed_from_u64(7);
        let mut ball = ball_at(200.0, 110.0, 0.0);
        let mut block = block_at(180.0, 120.0, 40.0, 20.0, BlockKind::MultiHit);
        let before = block.resistance();
        let impact = resolve_ball_block(&mut ball, &mut block, Side::Left, &mut rng, 0.0);
        assert_eq!(block.resistance(), before - 1);
        assert!(!impact.destroyed);
        assert!(impact.item.is_none());
    }

    #[test]
    fn test_block_reflection_axis_follows_dominant_displacement() {
        let mut rng = Pcg32::seed_from_u64(7);

        // Ball well above block center: vertical displacement dominates
        let mut ball = ball_at(200.0, 100.0, 3.0 * PI / 2.0); // heading down
        let vy_before = ball.velocity().y;
        let mut block = block_at(180.0, 110.0, 40.0, 20.0, BlockKind::Destructible);
        resolve_ball_block(&mut ball, &mut block, Side::Left, &mut rng, 0.0);
        assert!(vy_before > 0.0 && ball.velocity().y < 0.0);

        // Ball left of block center: horizontal displacement dominates
        let mut ball = ball_at(170.0, 120.0, 0.0); // heading right
        let vx_before = ball.velocity().x;
        let mut block = block_at(180.0, 110.0, 40.0, 20.0, BlockKind::Destructible);
        resolve_ball_block(&mut ball, &mut block, Side::Left, &mut rng, 0.0);
        assert!(vx_before > 0.0 && ball.velocity().x < 0.0);
    }

    #[test]
    fn test_bonus_block_drop_is_deterministic_at_full_chance() {
        let mut rng = Pcg32::seed_from_u64(42);
        let mut ball = ball_at(200.0, 110.0, 0.0);
        let mut block = block_at(180.0, 100.0, 40.0, 20.0, BlockKind::Bonus);
        let impact = resolve_ball_block(&mut ball, &mut block, Side::Right, &mut rng, 1.0);
        assert!(impact.destroyed);
        let item = impact.item.expect("drop chance 1.0 must yield an item");
        assert_eq!(item.target(), Side::Right);
        assert!(!item.active());
    }

    #[test]
    fn test_bonus_block_never_drops_at_zero_chance() {
        let mut rng = Pcg32::seed_from_u64(42);
        let mut ball = ball_at(200.0, 110.0, 0.0);
        let mut block = block_at(180.0, 100.0, 40.0, 20.0, BlockKind::Bonus);
        let impact = resolve_ball_block(&mut ball, &mut block, Side::Right, &mut rng, 0.0);
        assert!(impact.destroyed);
        assert!(impact.item.is_none());
    }

    #[test]
    fn test_paddle_center_hit_reflects_horizontal() {
        let paddle = paddle(Side::Left);
        let mut ball = ball_at(55.0, 300.0, PI); // heading left, dead center
        assert!(resolve_ball_paddle(&mut ball, &paddle));
        let v = ball.velocity();
        assert!(v.x > 0.0);
        assert!(v.y.abs() < 1e-3);
    }

    #[test]
    fn test_paddle_edge_hit_deflects_steeply() {
        let paddle = paddle(Side::Left);
        // Near the top edge of the paddle (center 300, half-height 50)
        let mut ball = ball_at(55.0, 255.0, PI);
        resolve_ball_paddle(&mut ball, &paddle);
        let v = ball.velocity();
        assert!(v.x > 0.0);
        assert!(v.y < 0.0, "top-edge hit must send the ball upward");
        assert!((ball.angle() - 0.9 * PADDLE_DEFLECTION_MAX).abs() < 0.01);
    }

    #[test]
    fn test_paddle_ignores_departing_ball() {
        let paddle = paddle(Side::Left);
        let mut ball = ball_at(55.0, 300.0, 0.0); // already heading right
        let angle = ball.angle();
        assert!(!resolve_ball_paddle(&mut ball, &paddle));
        assert_eq!(ball.angle(), angle);
    }

    #[test]
    fn test_paddle_boost_respects_max_speed() {
        let paddle = paddle(Side::Right);
        let mut ball = Ball::new(Vec2::new(745.0, 300.0), 10.0, 635.0, 640.0, 0.0).unwrap();
        resolve_ball_paddle(&mut ball, &paddle);
        assert!(ball.speed() <= ball.max_speed());
    }

    #[test]
    fn test_wall_bounce_top() {
        let mut ball = ball_at(400.0, 5.0, PI / 3.0); // heading up-right
        assert!(ball.velocity().y < 0.0);
        let goal = resolve_ball_walls(&mut ball, 800.0, 600.0);
        assert!(goal.is_none());
        assert!(ball.velocity().y > 0.0);
        assert_eq!(ball.pos().y, ball.radius());
    }

    #[test]
    fn test_goal_crossings() {
        let mut ball = ball_at(-20.0, 300.0, PI);
        assert_eq!(resolve_ball_walls(&mut ball, 800.0, 600.0), Some(Side::Left));

        let mut ball = ball_at(820.0, 300.0, 0.0);
        assert_eq!(resolve_ball_walls(&mut ball, 800.0, 600.0), Some(Side::Right));

        let mut ball = ball_at(400.0, 300.0, 0.0);
        assert_eq!(resolve_ball_walls(&mut ball, 800.0, 600.0), None);
    }

    proptest! {
        /// detect(ball, block) == detect(block, ball) over random geometry
        #[test]
        fn prop_detection_symmetric(
            bx in 0.0f32..800.0,
            by in 0.0f32..600.0,
            x in 0.0f32..800.0,
            y in 0.0f32..600.0,
            w in 1.0f32..120.0,
            h in 1.0f32..60.0,
        ) {
            let ball = ball_at(bx, by, 0.0);
            let block = block_at(x, y, w, h, BlockKind::Destructible);
            prop_assert_eq!(
                detect(Collider::Ball(&ball), Collider::Block(&block)),
                detect(Collider::Block(&block), Collider::Ball(&ball)),
            );
        }
    }
}
