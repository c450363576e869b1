//! Paddle movement strategies
//!
//! A driver computes the paddle's next vertical center once per tick. Human
//! drivers map direction signals; AI drivers predict the ball's intercept
//! with a difficulty-scaled error and a reaction timer that limits how often
//! they re-aim. Each AI owns its own seeded RNG stream so a match replays
//! from its seed.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::entity::{Ball, Paddle};

/// Discrete direction signal delivered by the input collaborator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PaddleInput {
    Up,
    Down,
    #[default]
    Idle,
}

/// Per-call context handed to a driver for the duration of one tick
#[derive(Debug, Clone, Copy)]
pub struct MoveContext<'a> {
    pub ball: &'a Ball,
    pub input: PaddleInput,
}

/// What moves a paddle: a human input signal or an AI controller
#[derive(Debug, Clone)]
pub enum Driver {
    Human,
    Ai(AiController),
}

impl Driver {
    /// Compute the paddle's next center, clamped to its bounds
    pub fn next_center(&mut self, paddle: &Paddle, ctx: &MoveContext<'_>, dt: f32) -> f32 {
        match self {
            Driver::Human => human_next_center(paddle, ctx.input, dt),
            Driver::Ai(ai) => ai.next_center(paddle, ctx.ball, dt),
        }
    }
}

fn human_next_center(paddle: &Paddle, input: PaddleInput, dt: f32) -> f32 {
    let step = paddle.speed() * dt;
    let target = match input {
        PaddleInput::Up => paddle.center() - step,
        PaddleInput::Down => paddle.center() + step,
        PaddleInput::Idle => paddle.center(),
    };
    paddle.clamp_center(target)
}

/// An AI opponent for one match.
///
/// Difficulty 1-10 monotonically shrinks both the reaction interval and the
/// uniform prediction-error span.
#[derive(Debug, Clone)]
pub struct AiController {
    difficulty: u8,
    reaction_interval: f32,
    error_span: f32,
    reaction_timer: f32,
    target: Option<f32>,
    rng: Pcg32,
}

impl AiController {
    /// Build the controller for a difficulty tier (clamped to 1-10)
    pub fn for_difficulty(difficulty: u8, seed: u64) -> Self {
        let difficulty = difficulty.clamp(1, 10);
        let tier = difficulty as f32;
        Self {
            difficulty,
            reaction_interval: 0.05 + 0.05 * (10.0 - tier),
            error_span: 15.0 * (11.0 - tier),
            reaction_timer: 0.0,
            target: None,
            rng: Pcg32::seed_from_u64(seed.wrapping_add(difficulty as u64)),
        }
    }

    #[inline]
    pub fn difficulty(&self) -> u8 {
        self.difficulty
    }

    #[inline]
    pub fn reaction_interval(&self) -> f32 {
        self.reaction_interval
    }

    #[inline]
    pub fn error_span(&self) -> f32 {
        self.error_span
    }

    /// Last computed aim point, if any
    #[inline]
    pub fn target(&self) -> Option<f32> {
        self.target
    }

    fn next_center(&mut self, paddle: &Paddle, ball: &Ball, dt: f32) -> f32 {
        self.reaction_timer -= dt;
        if self.reaction_timer <= 0.0 {
            self.reaction_timer = self.reaction_interval;
            let (north, south) = paddle.bounds();
            // When the ball is heading away, drift back to the band middle
            let predicted = predict_intercept_y(ball, paddle.plane_x(), north, south)
                .unwrap_or((north + south) / 2.0);
            let error = self.rng.random_range(-self.error_span..=self.error_span);
            self.target = Some(predicted + error);
        }

        let Some(target) = self.target else {
            return paddle.center();
        };
        let step = paddle.speed() * dt;
        let center = if (target - paddle.center()).abs() <= step {
            target
        } else if target > paddle.center() {
            paddle.center() + step
        } else {
            paddle.center() - step
        };
        paddle.clamp_center(center)
    }
}

/// Predict the ball's y at `plane_x` by linear extrapolation, folding the
/// path off the top/bottom walls by mirror reflection (not a physics
/// replay). None when the ball is not approaching the plane.
pub fn predict_intercept_y(ball: &Ball, plane_x: f32, top: f32, bottom: f32) -> Option<f32> {
    let vel = ball.velocity();
    let dx = plane_x - ball.pos().x;
    if vel.x == 0.0 || dx * vel.x <= 0.0 {
        return None;
    }
    let t = dx / vel.x;
    let raw = ball.pos().y + vel.y * t;
    Some(mirror_fold(raw, top + ball.radius(), bottom - ball.radius()))
}

/// Fold a coordinate into [lo, hi] by repeated mirror reflection
fn mirror_fold(value: f32, lo: f32, hi: f32) -> f32 {
    let span = hi - lo;
    if span <= 0.0 {
        return (lo + hi) / 2.0;
    }
    let period = 2.0 * span;
    let m = (value - lo).rem_euclid(period);
    lo + if m <= span { m } else { period - m }
}
