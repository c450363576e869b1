//! Game state machine and per-tick pipeline
//!
//! `GameState` owns every mutable piece of the running match. While in the
//! `Playing` phase each tick runs movement, collisions, item effect timers,
//! then scoring; other phases are inert with respect to the pipeline.
//! Observer callbacks are dispatched only after all of a tick's state
//! mutation has completed.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::collision::{self, Collider};
use super::entity::{Ball, Block, EntityError, Item, Paddle, Side};
use super::items::{self, EffectTarget};
use super::strategy::{AiController, Driver, MoveContext, PaddleInput};
use crate::config::AppContext;
use crate::consts::*;
use crate::level::LevelSnapshot;

/// Current phase of the application
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Menu,
    Playing,
    Paused,
    GameOver,
}

/// Match setup carried by the start command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameMode {
    TwoPlayer,
    VsAi { difficulty: u8 },
    /// Both paddles AI-driven, for attract/demo screens
    Demo { left: u8, right: u8 },
}

/// Discrete commands delivered by the input collaborator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    StartGame(GameMode),
    Pause,
}

/// Input snapshot for a single tick: plain values, no control flow
#[derive(Debug, Clone, Copy, Default)]
pub struct TickInput {
    pub left: PaddleInput,
    pub right: PaddleInput,
    pub command: Option<Command>,
}

/// Match score
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Score {
    pub left: u32,
    pub right: u32,
}

impl Score {
    pub fn get(self, side: Side) -> u32 {
        match side {
            Side::Left => self.left,
            Side::Right => self.right,
        }
    }

    fn add_point(&mut self, side: Side) -> u32 {
        match side {
            Side::Left => {
                self.left += 1;
                self.left
            }
            Side::Right => {
                self.right += 1;
                self.right
            }
        }
    }

    /// Who is ahead, or None when tied
    pub fn leader(self) -> Option<Side> {
        match self.left.cmp(&self.right) {
            std::cmp::Ordering::Greater => Some(Side::Left),
            std::cmp::Ordering::Less => Some(Side::Right),
            std::cmp::Ordering::Equal => None,
        }
    }
}

/// Capability set for the audio/UI collaborators. Callbacks run
/// synchronously at the end of a tick and must not panic back into the
/// simulation.
pub trait GameObserver {
    fn on_score_changed(&mut self, _side: Side, _score: u32) {}
    fn on_game_ended(&mut self, _winner: Option<Side>) {}
    fn on_level_completed(&mut self) {}
    fn on_item_spawned(&mut self, _item: &Item) {}
}

/// Events accumulated during a tick, dispatched after mutation completes
enum GameEvent {
    Score(Side, u32),
    Ended(Option<Side>),
    LevelCompleted,
    ItemSpawned(Item),
}

/// Read-only snapshot of the active entities for the rendering collaborator
pub struct SceneView<'a> {
    pub phase: Phase,
    pub score: Score,
    pub paddles: [&'a Paddle; 2],
    pub ball: &'a Ball,
    pub blocks: &'a [Block],
    pub items: &'a [Item],
}

/// Complete state of the running match
pub struct GameState {
    phase: Phase,
    mode: Option<GameMode>,
    score: Score,
    win_score: u32,
    time_limit: Option<f32>,
    elapsed: f32,
    paddle_left: Paddle,
    paddle_right: Paddle,
    driver_left: Driver,
    driver_right: Driver,
    ball: Ball,
    blocks: Vec<Block>,
    items: Vec<Item>,
    item_drop_chance: f32,
    seed: u64,
    rng: Pcg32,
    time_ticks: u64,
    game_over_timer: f32,
    last_touch: Option<Side>,
    level_complete: bool,
    observers: Vec<Box<dyn GameObserver>>,
}

impl GameState {
    /// Build the initial state in the `Menu` phase from validated paddle
    /// prototypes
    pub fn new(ctx: &AppContext, seed: u64) -> Result<Self, EntityError> {
        let paddle_left = Paddle::from_config(ctx.paddles().config_for(Side::Left))?;
        let paddle_right = Paddle::from_config(ctx.paddles().config_for(Side::Right))?;
        let ball = Ball::new(
            Vec2::new(FIELD_WIDTH / 2.0, FIELD_HEIGHT / 2.0),
            BALL_RADIUS,
            BALL_START_SPEED,
            BALL_MAX_SPEED,
            0.0,
        )?;
        Ok(Self {
            phase: Phase::Menu,
            mode: None,
            score: Score::default(),
            win_score: ctx.settings.win_score,
            time_limit: ctx.settings.time_limit,
            elapsed: 0.0,
            paddle_left,
            paddle_right,
            driver_left: Driver::Human,
            driver_right: Driver::Human,
            ball,
            blocks: Vec::new(),
            items: Vec::new(),
            item_drop_chance: ctx.settings.item_drop_chance,
            seed,
            rng: Pcg32::seed_from_u64(seed),
            time_ticks: 0,
            game_over_timer: 0.0,
            last_touch: None,
            level_complete: true,
            observers: Vec::new(),
        })
    }

    pub fn add_observer(&mut self, observer: Box<dyn GameObserver>) {
        self.observers.push(observer);
    }

    /// Replace the mid-field layout with a level's blocks
    pub fn load_level(&mut self, level: &LevelSnapshot) -> Result<(), EntityError> {
        self.blocks = level.spawn()?;
        self.level_complete = !self.blocks.iter().any(Block::counts_for_clear);
        log::info!(
            "loaded level '{}' with {} blocks",
            level.meta().name,
            self.blocks.len()
        );
        Ok(())
    }

    #[inline]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    #[inline]
    pub fn mode(&self) -> Option<GameMode> {
        self.mode
    }

    #[inline]
    pub fn score(&self) -> Score {
        self.score
    }

    #[inline]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    #[inline]
    pub fn time_ticks(&self) -> u64 {
        self.time_ticks
    }

    pub fn paddle(&self, side: Side) -> &Paddle {
        match side {
            Side::Left => &self.paddle_left,
            Side::Right => &self.paddle_right,
        }
    }

    pub fn ball(&self) -> &Ball {
        &self.ball
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// Read-only view for the rendering collaborator
    pub fn render_view(&self) -> SceneView<'_> {
        SceneView {
            phase: self.phase,
            score: self.score,
            paddles: [&self.paddle_left, &self.paddle_right],
            ball: &self.ball,
            blocks: &self.blocks,
            items: &self.items,
        }
    }

    fn paddle_mut(&mut self, side: Side) -> &mut Paddle {
        match side {
            Side::Left => &mut self.paddle_left,
            Side::Right => &mut self.paddle_right,
        }
    }

    /// Advance the machine by one tick of `dt` seconds
    pub fn tick(&mut self, input: &TickInput, dt: f32) {
        let mut events = Vec::new();

        if let Some(command) = input.command {
            self.handle_command(command);
        }

        match self.phase {
            Phase::Playing => {
                self.run_pipeline(input, dt, &mut events);
                self.time_ticks += 1;
            }
            Phase::GameOver => {
                // One-shot timed return to the menu, no input required
                self.game_over_timer -= dt;
                if self.game_over_timer <= 0.0 {
                    self.phase = Phase::Menu;
                }
            }
            Phase::Menu | Phase::Paused => {}
        }

        self.dispatch(events);
    }

    fn handle_command(&mut self, command: Command) {
        match command {
            Command::StartGame(mode) if self.phase == Phase::Menu => self.start(mode),
            Command::StartGame(_) => {}
            Command::Pause => match self.phase {
                Phase::Playing => self.phase = Phase::Paused,
                Phase::Paused => self.phase = Phase::Playing,
                _ => {}
            },
        }
    }

    fn start(&mut self, mode: GameMode) {
        let (driver_left, driver_right) = match mode {
            GameMode::TwoPlayer => (Driver::Human, Driver::Human),
            GameMode::VsAi { difficulty } => (
                Driver::Human,
                Driver::Ai(AiController::for_difficulty(difficulty, self.seed)),
            ),
            GameMode::Demo { left, right } => (
                Driver::Ai(AiController::for_difficulty(left, self.seed)),
                Driver::Ai(AiController::for_difficulty(right, self.seed.wrapping_add(1))),
            ),
        };
        self.driver_left = driver_left;
        self.driver_right = driver_right;
        self.mode = Some(mode);
        self.score = Score::default();
        self.elapsed = 0.0;
        self.clear_items();

        // Paddles return to the middle of their bands
        let mid = |p: &Paddle| {
            let (north, south) = p.bounds();
            p.clamp_center((north + south) / 2.0)
        };
        let c = mid(&self.paddle_left);
        self.paddle_left.set_center(c);
        let c = mid(&self.paddle_right);
        self.paddle_right.set_center(c);

        let toward = if self.rng.random_bool(0.5) {
            Side::Left
        } else {
            Side::Right
        };
        self.serve(toward);
        self.phase = Phase::Playing;
        log::info!("match started: {mode:?}");
    }

    /// Re-serve from mid-field toward the conceding side, at a random
    /// angle inside the service cone
    fn serve(&mut self, toward: Side) {
        let base = match toward {
            Side::Right => 0.0,
            Side::Left => std::f32::consts::PI,
        };
        let jitter = self.rng.random_range(-HALF_SERVICE_ANGLE..=HALF_SERVICE_ANGLE);
        self.ball.reset(
            Vec2::new(FIELD_WIDTH / 2.0, FIELD_HEIGHT / 2.0),
            BALL_START_SPEED,
            base + jitter,
        );
        self.last_touch = None;
    }

    fn run_pipeline(&mut self, input: &TickInput, dt: f32, events: &mut Vec<GameEvent>) {
        // 1. Movement
        let ctx = MoveContext {
            ball: &self.ball,
            input: input.left,
        };
        let c = self.driver_left.next_center(&self.paddle_left, &ctx, dt);
        self.paddle_left.set_center(c);

        let ctx = MoveContext {
            ball: &self.ball,
            input: input.right,
        };
        let c = self.driver_right.next_center(&self.paddle_right, &ctx, dt);
        self.paddle_right.set_center(c);

        self.ball.advance(dt);

        // 2. Collisions: paddles, then blocks, then walls
        if collision::detect(Collider::Ball(&self.ball), Collider::Paddle(&self.paddle_left))
            && collision::resolve_ball_paddle(&mut self.ball, &self.paddle_left)
        {
            self.last_touch = Some(Side::Left);
        }
        if collision::detect(Collider::Ball(&self.ball), Collider::Paddle(&self.paddle_right))
            && collision::resolve_ball_paddle(&mut self.ball, &self.paddle_right)
        {
            self.last_touch = Some(Side::Right);
        }

        self.collide_blocks(events);

        let crossed = collision::resolve_ball_walls(&mut self.ball, FIELD_WIDTH, FIELD_HEIGHT);

        // 3. Item effect timers
        let GameState {
            items,
            paddle_left,
            paddle_right,
            ..
        } = self;
        for item in items.iter_mut() {
            let paddle = match item.target() {
                Side::Left => &mut *paddle_left,
                Side::Right => &mut *paddle_right,
            };
            items::update(item, dt, paddle);
        }
        items.retain(Item::active);

        // 4. Scoring and match end
        self.elapsed += dt;
        if let Some(crossed) = crossed {
            let scorer = crossed.opposite();
            let score = self.score.add_point(scorer);
            events.push(GameEvent::Score(scorer, score));
            if score >= self.win_score {
                self.end_game(Some(scorer), events);
            } else {
                self.serve(crossed);
            }
        }
        if self.phase == Phase::Playing
            && let Some(limit) = self.time_limit
            && self.elapsed >= limit
        {
            self.end_game(self.score.leader(), events);
        }
    }

    fn collide_blocks(&mut self, events: &mut Vec<GameEvent>) {
        let drop_chance = self.item_drop_chance;
        // A drop rewards whoever last touched the ball; before any contact,
        // infer the hitter from the travel direction
        let item_target = self.last_touch.unwrap_or(if self.ball.velocity().x > 0.0 {
            Side::Left
        } else {
            Side::Right
        });

        let mut spawned = Vec::new();
        {
            let GameState {
                ball, blocks, rng, ..
            } = self;
            for block in blocks.iter_mut() {
                if !collision::detect(Collider::Ball(ball), Collider::Block(block)) {
                    continue;
                }
                let impact = collision::resolve_ball_block(ball, block, item_target, rng, drop_chance);
                if let Some(item) = impact.item {
                    spawned.push(item);
                }
            }
        }

        for mut item in spawned {
            let paddle = self.paddle_mut(item.target());
            match items::apply(&mut item, EffectTarget::Paddle(paddle)) {
                Ok(()) => {
                    events.push(GameEvent::ItemSpawned(item.clone()));
                    self.items.push(item);
                }
                Err(err) => log::warn!("dropped item not applied: {err}"),
            }
        }

        if !self.level_complete
            && !self.blocks.iter().any(|b| b.active() && b.counts_for_clear())
        {
            self.level_complete = true;
            events.push(GameEvent::LevelCompleted);
        }
    }

    fn end_game(&mut self, winner: Option<Side>, events: &mut Vec<GameEvent>) {
        self.clear_items();
        self.phase = Phase::GameOver;
        self.game_over_timer = GAME_OVER_DISPLAY_SECS;
        events.push(GameEvent::Ended(winner));
        log::info!(
            "match over: winner {winner:?}, score {}-{}",
            self.score.left,
            self.score.right
        );
    }

    /// Deactivate every live item, restoring paddle attributes
    fn clear_items(&mut self) {
        let GameState {
            items,
            paddle_left,
            paddle_right,
            ..
        } = self;
        for item in items.iter_mut() {
            let paddle = match item.target() {
                Side::Left => &mut *paddle_left,
                Side::Right => &mut *paddle_right,
            };
            items::deactivate(item, paddle);
        }
        items.clear();
    }

    /// Dispatch accumulated events after the tick's mutations are done
    fn dispatch(&mut self, events: Vec<GameEvent>) {
        if events.is_empty() || self.observers.is_empty() {
            return;
        }
        let mut observers = std::mem::take(&mut self.observers);
        for event in &events {
            for observer in observers.iter_mut() {
                match event {
                    GameEvent::Score(side, score) => observer.on_score_changed(*side, *score),
                    GameEvent::Ended(winner) => observer.on_game_ended(*winner),
                    GameEvent::LevelCompleted => observer.on_level_completed(),
                    GameEvent::ItemSpawned(item) => observer.on_item_spawned(item),
                }
            }
        }
        self.observers = observers;
    }
}
