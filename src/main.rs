//! Rally Pong entry point
//!
//! Headless exhibition loop: runs an AI-vs-AI match at the fixed
//! simulation rate and logs the events a presentation layer would render.

use std::time::{Duration, Instant};

use clap::Parser;

use rally_pong::config::{AppContext, Settings};
use rally_pong::consts::*;
use rally_pong::level::LevelSnapshot;
use rally_pong::sim::{
    Command, GameMode, GameObserver, GameState, Item, Phase, Side, TickInput,
};

#[derive(Parser)]
#[command(name = "rally-pong", about = "Block-breaking Pong, exhibition mode")]
struct Args {
    /// AI difficulty for the left paddle (1-10)
    #[arg(long, default_value_t = 5)]
    left: u8,

    /// AI difficulty for the right paddle (1-10)
    #[arg(long, default_value_t = 5)]
    right: u8,

    /// Points needed to win
    #[arg(long, default_value_t = WIN_SCORE)]
    win_score: u32,

    /// Match time limit in seconds (leader wins, ties draw)
    #[arg(long)]
    time_limit: Option<f32>,

    /// RNG seed for a reproducible match
    #[arg(long, default_value_t = 0x00C0_FFEE)]
    seed: u64,

    /// Run the simulation flat out instead of in real time
    #[arg(long)]
    fast: bool,

    /// Safety cap on simulated ticks
    #[arg(long, default_value_t = 120 * 60 * 10)]
    max_ticks: u64,
}

/// Logs what the audio/UI collaborators would present
struct ConsoleObserver;

impl GameObserver for ConsoleObserver {
    fn on_score_changed(&mut self, side: Side, score: u32) {
        log::info!("point for {side:?}, now at {score}");
    }

    fn on_game_ended(&mut self, winner: Option<Side>) {
        match winner {
            Some(side) => log::info!("match won by {side:?}"),
            None => log::info!("match drawn"),
        }
    }

    fn on_level_completed(&mut self) {
        log::info!("mid-field wall cleared");
    }

    fn on_item_spawned(&mut self, item: &Item) {
        log::info!("{:?} item applied to the {:?} paddle", item.kind(), item.target());
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let settings = Settings {
        win_score: args.win_score,
        time_limit: args.time_limit,
        ..Default::default()
    };
    let ctx = AppContext::new(settings);

    let mut game = GameState::new(&ctx, args.seed)?;
    game.add_observer(Box::new(ConsoleObserver));
    game.load_level(&LevelSnapshot::default_layout())?;

    let mut input = TickInput {
        command: Some(Command::StartGame(GameMode::Demo {
            left: args.left,
            right: args.right,
        })),
        ..Default::default()
    };

    let mut accumulator = 0.0f32;
    let mut last = Instant::now();
    while game.time_ticks() < args.max_ticks {
        if args.fast {
            game.tick(&input, SIM_DT);
            input.command = None;
        } else {
            let now = Instant::now();
            let dt = (now - last).as_secs_f32().min(0.1);
            last = now;
            accumulator += dt;

            let mut substeps = 0;
            while accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
                game.tick(&input, SIM_DT);
                input.command = None;
                accumulator -= SIM_DT;
                substeps += 1;
            }
            std::thread::sleep(Duration::from_millis(2));
        }

        if game.phase() == Phase::GameOver {
            break;
        }
    }

    let score = game.score();
    println!("final score: {} - {}", score.left, score.right);
    Ok(())
}
