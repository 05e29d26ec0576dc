//! Grid Snake headless runner
//!
//! Plays one autopilot game against a simulated clock and prints the result.

use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use clap::Parser;

use grid_snake::audio::{AudioManager, LogSound};
use grid_snake::persistence::{FileStore, KeyValueStore, MemoryStore};
use grid_snake::render::{ascii_board, format_time, status_line};
use grid_snake::sim::{GameConfig, GameState, GameStatus, autopilot};
use grid_snake::{Difficulty, Ports, Session, Settings, StoredScores};

/// Simulated frame length
const FRAME: Duration = Duration::from_millis(16);

#[derive(Parser)]
#[command(name = "grid-snake")]
#[command(version, about = "Deterministic grid snake, played by an autopilot")]
struct Args {
    /// RNG seed (random when omitted)
    #[arg(long)]
    seed: Option<u64>,

    /// Simulated seconds to play at most
    #[arg(long, default_value = "60")]
    seconds: u64,

    /// JSON game config; stored difficulty is ignored when given
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the difficulty (easy, medium, hard)
    #[arg(long)]
    difficulty: Option<String>,

    /// JSON file for high score, stats and settings (in-memory when omitted)
    #[arg(long)]
    store: Option<PathBuf>,

    /// Print the final board
    #[arg(long)]
    board: bool,

    /// Print the final state as JSON
    #[arg(long)]
    json: bool,

    /// Print everything stored as an export document
    #[arg(long)]
    export: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let store: Box<dyn KeyValueStore> = match &args.store {
        Some(path) => Box::new(
            FileStore::open(path).with_context(|| format!("opening {}", path.display()))?,
        ),
        None => Box::new(MemoryStore::new()),
    };
    let settings = Settings::load(&store);

    let mut config = match &args.config {
        Some(path) => {
            GameConfig::load(path).with_context(|| format!("loading {}", path.display()))?
        }
        None => {
            let mut config = GameConfig::default();
            settings.apply_to(&mut config);
            config
        }
    };
    if let Some(name) = &args.difficulty {
        let difficulty =
            Difficulty::from_str(name).ok_or_else(|| anyhow!("unknown difficulty `{name}`"))?;
        config.base_tick_ms = difficulty.base_tick_ms();
    }

    let seed = args.seed.unwrap_or_else(rand::random);
    log::info!(
        "Grid Snake starting: {}x{} board, seed {}",
        config.board_width,
        config.board_height,
        seed
    );

    let scores = Rc::new(RefCell::new(StoredScores::new(store)));
    let ports = Ports::new(scores.clone())
        .with_sound(AudioManager::from_settings(Box::new(LogSound), &settings))
        .with_snapshots(|state: &GameState| log::trace!("{}", status_line(state)));
    let mut session = Session::new(config, seed, ports)?;

    let input = session.sender();
    input.start();

    let limit = Duration::from_secs(args.seconds);
    while session.now() < limit {
        session.advance(FRAME);
        let state = session.state();
        if state.status == GameStatus::GameOver {
            break;
        }
        if let Some(direction) = autopilot::suggest(state, session.engine().board()) {
            if direction != state.direction {
                input.submit(direction);
            }
        }
    }

    let state = session.state();
    println!("{}", status_line(state));
    if args.board {
        print!("{}", ascii_board(state, session.engine().board()));
    }
    if args.json {
        println!("{}", serde_json::to_string_pretty(state)?);
    }

    let stats = scores.borrow().stats();
    println!(
        "games {} | average {} | best time {} | total time {}",
        stats.games_played,
        stats.average_score,
        format_time(stats.best_time),
        format_time(stats.total_play_time)
    );
    if args.export {
        println!("{}", scores.borrow().export_json()?);
    }

    Ok(())
}
