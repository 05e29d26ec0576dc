//! Game state and simulation events
//!
//! `GameState` is the snapshot handed to renderers after every tick and
//! control operation.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::grid::{Direction, Position};
use super::snake::Snake;

/// Current phase of play
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameStatus {
    /// Waiting for start
    Menu,
    /// Active gameplay
    Playing,
    /// Timers frozen, input ignored
    Paused,
    /// Run ended
    GameOver,
}

/// What ended a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Collision {
    Wall,
    SelfCollision,
    Obstacle,
}

/// Something that happened during a transition, for collaborators to act on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    Started,
    Paused,
    Resumed,
    Reset,
    /// Regular food eaten
    Ate { score: u64 },
    /// Special food eaten
    AteSpecial { score: u64 },
    /// A special food appeared (possibly replacing an active one)
    SpecialFoodSpawned { at: Position, replaced: bool },
    SpecialFoodExpired,
    LevelUp { level: u32 },
    NewHighScore { score: u64 },
    GameOver {
        cause: Collision,
        score: u64,
        play_time: Duration,
        level: u32,
    },
}

/// Complete game state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    pub snake: Snake,
    /// Direction applied on the last tick
    pub direction: Direction,
    pub food: Position,
    pub special_food: Option<Position>,
    /// Static for the current level
    pub obstacles: Vec<Position>,
    pub score: u64,
    /// Best score seen by this process, never decreases
    pub high_score: u64,
    pub level: u32,
    pub status: GameStatus,
    /// Zero when no special food is on the board
    pub special_food_remaining: Duration,
    pub elapsed: Duration,
    /// Bumped by every start and reset; timers armed for an older session are stale
    pub session: u64,
}

impl GameState {
    pub fn is_playing(&self) -> bool {
        self.status == GameStatus::Playing
    }

    /// Whole seconds of play
    pub fn play_seconds(&self) -> u64 {
        self.elapsed.as_secs()
    }

    pub fn is_obstacle(&self, pos: Position) -> bool {
        self.obstacles.contains(&pos)
    }
}
