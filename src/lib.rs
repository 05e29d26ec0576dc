//! Grid Snake - a deterministic grid snake engine
//!
//! Core modules:
//! - `sim`: Deterministic simulation (movement, collisions, spawning, levels)
//! - `session`: Single-threaded driver that owns timers and collaborator ports
//! - `persistence`: Key-value storage backends
//! - `highscores`: High score and statistics repository
//! - `audio`: Sound port and effect recipes
//! - `settings`: Player preferences
//! - `render`: Text output of snapshots

pub mod audio;
pub mod highscores;
pub mod persistence;
pub mod render;
pub mod session;
pub mod settings;
pub mod sim;

pub use highscores::{GameStats, ScoreRepository, StoredScores};
pub use session::{Command, CommandSender, Ports, Session};
pub use settings::{Difficulty, Settings};

/// Game configuration constants
pub mod consts {
    use std::time::Duration;

    /// Pending directions the input queue holds at most
    pub const QUEUE_CAPACITY: usize = 3;
    /// Minimum gap after an applied change before a new submission is queued
    pub const SUBMIT_DEBOUNCE: Duration = Duration::from_millis(25);
    /// Minimum gap between two applied direction changes
    pub const RESOLVE_DEBOUNCE: Duration = Duration::from_millis(50);

    /// Rejection sampling bound for food placement
    pub const FOOD_SPAWN_ATTEMPTS: u32 = 1000;
    /// A special food appears every time the score hits a multiple of this
    pub const SPECIAL_FOOD_PERIOD: u64 = 12;

    /// Random obstacle cap (level 5+)
    pub const MAX_RANDOM_OBSTACLES: u32 = 25;
    /// Random obstacles per level before the cap
    pub const OBSTACLES_PER_LEVEL: u32 = 2;
    /// Placement attempts per wanted obstacle
    pub const OBSTACLE_ATTEMPTS_PER_SLOT: u32 = 10;
    /// Open orthogonal neighbours a random obstacle must leave
    pub const MIN_OPEN_NEIGHBOURS: usize = 2;
    /// Half extent of the square kept clear around the spawn point
    pub const SAFE_ZONE_HALF_EXTENT: i32 = 2;

    /// Fastest allowed tick interval
    pub const MIN_TICK_INTERVAL: Duration = Duration::from_millis(50);
    /// Tick interval shrink per level above 1
    pub const SPEEDUP_PER_LEVEL: Duration = Duration::from_millis(20);

    /// Special food countdown granularity
    pub const COUNTDOWN_STEP: Duration = Duration::from_millis(100);
    /// Play clock granularity
    pub const CLOCK_INTERVAL: Duration = Duration::from_secs(1);
}
