//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Seeded RNG only
//! - Time is supplied by the caller, never read from a clock
//! - No rendering, audio or storage dependencies

pub mod autopilot;
pub mod config;
pub mod food;
pub mod grid;
pub mod input;
pub mod obstacles;
pub mod snake;
pub mod state;
pub mod tick;
pub mod timers;

pub use config::{ConfigError, GameConfig};
pub use grid::{Direction, GridWorld, Position, collides_with};
pub use input::DirectionInputQueue;
pub use obstacles::SafeZone;
pub use snake::Snake;
pub use state::{Collision, GameEvent, GameState, GameStatus};
pub use tick::GameEngine;
pub use timers::{Firing, IntervalTimer, TimerKind, Timers};
