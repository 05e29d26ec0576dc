use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::grid::GridWorld;
use crate::consts::{MIN_TICK_INTERVAL, SAFE_ZONE_HALF_EXTENT, SPEEDUP_PER_LEVEL};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Configuration for a game
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Board width in cells
    pub board_width: i32,
    /// Board height in cells
    pub board_height: i32,
    /// Snake length at start
    pub initial_length: usize,
    /// Tick interval at level 1
    pub base_tick_ms: u64,
    /// How long a special food stays on the board
    pub special_food_ms: u64,
    /// Points for a special food
    pub special_food_score: u64,
    /// Points per level
    pub level_up_score: u64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            board_width: 40,
            board_height: 30,
            initial_length: 3,
            base_tick_ms: 150,
            special_food_ms: 6000,
            special_food_score: 5,
            level_up_score: 15,
        }
    }
}

impl GameConfig {
    /// Create a configuration with a custom board size
    pub fn new(board_width: i32, board_height: i32) -> Self {
        Self {
            board_width,
            board_height,
            ..Default::default()
        }
    }

    /// Load from a JSON file; missing fields take their defaults
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        let config: GameConfig = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        // The spawn area must fit with the snake trailing left of center
        let min_side = 2 * SAFE_ZONE_HALF_EXTENT + 1;
        if self.board_width < min_side || self.board_height < min_side {
            return Err(ConfigError::Invalid(format!(
                "board must be at least {min_side}x{min_side}, got {}x{}",
                self.board_width, self.board_height
            )));
        }
        if self.initial_length == 0 || self.initial_length as i32 > self.board_width / 2 + 1 {
            return Err(ConfigError::Invalid(format!(
                "initial length {} does not fit a board {} wide",
                self.initial_length, self.board_width
            )));
        }
        if self.level_up_score == 0 {
            return Err(ConfigError::Invalid("level_up_score must be positive".into()));
        }
        if self.base_tick_ms == 0 || self.special_food_ms == 0 {
            return Err(ConfigError::Invalid("timings must be positive".into()));
        }
        Ok(())
    }

    pub fn board(&self) -> GridWorld {
        GridWorld::new(self.board_width, self.board_height)
    }

    pub fn special_food_duration(&self) -> Duration {
        Duration::from_millis(self.special_food_ms)
    }

    /// Tick interval for `level`, never faster than the minimum
    pub fn tick_interval(&self, level: u32) -> Duration {
        let base = Duration::from_millis(self.base_tick_ms);
        let speedup = SPEEDUP_PER_LEVEL * level.saturating_sub(1);
        base.saturating_sub(speedup).max(MIN_TICK_INTERVAL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = GameConfig::default();
        assert_eq!(config.board_width, 40);
        assert_eq!(config.board_height, 30);
        assert_eq!(config.initial_length, 3);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_tick_interval_speeds_up_then_clamps() {
        let config = GameConfig::default();
        assert_eq!(config.tick_interval(1), Duration::from_millis(150));
        assert_eq!(config.tick_interval(2), Duration::from_millis(130));
        assert_eq!(config.tick_interval(5), Duration::from_millis(70));
        assert_eq!(config.tick_interval(6), Duration::from_millis(50));
        assert_eq!(config.tick_interval(50), Duration::from_millis(50));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: GameConfig = serde_json::from_str(r#"{"board_width": 20}"#).unwrap();
        assert_eq!(config.board_width, 20);
        assert_eq!(config.board_height, 30);
        assert_eq!(config.level_up_score, 15);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        assert!(GameConfig::new(3, 30).validate().is_err());
        let config = GameConfig {
            level_up_score: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_load_missing_file() {
        let err = GameConfig::load("/nonexistent/grid-snake.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
