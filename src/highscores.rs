//! High score and play statistics
//!
//! The engine only sees [`ScoreRepository`]: one read of the high score at
//! startup, then writes on new records and on game over.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::persistence::{KeyValueStore, StoreError, load_json, save_json};
use crate::settings::Settings;

/// Store key for the high score
pub const HIGH_SCORE_KEY: &str = "snake_high_score";
/// Store key for the statistics aggregate
pub const STATS_KEY: &str = "snake_game_stats";

/// Summary of one finished game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameRecord {
    pub score: u64,
    /// Whole seconds of play
    pub play_time: u64,
    pub level: u32,
}

/// Aggregate over all finished games
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GameStats {
    pub games_played: u64,
    pub total_score: u64,
    /// Rounded mean score
    pub average_score: u64,
    /// Longest single game (seconds)
    pub best_time: u64,
    pub total_play_time: u64,
    /// Distinct levels reached, ascending
    pub levels_reached: Vec<u32>,
}

impl GameStats {
    pub fn record(&mut self, game: &GameRecord) {
        self.games_played += 1;
        self.total_score += game.score;
        self.average_score = (self.total_score + self.games_played / 2) / self.games_played;
        self.best_time = self.best_time.max(game.play_time);
        self.total_play_time += game.play_time;
        if let Err(pos) = self.levels_reached.binary_search(&game.level) {
            self.levels_reached.insert(pos, game.level);
        }
    }
}

/// Where the session persists scores
pub trait ScoreRepository {
    fn high_score(&self) -> Result<u64, StoreError>;
    fn save_high_score(&mut self, score: u64) -> Result<(), StoreError>;
    fn update_stats(&mut self, game: &GameRecord) -> Result<(), StoreError>;
}

/// Score repository over any key-value store
#[derive(Debug, Default)]
pub struct StoredScores<S> {
    store: S,
}

impl<S: KeyValueStore> StoredScores<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_inner(self) -> S {
        self.store
    }

    /// Stored statistics; missing or unreadable data reads as empty
    pub fn stats(&self) -> GameStats {
        match load_json(&self.store, STATS_KEY) {
            Ok(stats) => stats.unwrap_or_default(),
            Err(e) => {
                log::warn!("Ignoring stored stats: {}", e);
                GameStats::default()
            }
        }
    }

    pub fn reset_high_score(&mut self) -> Result<(), StoreError> {
        self.store.remove(HIGH_SCORE_KEY)
    }

    pub fn reset_stats(&mut self) -> Result<(), StoreError> {
        self.store.remove(STATS_KEY)
    }

    /// Remove high score, stats and settings
    pub fn clear_all(&mut self) -> Result<(), StoreError> {
        self.reset_high_score()?;
        self.reset_stats()?;
        Settings::reset(&mut self.store)
    }

    /// Everything stored, as pretty JSON
    pub fn export_json(&self) -> Result<String, StoreError> {
        let export = Export {
            high_score: self.high_score().unwrap_or(0),
            settings: Settings::load(&self.store),
            stats: self.stats(),
            export_date: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_secs())
                .unwrap_or(0),
        };
        Ok(serde_json::to_string_pretty(&export)?)
    }

    /// Apply the sections present in an exported document
    pub fn import_json(&mut self, text: &str) -> Result<(), StoreError> {
        let import: Import = serde_json::from_str(text)?;
        if let Some(score) = import.high_score {
            self.save_high_score(score)?;
        }
        if let Some(patch) = import.settings {
            Settings::update(&mut self.store, &patch)?;
        }
        if let Some(stats) = import.stats {
            save_json(&mut self.store, STATS_KEY, &stats)?;
        }
        log::info!("Imported game data");
        Ok(())
    }
}

impl<S: KeyValueStore> ScoreRepository for StoredScores<S> {
    fn high_score(&self) -> Result<u64, StoreError> {
        match self.store.get(HIGH_SCORE_KEY)? {
            None => Ok(0),
            Some(value) => value.trim().parse().map_err(|_| StoreError::Malformed {
                key: HIGH_SCORE_KEY.to_string(),
                value,
            }),
        }
    }

    /// Only writes when `score` beats the stored value
    fn save_high_score(&mut self, score: u64) -> Result<(), StoreError> {
        let current = self.high_score().unwrap_or(0);
        if score > current {
            self.store.set(HIGH_SCORE_KEY, &score.to_string())?;
            log::info!("High score saved: {}", score);
        }
        Ok(())
    }

    fn update_stats(&mut self, game: &GameRecord) -> Result<(), StoreError> {
        let mut stats = self.stats();
        stats.record(game);
        save_json(&mut self.store, STATS_KEY, &stats)
    }
}

/// Lets a caller keep reading a repository it handed to a session
impl<R: ScoreRepository> ScoreRepository for Rc<RefCell<R>> {
    fn high_score(&self) -> Result<u64, StoreError> {
        self.borrow().high_score()
    }

    fn save_high_score(&mut self, score: u64) -> Result<(), StoreError> {
        self.borrow_mut().save_high_score(score)
    }

    fn update_stats(&mut self, game: &GameRecord) -> Result<(), StoreError> {
        self.borrow_mut().update_stats(game)
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Export {
    high_score: u64,
    settings: Settings,
    stats: GameStats,
    export_date: u64,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Import {
    high_score: Option<u64>,
    settings: Option<serde_json::Value>,
    stats: Option<GameStats>,
}
