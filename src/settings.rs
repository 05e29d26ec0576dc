//! Player settings and preferences
//!
//! Persisted as JSON in the key-value store, separately from scores.

use serde::{Deserialize, Serialize};

use crate::persistence::{KeyValueStore, StoreError, load_json, save_json};
use crate::sim::GameConfig;

/// Store key for settings
pub const SETTINGS_KEY: &str = "snake_game_settings";

/// Difficulty presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "easy" => Some(Difficulty::Easy),
            "medium" | "med" => Some(Difficulty::Medium),
            "hard" => Some(Difficulty::Hard),
            _ => None,
        }
    }

    /// Level 1 tick interval for this preset
    pub fn base_tick_ms(&self) -> u64 {
        match self {
            Difficulty::Easy => 200,
            Difficulty::Medium => 150,
            Difficulty::Hard => 100,
        }
    }
}

/// Color theme, only stored for the front end
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    pub sound_enabled: bool,
    pub theme: Theme,
    pub difficulty: Difficulty,
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            sound_enabled: true,
            theme: Theme::Light,
            difficulty: Difficulty::Medium,
            master_volume: 0.8,
            sfx_volume: 1.0,
        }
    }
}

impl Settings {
    /// Apply difficulty to a game config
    pub fn apply_to(&self, config: &mut GameConfig) {
        config.base_tick_ms = self.difficulty.base_tick_ms();
    }

    /// Load settings, falling back to defaults when missing or unreadable
    pub fn load<S: KeyValueStore + ?Sized>(store: &S) -> Self {
        match load_json::<Settings, _>(store, SETTINGS_KEY) {
            Ok(Some(settings)) => {
                log::info!("Loaded settings");
                settings
            }
            Ok(None) => {
                log::info!("Using default settings");
                Self::default()
            }
            Err(e) => {
                log::warn!("Ignoring stored settings: {}", e);
                Self::default()
            }
        }
    }

    pub fn save<S: KeyValueStore + ?Sized>(&self, store: &mut S) -> Result<(), StoreError> {
        save_json(store, SETTINGS_KEY, self)?;
        log::info!("Settings saved");
        Ok(())
    }

    /// Overlay the fields present in `patch` onto the stored settings and save
    pub fn update<S: KeyValueStore + ?Sized>(
        store: &mut S,
        patch: &serde_json::Value,
    ) -> Result<Self, StoreError> {
        let mut merged = serde_json::to_value(Self::load(store))?;
        if let (Some(target), Some(fields)) = (merged.as_object_mut(), patch.as_object()) {
            for (key, value) in fields {
                target.insert(key.clone(), value.clone());
            }
        }
        let settings: Settings = serde_json::from_value(merged)?;
        settings.save(store)?;
        Ok(settings)
    }

    pub fn reset<S: KeyValueStore + ?Sized>(store: &mut S) -> Result<(), StoreError> {
        store.remove(SETTINGS_KEY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStore;

    #[test]
    fn test_defaults_when_missing() {
        let store = MemoryStore::new();
        assert_eq!(Settings::load(&store), Settings::default());
    }

    #[test]
    fn test_corrupt_settings_fall_back() {
        let mut store = MemoryStore::new();
        store.set(SETTINGS_KEY, "not json").unwrap();
        assert_eq!(Settings::load(&store), Settings::default());
    }

    #[test]
    fn test_partial_update_merges() {
        let mut store = MemoryStore::new();
        let updated =
            Settings::update(&mut store, &serde_json::json!({ "difficulty": "hard" })).unwrap();
        assert_eq!(updated.difficulty, Difficulty::Hard);
        assert!(updated.sound_enabled);

        let updated =
            Settings::update(&mut store, &serde_json::json!({ "soundEnabled": false })).unwrap();
        assert_eq!(updated.difficulty, Difficulty::Hard);
        assert!(!updated.sound_enabled);
        assert_eq!(Settings::load(&store), updated);
    }

    #[test]
    fn test_difficulty_sets_tick() {
        let mut config = GameConfig::default();
        let settings = Settings {
            difficulty: Difficulty::Easy,
            ..Default::default()
        };
        settings.apply_to(&mut config);
        assert_eq!(config.base_tick_ms, 200);
        assert_eq!(Difficulty::from_str("MED"), Some(Difficulty::Medium));
    }
}
