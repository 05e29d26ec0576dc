//! Sound effects
//!
//! Effects are described as short tone sequences; a [`SoundPort`] backend
//! turns them into actual audio. Playback failures never reach the game.

use std::time::Duration;

use thiserror::Error;

use crate::settings::Settings;

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundEffect {
    /// Regular food eaten
    Eat,
    /// Special food eaten
    SpecialEat,
    /// Snake crashed
    GameOver,
    /// New level reached
    LevelUp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Waveform {
    Sine,
    Square,
    Sawtooth,
}

/// One oscillator note within an effect
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tone {
    pub frequency_hz: f32,
    pub duration: Duration,
    pub waveform: Waveform,
    /// Peak gain before master/sfx scaling
    pub volume: f32,
    /// Start time relative to the effect trigger
    pub offset: Duration,
}

const fn tone(frequency_hz: f32, ms: u64, waveform: Waveform, volume: f32, offset_ms: u64) -> Tone {
    Tone {
        frequency_hz,
        duration: Duration::from_millis(ms),
        waveform,
        volume,
        offset: Duration::from_millis(offset_ms),
    }
}

const EAT: [Tone; 2] = [
    tone(400.0, 100, Waveform::Sine, 0.15, 0),
    tone(600.0, 100, Waveform::Sine, 0.15, 50),
];

const SPECIAL_EAT: [Tone; 3] = [
    tone(800.0, 150, Waveform::Sine, 0.2, 0),
    tone(1000.0, 150, Waveform::Sine, 0.15, 75),
    tone(1200.0, 150, Waveform::Sine, 0.1, 150),
];

const GAME_OVER: [Tone; 3] = [
    tone(400.0, 300, Waveform::Sawtooth, 0.3, 0),
    tone(300.0, 300, Waveform::Sawtooth, 0.25, 150),
    tone(200.0, 500, Waveform::Sawtooth, 0.2, 300),
];

const LEVEL_UP: [Tone; 4] = [
    tone(500.0, 200, Waveform::Square, 0.2, 0),
    tone(700.0, 200, Waveform::Square, 0.18, 100),
    tone(900.0, 200, Waveform::Square, 0.16, 200),
    tone(1100.0, 300, Waveform::Square, 0.14, 300),
];

impl SoundEffect {
    pub fn tones(&self) -> &'static [Tone] {
        match self {
            SoundEffect::Eat => &EAT,
            SoundEffect::SpecialEat => &SPECIAL_EAT,
            SoundEffect::GameOver => &GAME_OVER,
            SoundEffect::LevelUp => &LEVEL_UP,
        }
    }

    /// Time until the last tone ends
    pub fn length(&self) -> Duration {
        self.tones()
            .iter()
            .map(|t| t.offset + t.duration)
            .max()
            .unwrap_or_default()
    }
}

#[derive(Debug, Error)]
pub enum AudioError {
    #[error("audio backend unavailable: {0}")]
    Unavailable(String),
    #[error("playback failed: {0}")]
    Playback(String),
}

/// Audio output backend
pub trait SoundPort {
    fn play(&mut self, effect: SoundEffect, volume: f32) -> Result<(), AudioError>;
}

/// Backend that only logs what would be played
#[derive(Debug, Default)]
pub struct LogSound;

impl SoundPort for LogSound {
    fn play(&mut self, effect: SoundEffect, volume: f32) -> Result<(), AudioError> {
        log::debug!(
            "sound {:?} at {:.2} ({} tones, {:?})",
            effect,
            volume,
            effect.tones().len(),
            effect.length()
        );
        Ok(())
    }
}

/// Audio manager for the game
pub struct AudioManager {
    backend: Option<Box<dyn SoundPort>>,
    master_volume: f32,
    sfx_volume: f32,
    muted: bool,
}

impl Default for AudioManager {
    fn default() -> Self {
        Self::silent()
    }
}

impl std::fmt::Debug for AudioManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudioManager")
            .field("backend", &self.backend.is_some())
            .field("master_volume", &self.master_volume)
            .field("sfx_volume", &self.sfx_volume)
            .field("muted", &self.muted)
            .finish()
    }
}

impl AudioManager {
    pub fn new(backend: Box<dyn SoundPort>) -> Self {
        Self {
            backend: Some(backend),
            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,
        }
    }

    /// Manager with no backend at all
    pub fn silent() -> Self {
        Self {
            backend: None,
            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,
        }
    }

    pub fn from_settings(backend: Box<dyn SoundPort>, settings: &Settings) -> Self {
        let mut audio = Self::new(backend);
        audio.set_master_volume(settings.master_volume);
        audio.set_sfx_volume(settings.sfx_volume);
        audio.set_muted(!settings.sound_enabled);
        audio
    }

    /// Set master volume (0.0 - 1.0)
    pub fn set_master_volume(&mut self, vol: f32) {
        self.master_volume = vol.clamp(0.0, 1.0);
    }

    /// Set SFX volume (0.0 - 1.0)
    pub fn set_sfx_volume(&mut self, vol: f32) {
        self.sfx_volume = vol.clamp(0.0, 1.0);
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    fn effective_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.master_volume * self.sfx_volume
        }
    }

    /// Play a sound effect; backend errors are logged and dropped
    pub fn play(&mut self, effect: SoundEffect) {
        let vol = self.effective_volume();
        if vol <= 0.0 {
            return;
        }
        let Some(backend) = self.backend.as_mut() else {
            return;
        };
        if let Err(e) = backend.play(effect, vol) {
            log::warn!("Failed to play {:?}: {}", effect, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Recorder(Arc<Mutex<Vec<(SoundEffect, f32)>>>);

    impl SoundPort for Recorder {
        fn play(&mut self, effect: SoundEffect, volume: f32) -> Result<(), AudioError> {
            self.0.lock().unwrap().push((effect, volume));
            Ok(())
        }
    }

    struct Broken;

    impl SoundPort for Broken {
        fn play(&mut self, _: SoundEffect, _: f32) -> Result<(), AudioError> {
            Err(AudioError::Unavailable("no device".into()))
        }
    }

    #[test]
    fn test_recipes() {
        assert_eq!(SoundEffect::Eat.tones().len(), 2);
        assert_eq!(SoundEffect::LevelUp.tones()[3].frequency_hz, 1100.0);
        assert_eq!(SoundEffect::GameOver.length(), Duration::from_millis(800));
        assert!(
            SoundEffect::SpecialEat
                .tones()
                .iter()
                .all(|t| t.waveform == Waveform::Sine)
        );
    }

    #[test]
    fn test_volume_scaling_and_mute() {
        let recorder = Recorder::default();
        let mut audio = AudioManager::new(Box::new(recorder.clone()));
        audio.set_master_volume(0.5);
        audio.set_sfx_volume(2.0);
        audio.play(SoundEffect::Eat);
        audio.set_muted(true);
        audio.play(SoundEffect::GameOver);

        let played = recorder.0.lock().unwrap();
        assert_eq!(played.as_slice(), &[(SoundEffect::Eat, 0.5)]);
    }

    #[test]
    fn test_settings_disable_sound() {
        let settings = Settings {
            sound_enabled: false,
            ..Default::default()
        };
        let audio = AudioManager::from_settings(Box::new(LogSound), &settings);
        assert!(audio.is_muted());
    }

    #[test]
    fn test_backend_failure_is_swallowed() {
        let mut audio = AudioManager::new(Box::new(Broken));
        audio.play(SoundEffect::LevelUp);
        AudioManager::silent().play(SoundEffect::Eat);
    }
}
