//! Single-threaded session driver
//!
//! A [`Session`] owns the engine, its three timers and the collaborator
//! ports. Commands arrive over a channel and are applied at the start of
//! each [`Session::advance`], so the engine only ever sees one transition
//! at a time. Time is whatever the caller feeds in.

use std::sync::mpsc::{self, Receiver, Sender};
use std::time::Duration;

use crate::audio::{AudioManager, SoundEffect};
use crate::consts::{CLOCK_INTERVAL, COUNTDOWN_STEP};
use crate::highscores::{GameRecord, ScoreRepository};
use crate::sim::{
    ConfigError, Direction, GameConfig, GameEngine, GameEvent, GameState, TimerKind, Timers,
};

/// Requests from the input layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Submit(Direction),
    Start,
    Pause,
    Reset,
}

/// Cloneable handle for feeding commands into a session
#[derive(Debug, Clone)]
pub struct CommandSender {
    tx: Sender<Command>,
}

impl CommandSender {
    /// Returns false once the session is gone
    pub fn send(&self, command: Command) -> bool {
        self.tx.send(command).is_ok()
    }

    pub fn submit(&self, direction: Direction) -> bool {
        self.send(Command::Submit(direction))
    }

    pub fn start(&self) -> bool {
        self.send(Command::Start)
    }

    pub fn pause(&self) -> bool {
        self.send(Command::Pause)
    }

    pub fn reset(&self) -> bool {
        self.send(Command::Reset)
    }
}

/// Receives a snapshot after every control operation and applied tick
pub trait SnapshotSink {
    fn publish(&mut self, state: &GameState);
}

impl<F: FnMut(&GameState)> SnapshotSink for F {
    fn publish(&mut self, state: &GameState) {
        self(state)
    }
}

/// Collaborators a session reports to
pub struct Ports {
    pub sound: AudioManager,
    pub scores: Box<dyn ScoreRepository>,
    pub snapshots: Box<dyn SnapshotSink>,
}

impl Ports {
    /// Silent ports that only persist scores
    pub fn new(scores: impl ScoreRepository + 'static) -> Self {
        Self {
            sound: AudioManager::silent(),
            scores: Box::new(scores),
            snapshots: Box::new(|_: &GameState| {}),
        }
    }

    pub fn with_sound(mut self, sound: AudioManager) -> Self {
        self.sound = sound;
        self
    }

    pub fn with_snapshots(mut self, sink: impl SnapshotSink + 'static) -> Self {
        self.snapshots = Box::new(sink);
        self
    }
}

pub struct Session {
    engine: GameEngine,
    timers: Timers,
    ports: Ports,
    commands: Receiver<Command>,
    sender: Sender<Command>,
    now: Duration,
}

impl Session {
    /// Build a session in the menu. The stored high score is read once here.
    pub fn new(config: GameConfig, seed: u64, ports: Ports) -> Result<Self, ConfigError> {
        let engine = GameEngine::new(config, seed)?;
        let high_score = match ports.scores.high_score() {
            Ok(score) => score,
            Err(e) => {
                log::warn!("Could not read high score, starting from 0: {}", e);
                0
            }
        };
        let (sender, commands) = mpsc::channel();
        log::info!("Session created (seed {}, high score {})", seed, high_score);
        Ok(Self {
            engine: engine.with_high_score(high_score),
            timers: Timers::default(),
            ports,
            commands,
            sender,
            now: Duration::ZERO,
        })
    }

    pub fn sender(&self) -> CommandSender {
        CommandSender {
            tx: self.sender.clone(),
        }
    }

    /// Session clock: total time fed through `advance`
    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn state(&self) -> &GameState {
        self.engine.state()
    }

    pub fn engine(&self) -> &GameEngine {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut GameEngine {
        &mut self.engine
    }

    pub fn timers(&self) -> &Timers {
        &self.timers
    }

    /// Apply one command immediately
    pub fn apply(&mut self, command: Command) {
        let events = match command {
            Command::Submit(direction) => {
                self.engine.submit(direction, self.now);
                return;
            }
            Command::Start => self.engine.start(),
            Command::Pause => self.engine.pause(),
            Command::Reset => self.engine.reset(),
        };
        self.handle(&events);
        self.ports.snapshots.publish(self.engine.state());
    }

    /// Apply every queued command in arrival order
    pub fn drain_commands(&mut self) {
        while let Ok(command) = self.commands.try_recv() {
            self.apply(command);
        }
    }

    /// Apply pending commands, then let `dt` pass, firing timers in order
    pub fn advance(&mut self, dt: Duration) {
        self.drain_commands();

        let mut budget = dt;
        loop {
            let before = budget;
            let due = self.timers.next_due(&mut budget);
            self.now += before - budget;
            let Some(firing) = due else { break };

            if firing.session != self.engine.state().session {
                log::debug!("Dropped {:?} firing from an old session", firing.kind);
                continue;
            }
            let events = self.engine.fire(firing, self.now);
            self.handle(&events);
            self.ports.snapshots.publish(self.engine.state());
        }
    }

    fn handle(&mut self, events: &[GameEvent]) {
        let session = self.engine.state().session;
        for event in events {
            match *event {
                GameEvent::Started => {
                    self.timers.cancel_all();
                    self.timers
                        .get_mut(TimerKind::Step)
                        .arm(self.engine.tick_interval(), session);
                    self.timers
                        .get_mut(TimerKind::Clock)
                        .arm(CLOCK_INTERVAL, session);
                }
                GameEvent::Paused => self.timers.freeze_all(),
                GameEvent::Resumed => self.timers.thaw_all(),
                GameEvent::Reset => self.timers.cancel_all(),
                GameEvent::Ate { .. } => self.ports.sound.play(SoundEffect::Eat),
                GameEvent::AteSpecial { .. } => {
                    self.ports.sound.play(SoundEffect::SpecialEat);
                    self.timers.get_mut(TimerKind::SpecialFood).cancel();
                }
                GameEvent::SpecialFoodSpawned { .. } => {
                    self.timers
                        .get_mut(TimerKind::SpecialFood)
                        .arm(COUNTDOWN_STEP, session);
                }
                GameEvent::SpecialFoodExpired => {
                    self.timers.get_mut(TimerKind::SpecialFood).cancel();
                }
                GameEvent::LevelUp { .. } => {
                    self.ports.sound.play(SoundEffect::LevelUp);
                    self.timers
                        .get_mut(TimerKind::Step)
                        .arm(self.engine.tick_interval(), session);
                }
                GameEvent::NewHighScore { score } => {
                    if let Err(e) = self.ports.scores.save_high_score(score) {
                        log::warn!("Failed to save high score: {}", e);
                    }
                }
                GameEvent::GameOver {
                    score,
                    play_time,
                    level,
                    ..
                } => {
                    self.ports.sound.play(SoundEffect::GameOver);
                    self.timers.cancel_all();
                    let record = GameRecord {
                        score,
                        play_time: play_time.as_secs(),
                        level,
                    };
                    if let Err(e) = self.ports.scores.update_stats(&record) {
                        log::warn!("Failed to update stats: {}", e);
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::{AudioError, SoundPort};
    use crate::highscores::{HIGH_SCORE_KEY, StoredScores};
    use crate::persistence::{KeyValueStore, MemoryStore, StoreError};
    use crate::sim::{Firing, GameStatus, Snake};
    use glam::IVec2;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    type Shared = Rc<RefCell<StoredScores<MemoryStore>>>;

    fn session_with(scores: Shared) -> Session {
        Session::new(GameConfig::default(), 7, Ports::new(scores)).unwrap()
    }

    struct BrokenScores;

    impl ScoreRepository for BrokenScores {
        fn high_score(&self) -> Result<u64, StoreError> {
            Err(StoreError::Unavailable("offline".into()))
        }

        fn save_high_score(&mut self, _: u64) -> Result<(), StoreError> {
            Err(StoreError::Unavailable("offline".into()))
        }

        fn update_stats(&mut self, _: &GameRecord) -> Result<(), StoreError> {
            Err(StoreError::Unavailable("offline".into()))
        }
    }

    #[derive(Clone, Default)]
    struct Sounds(Rc<RefCell<Vec<SoundEffect>>>);

    impl SoundPort for Sounds {
        fn play(&mut self, effect: SoundEffect, _: f32) -> Result<(), AudioError> {
            self.0.borrow_mut().push(effect);
            Ok(())
        }
    }

    /// Put the snake one step left of the food, heading right
    fn line_up_food(session: &mut Session) {
        let state = session.engine_mut().state_mut();
        state.snake =
            Snake::from_cells([IVec2::new(10, 5), IVec2::new(9, 5), IVec2::new(8, 5)]).unwrap();
        state.food = IVec2::new(11, 5);
        state.obstacles.clear();
        state.special_food = None;
    }

    #[test]
    fn test_reads_stored_high_score() {
        let mut store = MemoryStore::new();
        store.set(HIGH_SCORE_KEY, "17").unwrap();
        let scores = Rc::new(RefCell::new(StoredScores::new(store)));
        let session = session_with(scores);
        assert_eq!(session.state().high_score, 17);
        assert_eq!(session.state().status, GameStatus::Menu);
    }

    #[test]
    fn test_rejects_invalid_config() {
        let config = GameConfig {
            level_up_score: 0,
            ..Default::default()
        };
        let result = Session::new(config, 1, Ports::new(Shared::default()));
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_commands_apply_on_advance() {
        let mut session = session_with(Shared::default());
        let sender = session.sender();
        assert!(sender.start());
        assert_eq!(session.state().status, GameStatus::Menu);

        session.advance(Duration::ZERO);
        assert!(session.state().is_playing());
        assert!(session.timers().get(TimerKind::Step).is_running());
        assert!(session.timers().get(TimerKind::Clock).is_running());
        assert!(!session.timers().get(TimerKind::SpecialFood).is_armed());
    }

    #[test]
    fn test_ticks_follow_interval() {
        let mut session = session_with(Shared::default());
        session.apply(Command::Start);
        let start = session.state().snake.head();

        session.advance(ms(149));
        assert_eq!(session.state().snake.head(), start);
        session.advance(ms(1));
        assert_eq!(session.state().snake.head(), start + IVec2::new(1, 0));
        session.advance(ms(300));
        assert_eq!(session.state().snake.head(), start + IVec2::new(3, 0));
        assert_eq!(session.now(), ms(450));
    }

    #[test]
    fn test_clock_counts_seconds() {
        let mut session = session_with(Shared::default());
        session.apply(Command::Start);
        session.advance(ms(1000));
        assert_eq!(session.state().play_seconds(), 1);
    }

    #[test]
    fn test_pause_freezes_everything() {
        let mut session = session_with(Shared::default());
        session.apply(Command::Start);
        session.advance(ms(100));
        session.apply(Command::Pause);
        let frozen = session.state().clone();

        session.advance(ms(5000));
        assert_eq!(session.state(), &frozen);
        assert_eq!(session.timers().get(TimerKind::Step).until_next(), ms(50));

        session.apply(Command::Pause);
        session.advance(ms(50));
        assert_eq!(
            session.state().snake.head(),
            frozen.snake.head() + IVec2::new(1, 0)
        );
    }

    #[test]
    fn test_stale_firing_is_dropped() {
        let mut session = session_with(Shared::default());
        session.apply(Command::Start);
        let old = session.state().session;
        session.apply(Command::Start);
        let head = session.state().snake.head();

        session.timers.get_mut(TimerKind::Step).arm(ms(10), old);
        session.advance(ms(20));
        assert_eq!(session.state().snake.head(), head);

        let events = session.engine_mut().fire(
            Firing {
                kind: TimerKind::Step,
                session: old,
            },
            ms(30),
        );
        assert!(events.is_empty());
    }

    #[test]
    fn test_eating_plays_sound_and_saves_high_score() {
        let scores = Shared::default();
        let sounds = Sounds::default();
        let ports = Ports::new(scores.clone())
            .with_sound(AudioManager::new(Box::new(sounds.clone())));
        let mut session = Session::new(GameConfig::default(), 3, ports).unwrap();
        session.apply(Command::Start);
        line_up_food(&mut session);

        session.advance(ms(150));
        assert_eq!(session.state().score, 1);
        assert_eq!(sounds.0.borrow().as_slice(), &[SoundEffect::Eat]);
        assert_eq!(scores.borrow().high_score().unwrap(), 1);
    }

    #[test]
    fn test_special_food_countdown_runs_on_timer() {
        let mut session = session_with(Shared::default());
        session.apply(Command::Start);
        session.engine_mut().state_mut().score = 11;
        line_up_food(&mut session);

        session.advance(ms(150));
        assert!(session.state().special_food.is_some());
        assert!(session.timers().get(TimerKind::SpecialFood).is_running());

        // Keep the snake alive while the countdown runs out
        let state = session.engine_mut().state_mut();
        state.snake = Snake::from_cells([IVec2::new(0, 0)]).unwrap();
        session.sender().submit(Direction::Down);
        session.advance(ms(100));
        assert_eq!(
            session.state().special_food_remaining,
            GameConfig::default().special_food_duration() - ms(100)
        );

        session.engine_mut().state_mut().special_food_remaining = ms(100);
        session.advance(ms(100));
        assert_eq!(session.state().special_food, None);
        assert!(!session.timers().get(TimerKind::SpecialFood).is_armed());
    }

    #[test]
    fn test_game_over_records_stats_once() {
        let scores = Shared::default();
        let snapshots = Rc::new(RefCell::new(Vec::new()));
        let seen = snapshots.clone();
        let ports = Ports::new(scores.clone())
            .with_snapshots(move |s: &GameState| seen.borrow_mut().push(s.status));
        let mut session = Session::new(GameConfig::default(), 5, ports).unwrap();
        session.apply(Command::Start);

        // Heading right from the center hits the wall after 20 ticks
        session.advance(ms(150 * 25));
        assert_eq!(session.state().status, GameStatus::GameOver);
        assert!(!session.timers().get(TimerKind::Step).is_armed());

        session.advance(ms(10_000));
        let stats = scores.borrow().stats();
        assert_eq!(stats.games_played, 1);
        // The fatal step wins the tie with the clock at 3s
        assert_eq!(stats.total_play_time, 2);
        assert_eq!(stats.levels_reached, vec![1]);

        let seen = snapshots.borrow();
        assert_eq!(seen.first(), Some(&GameStatus::Playing));
        assert_eq!(seen.last(), Some(&GameStatus::GameOver));
    }

    #[test]
    fn test_broken_store_does_not_stop_play() {
        let mut session =
            Session::new(GameConfig::default(), 5, Ports::new(BrokenScores)).unwrap();
        assert_eq!(session.state().high_score, 0);
        session.apply(Command::Start);
        line_up_food(&mut session);
        session.advance(ms(150 * 30));
        assert_eq!(session.state().status, GameStatus::GameOver);
        assert!(session.state().high_score >= 1);
    }

    #[test]
    fn test_reset_cancels_timers() {
        let mut session = session_with(Shared::default());
        session.apply(Command::Start);
        session.advance(ms(400));
        session.apply(Command::Reset);
        assert_eq!(session.state().status, GameStatus::Menu);
        assert!(!session.timers().get(TimerKind::Step).is_armed());
        assert!(!session.timers().get(TimerKind::Clock).is_armed());
    }
}
