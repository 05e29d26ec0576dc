//! Game engine: control operations and the per-tick transition
//!
//! The engine owns the state, the input queue and the seeded RNG. It never
//! reads a clock; callers pass `now` for debouncing and receive the events
//! each transition produced.

use std::collections::HashSet;
use std::time::Duration;

use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::config::{ConfigError, GameConfig};
use super::food;
use super::grid::{Direction, GridWorld, Position};
use super::input::DirectionInputQueue;
use super::obstacles;
use super::snake::Snake;
use super::state::{Collision, GameEvent, GameState, GameStatus};
use super::timers::{Firing, TimerKind};
use crate::consts::{CLOCK_INTERVAL, COUNTDOWN_STEP, SPECIAL_FOOD_PERIOD};

/// Heading of a freshly spawned snake
pub const SPAWN_HEADING: Direction = Direction::Right;

pub struct GameEngine {
    config: GameConfig,
    board: GridWorld,
    rng: Pcg32,
    input: DirectionInputQueue,
    state: GameState,
}

impl GameEngine {
    /// Create an engine in the menu, seeded for reproducible spawns.
    ///
    /// The config is validated here so nothing later in the tick can trip
    /// over a zero divisor or a snake longer than the board.
    pub fn new(config: GameConfig, seed: u64) -> Result<Self, ConfigError> {
        config.validate()?;
        let board = config.board();
        let mut engine = Self {
            board,
            rng: Pcg32::seed_from_u64(seed),
            input: DirectionInputQueue::new(SPAWN_HEADING),
            state: GameState {
                snake: Snake::new(board.center(), SPAWN_HEADING, config.initial_length),
                direction: SPAWN_HEADING,
                food: board.center(),
                special_food: None,
                obstacles: Vec::new(),
                score: 0,
                high_score: 0,
                level: 1,
                status: GameStatus::Menu,
                special_food_remaining: Duration::ZERO,
                elapsed: Duration::ZERO,
                session: 0,
            },
            config,
        };
        engine.state = engine.fresh_state(GameStatus::Menu);
        Ok(engine)
    }

    /// Seed the best score read from storage
    pub fn with_high_score(mut self, high_score: u64) -> Self {
        self.state.high_score = self.state.high_score.max(high_score);
        self
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Direct state access for test fixtures
    pub(crate) fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn board(&self) -> &GridWorld {
        &self.board
    }

    pub fn input(&self) -> &DirectionInputQueue {
        &self.input
    }

    /// Interval between ticks at the current level
    pub fn tick_interval(&self) -> Duration {
        self.config.tick_interval(self.state.level)
    }

    /// The snake every session starts with
    pub fn spawn_snake(&self) -> Snake {
        Snake::new(self.board.center(), SPAWN_HEADING, self.config.initial_length)
    }

    fn fresh_state(&mut self, status: GameStatus) -> GameState {
        let snake = self.spawn_snake();
        let occupied: HashSet<Position> = snake.cells().copied().collect();
        let food = food::spawn(&mut self.rng, &self.board, &occupied);
        GameState {
            snake,
            direction: SPAWN_HEADING,
            food,
            special_food: None,
            obstacles: Vec::new(),
            score: 0,
            high_score: self.state.high_score,
            level: 1,
            status,
            special_food_remaining: Duration::ZERO,
            elapsed: Duration::ZERO,
            session: self.state.session + 1,
        }
    }

    /// Begin a new session from any status. The high score carries over.
    pub fn start(&mut self) -> Vec<GameEvent> {
        self.input.clear(SPAWN_HEADING);
        self.state = self.fresh_state(GameStatus::Playing);
        log::info!(
            "Session {} started (high score {})",
            self.state.session,
            self.state.high_score
        );
        vec![GameEvent::Started]
    }

    /// Toggle between Playing and Paused; ignored in other states
    pub fn pause(&mut self) -> Vec<GameEvent> {
        match self.state.status {
            GameStatus::Playing => {
                self.state.status = GameStatus::Paused;
                vec![GameEvent::Paused]
            }
            GameStatus::Paused => {
                self.state.status = GameStatus::Playing;
                vec![GameEvent::Resumed]
            }
            GameStatus::Menu | GameStatus::GameOver => Vec::new(),
        }
    }

    /// Back to the menu, discarding everything but the high score
    pub fn reset(&mut self) -> Vec<GameEvent> {
        self.input.clear(SPAWN_HEADING);
        self.state = self.fresh_state(GameStatus::Menu);
        vec![GameEvent::Reset]
    }

    /// Offer a direction change made at `now`. Returns whether it was queued.
    pub fn submit(&mut self, direction: Direction, now: Duration) -> bool {
        if !self.state.is_playing() {
            return false;
        }
        match self.input.submit(direction, now) {
            Ok(()) => true,
            Err(reason) => {
                log::trace!("Dropped {} input: {:?}", direction.as_str(), reason);
                false
            }
        }
    }

    /// Handle a timer expiry. Firings from another session are ignored.
    pub fn fire(&mut self, firing: Firing, now: Duration) -> Vec<GameEvent> {
        if firing.session != self.state.session {
            log::debug!(
                "Ignored stale {:?} firing from session {}",
                firing.kind,
                firing.session
            );
            return Vec::new();
        }
        match firing.kind {
            TimerKind::Step => self.step(now),
            TimerKind::SpecialFood => self.countdown(),
            TimerKind::Clock => {
                self.clock();
                Vec::new()
            }
        }
    }

    /// Advance the simulation by one tick
    pub fn step(&mut self, now: Duration) -> Vec<GameEvent> {
        if !self.state.is_playing() {
            return Vec::new();
        }

        let direction = self.input.resolve(now);
        self.state.direction = direction;
        let head = self.state.snake.next_head(direction);

        let collision = if !self.board.in_bounds(head) {
            Some(Collision::Wall)
        } else if self.state.snake.contains(head) {
            Some(Collision::SelfCollision)
        } else if self.state.is_obstacle(head) {
            Some(Collision::Obstacle)
        } else {
            None
        };
        if let Some(cause) = collision {
            return self.game_over(cause);
        }

        self.state.snake.push_head(head);

        let mut events = Vec::new();
        let mut grew = false;

        if head == self.state.food {
            self.state.score += 1;
            grew = true;
            events.push(GameEvent::Ate {
                score: self.state.score,
            });

            let occupied = self.occupied(self.state.special_food);
            self.state.food = food::spawn(&mut self.rng, &self.board, &occupied);

            if self.state.score % SPECIAL_FOOD_PERIOD == 0 {
                events.push(self.spawn_special_food());
            }
        } else if self.state.special_food == Some(head) {
            self.state.score += self.config.special_food_score;
            grew = true;
            self.state.special_food = None;
            self.state.special_food_remaining = Duration::ZERO;
            events.push(GameEvent::AteSpecial {
                score: self.state.score,
            });
        }

        if !grew {
            self.state.snake.pop_tail();
        }

        let target = self.state.score / self.config.level_up_score + 1;
        if self.state.score >= self.config.level_up_score && u64::from(self.state.level) < target {
            self.state.level = target as u32;
            self.regenerate_obstacles();
            log::info!("Level {} reached at score {}", self.state.level, self.state.score);
            events.push(GameEvent::LevelUp {
                level: self.state.level,
            });
        }

        if self.state.score > self.state.high_score {
            self.state.high_score = self.state.score;
            events.push(GameEvent::NewHighScore {
                score: self.state.high_score,
            });
        }

        events
    }

    /// One special food countdown step
    pub fn countdown(&mut self) -> Vec<GameEvent> {
        if !self.state.is_playing() || self.state.special_food.is_none() {
            return Vec::new();
        }
        self.state.special_food_remaining = self
            .state
            .special_food_remaining
            .saturating_sub(COUNTDOWN_STEP);
        if self.state.special_food_remaining.is_zero() {
            self.state.special_food = None;
            return vec![GameEvent::SpecialFoodExpired];
        }
        Vec::new()
    }

    /// One play clock interval
    pub fn clock(&mut self) {
        if self.state.is_playing() {
            self.state.elapsed += CLOCK_INTERVAL;
        }
    }

    fn game_over(&mut self, cause: Collision) -> Vec<GameEvent> {
        self.state.status = GameStatus::GameOver;
        log::info!(
            "Game over ({:?}) score={} level={} time={}s",
            cause,
            self.state.score,
            self.state.level,
            self.state.play_seconds()
        );

        let mut events = Vec::new();
        if self.state.score > self.state.high_score {
            self.state.high_score = self.state.score;
            events.push(GameEvent::NewHighScore {
                score: self.state.score,
            });
        }
        events.push(GameEvent::GameOver {
            cause,
            score: self.state.score,
            play_time: self.state.elapsed,
            level: self.state.level,
        });
        events
    }

    /// Cells food must avoid: snake, obstacles and optionally one extra cell
    fn occupied(&self, extra: Option<Position>) -> HashSet<Position> {
        self.state
            .snake
            .cells()
            .chain(self.state.obstacles.iter())
            .copied()
            .chain(extra)
            .collect()
    }

    /// Place a special food, replacing any active one, and restart its countdown
    fn spawn_special_food(&mut self) -> GameEvent {
        let occupied = self.occupied(Some(self.state.food));
        let at = food::spawn(&mut self.rng, &self.board, &occupied);
        let replaced = self.state.special_food.is_some();
        if replaced {
            log::debug!("Special food replaced before it was eaten");
        }
        self.state.special_food = Some(at);
        self.state.special_food_remaining = self.config.special_food_duration();
        GameEvent::SpecialFoodSpawned { at, replaced }
    }

    /// Swap in the layout for the current level, keeping the snake and its
    /// spawn cells clear and moving any food the new layout covers
    fn regenerate_obstacles(&mut self) {
        let spawn = self.spawn_snake();
        let mut layout = obstacles::generate(&mut self.rng, self.state.level, &self.board);
        layout.retain(|cell| !spawn.contains(*cell) && !self.state.snake.contains(*cell));
        self.state.obstacles = layout;

        if self.state.is_obstacle(self.state.food) {
            let occupied = self.occupied(self.state.special_food);
            self.state.food = food::spawn(&mut self.rng, &self.board, &occupied);
        }
        if let Some(special) = self.state.special_food {
            if self.state.is_obstacle(special) {
                let occupied = self.occupied(Some(self.state.food));
                self.state.special_food = Some(food::spawn(&mut self.rng, &self.board, &occupied));
            }
        }
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn direction() -> impl Strategy<Value = Direction> {
        prop_oneof![
            Just(Direction::Up),
            Just(Direction::Down),
            Just(Direction::Left),
            Just(Direction::Right),
        ]
    }

    proptest! {
        #[test]
        fn invariants_hold_under_random_input(
            seed in any::<u64>(),
            inputs in prop::collection::vec(prop::option::of(direction()), 1..200),
        ) {
            let mut engine = GameEngine::new(GameConfig::default(), seed).unwrap();
            engine.start();
            let initial_len = engine.state().snake.len();
            let mut growth = 0usize;
            let mut last_score = 0;
            let mut last_level = 1;

            for (i, input) in inputs.into_iter().enumerate() {
                let now = Duration::from_millis(i as u64 * 150);
                if let Some(direction) = input {
                    engine.submit(direction, now);
                }
                let events = engine.step(now + Duration::from_millis(100));
                growth += events
                    .iter()
                    .filter(|e| matches!(e, GameEvent::Ate { .. } | GameEvent::AteSpecial { .. }))
                    .count();

                let state = engine.state();
                prop_assert!(!state.snake.contains(state.food));
                prop_assert!(!state.is_obstacle(state.food));
                if let Some(special) = state.special_food {
                    prop_assert!(!state.snake.contains(special));
                    prop_assert!(!state.is_obstacle(special));
                    prop_assert_ne!(special, state.food);
                }
                prop_assert!(state.score >= last_score);
                prop_assert!(state.level >= last_level);
                prop_assert_eq!(state.snake.len(), initial_len + growth);
                last_score = state.score;
                last_level = state.level;

                if state.status == GameStatus::GameOver {
                    break;
                }
            }
        }

        #[test]
        fn reversal_never_changes_next_direction(seed in any::<u64>(), turns in 0usize..4) {
            let mut engine = GameEngine::new(GameConfig::default(), seed).unwrap();
            engine.start();
            engine.state_mut().food = glam::IVec2::new(0, 0);
            // A few legal turns first so the heading varies
            let mut now = Duration::ZERO;
            for turn in [Direction::Up, Direction::Left, Direction::Down].into_iter().take(turns) {
                engine.submit(turn, now);
                engine.step(now + Duration::from_millis(60));
                now += Duration::from_millis(150);
            }
            let heading = engine.input().last_processed();
            engine.submit(heading.opposite(), now);
            engine.step(now + Duration::from_millis(100));
            prop_assert_eq!(engine.state().direction, heading);
        }
    }
}
