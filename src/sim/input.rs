//! Debounced direction input
//!
//! Key events can arrive several times per frame while the simulation only
//! moves once per tick. Submissions are queued (bounded, deduplicated, gated
//! by a short debounce) and `resolve` hands out at most one validated change
//! per tick, never a 180° reversal of the direction last applied.

use std::collections::VecDeque;
use std::time::Duration;

use super::grid::Direction;
use crate::consts::{QUEUE_CAPACITY, RESOLVE_DEBOUNCE, SUBMIT_DEBOUNCE};

/// Why a submission was not queued
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    Duplicate,
    QueueFull,
    TooSoon,
}

#[derive(Debug, Clone)]
pub struct DirectionInputQueue {
    pending: VecDeque<Direction>,
    last_processed: Direction,
    /// Time of the last applied change (`None` until the first one)
    last_change: Option<Duration>,
}

impl DirectionInputQueue {
    pub fn new(initial: Direction) -> Self {
        Self {
            pending: VecDeque::with_capacity(QUEUE_CAPACITY),
            last_processed: initial,
            last_change: None,
        }
    }

    /// Forget all pending input and start over heading `initial`
    pub fn clear(&mut self, initial: Direction) {
        *self = Self::new(initial);
    }

    pub fn last_processed(&self) -> Direction {
        self.last_processed
    }

    pub fn pending(&self) -> impl Iterator<Item = &Direction> {
        self.pending.iter()
    }

    fn within(&self, now: Duration, window: Duration) -> bool {
        self.last_change
            .is_some_and(|at| now.saturating_sub(at) < window)
    }

    /// Queue a direction request made at `now`
    pub fn submit(&mut self, direction: Direction, now: Duration) -> Result<(), Rejection> {
        if self.within(now, SUBMIT_DEBOUNCE) {
            return Err(Rejection::TooSoon);
        }
        if self.pending.contains(&direction) {
            return Err(Rejection::Duplicate);
        }
        if self.pending.len() >= QUEUE_CAPACITY {
            return Err(Rejection::QueueFull);
        }
        self.pending.push_back(direction);
        Ok(())
    }

    /// Direction to apply on the tick happening at `now`
    pub fn resolve(&mut self, now: Duration) -> Direction {
        if self.pending.is_empty() || self.within(now, RESOLVE_DEBOUNCE) {
            return self.last_processed;
        }

        while let Some(next) = self.pending.pop_front() {
            if next.is_opposite(self.last_processed) {
                log::debug!("Dropped queued reversal {}", next.as_str());
                continue;
            }
            self.last_processed = next;
            self.last_change = Some(now);
            return next;
        }

        self.last_processed
    }
}
