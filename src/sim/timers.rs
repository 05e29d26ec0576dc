//! Repeating timers driven by an external clock
//!
//! Nothing here reads wall time. The owner feeds elapsed time through
//! [`Timers::next_due`], which reports firings one by one in chronological
//! order so each can be handled (and timers re-armed) before the next.

use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerKind {
    /// Simulation tick
    Step,
    /// Special food countdown step
    SpecialFood,
    /// Play clock
    Clock,
}

impl TimerKind {
    /// Tie-break order when several timers are due at the same instant
    pub const ORDER: [TimerKind; 3] = [TimerKind::Step, TimerKind::SpecialFood, TimerKind::Clock];
}

/// A timer expiry, stamped with the session that armed the timer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Firing {
    pub kind: TimerKind,
    pub session: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum TimerState {
    #[default]
    Idle,
    Running,
    Frozen,
}

/// A repeating timer that keeps its remainder while frozen
#[derive(Debug, Clone, Default)]
pub struct IntervalTimer {
    period: Duration,
    until_next: Duration,
    state: TimerState,
    session: u64,
}

impl IntervalTimer {
    /// Start a full period for `session`, discarding any previous remainder
    pub fn arm(&mut self, period: Duration, session: u64) {
        self.period = period.max(Duration::from_millis(1));
        self.until_next = self.period;
        self.state = TimerState::Running;
        self.session = session;
    }

    pub fn freeze(&mut self) {
        if self.state == TimerState::Running {
            self.state = TimerState::Frozen;
        }
    }

    /// Resume from the frozen remainder
    pub fn thaw(&mut self) {
        if self.state == TimerState::Frozen {
            self.state = TimerState::Running;
        }
    }

    pub fn cancel(&mut self) {
        *self = Self::default();
    }

    pub fn is_running(&self) -> bool {
        self.state == TimerState::Running
    }

    /// Running or frozen
    pub fn is_armed(&self) -> bool {
        self.state != TimerState::Idle
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn until_next(&self) -> Duration {
        self.until_next
    }
}

/// The three timers of a play session
#[derive(Debug, Clone, Default)]
pub struct Timers {
    step: IntervalTimer,
    special_food: IntervalTimer,
    clock: IntervalTimer,
}

impl Timers {
    pub fn get(&self, kind: TimerKind) -> &IntervalTimer {
        match kind {
            TimerKind::Step => &self.step,
            TimerKind::SpecialFood => &self.special_food,
            TimerKind::Clock => &self.clock,
        }
    }

    pub fn get_mut(&mut self, kind: TimerKind) -> &mut IntervalTimer {
        match kind {
            TimerKind::Step => &mut self.step,
            TimerKind::SpecialFood => &mut self.special_food,
            TimerKind::Clock => &mut self.clock,
        }
    }

    pub fn freeze_all(&mut self) {
        for kind in TimerKind::ORDER {
            self.get_mut(kind).freeze();
        }
    }

    pub fn thaw_all(&mut self) {
        for kind in TimerKind::ORDER {
            self.get_mut(kind).thaw();
        }
    }

    pub fn cancel_all(&mut self) {
        for kind in TimerKind::ORDER {
            self.get_mut(kind).cancel();
        }
    }

    /// Spend up to `budget` of elapsed time, stopping at the first expiry.
    ///
    /// The expired timer is re-armed for another period before returning.
    /// `budget` is reduced by the time actually spent; `None` means the whole
    /// budget passed without an expiry.
    pub fn next_due(&mut self, budget: &mut Duration) -> Option<Firing> {
        let due = TimerKind::ORDER
            .into_iter()
            .filter(|k| self.get(*k).is_running())
            .min_by_key(|k| self.get(*k).until_next);

        let Some(kind) = due else {
            *budget = Duration::ZERO;
            return None;
        };

        let wait = self.get(kind).until_next;
        let spent = wait.min(*budget);
        for k in TimerKind::ORDER {
            let timer = self.get_mut(k);
            if timer.is_running() {
                timer.until_next = timer.until_next.saturating_sub(spent);
            }
        }
        *budget -= spent;

        if wait > spent {
            return None;
        }

        let timer = self.get_mut(kind);
        timer.until_next = timer.period;
        Some(Firing {
            kind,
            session: timer.session,
        })
    }
}
