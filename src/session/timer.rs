//! Focus timer state and accounting

use crate::db::TaskRef;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Timer lifecycle states. An absent timer is the logical Idle state; the
/// engine registry holds no entry for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerState {
    Running,
    Paused,
    Completed,
}

/// One user's focus timer.
///
/// `remaining` is authoritative while Paused and derived while Running
/// (`remaining - elapsed since started_at`). Durations keep full precision
/// internally so repeated pause/resume cycles do not drift; flooring to
/// whole seconds happens only at display time via [`format_clock`].
///
/// Each Start/Resume cycle gets a fresh cancellation token and bumps the
/// cycle counter. The waiting task that raced this cycle's deadline must
/// re-check both state and cycle before committing a completion, so a
/// late-firing deadline can never complete a timer that was paused or
/// replaced in the meantime. Paused and Completed timers hold no live
/// cancellation handle.
#[derive(Debug)]
pub struct FocusTimer {
    task: TaskRef,
    total: Duration,
    remaining: Duration,
    state: TimerState,
    started_at: Option<Instant>,
    cancel: Option<CancellationToken>,
    cycle: u64,
}

impl FocusTimer {
    /// Create a Running timer and the cancellation token for its first cycle.
    pub fn start(task: TaskRef, total: Duration) -> (Self, CancellationToken) {
        let cancel = CancellationToken::new();
        (
            Self {
                task,
                total,
                remaining: total,
                state: TimerState::Running,
                started_at: Some(Instant::now()),
                cancel: Some(cancel.clone()),
                cycle: 0,
            },
            cancel,
        )
    }

    pub fn task(&self) -> TaskRef {
        self.task
    }

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn total(&self) -> Duration {
        self.total
    }

    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    /// Remaining time right now, clamped to zero. Never negative, no matter
    /// how long after expiry it is read.
    pub fn remaining_now(&self) -> Duration {
        match self.state {
            TimerState::Running => {
                let elapsed = self.started_at.map_or(Duration::ZERO, |t| t.elapsed());
                self.remaining.saturating_sub(elapsed)
            }
            TimerState::Paused => self.remaining,
            TimerState::Completed => Duration::ZERO,
        }
    }

    /// Running -> Paused. Fixes `remaining` and raises this cycle's
    /// cancellation signal. Caller must have verified the timer is Running.
    pub fn pause(&mut self) -> Duration {
        debug_assert_eq!(self.state, TimerState::Running);
        self.remaining = self.remaining_now();
        self.state = TimerState::Paused;
        self.started_at = None;
        if let Some(cancel) = self.cancel.take() {
            cancel.cancel();
        }
        self.remaining
    }

    /// Paused -> Running, beginning a new cycle with a fresh cancellation
    /// token. Caller must have verified the timer is Paused.
    pub fn resume(&mut self) -> CancellationToken {
        debug_assert_eq!(self.state, TimerState::Paused);
        let cancel = CancellationToken::new();
        self.state = TimerState::Running;
        self.started_at = Some(Instant::now());
        self.cancel = Some(cancel.clone());
        self.cycle += 1;
        cancel
    }

    /// Commit a natural completion for the given cycle. Returns the task
    /// reference if that cycle still owns a Running timer; `None` if a pause
    /// or replacement won the race, in which case the caller must discard
    /// the firing.
    pub fn try_complete(&mut self, cycle: u64) -> Option<TaskRef> {
        if self.state != TimerState::Running || self.cycle != cycle {
            return None;
        }
        self.state = TimerState::Completed;
        self.remaining = Duration::ZERO;
        self.started_at = None;
        self.cancel = None;
        Some(self.task)
    }
}

/// Render a duration as `MM:SS`, floored to whole seconds.
pub fn format_clock(d: Duration) -> String {
    let secs = d.as_secs();
    format!("{:02}:{:02}", secs / 60, secs % 60)
}
