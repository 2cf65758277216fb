//! Session engine: per-user timer registry and lifecycle

use super::timer::{format_clock, FocusTimer, TimerState};
use crate::db::{TaskRef, TaskSummary};
use crate::gateway::{PromptOption, UserId};
use crate::runtime::{MessagingGateway, TaskStore};
use crate::state_machine::Command;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// State-violation rejections. Per-user and recoverable; the conversation
/// layer translates these into user-visible notices.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("A focus session is already running")]
    AlreadyRunning,
    #[error("No active focus session")]
    NoActiveTimer,
    #[error("No paused focus session to resume")]
    NoPausedTimer,
}

/// Owns and drives each user's [`FocusTimer`].
///
/// Start, pause, resume and query are synchronous, non-blocking operations
/// guarded by that user's timer lock; the registry lock is only ever held
/// for insert/lookup, so operations on different users never contend.
///
/// Each Start/Resume spawns one waiting task racing the cycle's deadline
/// against the cycle's private cancellation token. Cancellation is scoped
/// strictly per cycle: pausing one user's timer can never disturb another
/// user's, nor a later cycle of the same user's.
pub struct SessionEngine<S, G> {
    store: Arc<S>,
    gateway: Arc<G>,
    timers: RwLock<HashMap<UserId, Arc<Mutex<FocusTimer>>>>,
}

impl<S, G> SessionEngine<S, G>
where
    S: TaskStore + 'static,
    G: MessagingGateway + 'static,
{
    pub fn new(store: Arc<S>, gateway: Arc<G>) -> Self {
        Self {
            store,
            gateway,
            timers: RwLock::new(HashMap::new()),
        }
    }

    /// Start a focus session. Rejects if this user already has a Running
    /// timer; a Paused or Completed timer is replaced.
    pub fn start(
        &self,
        owner: UserId,
        task: TaskRef,
        duration: Duration,
    ) -> Result<(), SessionError> {
        let (timer, cancel) = {
            let mut timers = self.timers.write().unwrap();
            if let Some(existing) = timers.get(&owner) {
                if existing.lock().unwrap().state() == TimerState::Running {
                    return Err(SessionError::AlreadyRunning);
                }
            }
            let (timer, cancel) = FocusTimer::start(task, duration);
            let timer = Arc::new(Mutex::new(timer));
            timers.insert(owner, Arc::clone(&timer));
            (timer, cancel)
        };
        tracing::info!(
            user = %owner,
            task = %task,
            minutes = duration.as_secs() / 60,
            "Focus session started"
        );
        self.spawn_waiter(owner, timer, duration, cancel, 0);
        Ok(())
    }

    /// Pause the Running timer, fixing its remaining time and raising the
    /// current cycle's cancellation signal. Returns the remaining duration.
    pub fn pause(&self, owner: UserId) -> Result<Duration, SessionError> {
        let timer = self.get(owner).ok_or(SessionError::NoActiveTimer)?;
        let mut timer = timer.lock().unwrap();
        if timer.state() != TimerState::Running {
            return Err(SessionError::NoActiveTimer);
        }
        let remaining = timer.pause();
        tracing::info!(user = %owner, remaining = %format_clock(remaining), "Focus session paused");
        Ok(remaining)
    }

    /// Resume the Paused timer with a fresh cancellation cycle. Returns the
    /// remaining duration being scheduled.
    pub fn resume(&self, owner: UserId) -> Result<Duration, SessionError> {
        let timer = self.get(owner).ok_or(SessionError::NoPausedTimer)?;
        let (cancel, remaining, cycle) = {
            let mut t = timer.lock().unwrap();
            if t.state() != TimerState::Paused {
                return Err(SessionError::NoPausedTimer);
            }
            let cancel = t.resume();
            (cancel, t.remaining_now(), t.cycle())
        };
        tracing::info!(user = %owner, remaining = %format_clock(remaining), "Focus session resumed");
        self.spawn_waiter(owner, timer, remaining, cancel, cycle);
        Ok(remaining)
    }

    /// Remaining time of the Running or Paused timer. Full precision; clamp
    /// to whole seconds only when displaying.
    pub fn remaining(&self, owner: UserId) -> Result<Duration, SessionError> {
        let timer = self.get(owner).ok_or(SessionError::NoActiveTimer)?;
        let timer = timer.lock().unwrap();
        match timer.state() {
            TimerState::Running | TimerState::Paused => Ok(timer.remaining_now()),
            TimerState::Completed => Err(SessionError::NoActiveTimer),
        }
    }

    /// Current timer state for this user, if a timer exists at all.
    pub fn timer_state(&self, owner: UserId) -> Option<TimerState> {
        self.get(owner).map(|t| t.lock().unwrap().state())
    }

    fn get(&self, owner: UserId) -> Option<Arc<Mutex<FocusTimer>>> {
        self.timers.read().unwrap().get(&owner).cloned()
    }

    /// Race this cycle's deadline against its cancellation signal. On a
    /// natural expiry the task re-checks under the timer lock that the cycle
    /// still owns a Running timer before committing the completion; a firing
    /// that lost the race to a pause or replacement is discarded.
    fn spawn_waiter(
        &self,
        owner: UserId,
        timer: Arc<Mutex<FocusTimer>>,
        wait: Duration,
        cancel: CancellationToken,
        cycle: u64,
    ) {
        let store = Arc::clone(&self.store);
        let gateway = Arc::clone(&self.gateway);
        tokio::spawn(async move {
            tokio::select! {
                () = tokio::time::sleep(wait) => {}
                () = cancel.cancelled() => return,
            }

            let task = match timer.lock().unwrap().try_complete(cycle) {
                Some(task) => task,
                None => return,
            };
            tracing::info!(user = %owner, task = %task, "Focus session completed");

            // The interval elapsed either way; a vanished task is reported,
            // not hidden, and the timer stays Completed.
            let notice = match store.increment_completed(task).await {
                Ok(summary) => completion_notice(&summary),
                Err(e) => {
                    tracing::warn!(
                        user = %owner,
                        task = %task,
                        error = %e,
                        "Completion fired but the task could not be updated"
                    );
                    format!("Your focus session is complete, but the task could not be updated: {e}")
                }
            };
            let options = [PromptOption::new(
                "Back to main menu",
                Command::MainMenu.value(),
            )];
            if let Err(e) = gateway.prompt(owner, &notice, &options).await {
                tracing::warn!(user = %owner, error = %e, "Failed to deliver completion notice");
            }
        });
    }
}

fn completion_notice(task: &TaskSummary) -> String {
    use std::cmp::Ordering;
    let status = match task.completed.cmp(&task.required) {
        Ordering::Less => format!("{} of {} intervals done", task.completed, task.required),
        Ordering::Equal => "completed ✅".to_string(),
        Ordering::Greater => "ahead of plan".to_string(),
    };
    format!(
        "Your focus session is complete!\n{}: {}",
        task.name, status
    )
}
