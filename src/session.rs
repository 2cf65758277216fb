//! Per-user focus session engine
//!
//! Owns, per user, at most one timed interval ("focus session"): start,
//! pause, resume, query-remaining, plus the completion task that fires when
//! a session's duration elapses uncancelled. Self-contained: no dependency
//! on conversation state.

mod engine;
mod timer;

pub use engine::{SessionEngine, SessionError};
pub use timer::{format_clock, FocusTimer, TimerState};
