//! Core conversation state machine
//!
//! Implements the Elm Architecture pattern with pure state transitions:
//! one inbound event per call, validated against the user's current state,
//! producing a new state plus a list of effects for the runtime to execute.

pub mod event;
mod effect;
pub mod state;
pub(crate) mod transition;

#[cfg(test)]
mod proptests;

pub use effect::{main_menu_options, Effect};
pub use event::{Command, Event};
pub use state::{ConvState, TaskDraft};
pub use transition::{transition, TransitionResult};
