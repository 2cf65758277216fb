//! Pure state transition function

use super::effect::Effect;
use super::event::{Command, Event};
use super::state::{ConvState, TaskDraft};
use std::time::Duration;

/// Result of a state transition
#[derive(Debug)]
pub struct TransitionResult {
    pub new_state: ConvState,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(state: ConvState) -> Self {
        Self {
            new_state: state,
            effects: vec![],
        }
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }
}

/// Pure transition function.
///
/// Total over all (state, event) pairs: an event that does not fit the
/// current state produces a notice effect and leaves the state unchanged,
/// it is never an error. Given the same inputs it always produces the same
/// outputs, with no I/O side effects.
pub fn transition(state: &ConvState, event: Event) -> TransitionResult {
    match event {
        Event::Selection { value } => match Command::parse(&value) {
            Some(command) => command_transition(state, command),
            None => selection_transition(state, &value),
        },
        Event::Text { body } => text_transition(state, &body),
    }
}

fn command_transition(state: &ConvState, command: Command) -> TransitionResult {
    match command {
        // Timer vocabulary: valid in any conversation state, state unchanged.
        // The session engine decides whether a timer actually exists.
        Command::Pause => TransitionResult::new(state.clone()).with_effect(Effect::PauseTimer),
        Command::Resume => TransitionResult::new(state.clone()).with_effect(Effect::ResumeTimer),
        Command::Remaining => {
            TransitionResult::new(state.clone()).with_effect(Effect::ReportRemaining)
        }

        // Returning to the menu abandons any pending dialogue and its draft.
        Command::MainMenu => TransitionResult::new(ConvState::Idle).with_effect(Effect::main_menu()),

        Command::AddTask => match state {
            ConvState::Idle => TransitionResult::new(ConvState::AwaitingTaskName)
                .with_effect(Effect::prompt("Enter a name for the new task:")),
            other => unknown(other),
        },

        Command::StartSession => match state {
            ConvState::Idle => TransitionResult::new(ConvState::AwaitingTaskSelection)
                .with_effect(Effect::PresentTaskSelection),
            other => unknown(other),
        },

        Command::ListTasks => match state {
            ConvState::Idle => {
                TransitionResult::new(ConvState::Idle).with_effect(Effect::ShowOngoingTasks)
            }
            other => unknown(other),
        },

        Command::ListCompleted => match state {
            ConvState::Idle => {
                TransitionResult::new(ConvState::Idle).with_effect(Effect::ShowCompletedTasks)
            }
            other => unknown(other),
        },
    }
}

fn text_transition(state: &ConvState, body: &str) -> TransitionResult {
    match state {
        ConvState::AwaitingTaskName => {
            let name = body.trim();
            if name.is_empty() {
                return TransitionResult::new(state.clone())
                    .with_effect(Effect::prompt("Enter a name for the new task:"));
            }
            TransitionResult::new(ConvState::AwaitingPomoCount {
                draft: TaskDraft {
                    name: name.to_string(),
                },
            })
            .with_effect(Effect::prompt(
                "How many focus intervals does this task need?",
            ))
        }

        // Non-integer input is a recoverable validation failure: re-prompt,
        // keep the draft, stay put.
        ConvState::AwaitingPomoCount { draft } => match body.trim().parse::<u32>() {
            Ok(count) if count > 0 => TransitionResult::new(ConvState::Idle).with_effect(
                Effect::CreateTask {
                    name: draft.name.clone(),
                    required: count,
                },
            ),
            _ => TransitionResult::new(state.clone()).with_effect(Effect::prompt(
                "Please enter a whole number of intervals (e.g. 1, 2, 3, ...):",
            )),
        },

        other => unknown(other),
    }
}

fn selection_transition(state: &ConvState, value: &str) -> TransitionResult {
    match state {
        ConvState::AwaitingTaskSelection => match value.parse::<i64>() {
            Ok(id) => TransitionResult::new(ConvState::AwaitingDurationSelection {
                task: crate::db::TaskRef(id),
            })
            .with_effect(Effect::duration_menu()),
            Err(_) => unknown(state),
        },

        ConvState::AwaitingDurationSelection { task } => match value.parse::<u64>() {
            Ok(minutes) if minutes > 0 => {
                TransitionResult::new(ConvState::Idle).with_effect(Effect::StartTimer {
                    task: *task,
                    duration: Duration::from_secs(minutes * 60),
                })
            }
            _ => TransitionResult::new(state.clone()).with_effect(Effect::duration_menu()),
        },

        other => unknown(other),
    }
}

fn unknown(state: &ConvState) -> TransitionResult {
    TransitionResult::new(state.clone()).with_effect(Effect::notice(
        "Unknown command. Please use one of the buttons.",
    ))
}
