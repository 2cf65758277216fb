//! Conversation state types

use crate::db::TaskRef;
use serde::{Deserialize, Serialize};

/// A partially-built task: the name is known, the interval count is pending.
/// Owned exclusively by the conversation holding it; discarded on completion
/// or abandonment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDraft {
    pub name: String,
}

/// Which multi-step dialogue (if any) a user is mid-way through.
///
/// The draft and the selected task ride inside the state variants, so a
/// draft cannot outlive the dialogue that created it and a duration can only
/// be selected with a task in hand.
///
/// A running focus session is NOT tracked here: once a timer starts, the
/// conversation returns to `Idle` and the timer answers its own
/// pause/resume/query vocabulary inside the session engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ConvState {
    /// Ready for commands, no dialogue in progress
    #[default]
    Idle,

    /// "add task" issued, waiting for the task name
    AwaitingTaskName,

    /// Name captured, waiting for the required interval count
    AwaitingPomoCount { draft: TaskDraft },

    /// "start session" issued, waiting for a task selection
    AwaitingTaskSelection,

    /// Task selected, waiting for a duration selection
    AwaitingDurationSelection { task: TaskRef },
}

impl ConvState {
    /// Whether a multi-step dialogue is in progress.
    pub fn is_mid_dialogue(&self) -> bool {
        !matches!(self, ConvState::Idle)
    }
}
