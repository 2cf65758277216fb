//! Events that can occur in a conversation

use serde::{Deserialize, Serialize};

/// Events that trigger state transitions.
///
/// The dispatcher strips the owner off a gateway
/// [`crate::gateway::InboundEvent`] before handing it here; transitions are
/// per-user by construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Event {
    /// Free-text message from the user
    Text { body: String },
    /// Button press carrying the option value
    Selection { value: String },
}

/// Recognized button commands.
///
/// `Pause`, `Resume` and `Remaining` belong to the running timer's own
/// vocabulary: they are accepted in any conversation state, because a user
/// can be mid-dialogue (or idle) while a session runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    MainMenu,
    AddTask,
    StartSession,
    ListTasks,
    ListCompleted,
    Remaining,
    Pause,
    Resume,
}

impl Command {
    /// Parse a selection value into a command, if recognized.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "menu" => Some(Command::MainMenu),
            "add_task" => Some(Command::AddTask),
            "start_session" => Some(Command::StartSession),
            "tasks" => Some(Command::ListTasks),
            "completed" => Some(Command::ListCompleted),
            "remaining" => Some(Command::Remaining),
            "pause" => Some(Command::Pause),
            "resume" => Some(Command::Resume),
            _ => None,
        }
    }

    /// The selection value delivered by the gateway for this command.
    pub fn value(self) -> &'static str {
        match self {
            Command::MainMenu => "menu",
            Command::AddTask => "add_task",
            Command::StartSession => "start_session",
            Command::ListTasks => "tasks",
            Command::ListCompleted => "completed",
            Command::Remaining => "remaining",
            Command::Pause => "pause",
            Command::Resume => "resume",
        }
    }
}
