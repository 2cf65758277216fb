//! Effects produced by state transitions

use crate::db::TaskRef;
use crate::gateway::PromptOption;
use crate::state_machine::event::Command;
use std::time::Duration;

/// Effects to be executed after a state transition. Transitions stay pure;
/// all I/O (task store, messaging gateway, session engine) happens when the
/// runtime executes these.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Deliver a prompt, replacing the user's previous one
    Prompt {
        text: String,
        options: Vec<PromptOption>,
    },

    /// Persist a finalized task draft
    CreateTask { name: String, required: u32 },

    /// Fetch and render the user's ongoing tasks with progress
    ShowOngoingTasks,

    /// Fetch and render the user's finished tasks
    ShowCompletedTasks,

    /// Fetch incomplete tasks and present them for selection
    PresentTaskSelection,

    /// Start a focus session on the selected task
    StartTimer { task: TaskRef, duration: Duration },

    /// Pause the running focus session, if any
    PauseTimer,

    /// Resume the paused focus session, if any
    ResumeTimer,

    /// Report the remaining time of the current focus session
    ReportRemaining,
}

impl Effect {
    pub fn prompt(text: impl Into<String>) -> Self {
        Effect::Prompt {
            text: text.into(),
            options: vec![],
        }
    }

    pub fn prompt_with(text: impl Into<String>, options: Vec<PromptOption>) -> Self {
        Effect::Prompt {
            text: text.into(),
            options,
        }
    }

    /// A notice with a way back to the main menu.
    pub fn notice(text: impl Into<String>) -> Self {
        Effect::prompt_with(
            text,
            vec![PromptOption::new("Back to main menu", Command::MainMenu.value())],
        )
    }

    /// The main menu prompt.
    pub fn main_menu() -> Self {
        Effect::prompt_with(
            "Main menu:\nChoose an option to continue",
            main_menu_options(),
        )
    }

    /// The duration selection prompt: 15 to 60 minutes in 5-minute steps.
    pub fn duration_menu() -> Self {
        let options = (15..=60)
            .step_by(5)
            .map(|mins| PromptOption::new(format!("{mins} minutes"), mins.to_string()))
            .collect();
        Effect::prompt_with("Pick a duration for this focus session:", options)
    }
}

/// Options shown on the main menu and appended to confirmations.
pub fn main_menu_options() -> Vec<PromptOption> {
    vec![
        PromptOption::new("Start session", Command::StartSession.value()),
        PromptOption::new("Tasks list", Command::ListTasks.value()),
        PromptOption::new("Add task", Command::AddTask.value()),
        PromptOption::new("Completed tasks", Command::ListCompleted.value()),
    ]
}
