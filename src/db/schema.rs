//! Database schema and task types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// SQL schema for initialization
pub const SCHEMA: &str = r"
CREATE TABLE IF NOT EXISTS tasks (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    owner INTEGER NOT NULL,
    name TEXT NOT NULL,
    required INTEGER NOT NULL,
    completed INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_tasks_owner ON tasks(owner, completed);
";

/// Reference to a stored task (sqlite rowid).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaskRef(pub i64);

impl fmt::Display for TaskRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Full task record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskRef,
    pub owner: i64,
    pub name: String,
    pub required: u32,
    pub completed: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Task summary crossing the store boundary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskSummary {
    pub id: TaskRef,
    pub name: String,
    pub completed: u32,
    pub required: u32,
}

impl TaskSummary {
    /// Whether the task has reached (or exceeded) its required interval count.
    /// Over-completion is tolerated, not capped.
    pub fn is_complete(&self) -> bool {
        self.completed >= self.required
    }

    /// Completion percentage for progress display.
    pub fn percent_done(&self) -> f64 {
        if self.required == 0 {
            return 100.0;
        }
        f64::from(self.completed) / f64::from(self.required) * 100.0
    }
}
