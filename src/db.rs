//! Database module for focusbot
//!
//! Provides persistence for user-owned tasks. One self-contained
//! read-modify-write per call; no cross-task transactions.

mod schema;

pub use schema::*;

use crate::gateway::UserId;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::{Arc, Mutex};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("Task not found: {0}")]
    TaskNotFound(TaskRef),
    #[error("Database path error: {0}")]
    Io(#[from] std::io::Error),
}

pub type DbResult<T> = Result<T, DbError>;

/// Thread-safe database handle
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Open or create database at the given path
    pub fn open<P: AsRef<Path>>(path: P) -> DbResult<Self> {
        let conn = Connection::open(path)?;
        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.run_migrations()?;
        Ok(db)
    }

    /// Open at the path from `FOCUSBOT_DB_PATH`, defaulting to
    /// `~/.focusbot/focusbot.db`.
    pub fn open_default() -> DbResult<Self> {
        let path = std::env::var("FOCUSBOT_DB_PATH").unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            format!("{home}/.focusbot/focusbot.db")
        });
        if let Some(parent) = Path::new(&path).parent() {
            std::fs::create_dir_all(parent)?;
        }
        Self::open(path)
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> DbResult<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.run_migrations()?;
        Ok(db)
    }

    fn run_migrations(&self) -> DbResult<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute_batch(SCHEMA)?;
        Ok(())
    }

    // ==================== Task Operations ====================

    /// Create a task with zero completed intervals
    pub fn create_task(&self, owner: UserId, name: &str, required: u32) -> DbResult<TaskSummary> {
        let conn = self.conn.lock().unwrap();
        let now = Utc::now().to_rfc3339();
        conn.execute(
            "INSERT INTO tasks (owner, name, required, completed, created_at, updated_at)
             VALUES (?1, ?2, ?3, 0, ?4, ?4)",
            params![owner.0, name, required, now],
        )?;
        let id = TaskRef(conn.last_insert_rowid());
        Ok(TaskSummary {
            id,
            name: name.to_string(),
            completed: 0,
            required,
        })
    }

    /// Get a task by reference
    pub fn get_task(&self, id: TaskRef) -> DbResult<Task> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT id, owner, name, required, completed, created_at, updated_at
             FROM tasks WHERE id = ?1",
        )?;
        stmt.query_row(params![id.0], row_to_task)
            .map_err(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => DbError::TaskNotFound(id),
                other => DbError::Sqlite(other),
            })
    }

    /// Tasks with fewer completed than required intervals, oldest first
    pub fn incomplete_tasks(&self, owner: UserId) -> DbResult<Vec<TaskSummary>> {
        self.tasks_where(owner, "completed < required")
    }

    /// Tasks that have reached their required interval count
    pub fn completed_tasks(&self, owner: UserId) -> DbResult<Vec<TaskSummary>> {
        self.tasks_where(owner, "completed >= required")
    }

    fn tasks_where(&self, owner: UserId, predicate: &str) -> DbResult<Vec<TaskSummary>> {
        let conn = self.conn.lock().unwrap();
        let sql = format!(
            "SELECT id, name, completed, required FROM tasks
             WHERE owner = ?1 AND {predicate} ORDER BY id ASC"
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params![owner.0], |row| {
            Ok(TaskSummary {
                id: TaskRef(row.get(0)?),
                name: row.get(1)?,
                completed: row.get(2)?,
                required: row.get(3)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(DbError::from)
    }

    /// Advance the completed-interval count by exactly one. Never caps at
    /// `required`; over-completion is a tolerated policy.
    pub fn increment_completed(&self, id: TaskRef) -> DbResult<TaskSummary> {
        {
            let conn = self.conn.lock().unwrap();
            let now = Utc::now().to_rfc3339();
            let changed = conn.execute(
                "UPDATE tasks SET completed = completed + 1, updated_at = ?2 WHERE id = ?1",
                params![id.0, now],
            )?;
            if changed == 0 {
                return Err(DbError::TaskNotFound(id));
            }
        }
        let task = self.get_task(id)?;
        Ok(TaskSummary {
            id: task.id,
            name: task.name,
            completed: task.completed,
            required: task.required,
        })
    }
}

fn row_to_task(row: &rusqlite::Row<'_>) -> rusqlite::Result<Task> {
    Ok(Task {
        id: TaskRef(row.get(0)?),
        owner: row.get(1)?,
        name: row.get(2)?,
        required: row.get(3)?,
        completed: row.get(4)?,
        created_at: parse_datetime(&row.get::<_, String>(5)?),
        updated_at: parse_datetime(&row.get::<_, String>(6)?),
    })
}

fn parse_datetime(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

#[cfg(test)]
mod tests {
    use super::*;

    const OWNER: UserId = UserId(100);

    #[test]
    fn create_and_list_tasks() {
        let db = Database::open_in_memory().unwrap();
        let task = db.create_task(OWNER, "write report", 4).unwrap();
        assert_eq!(task.completed, 0);
        assert_eq!(task.required, 4);

        let ongoing = db.incomplete_tasks(OWNER).unwrap();
        assert_eq!(ongoing.len(), 1);
        assert_eq!(ongoing[0].name, "write report");
        assert!(db.completed_tasks(OWNER).unwrap().is_empty());
    }

    #[test]
    fn tasks_are_scoped_to_owner() {
        let db = Database::open_in_memory().unwrap();
        db.create_task(OWNER, "mine", 1).unwrap();
        db.create_task(UserId(200), "theirs", 1).unwrap();

        let mine = db.incomplete_tasks(OWNER).unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].name, "mine");
    }

    #[test]
    fn increment_moves_task_to_completed() {
        let db = Database::open_in_memory().unwrap();
        let task = db.create_task(OWNER, "read chapter", 2).unwrap();

        let after_one = db.increment_completed(task.id).unwrap();
        assert_eq!(after_one.completed, 1);
        assert!(!after_one.is_complete());

        let after_two = db.increment_completed(task.id).unwrap();
        assert_eq!(after_two.completed, 2);
        assert!(after_two.is_complete());
        assert!(db.incomplete_tasks(OWNER).unwrap().is_empty());
        assert_eq!(db.completed_tasks(OWNER).unwrap().len(), 1);
    }

    #[test]
    fn increment_past_required_is_tolerated() {
        let db = Database::open_in_memory().unwrap();
        let task = db.create_task(OWNER, "stretch goal", 1).unwrap();
        db.increment_completed(task.id).unwrap();
        let ahead = db.increment_completed(task.id).unwrap();
        assert_eq!(ahead.completed, 2);
        assert!(ahead.is_complete());
    }

    #[test]
    fn increment_missing_task_is_not_found() {
        let db = Database::open_in_memory().unwrap();
        let err = db.increment_completed(TaskRef(999)).unwrap_err();
        assert!(matches!(err, DbError::TaskNotFound(TaskRef(999))));
    }

    #[test]
    fn open_on_disk_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("focusbot.db");
        {
            let db = Database::open(&path).unwrap();
            db.create_task(OWNER, "survives reopen", 3).unwrap();
        }
        let db = Database::open(&path).unwrap();
        let tasks = db.incomplete_tasks(OWNER).unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].name, "survives reopen");
    }

    #[test]
    fn percent_done_has_full_precision() {
        let summary = TaskSummary {
            id: TaskRef(1),
            name: "t".to_string(),
            completed: 1,
            required: 3,
        };
        assert!((summary.percent_done() - 33.333).abs() < 0.01);
    }
}
