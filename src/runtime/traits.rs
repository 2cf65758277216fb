//! Trait abstractions for the external collaborators
//!
//! The task store and the messaging gateway are consumed, not designed,
//! here; these traits are their interface boundary. They also enable
//! testing the dispatcher and the session engine with mock implementations.

use crate::db::{Database, DbError, TaskRef, TaskSummary};
use crate::gateway::{GatewayError, PromptOption, PromptRef, UserId};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Failures crossing the task-store boundary. No internal retries: retry
/// policy belongs to the store collaborator.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Task not found: {0}")]
    TaskNotFound(TaskRef),
    #[error("Task store unavailable: {0}")]
    Unavailable(String),
}

/// Durable storage of tasks, keyed by user identity
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Create a task with zero completed intervals
    async fn create_task(
        &self,
        owner: UserId,
        name: &str,
        required: u32,
    ) -> Result<TaskSummary, StoreError>;

    /// Tasks with fewer completed than required intervals
    async fn incomplete_tasks(&self, owner: UserId) -> Result<Vec<TaskSummary>, StoreError>;

    /// Tasks that reached their required interval count
    async fn completed_tasks(&self, owner: UserId) -> Result<Vec<TaskSummary>, StoreError>;

    /// Advance the completed count by exactly one
    async fn increment_completed(&self, task: TaskRef) -> Result<TaskSummary, StoreError>;
}

/// Delivery of prompts and menus to a user
#[async_trait]
pub trait MessagingGateway: Send + Sync {
    /// Deliver content with optional selectable options; the returned
    /// reference can later retract the prompt.
    async fn prompt(
        &self,
        owner: UserId,
        text: &str,
        options: &[PromptOption],
    ) -> Result<PromptRef, GatewayError>;

    /// Best-effort removal of a previously delivered prompt. Failures are
    /// non-fatal and ignored by callers.
    async fn retract(&self, prompt: &PromptRef) -> Result<(), GatewayError>;
}

// ============================================================================
// Arc implementations for trait objects
// ============================================================================

#[async_trait]
impl<T: TaskStore + ?Sized> TaskStore for Arc<T> {
    async fn create_task(
        &self,
        owner: UserId,
        name: &str,
        required: u32,
    ) -> Result<TaskSummary, StoreError> {
        (**self).create_task(owner, name, required).await
    }

    async fn incomplete_tasks(&self, owner: UserId) -> Result<Vec<TaskSummary>, StoreError> {
        (**self).incomplete_tasks(owner).await
    }

    async fn completed_tasks(&self, owner: UserId) -> Result<Vec<TaskSummary>, StoreError> {
        (**self).completed_tasks(owner).await
    }

    async fn increment_completed(&self, task: TaskRef) -> Result<TaskSummary, StoreError> {
        (**self).increment_completed(task).await
    }
}

#[async_trait]
impl<T: MessagingGateway + ?Sized> MessagingGateway for Arc<T> {
    async fn prompt(
        &self,
        owner: UserId,
        text: &str,
        options: &[PromptOption],
    ) -> Result<PromptRef, GatewayError> {
        (**self).prompt(owner, text, options).await
    }

    async fn retract(&self, prompt: &PromptRef) -> Result<(), GatewayError> {
        (**self).retract(prompt).await
    }
}

// ============================================================================
// Production Adapters
// ============================================================================

/// Adapter to use [`Database`] as the task store
#[derive(Clone)]
pub struct SqliteTaskStore {
    db: Database,
}

impl SqliteTaskStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    #[allow(dead_code)] // Useful for tests
    pub fn inner(&self) -> &Database {
        &self.db
    }
}

fn into_store_error(e: DbError) -> StoreError {
    match e {
        DbError::TaskNotFound(id) => StoreError::TaskNotFound(id),
        other => StoreError::Unavailable(other.to_string()),
    }
}

#[async_trait]
impl TaskStore for SqliteTaskStore {
    async fn create_task(
        &self,
        owner: UserId,
        name: &str,
        required: u32,
    ) -> Result<TaskSummary, StoreError> {
        self.db
            .create_task(owner, name, required)
            .map_err(into_store_error)
    }

    async fn incomplete_tasks(&self, owner: UserId) -> Result<Vec<TaskSummary>, StoreError> {
        self.db.incomplete_tasks(owner).map_err(into_store_error)
    }

    async fn completed_tasks(&self, owner: UserId) -> Result<Vec<TaskSummary>, StoreError> {
        self.db.completed_tasks(owner).map_err(into_store_error)
    }

    async fn increment_completed(&self, task: TaskRef) -> Result<TaskSummary, StoreError> {
        self.db.increment_completed(task).map_err(into_store_error)
    }
}
