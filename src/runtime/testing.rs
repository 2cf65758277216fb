//! Mock implementations for testing
//!
//! These mocks enable exercising the dispatcher and the session engine
//! without real I/O.

use super::traits::{MessagingGateway, StoreError, TaskStore};
use crate::db::{TaskRef, TaskSummary};
use crate::gateway::{GatewayError, PromptOption, PromptRef, UserId};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::Mutex;

// ============================================================================
// Mock Task Store
// ============================================================================

/// In-memory task store with failure injection and recorded increments
pub struct MockTaskStore {
    tasks: Mutex<HashMap<TaskRef, (UserId, TaskSummary)>>,
    next_id: AtomicI64,
    unavailable: AtomicBool,
    increments: Mutex<Vec<TaskRef>>,
}

impl MockTaskStore {
    pub fn new() -> Self {
        Self {
            tasks: Mutex::new(HashMap::new()),
            next_id: AtomicI64::new(1),
            unavailable: AtomicBool::new(false),
            increments: Mutex::new(Vec::new()),
        }
    }

    /// Insert a task directly, bypassing the trait
    pub fn seed_task(&self, owner: UserId, name: &str, required: u32) -> TaskRef {
        let id = TaskRef(self.next_id.fetch_add(1, Ordering::SeqCst));
        self.tasks.lock().unwrap().insert(
            id,
            (
                owner,
                TaskSummary {
                    id,
                    name: name.to_string(),
                    completed: 0,
                    required,
                },
            ),
        );
        id
    }

    /// Drop a task, simulating it vanishing mid-flight
    pub fn remove_task(&self, id: TaskRef) {
        self.tasks.lock().unwrap().remove(&id);
    }

    /// Overwrite a task's completed count
    pub fn set_completed(&self, id: TaskRef, completed: u32) {
        if let Some((_, summary)) = self.tasks.lock().unwrap().get_mut(&id) {
            summary.completed = completed;
        }
    }

    /// Make every operation fail with `StoreError::Unavailable`
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Recorded successful increments, in order
    pub fn increments(&self) -> Vec<TaskRef> {
        self.increments.lock().unwrap().clone()
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("injected outage".to_string()));
        }
        Ok(())
    }

    fn tasks_where(&self, owner: UserId, complete: bool) -> Vec<TaskSummary> {
        let mut tasks: Vec<TaskSummary> = self
            .tasks
            .lock()
            .unwrap()
            .values()
            .filter(|(o, summary)| *o == owner && summary.is_complete() == complete)
            .map(|(_, summary)| summary.clone())
            .collect();
        tasks.sort_by_key(|t| t.id.0);
        tasks
    }
}

impl Default for MockTaskStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TaskStore for MockTaskStore {
    async fn create_task(
        &self,
        owner: UserId,
        name: &str,
        required: u32,
    ) -> Result<TaskSummary, StoreError> {
        self.check_available()?;
        let id = self.seed_task(owner, name, required);
        let tasks = self.tasks.lock().unwrap();
        Ok(tasks[&id].1.clone())
    }

    async fn incomplete_tasks(&self, owner: UserId) -> Result<Vec<TaskSummary>, StoreError> {
        self.check_available()?;
        Ok(self.tasks_where(owner, false))
    }

    async fn completed_tasks(&self, owner: UserId) -> Result<Vec<TaskSummary>, StoreError> {
        self.check_available()?;
        Ok(self.tasks_where(owner, true))
    }

    async fn increment_completed(&self, task: TaskRef) -> Result<TaskSummary, StoreError> {
        self.check_available()?;
        let mut tasks = self.tasks.lock().unwrap();
        let (_, summary) = tasks.get_mut(&task).ok_or(StoreError::TaskNotFound(task))?;
        summary.completed += 1;
        self.increments.lock().unwrap().push(task);
        Ok(summary.clone())
    }
}

// ============================================================================
// Mock Messaging Gateway
// ============================================================================

/// Gateway that records deliveries and retractions
pub struct MockGateway {
    next_ref: AtomicI64,
    prompts: Mutex<Vec<(UserId, String, Vec<PromptOption>)>>,
    retracted: Mutex<Vec<PromptRef>>,
    fail_delivery: AtomicBool,
}

impl MockGateway {
    pub fn new() -> Self {
        Self {
            next_ref: AtomicI64::new(1),
            prompts: Mutex::new(Vec::new()),
            retracted: Mutex::new(Vec::new()),
            fail_delivery: AtomicBool::new(false),
        }
    }

    /// Make `prompt` fail with `GatewayError::Unavailable`
    pub fn set_fail_delivery(&self, fail: bool) {
        self.fail_delivery.store(fail, Ordering::SeqCst);
    }

    /// All delivered prompts, in order
    pub fn prompts(&self) -> Vec<(UserId, String, Vec<PromptOption>)> {
        self.prompts.lock().unwrap().clone()
    }

    /// The most recently delivered prompt
    pub fn last_prompt(&self) -> Option<(UserId, String, Vec<PromptOption>)> {
        self.prompts.lock().unwrap().last().cloned()
    }

    /// All retracted prompt references, in order
    pub fn retracted(&self) -> Vec<PromptRef> {
        self.retracted.lock().unwrap().clone()
    }
}

impl Default for MockGateway {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MessagingGateway for MockGateway {
    async fn prompt(
        &self,
        owner: UserId,
        text: &str,
        options: &[PromptOption],
    ) -> Result<PromptRef, GatewayError> {
        if self.fail_delivery.load(Ordering::SeqCst) {
            return Err(GatewayError::Unavailable("injected outage".to_string()));
        }
        self.prompts
            .lock()
            .unwrap()
            .push((owner, text.to_string(), options.to_vec()));
        let n = self.next_ref.fetch_add(1, Ordering::SeqCst);
        Ok(PromptRef(format!("prompt-{n}")))
    }

    async fn retract(&self, prompt: &PromptRef) -> Result<(), GatewayError> {
        self.retracted.lock().unwrap().push(prompt.clone());
        Ok(())
    }
}
