//! In-memory store for tests.
//!
//! Holds tasks in a map behind a mutex and mirrors the JSON store's
//! semantics. With the `test-support` feature it also counts calls and can
//! be told to fail upcoming operations, which is how the failure paths of
//! the settlement pipeline are exercised.

use super::{StoreError, StoreResult, TaskStore};
use crate::types::{OrderKey, ReorderEntry, Status, Task, TaskId};
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::Mutex;

#[cfg(feature = "test-support")]
use std::collections::VecDeque;
#[cfg(feature = "test-support")]
use std::sync::atomic::{AtomicUsize, Ordering};

#[cfg(feature = "test-support")]
#[derive(Default)]
struct Diagnostics {
    fetch_calls: AtomicUsize,
    move_calls: AtomicUsize,
    reorder_calls: AtomicUsize,
    fetch_failures: std::sync::Mutex<VecDeque<StoreError>>,
    move_failures: std::sync::Mutex<VecDeque<StoreError>>,
    reorder_failures: std::sync::Mutex<VecDeque<StoreError>>,
}

#[cfg(feature = "test-support")]
impl Diagnostics {
    fn pop(queue: &std::sync::Mutex<VecDeque<StoreError>>) -> Option<StoreError> {
        queue
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front()
    }

    fn push(queue: &std::sync::Mutex<VecDeque<StoreError>>, err: StoreError) {
        queue
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(err);
    }
}

/// Task store backed by a map
#[derive(Default)]
pub struct MemoryStore {
    tasks: Mutex<HashMap<TaskId, Task>>,
    #[cfg(feature = "test-support")]
    diag: Diagnostics,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a task
    pub async fn insert(&self, task: Task) {
        self.tasks.lock().await.insert(task.id, task);
    }

    /// Remove a task, returning it if present
    pub async fn remove(&self, id: TaskId) -> Option<Task> {
        self.tasks.lock().await.remove(&id)
    }

    /// The stored record for a task
    pub async fn stored(&self, id: TaskId) -> Option<Task> {
        self.tasks.lock().await.get(&id).cloned()
    }
}

#[cfg(feature = "test-support")]
impl MemoryStore {
    /// Queue an error for the next `fetch_tasks` call
    pub fn fail_next_fetch(&self, err: StoreError) {
        Diagnostics::push(&self.diag.fetch_failures, err);
    }

    /// Queue an error for the next `persist_task_move` call
    pub fn fail_next_move(&self, err: StoreError) {
        Diagnostics::push(&self.diag.move_failures, err);
    }

    /// Queue an error for the next `persist_reorder` call
    pub fn fail_next_reorder(&self, err: StoreError) {
        Diagnostics::push(&self.diag.reorder_failures, err);
    }

    /// Number of `fetch_tasks` calls made
    pub fn fetch_calls(&self) -> usize {
        self.diag.fetch_calls.load(Ordering::SeqCst)
    }

    /// Number of `persist_task_move` calls made, failed ones included
    pub fn move_calls(&self) -> usize {
        self.diag.move_calls.load(Ordering::SeqCst)
    }

    /// Number of `persist_reorder` calls made, failed ones included
    pub fn reorder_calls(&self) -> usize {
        self.diag.reorder_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TaskStore for MemoryStore {
    async fn fetch_tasks(&self) -> StoreResult<Vec<Task>> {
        #[cfg(feature = "test-support")]
        {
            self.diag.fetch_calls.fetch_add(1, Ordering::SeqCst);
            if let Some(err) = Diagnostics::pop(&self.diag.fetch_failures) {
                return Err(err);
            }
        }
        Ok(self.tasks.lock().await.values().cloned().collect())
    }

    async fn persist_task_move(
        &self,
        id: TaskId,
        status: Status,
        order: OrderKey,
    ) -> StoreResult<Task> {
        #[cfg(feature = "test-support")]
        {
            self.diag.move_calls.fetch_add(1, Ordering::SeqCst);
            if let Some(err) = Diagnostics::pop(&self.diag.move_failures) {
                return Err(err);
            }
        }
        let mut tasks = self.tasks.lock().await;
        let task = tasks.get_mut(&id).ok_or(StoreError::NotFound { id })?;
        task.status = status;
        task.order = order;
        Ok(task.clone())
    }

    async fn persist_reorder(&self, _status: Status, entries: &[ReorderEntry]) -> StoreResult<()> {
        #[cfg(feature = "test-support")]
        {
            self.diag.reorder_calls.fetch_add(1, Ordering::SeqCst);
            if let Some(err) = Diagnostics::pop(&self.diag.reorder_failures) {
                return Err(err);
            }
        }
        let mut tasks = self.tasks.lock().await;
        for entry in entries {
            let task = tasks
                .get_mut(&entry.id)
                .ok_or(StoreError::NotFound { id: entry.id })?;
            task.order = entry.order;
        }
        Ok(())
    }
}
