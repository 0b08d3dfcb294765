//! File-backed task store.
//!
//! One JSON file per task under `<root>/tasks/`, written atomically via a
//! temp file and rename. Mutations take a non-blocking exclusive lock on
//! `<root>/.lock` so writers in other processes fail fast instead of
//! interleaving; a busy lock surfaces as a retryable error.

use super::{StoreError, StoreResult, TaskStore};
use crate::types::{OrderKey, ReorderEntry, Status, Task, TaskId};
use async_trait::async_trait;
use fs2::FileExt;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// Task store keeping one JSON file per task
pub struct JsonStore {
    root: PathBuf,
}

impl JsonStore {
    /// Create a store rooted at the given directory
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    // =========================================================================
    // Path helpers
    // =========================================================================

    /// Root directory of the store
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path to the tasks directory
    fn tasks_dir(&self) -> PathBuf {
        self.root.join("tasks")
    }

    /// Path to a task's JSON file
    fn task_path(&self, id: TaskId) -> PathBuf {
        self.tasks_dir().join(format!("{}.json", id))
    }

    /// Path to the lock file
    fn lock_path(&self) -> PathBuf {
        self.root.join(".lock")
    }

    // =========================================================================
    // Task I/O
    // =========================================================================

    /// Insert or replace a task file
    pub async fn put(&self, task: &Task) -> StoreResult<()> {
        self.write_task(task).await
    }

    /// Read a task file
    async fn read_task(&self, id: TaskId) -> StoreResult<Task> {
        let path = self.task_path(id);
        if !path.exists() {
            return Err(StoreError::NotFound { id });
        }

        let content = fs::read_to_string(&path).await?;
        let task: Task = serde_json::from_str(&content)?;
        Ok(task)
    }

    /// Write a task file (atomic write via temp file)
    async fn write_task(&self, task: &Task) -> StoreResult<()> {
        let path = self.task_path(task.id);
        let content = serde_json::to_string_pretty(task)?;
        atomic_write(&path, content.as_bytes()).await
    }

    /// List task IDs by reading the tasks directory; files that are not
    /// `<id>.json` are skipped
    async fn list_task_ids(&self) -> StoreResult<Vec<TaskId>> {
        let tasks_dir = self.tasks_dir();
        if !tasks_dir.exists() {
            return Ok(Vec::new());
        }

        let mut ids = Vec::new();
        let mut entries = fs::read_dir(&tasks_dir).await?;

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|s| s.to_str()) == Some("json") {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    if let Ok(raw) = stem.parse::<i64>() {
                        ids.push(TaskId::new(raw));
                    }
                }
            }
        }

        Ok(ids)
    }

    // =========================================================================
    // Locking
    // =========================================================================

    /// Try to acquire an exclusive lock (non-blocking).
    ///
    /// A busy lock is reported as unavailable so the settlement retry
    /// treats it as transient.
    pub fn lock(&self) -> StoreResult<StoreLock> {
        let lock_path = self.lock_path();

        // Ensure parent directory exists
        if let Some(parent) = lock_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&lock_path)?;

        // Non-blocking lock attempt
        match file.try_lock_exclusive() {
            Ok(()) => Ok(StoreLock { file }),
            Err(_) => Err(StoreError::unavailable("store lock is busy")),
        }
    }
}

/// RAII lock guard - releases on drop
pub struct StoreLock {
    file: std::fs::File,
}

impl Drop for StoreLock {
    fn drop(&mut self) {
        let _ = self.file.unlock();
    }
}

/// Atomic write via temp file and rename
async fn atomic_write(path: &Path, content: &[u8]) -> StoreResult<()> {
    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await?;
    }

    // Write to temp file in same directory
    let temp_path = path.with_extension("tmp");
    fs::write(&temp_path, content).await?;

    // Rename (atomic on same filesystem)
    fs::rename(&temp_path, path).await?;

    Ok(())
}

#[async_trait]
impl TaskStore for JsonStore {
    async fn fetch_tasks(&self) -> StoreResult<Vec<Task>> {
        let ids = self.list_task_ids().await?;
        let mut tasks = Vec::with_capacity(ids.len());

        for id in ids {
            tasks.push(self.read_task(id).await?);
        }

        Ok(tasks)
    }

    async fn persist_task_move(
        &self,
        id: TaskId,
        status: Status,
        order: OrderKey,
    ) -> StoreResult<Task> {
        let _lock = self.lock()?;

        let mut task = self.read_task(id).await?;
        task.status = status;
        task.order = order;
        self.write_task(&task).await?;

        Ok(task)
    }

    async fn persist_reorder(&self, status: Status, entries: &[ReorderEntry]) -> StoreResult<()> {
        let _lock = self.lock()?;
        debug!(column = %status, tasks = entries.len(), "persisting reorder batch");

        for entry in entries {
            let mut task = self.read_task(entry.id).await?;
            task.order = entry.order;
            self.write_task(&task).await?;
        }

        Ok(())
    }
}
