//! Persistence behind the board.
//!
//! The engine applies every move locally first and settles it against a
//! [`TaskStore`] afterwards, so the trait is small: fetch everything, persist
//! one move, persist one batch of keys. [`JsonStore`] keeps tasks as files on
//! disk; [`MemoryStore`] backs tests.

use crate::types::{OrderKey, ReorderEntry, Status, Task, TaskId};
use async_trait::async_trait;
use thiserror::Error;

pub mod json;
pub mod memory;

pub use json::JsonStore;
pub use memory::MemoryStore;

/// Result type for store operations
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Errors a store can surface
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store refused the mutation; retrying the same call will not help
    #[error("persistence rejected: {reason}")]
    Rejected { reason: String },

    /// The store could not be reached; the same call may succeed shortly
    #[error("store unavailable: {reason}")]
    Unavailable { reason: String },

    /// The task does not exist in the store
    #[error("task not found: {id}")]
    NotFound { id: TaskId },

    /// IO operation failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization or parsing failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl StoreError {
    /// Create a rejection error
    pub fn rejected(reason: impl Into<String>) -> Self {
        Self::Rejected {
            reason: reason.into(),
        }
    }

    /// Create an unavailability error
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::Unavailable {
            reason: reason.into(),
        }
    }

    /// Whether retrying the failed call could succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, StoreError::Unavailable { .. })
    }
}

/// Persistence operations the board settles moves against
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Fetch every task the store holds
    async fn fetch_tasks(&self) -> StoreResult<Vec<Task>>;

    /// Persist one task's new column and order key, returning the stored
    /// record.
    ///
    /// Must be idempotent: repeating a call with the same arguments leaves
    /// the store in the same state it reached the first time.
    async fn persist_task_move(
        &self,
        id: TaskId,
        status: Status,
        order: OrderKey,
    ) -> StoreResult<Task>;

    /// Persist a batch of order keys for one column
    async fn persist_reorder(&self, status: Status, entries: &[ReorderEntry]) -> StoreResult<()>;
}
