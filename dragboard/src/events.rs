//! Change notification events

use crate::types::TaskId;
use serde::{Deserialize, Serialize};

/// Broadcast to subscribers on every observable change.
///
/// `TasksChanged` asks consumers to re-render from `columns()`. The two
/// settlement events report the outcome of an asynchronous persistence call;
/// either one means the task accepts new drags again.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BoardEvent {
    /// Task data changed
    TasksChanged,
    /// A move was persisted successfully
    MoveSettled { task_id: TaskId },
    /// A move failed and the board rolled back
    MutationFailed { task_id: TaskId, reason: String },
}
