//! Error types for the board engine

use crate::store::StoreError;
use crate::types::TaskId;
use thiserror::Error;

/// Result type for board operations
pub type Result<T> = std::result::Result<T, BoardError>;

/// Errors that can occur in board operations
#[derive(Debug, Error)]
pub enum BoardError {
    /// Task not found in the local model
    #[error("task not found: {id}")]
    TaskNotFound { id: TaskId },

    /// Task already has a move being persisted
    #[error("task {id} has a move in flight")]
    MoveInFlight { id: TaskId },

    /// A drag session is already active
    #[error("a drag is already active for task {id}")]
    DragActive { id: TaskId },

    /// The persistence collaborator failed
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = BoardError::TaskNotFound { id: TaskId::new(42) };
        assert_eq!(err.to_string(), "task not found: 42");
    }

    #[test]
    fn test_store_error_wraps() {
        let err = BoardError::from(StoreError::rejected("duplicate order"));
        assert!(err.to_string().contains("duplicate order"));
    }
}
