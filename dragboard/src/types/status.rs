//! Task status - determines which column a task belongs to

use serde::{Deserialize, Serialize};
use std::fmt;

/// Workflow state of a task. Each status is one column on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    Pending,
    InProgress,
    Review,
    Completed,
}

impl Status {
    /// All statuses in column display order, left to right
    pub const ALL: [Status; 4] = [
        Status::Pending,
        Status::InProgress,
        Status::Review,
        Status::Completed,
    ];

    /// The serialized form, e.g. `"IN_PROGRESS"`
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Pending => "PENDING",
            Status::InProgress => "IN_PROGRESS",
            Status::Review => "REVIEW",
            Status::Completed => "COMPLETED",
        }
    }

    /// Zero-based display position of this status
    pub fn column_index(&self) -> usize {
        match self {
            Status::Pending => 0,
            Status::InProgress => 1,
            Status::Review => 2,
            Status::Completed => 3,
        }
    }

    /// The column to the left in display order, if any
    pub fn left(&self) -> Option<Status> {
        let idx = self.column_index();
        if idx == 0 {
            None
        } else {
            Some(Status::ALL[idx - 1])
        }
    }

    /// The column to the right in display order, if any
    pub fn right(&self) -> Option<Status> {
        Status::ALL.get(self.column_index() + 1).copied()
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_serde() {
        assert_eq!(
            serde_json::to_string(&Status::InProgress).unwrap(),
            "\"IN_PROGRESS\""
        );
        let status: Status = serde_json::from_str("\"COMPLETED\"").unwrap();
        assert_eq!(status, Status::Completed);
    }

    #[test]
    fn test_display_order() {
        assert_eq!(Status::ALL[0], Status::Pending);
        assert_eq!(Status::ALL[3], Status::Completed);
        for (i, status) in Status::ALL.iter().enumerate() {
            assert_eq!(status.column_index(), i);
        }
    }

    #[test]
    fn test_neighbors() {
        assert_eq!(Status::Pending.left(), None);
        assert_eq!(Status::Pending.right(), Some(Status::InProgress));
        assert_eq!(Status::Completed.right(), None);
        assert_eq!(Status::Review.left(), Some(Status::InProgress));
    }
}
