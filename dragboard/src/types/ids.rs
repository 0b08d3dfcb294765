//! Identifier newtypes for board entities

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of a task. Assigned by the persistence collaborator, never reused.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct TaskId(i64);

impl TaskId {
    /// Create a task id from its raw value
    pub const fn new(raw: i64) -> Self {
        Self(raw)
    }

    /// Get the raw value
    pub const fn as_i64(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for TaskId {
    fn from(raw: i64) -> Self {
        Self(raw)
    }
}

/// Identity of a category, used only for filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryId(i64);

impl CategoryId {
    /// Create a category id from its raw value
    pub const fn new(raw: i64) -> Self {
        Self(raw)
    }

    /// Get the raw value
    pub const fn as_i64(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for CategoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for CategoryId {
    fn from(raw: i64) -> Self {
        Self(raw)
    }
}
