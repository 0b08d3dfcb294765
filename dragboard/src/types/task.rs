//! Task record - one unit of work on the board

use super::ids::{CategoryId, TaskId};
use super::order::OrderKey;
use super::status::Status;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A task as held by the board.
///
/// `status` and `order` are the two fields the engine mutates. Everything else
/// is display data that round-trips unchanged through load and persist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub status: Status,
    pub order: OrderKey,

    /// Optional category reference, read for filtering, never written here
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<CategoryId>,

    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,

    /// Opaque extra fields carried for the consumer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

impl Task {
    /// Create a new task record
    pub fn new(
        id: impl Into<TaskId>,
        title: impl Into<String>,
        status: Status,
        order: OrderKey,
    ) -> Self {
        Self {
            id: id.into(),
            status,
            order,
            category: None,
            title: title.into(),
            description: None,
            priority: None,
            deadline: None,
            owner: None,
            metadata: None,
        }
    }

    /// Set the category
    pub fn with_category(mut self, category: CategoryId) -> Self {
        self.category = Some(category);
        self
    }

    /// Set the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the priority
    pub fn with_priority(mut self, priority: impl Into<String>) -> Self {
        self.priority = Some(priority.into());
        self
    }

    /// Set the deadline
    pub fn with_deadline(mut self, deadline: DateTime<Utc>) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Set the owner
    pub fn with_owner(mut self, owner: impl Into<String>) -> Self {
        self.owner = Some(owner.into());
        self
    }

    /// Set opaque metadata
    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Sort key within a column: order first, id breaks ties
    pub fn rank(&self) -> (OrderKey, TaskId) {
        (self.order, self.id)
    }
}
