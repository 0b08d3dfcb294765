//! TaskModel - the authoritative in-memory task collection.
//!
//! The model holds plain records and exposes data primitives. No ordering or
//! gesture logic lives here; the engine modules do all the work and the board
//! facade owns change notification.

use crate::error::{BoardError, Result};
use crate::types::{OrderKey, Status, Task, TaskId};
use std::collections::{HashMap, HashSet};

/// In-memory task set keyed by id
#[derive(Debug, Default)]
pub struct TaskModel {
    records: HashMap<TaskId, Task>,
}

impl TaskModel {
    /// Create an empty model
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records held
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check whether the model is empty
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Look up one record
    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.records.get(&id)
    }

    /// Check whether a record exists
    pub fn contains(&self, id: TaskId) -> bool {
        self.records.contains_key(&id)
    }

    /// Iterate over all records in no particular order
    pub fn tasks(&self) -> impl Iterator<Item = &Task> {
        self.records.values()
    }

    /// Replace or insert records by id
    pub fn upsert_many(&mut self, tasks: impl IntoIterator<Item = Task>) {
        for task in tasks {
            self.records.insert(task.id, task);
        }
    }

    /// Drop every record whose id is not in `keep`.
    ///
    /// Used after a full reload so deletions by the persistence collaborator
    /// are observed.
    pub fn retain_ids(&mut self, keep: &HashSet<TaskId>) {
        self.records.retain(|id, _| keep.contains(id));
    }

    /// Mutate exactly one record's status and order
    pub fn set_status_and_order(
        &mut self,
        id: TaskId,
        status: Status,
        order: OrderKey,
    ) -> Result<()> {
        let task = self
            .records
            .get_mut(&id)
            .ok_or(BoardError::TaskNotFound { id })?;
        task.status = status;
        task.order = order;
        Ok(())
    }

    /// Immutable copy of the full task list for rollback purposes
    pub fn snapshot(&self) -> Vec<Task> {
        self.records.values().cloned().collect()
    }

    /// Restore selected records from a snapshot.
    ///
    /// Only ids present in both the snapshot and the current model are
    /// restored; records removed by a concurrent reload stay removed.
    pub fn restore_records(&mut self, snapshot: &[Task], ids: &[TaskId]) {
        for id in ids {
            if !self.records.contains_key(id) {
                continue;
            }
            if let Some(saved) = snapshot.iter().find(|t| t.id == *id) {
                self.records.insert(*id, saved.clone());
            }
        }
    }
}
