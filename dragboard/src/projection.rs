//! Column projection - the ordered visible slice of one status

use crate::model::TaskModel;
use crate::types::{CategoryId, Status, Task};

/// Compute the ordered visible list for one column.
///
/// Filters by status and (when set) category, then sorts by `(order, id)`
/// ascending. Pure function of its inputs; stored keys are never touched.
pub fn project(model: &TaskModel, status: Status, filter: Option<CategoryId>) -> Vec<Task> {
    let mut tasks: Vec<Task> = model
        .tasks()
        .filter(|t| t.status == status)
        .filter(|t| filter.is_none() || t.category == filter)
        .cloned()
        .collect();
    tasks.sort_by_key(|t| t.rank());
    tasks
}
