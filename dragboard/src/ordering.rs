//! Order assignment for drops, including the renumbering pass.
//!
//! Given a destination column and a target index, computes the order key that
//! places the dragged task at that index without disturbing any other key.
//! When midpoint insertion has no representable value left, the whole column
//! is renumbered to evenly spaced keys first and the placement retried.

use crate::types::{OrderKey, ReorderEntry, Task, TaskId};
use std::collections::HashMap;

/// Result of computing a slot for a dragged task
#[derive(Debug, Clone, PartialEq)]
pub enum Assignment {
    /// The key places the task directly; no other task is touched
    Direct { order: OrderKey },
    /// The column ran out of room and was renumbered before placement
    Renumbered {
        /// Evenly spaced keys for the whole destination column, display order
        /// preserved, the dragged task excluded
        entries: Vec<ReorderEntry>,
        /// Key for the dragged task against the renumbered column
        order: OrderKey,
    },
}

impl Assignment {
    /// The key assigned to the dragged task
    pub fn order(&self) -> OrderKey {
        match self {
            Assignment::Direct { order } => *order,
            Assignment::Renumbered { order, .. } => *order,
        }
    }
}

/// Compute the order key that places a task at `target_index`.
///
/// `visible` is the destination column as displayed (category filter applied),
/// `full` the unfiltered destination column; both sorted by `(order, id)` and
/// with the dragged task already excluded. Indexes past the end of `visible`
/// append.
pub fn assign_slot(visible: &[Task], full: &[Task], target_index: usize) -> Assignment {
    if let Some(order) = direct_key(visible, target_index) {
        return Assignment::Direct { order };
    }

    let entries = renumber(full);
    let keys: HashMap<TaskId, OrderKey> = entries.iter().map(|e| (e.id, e.order)).collect();
    let renumbered: Vec<Task> = visible
        .iter()
        .map(|t| {
            let mut t = t.clone();
            if let Some(key) = keys.get(&t.id) {
                t.order = *key;
            }
            t
        })
        .collect();

    // Spacing restores headroom, so the retry always finds room.
    let order = direct_key(&renumbered, target_index).unwrap_or(OrderKey::BASELINE);
    Assignment::Renumbered { entries, order }
}

/// Reassign evenly spaced keys to a column in its current display order
pub fn renumber(column: &[Task]) -> Vec<ReorderEntry> {
    column
        .iter()
        .enumerate()
        .map(|(i, t)| ReorderEntry {
            id: t.id,
            order: OrderKey::from_int((i as i64 + 1) * 1000),
        })
        .collect()
}

/// Key for `target_index` against a visible sequence, or `None` when the
/// representation has no room there
fn direct_key(visible: &[Task], target_index: usize) -> Option<OrderKey> {
    if visible.is_empty() {
        return Some(OrderKey::BASELINE);
    }
    if target_index == 0 {
        return visible[0].order.step_below();
    }
    if target_index >= visible.len() {
        return visible[visible.len() - 1].order.step_above();
    }
    OrderKey::between(visible[target_index - 1].order, visible[target_index].order)
}
