//! Settlement pipeline for optimistic moves.
//!
//! A move mutates the local model synchronously (`stage`), then persists in a
//! background task (`settle`). While a task's move is in flight it is gated:
//! no second move or drag may start for it. Settlement either reconciles the
//! model against the record the store returns, or restores the staged
//! snapshot for whatever the store did not accept and reports the failure.
//!
//! The mutexes in [`Shared`] are plain `std::sync` locks held only for short
//! synchronous sections, never across an await. Where both are taken, the
//! model lock comes first.

use crate::defaults::BoardConfig;
use crate::drag::MoveRequest;
use crate::error::{BoardError, Result};
use crate::events::BoardEvent;
use crate::model::TaskModel;
use crate::ordering::{self, Assignment};
use crate::projection::project;
use crate::store::{StoreError, StoreResult, TaskStore};
use crate::types::{OrderKey, ReorderEntry, Status, Task, TaskId};
use std::collections::HashSet;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

/// State the board facade and settlement tasks share
pub(crate) struct Shared {
    pub(crate) model: Mutex<TaskModel>,
    /// Tasks with a persist in flight; moves and drags for them are refused
    pub(crate) in_flight: Mutex<HashSet<TaskId>>,
    pub(crate) events: broadcast::Sender<BoardEvent>,
    pub(crate) config: BoardConfig,
}

impl Shared {
    pub(crate) fn emit(&self, event: BoardEvent) {
        // Best-effort notify; no receivers is fine.
        let _ = self.events.send(event);
    }
}

/// Lock a mutex, recovering the guard if a holder panicked
pub(crate) fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|e| e.into_inner())
}

/// A staged move waiting for its store round trip
pub(crate) struct PendingMove {
    pub(crate) task_id: TaskId,
    pub(crate) from_status: Status,
    pub(crate) to_status: Status,
    pub(crate) order: OrderKey,
    /// Column-wide key rewrite that made room for the move, if one was needed
    pub(crate) renumbered: Option<(Status, Vec<ReorderEntry>)>,
    /// Full model state before the move, for rollback
    pub(crate) snapshot: Vec<Task>,
}

/// Apply a move to the local model and gate the task.
///
/// Picks the order key for the requested slot, renumbering the destination
/// column first when its keys have no room left. The caller owns notifying
/// listeners and spawning [`settle`] for the returned pending move.
pub(crate) fn stage(shared: &Shared, request: &MoveRequest) -> Result<PendingMove> {
    let mut model = lock(&shared.model);

    {
        let in_flight = lock(&shared.in_flight);
        if in_flight.contains(&request.task_id) {
            return Err(BoardError::MoveInFlight {
                id: request.task_id,
            });
        }
    }

    let task = model
        .get(request.task_id)
        .cloned()
        .ok_or(BoardError::TaskNotFound {
            id: request.task_id,
        })?;

    let snapshot = model.snapshot();

    // Destination neighbors as the gesture saw them, moving task excluded
    let visible: Vec<Task> = project(&model, request.to_status, request.filter)
        .into_iter()
        .filter(|t| t.id != request.task_id)
        .collect();
    // A key rewrite has to span the whole column, hidden tasks included
    let full: Vec<Task> = project(&model, request.to_status, None)
        .into_iter()
        .filter(|t| t.id != request.task_id)
        .collect();

    let assignment = ordering::assign_slot(&visible, &full, request.target_index);
    let order = assignment.order();

    let renumbered = match assignment {
        Assignment::Direct { .. } => None,
        Assignment::Renumbered { entries, .. } => {
            info!(
                column = %request.to_status,
                tasks = entries.len(),
                "order keys exhausted - renumbering column"
            );
            for entry in &entries {
                model.set_status_and_order(entry.id, request.to_status, entry.order)?;
            }
            Some((request.to_status, entries))
        }
    };

    model.set_status_and_order(request.task_id, request.to_status, order)?;
    lock(&shared.in_flight).insert(request.task_id);

    debug!(
        task = %request.task_id,
        from = %task.status,
        to = %request.to_status,
        order = %order,
        "move staged"
    );

    Ok(PendingMove {
        task_id: request.task_id,
        from_status: task.status,
        to_status: request.to_status,
        order,
        renumbered,
        snapshot,
    })
}

/// Persist a staged move and resolve it.
///
/// Runs on its own task; the outcome lands in the shared model and the event
/// channel whether or not anything is still listening.
pub(crate) async fn settle(shared: Arc<Shared>, store: Arc<dyn TaskStore>, pending: PendingMove) {
    // The batch goes first: the moved task's key only makes sense on top of
    // the renumbered column.
    if let Some((status, entries)) = &pending.renumbered {
        let result =
            with_retry(&shared.config, || store.persist_reorder(*status, entries)).await;
        if let Err(err) = result {
            warn!(
                task = %pending.task_id,
                error = %err,
                "reorder persistence failed - rolling back"
            );
            roll_back_batch(&shared, &pending);
            finish_failed(&shared, pending.task_id, &err);
            return;
        }
    }

    let result = with_retry(&shared.config, || {
        store.persist_task_move(pending.task_id, pending.to_status, pending.order)
    })
    .await;

    match result {
        Ok(record) => {
            let changed = {
                let mut model = lock(&shared.model);
                match model.get(pending.task_id) {
                    // The stored record wins where it differs from the
                    // optimistic apply
                    Some(local) if *local != record => {
                        model.upsert_many([record]);
                        true
                    }
                    Some(_) => false,
                    // Removed locally while in flight; leave it gone
                    None => false,
                }
            };
            lock(&shared.in_flight).remove(&pending.task_id);

            debug!(
                task = %pending.task_id,
                from = %pending.from_status,
                to = %pending.to_status,
                "move settled"
            );
            if changed {
                shared.emit(BoardEvent::TasksChanged);
            }
            shared.emit(BoardEvent::MoveSettled {
                task_id: pending.task_id,
            });
        }
        Err(err) => {
            warn!(
                task = %pending.task_id,
                error = %err,
                "move persistence failed - rolling back"
            );
            roll_back_task(&shared, &pending);
            finish_failed(&shared, pending.task_id, &err);
        }
    }
}

/// Restore the moved task from its snapshot.
///
/// Renumbered neighbors keep their rewritten keys here: a batch only reaches
/// this path once the store has accepted it, so those keys are the stored
/// truth and reverting them locally would diverge from it.
fn roll_back_task(shared: &Shared, pending: &PendingMove) {
    lock(&shared.model).restore_records(&pending.snapshot, &[pending.task_id]);
}

/// Restore the moved task and the renumber batch from the snapshot.
///
/// Nothing reached the store on this path. Batch members whose own later
/// moves are still in flight are left alone; their settlements own them.
fn roll_back_batch(shared: &Shared, pending: &PendingMove) {
    let mut model = lock(&shared.model);

    let mut ids: Vec<TaskId> = vec![pending.task_id];
    if let Some((_, entries)) = &pending.renumbered {
        let in_flight = lock(&shared.in_flight);
        ids.extend(
            entries
                .iter()
                .map(|e| e.id)
                .filter(|id| !in_flight.contains(id)),
        );
    }

    model.restore_records(&pending.snapshot, &ids);
}

fn finish_failed(shared: &Shared, task_id: TaskId, err: &StoreError) {
    lock(&shared.in_flight).remove(&task_id);
    shared.emit(BoardEvent::TasksChanged);
    shared.emit(BoardEvent::MutationFailed {
        task_id,
        reason: err.to_string(),
    });
}

/// Run a store call, retrying transient failures up to the configured
/// attempt count
async fn with_retry<T, F, Fut>(config: &BoardConfig, mut call: F) -> StoreResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = StoreResult<T>>,
{
    let mut attempt = 1;
    loop {
        match call().await {
            Ok(value) => {
                if attempt > 1 {
                    debug!(attempt, "store call succeeded after retry");
                }
                return Ok(value);
            }
            Err(err) if err.is_retryable() && attempt < config.persist_attempts => {
                warn!(attempt, error = %err, "store call failed - retrying");
                tokio::time::sleep(config.retry_delay).await;
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}
