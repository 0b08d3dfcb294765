//! Board facade - the single entry point consumers drive.
//!
//! The board owns the task model, the drag session, and the store handle.
//! Reads are synchronous projections; moves apply locally at once and settle
//! against the store on a background task, so every mutating call returns as
//! soon as the local model is updated. Listeners follow along on the event
//! channel.

use crate::defaults::BoardConfig;
use crate::drag::{DragSession, DropTarget, MoveRequest, SessionCtx};
use crate::error::{BoardError, Result};
use crate::events::BoardEvent;
use crate::model::TaskModel;
use crate::projection::project;
use crate::reconcile::{self, lock, Shared};
use crate::store::TaskStore;
use crate::surface::{self, BoardLayout, Direction};
use crate::types::{CategoryId, Status, Task, TaskId};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use tokio::sync::broadcast;
use tracing::debug;

/// One column's visible tasks, in display order
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnView {
    pub status: Status,
    pub tasks: Vec<Task>,
}

/// Task board with optimistic drag-and-drop reordering.
///
/// Moves spawn their persistence on the current Tokio runtime, so mutating
/// calls must run inside one.
pub struct Board {
    shared: Arc<Shared>,
    store: Arc<dyn TaskStore>,
    session: Mutex<DragSession>,
    filter: Mutex<Option<CategoryId>>,
    layout: Mutex<Option<BoardLayout>>,
}

impl Board {
    /// Create a board over a store with default settings
    pub fn new(store: Arc<dyn TaskStore>) -> Self {
        Self::with_config(store, BoardConfig::default())
    }

    /// Create a board with explicit settings
    pub fn with_config(store: Arc<dyn TaskStore>, config: BoardConfig) -> Self {
        let (events, _) = broadcast::channel(config.event_capacity);
        Self {
            shared: Arc::new(Shared {
                model: Mutex::new(TaskModel::new()),
                in_flight: Mutex::new(HashSet::new()),
                events,
                config,
            }),
            store,
            session: Mutex::new(DragSession::new()),
            filter: Mutex::new(None),
            layout: Mutex::new(None),
        }
    }

    /// Replace the model with the store's current tasks.
    ///
    /// Tasks the store no longer returns are dropped from the model.
    pub async fn load(&self) -> Result<()> {
        let fetched = self.store.fetch_tasks().await?;
        let count = fetched.len();
        {
            let mut model = lock(&self.shared.model);
            let ids: HashSet<TaskId> = fetched.iter().map(|t| t.id).collect();
            model.upsert_many(fetched);
            model.retain_ids(&ids);
        }
        debug!(tasks = count, "board loaded");
        self.shared.emit(BoardEvent::TasksChanged);
        Ok(())
    }

    /// Subscribe to board events
    pub fn subscribe(&self) -> broadcast::Receiver<BoardEvent> {
        self.shared.events.subscribe()
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// All four columns under a category filter, each sorted for display
    pub fn columns(&self, filter: Option<CategoryId>) -> [ColumnView; 4] {
        let model = lock(&self.shared.model);
        Status::ALL.map(|status| ColumnView {
            status,
            tasks: project(&model, status, filter),
        })
    }

    /// The current record for a task
    pub fn task(&self, id: TaskId) -> Option<Task> {
        lock(&self.shared.model).get(id).cloned()
    }

    /// Whether a task has a move waiting on the store
    pub fn is_move_pending(&self, id: TaskId) -> bool {
        lock(&self.shared.in_flight).contains(&id)
    }

    /// Whether a drag is armed or in progress
    pub fn is_drag_active(&self) -> bool {
        lock(&self.session).is_active()
    }

    /// The active drag's current drop candidate
    pub fn drag_candidate(&self) -> Option<DropTarget> {
        lock(&self.session).candidate()
    }

    // =========================================================================
    // Configuration
    // =========================================================================

    /// Install measured board geometry for pointer hit testing
    pub fn set_layout(&self, layout: BoardLayout) {
        *lock(&self.layout) = Some(layout);
    }

    /// Set the category filter drags are interpreted under.
    ///
    /// A drag captures this value when it arms and counts drop slots against
    /// the cards it leaves visible, so keep it in step with the filter the
    /// columns are rendered with.
    pub fn set_category_filter(&self, filter: Option<CategoryId>) {
        *lock(&self.filter) = filter;
    }

    /// The category filter drags are interpreted under
    pub fn category_filter(&self) -> Option<CategoryId> {
        *lock(&self.filter)
    }

    // =========================================================================
    // Pointer input
    // =========================================================================

    /// Record a pointer press on a task.
    ///
    /// Nothing arms until the pointer travels the activation distance, so a
    /// plain click never starts a drag.
    pub fn pointer_down(&self, id: TaskId, x: f64, y: f64) {
        lock(&self.session).track(id, x, y);
    }

    /// Feed a pointer position to the active gesture.
    ///
    /// Arms the session once the press travels far enough, then keeps the
    /// drop candidate in step with the installed layout. Arming fails when
    /// the task is gone or its previous move is still in flight.
    pub fn pointer_move(&self, x: f64, y: f64) -> Result<()> {
        let activated = {
            let session = lock(&self.session);
            session.activation(x, y, self.shared.config.activation_distance)
        };
        if let Some(id) = activated {
            if let Err(err) = self.arm(id) {
                lock(&self.session).cancel();
                return Err(err);
            }
        }

        if !lock(&self.session).is_active() {
            return Ok(());
        }

        if self.cancel_if_vanished() {
            return Ok(());
        }

        let candidate = lock(&self.layout).as_ref().and_then(|l| l.resolve(x, y));
        lock(&self.session).update_target(candidate);
        Ok(())
    }

    /// Release the pointer, dropping onto the current candidate if there is
    /// one. See [`Board::finish_drag`].
    pub fn pointer_up(&self) -> Result<bool> {
        self.finish_drag()
    }

    // =========================================================================
    // Keyboard and programmatic input
    // =========================================================================

    /// Arm a drag on a task directly, as a keyboard grab does.
    ///
    /// Refused while the task's previous move is in flight or another drag
    /// is active.
    pub fn begin_drag(&self, id: TaskId) -> Result<()> {
        self.arm(id)
    }

    /// Step the active drag's candidate one slot or one column.
    ///
    /// The first step starts from the dragged task's own slot. Steps clamp
    /// to the board's edges and each column's visible length. Ignored when
    /// no drag is active.
    pub fn key_move(&self, direction: Direction) {
        let origin = lock(&self.session).step_origin();
        let Some((id, filter, from)) = origin else {
            return;
        };

        if self.cancel_if_vanished() {
            return;
        }

        let lens: [usize; 4] = {
            let model = lock(&self.shared.model);
            Status::ALL.map(|status| {
                project(&model, status, filter)
                    .iter()
                    .filter(|t| t.id != id)
                    .count()
            })
        };

        let next = surface::step(from, direction, |status| lens[status.column_index()]);
        lock(&self.session).update_target(Some(next));
    }

    /// Point the active drag at an explicit target, or at nothing.
    ///
    /// Ignored when no drag is active.
    pub fn update_drag_target(&self, target: Option<DropTarget>) {
        if !lock(&self.session).is_active() {
            return;
        }
        if self.cancel_if_vanished() {
            return;
        }
        lock(&self.session).update_target(target);
    }

    /// Finish the active gesture.
    ///
    /// Returns whether a move was submitted: a drag over a candidate submits
    /// and returns `true`; a click or a drag over nothing returns `false`.
    /// Fails when the dragged task disappeared while the gesture ran.
    pub fn finish_drag(&self) -> Result<bool> {
        let request = lock(&self.session).complete();
        match request {
            Some(request) => {
                self.submit(request)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Abandon the active gesture without moving anything
    pub fn cancel_drag(&self) {
        lock(&self.session).cancel();
    }

    // =========================================================================
    // Moves
    // =========================================================================

    /// Move a task to a slot in a column without a gesture.
    ///
    /// Identical semantics to dropping it there: the slot indexes the
    /// destination's visible cards under the current category filter, and
    /// the move settles in the background like any drop.
    pub fn move_task(&self, id: TaskId, status: Status, index: usize) -> Result<()> {
        let from_status = {
            let model = lock(&self.shared.model);
            model
                .get(id)
                .map(|t| t.status)
                .ok_or(BoardError::TaskNotFound { id })?
        };

        let request = MoveRequest {
            task_id: id,
            from_status,
            to_status: status,
            target_index: index,
            filter: self.category_filter(),
        };
        self.submit(request)
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn arm(&self, id: TaskId) -> Result<()> {
        {
            let in_flight = lock(&self.shared.in_flight);
            if in_flight.contains(&id) {
                return Err(BoardError::MoveInFlight { id });
            }
        }

        let filter = self.category_filter();
        let ctx = {
            let model = lock(&self.shared.model);
            let task = model
                .get(id)
                .cloned()
                .ok_or(BoardError::TaskNotFound { id })?;

            // The task's own slot in dragged-task-excluded numbering: the
            // count of visible cards ranked above it
            let home_index = project(&model, task.status, filter)
                .iter()
                .filter(|t| t.rank() < task.rank())
                .count();

            SessionCtx {
                task_id: id,
                from_status: task.status,
                from_order: task.order,
                filter,
                home: DropTarget::new(task.status, home_index),
            }
        };

        lock(&self.session).arm(ctx)?;
        debug!(task = %id, "drag armed");
        Ok(())
    }

    /// Cancel the gesture if its task left the model; true when cancelled
    fn cancel_if_vanished(&self) -> bool {
        let active_id = lock(&self.session).task_id();
        if let Some(id) = active_id {
            if !lock(&self.shared.model).contains(id) {
                debug!(task = %id, "dragged task vanished - cancelling gesture");
                lock(&self.session).cancel();
                return true;
            }
        }
        false
    }

    fn submit(&self, request: MoveRequest) -> Result<()> {
        let pending = reconcile::stage(&self.shared, &request)?;
        self.shared.emit(BoardEvent::TasksChanged);
        tokio::spawn(reconcile::settle(
            Arc::clone(&self.shared),
            Arc::clone(&self.store),
            pending,
        ));
        Ok(())
    }
}
