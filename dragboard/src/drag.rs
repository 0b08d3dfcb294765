//! Drag session state machine.
//!
//! One session covers one gesture: a press is tracked until it either travels
//! past the activation distance and arms, or releases as a plain click. An
//! armed session turns into a drag on its first candidate and finishes as a
//! move request or a cancellation. Pointer and keyboard input normalize to the
//! same vocabulary of transitions, so the machine never cares which device
//! drove it.
//!
//! The session is a passive value: the board facade validates tasks and the
//! in-flight gate, resolves candidates, and drives the transitions below.
//! Inputs that make no sense in the current phase are ignored rather than
//! rejected; a gesture stream is lossy by nature. Errors are reserved for
//! refusals the consumer must surface.

use crate::error::{BoardError, Result};
use crate::types::{CategoryId, OrderKey, Status, TaskId};
use serde::{Deserialize, Serialize};

/// Where a drop would land: a column and a slot in its visible list.
///
/// The index counts visible cards only, with the dragged card excluded;
/// an index equal to the visible count appends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropTarget {
    pub status: Status,
    pub index: usize,
}

impl DropTarget {
    /// Create a drop target
    pub fn new(status: Status, index: usize) -> Self {
        Self { status, index }
    }
}

/// One move emitted by a completed drag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveRequest {
    pub task_id: TaskId,
    pub from_status: Status,
    pub to_status: Status,
    /// Slot in the destination column's visible list
    pub target_index: usize,
    /// Category filter the gesture ran under; `target_index` counts the
    /// cards visible under this filter
    pub filter: Option<CategoryId>,
}

/// Facts captured when a session arms
#[derive(Debug, Clone, PartialEq)]
pub struct SessionCtx {
    pub task_id: TaskId,
    pub from_status: Status,
    pub from_order: OrderKey,
    /// Category filter active at arm time
    pub filter: Option<CategoryId>,
    /// The task's own visible slot at arm time; keyboard traversal starts here
    pub home: DropTarget,
}

#[derive(Debug)]
enum Phase {
    Idle,
    /// Pointer is down on a task but has not crossed the activation distance
    Tracking {
        task_id: TaskId,
        origin_x: f64,
        origin_y: f64,
    },
    Armed {
        ctx: SessionCtx,
    },
    Dragging {
        ctx: SessionCtx,
        /// Current candidate; `None` while the pointer is over no droppable
        /// surface
        candidate: Option<DropTarget>,
    },
}

/// State of the in-progress gesture
#[derive(Debug)]
pub struct DragSession {
    phase: Phase,
}

impl Default for DragSession {
    fn default() -> Self {
        Self::new()
    }
}

impl DragSession {
    /// Create an idle session
    pub fn new() -> Self {
        Self { phase: Phase::Idle }
    }

    /// No gesture armed or dragging (press tracking counts as idle)
    pub fn is_idle(&self) -> bool {
        matches!(self.phase, Phase::Idle | Phase::Tracking { .. })
    }

    /// Session is armed or dragging
    pub fn is_active(&self) -> bool {
        matches!(self.phase, Phase::Armed { .. } | Phase::Dragging { .. })
    }

    /// The task the active session belongs to
    pub fn task_id(&self) -> Option<TaskId> {
        match &self.phase {
            Phase::Idle => None,
            Phase::Tracking { task_id, .. } => Some(*task_id),
            Phase::Armed { ctx } | Phase::Dragging { ctx, .. } => Some(ctx.task_id),
        }
    }

    /// The current drop candidate, when dragging over a surface
    pub fn candidate(&self) -> Option<DropTarget> {
        match &self.phase {
            Phase::Dragging { candidate, .. } => *candidate,
            _ => None,
        }
    }

    /// Begin tracking a pointer press on a task.
    ///
    /// The session stays idle until the pointer travels past the activation
    /// distance. Ignored while a gesture is active.
    pub fn track(&mut self, task_id: TaskId, x: f64, y: f64) {
        if self.is_idle() {
            self.phase = Phase::Tracking {
                task_id,
                origin_x: x,
                origin_y: y,
            };
        }
    }

    /// The tracked task, when the pointer has travelled at least `threshold`
    /// from its press origin
    pub fn activation(&self, x: f64, y: f64, threshold: f64) -> Option<TaskId> {
        match self.phase {
            Phase::Tracking {
                task_id,
                origin_x,
                origin_y,
            } => {
                let (dx, dy) = (x - origin_x, y - origin_y);
                if (dx * dx + dy * dy).sqrt() >= threshold {
                    Some(task_id)
                } else {
                    None
                }
            }
            _ => None,
        }
    }

    /// Arm the session. The caller has already validated the task and the
    /// in-flight gate.
    pub fn arm(&mut self, ctx: SessionCtx) -> Result<()> {
        if let Some(id) = self.task_id() {
            if self.is_active() {
                return Err(BoardError::DragActive { id });
            }
        }
        self.phase = Phase::Armed { ctx };
        Ok(())
    }

    /// Recompute the candidate on a move.
    ///
    /// The first candidate turns an armed session into a drag; afterwards the
    /// candidate follows every move, including back to `None` when the input
    /// leaves all droppable surfaces. Ignored while idle.
    pub fn update_target(&mut self, candidate: Option<DropTarget>) {
        match std::mem::replace(&mut self.phase, Phase::Idle) {
            Phase::Armed { ctx } => {
                self.phase = match candidate {
                    Some(_) => Phase::Dragging { ctx, candidate },
                    None => Phase::Armed { ctx },
                };
            }
            Phase::Dragging { ctx, .. } => {
                self.phase = Phase::Dragging { ctx, candidate };
            }
            other => self.phase = other,
        }
    }

    /// Finish the gesture.
    ///
    /// A drag with a candidate emits its move request; anything else (a plain
    /// click, a drag over no surface) ends quietly. The session is idle
    /// afterwards either way.
    pub fn complete(&mut self) -> Option<MoveRequest> {
        match std::mem::replace(&mut self.phase, Phase::Idle) {
            Phase::Dragging {
                ctx,
                candidate: Some(target),
            } => Some(MoveRequest {
                task_id: ctx.task_id,
                from_status: ctx.from_status,
                to_status: target.status,
                target_index: target.index,
                filter: ctx.filter,
            }),
            _ => None,
        }
    }

    /// Abort the gesture from any phase without emitting anything
    pub fn cancel(&mut self) {
        self.phase = Phase::Idle;
    }

    /// Where a keyboard step starts: the current candidate, or the task's
    /// home slot before any move happened
    pub fn step_origin(&self) -> Option<(TaskId, Option<CategoryId>, DropTarget)> {
        match &self.phase {
            Phase::Armed { ctx } => Some((ctx.task_id, ctx.filter, ctx.home)),
            Phase::Dragging { ctx, candidate } => {
                Some((ctx.task_id, ctx.filter, candidate.unwrap_or(ctx.home)))
            }
            _ => None,
        }
    }
}
