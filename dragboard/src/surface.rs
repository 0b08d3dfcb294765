//! Board geometry: hit testing pointer positions into drop targets.
//!
//! The consumer measures its rendered columns and cards and hands the frames
//! over as a [`BoardLayout`]. The engine never owns a coordinate system; it
//! only needs the frames to agree with whatever space the pointer events use.

use crate::drag::DropTarget;
use crate::types::Status;

/// Axis-aligned rectangle in the consumer's coordinate space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Point containment, half-open on the far edges so adjacent frames
    /// never both claim a point
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.x && x < self.x + self.width && y >= self.y && y < self.y + self.height
    }

    /// Vertical midline of the rectangle
    pub fn mid_y(&self) -> f64 {
        self.y + self.height / 2.0
    }
}

/// Measured frames for one column and the cards visible in it.
///
/// Card frames are listed top to bottom and must exclude the dragged card,
/// matching the slot numbering drops use.
#[derive(Debug, Clone)]
pub struct ColumnSurface {
    pub status: Status,
    pub frame: Rect,
    pub cards: Vec<Rect>,
}

/// Measured geometry for the whole board
#[derive(Debug, Clone, Default)]
pub struct BoardLayout {
    columns: Vec<ColumnSurface>,
}

impl BoardLayout {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a column's frames
    pub fn column(mut self, status: Status, frame: Rect, cards: Vec<Rect>) -> Self {
        self.columns.push(ColumnSurface {
            status,
            frame,
            cards,
        });
        self
    }

    /// Resolve a pointer position to a drop target.
    ///
    /// The first column whose frame contains the point wins; within it, the
    /// slot is the number of cards whose midline sits at or above the
    /// pointer. Below every midline appends. Outside all columns there is no
    /// target.
    pub fn resolve(&self, x: f64, y: f64) -> Option<DropTarget> {
        let column = self.columns.iter().find(|c| c.frame.contains(x, y))?;
        let index = column.cards.iter().filter(|c| c.mid_y() <= y).count();
        Some(DropTarget::new(column.status, index))
    }
}

/// A keyboard traversal step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

/// Step a drop target one slot or one column in `direction`.
///
/// `column_len` reports the visible card count of a column, dragged card
/// excluded. Vertical steps clamp to the column's slots (the slot one past
/// the last card appends); horizontal steps keep the slot where the new
/// column allows it and otherwise clamp to its end. Stepping off the board's
/// edge leaves the target unchanged.
pub fn step(
    from: DropTarget,
    direction: Direction,
    column_len: impl Fn(Status) -> usize,
) -> DropTarget {
    match direction {
        Direction::Up => DropTarget::new(from.status, from.index.saturating_sub(1)),
        Direction::Down => {
            let limit = column_len(from.status);
            DropTarget::new(from.status, (from.index + 1).min(limit))
        }
        Direction::Left | Direction::Right => {
            let next = if direction == Direction::Left {
                from.status.left()
            } else {
                from.status.right()
            };
            match next {
                Some(status) => DropTarget::new(status, from.index.min(column_len(status))),
                None => from,
            }
        }
    }
}
