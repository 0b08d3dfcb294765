//! Task board ordering and drag-reconciliation engine
//!
//! This crate keeps a four-column task board ordered and consistent while
//! tasks get dragged around. Positions are fractional order keys, so a move
//! rewrites one record; moves apply to the local model immediately and settle
//! against a pluggable store in the background, rolling back on failure.
//!
//! ## Overview
//!
//! - **Fractional ordering** - A card's position is a single key; dropping
//!   between neighbors takes their midpoint, and a column renumbers itself
//!   when its keys run out of room
//! - **Optimistic moves** - The model updates before the store answers;
//!   a rejected persist restores exactly the records it touched
//! - **Gesture engine** - Pointer and keyboard input drive one drag state
//!   machine with an activation threshold, so clicks stay clicks
//! - **Pluggable stores** - File-per-task JSON storage with locking, or an
//!   in-memory store for tests
//!
//! ## Basic Usage
//!
//! ```rust,no_run
//! use dragboard::{Board, JsonStore, Status, TaskId};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let board = Board::new(Arc::new(JsonStore::new("/path/to/board")));
//! let mut events = board.subscribe();
//! board.load().await?;
//!
//! // A drop and a programmatic move do the same thing
//! board.move_task(TaskId::new(42), Status::InProgress, 0)?;
//!
//! println!("{:?}", events.recv().await?);
//! # Ok(())
//! # }
//! ```
//!
//! ## Storage Structure
//!
//! ```text
//! board/
//! ├── .lock               # Exclusive writer lock
//! └── tasks/
//!     └── {id}.json       # One task per file, written atomically
//! ```

pub mod board;
pub mod defaults;
pub mod drag;
mod error;
pub mod events;
pub mod model;
pub mod ordering;
pub mod projection;
mod reconcile;
pub mod store;
pub mod surface;
pub mod types;

pub use board::{Board, ColumnView};
pub use defaults::BoardConfig;
pub use drag::{DragSession, DropTarget, MoveRequest, SessionCtx};
pub use error::{BoardError, Result};
pub use events::BoardEvent;
pub use store::{JsonStore, MemoryStore, StoreError, StoreResult, TaskStore};
pub use surface::{BoardLayout, Direction, Rect};

// Re-export commonly used types
pub use types::{CategoryId, OrderKey, ReorderEntry, Status, Task, TaskId};
