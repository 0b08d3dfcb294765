//! Core types for the board engine

mod ids;
mod order;
mod status;
mod task;

// Re-export all types
pub use ids::{CategoryId, TaskId};
pub use order::{OrderKey, ReorderEntry};
pub use status::Status;
pub use task::Task;
