//! # Kanvas Core
//!
//! Core domain logic for Kanvas task boards.
//!
//! This crate provides the fundamental types and operations for a kanban
//! task application: the fractional ordering engine behind drag-and-drop
//! reordering, the status workflow, an in-memory store with optimistic
//! move semantics, and pluggable storage backends, without any dependency
//! on specific UI implementations.

pub mod domain;
pub mod error;
pub mod storage;
pub mod store;

// Re-export commonly used types
pub use domain::{
    board::{Board, BoardConfig, Column},
    ordering::{apply_move, compute_order, needs_normalization, normalize_group, MIN_GAP},
    task::{Priority, Status, Task, TaskId},
};
pub use error::{KanvasError, Result};
pub use storage::Storage;
pub use store::{MoveOutcome, StoreSnapshot, TaskDraft, TaskStore, TaskUpdate};
