use crate::{
    domain::{board::Board, task::{Task, TaskId}},
    error::Result,
    store::TaskUpdate,
};
use async_trait::async_trait;

#[cfg(feature = "file-storage")]
pub mod file_storage;

#[cfg(feature = "sqlite-storage")]
pub mod sqlite_storage;

/// Storage trait for persisting tasks and board state
#[async_trait]
pub trait Storage: Send + Sync {
    /// Initializes the storage backend
    async fn initialize(&self) -> Result<()>;

    /// Saves a task
    async fn save_task(&self, task: &Task) -> Result<()>;

    /// Loads a task by ID
    async fn load_task(&self, id: &TaskId) -> Result<Task>;

    /// Lists all tasks, oldest first
    async fn list_tasks(&self) -> Result<Vec<Task>>;

    /// Searches for tasks matching the query in title or description
    /// (case-insensitive)
    async fn search_tasks(&self, query: &str) -> Result<Vec<Task>>;

    /// Deletes a task
    async fn delete_task(&self, id: &TaskId) -> Result<()>;

    /// Applies a batch of `{id, status, order}` updates all-or-nothing and
    /// returns the updated records
    ///
    /// This is the persistence endpoint for drag-and-drop moves: the whole
    /// batch fails if any referenced task is missing.
    async fn apply_updates(&self, updates: &[TaskUpdate]) -> Result<Vec<Task>>;

    /// Saves the board state
    async fn save_board(&self, board: &Board) -> Result<()>;

    /// Loads the board state
    async fn load_board(&self) -> Result<Board>;

    /// Checks if the project is initialized
    async fn is_initialized(&self) -> bool;
}
