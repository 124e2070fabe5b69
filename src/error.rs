use thiserror::Error;

pub type Result<T> = std::result::Result<T, KanvasError>;

#[derive(Debug, Error)]
pub enum KanvasError {
    #[error("Task not found: {0}")]
    TaskNotFound(String),

    #[error("Board not initialized")]
    BoardNotInitialized,

    #[error("Invalid title: {0}")]
    InvalidTitle(String),

    #[error("Invalid task ID format: {0}")]
    InvalidTaskId(String),

    #[error("Unknown status: {0}")]
    UnknownStatus(String),

    #[error("Unknown priority: {0}")]
    UnknownPriority(String),

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[cfg(feature = "sqlite-storage")]
    #[error("Database error: {0}")]
    DatabaseError(#[from] rusqlite::Error),
}
