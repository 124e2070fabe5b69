pub mod board;
pub mod ordering;
pub mod sorting;
pub mod task;

pub use board::{Board, BoardConfig, Column};
pub use ordering::{apply_move, compute_order, needs_normalization, normalize_group};
pub use sorting::{sort_tasks, SortField, SortOrder};
pub use task::{Priority, Status, Task, TaskId};
