//! In-memory task store with optimistic move semantics.
//!
//! The store applies moves locally before the persistence call resolves and
//! hands the caller everything needed to reconcile: the batch of updates for
//! the persistence boundary and a snapshot to revert to if that call fails.

use crate::{
    domain::{
        ordering::{append_order, apply_move, compare_in_group, effective_order,
            needs_normalization, normalize_group},
        task::{Priority, Status, Task, TaskId},
    },
    error::{KanvasError, Result},
};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// One record of the `{id, status, order}` batch sent to the persistence
/// service after a move.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskUpdate {
    pub id: TaskId,
    pub status: Status,
    pub order: Option<f64>,
}

/// Point-in-time copy of the store, used to revert a failed optimistic move
#[derive(Debug, Clone)]
pub struct StoreSnapshot {
    tasks: Vec<Task>,
}

/// Result of an optimistic move
///
/// `updates` is what the persistence service should apply atomically;
/// `snapshot` is the pre-move state to revert to when that call fails.
#[derive(Debug)]
pub struct MoveOutcome {
    pub task: Task,
    pub updates: Vec<TaskUpdate>,
    pub snapshot: StoreSnapshot,
    pub normalized: bool,
}

/// Validated input for creating a task
#[derive(Debug, Clone)]
pub struct TaskDraft {
    pub title: String,
    pub description: Option<String>,
    pub priority: Priority,
    pub status: Status,
}

impl TaskDraft {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            priority: Priority::Medium,
            status: Status::Todo,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_status(mut self, status: Status) -> Self {
        self.status = status;
        self
    }
}

/// In-memory task list backing the board and list views
#[derive(Debug, Default)]
pub struct TaskStore {
    tasks: Vec<Task>,
}

impl TaskStore {
    pub fn new(tasks: Vec<Task>) -> Self {
        Self { tasks }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn task(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Tasks of one status group in display order: ascending order key,
    /// keyless tasks last falling back to priority rank
    pub fn get_group_tasks(&self, status: Status) -> Vec<&Task> {
        let mut group: Vec<&Task> = self.tasks.iter().filter(|t| t.status == status).collect();
        group.sort_by(|a, b| compare_in_group(a, b));
        group
    }

    /// Creates a task from a draft, appending it to its status group
    pub fn add_task(&mut self, draft: TaskDraft) -> Result<Task> {
        let mut task = Task::new(draft.title)?;
        task.set_description(draft.description);
        task.set_priority(draft.priority);
        task.set_status(draft.status);

        let orders: Vec<f64> = self
            .tasks
            .iter()
            .filter(|t| t.status == draft.status)
            .map(effective_order)
            .collect();
        task.set_order(Some(append_order(&orders)));

        tracing::debug!(task = %task.id, status = %task.status, "added task");
        self.tasks.push(task.clone());
        Ok(task)
    }

    /// Replaces a task record wholesale, e.g. after a reconciled remote update
    pub fn replace_task(&mut self, id: TaskId, updated: Task) -> Result<()> {
        let pos = self.position(id)?;
        self.tasks[pos] = updated;
        Ok(())
    }

    /// Removes a task; siblings keep their order keys
    pub fn remove_task(&mut self, id: TaskId) -> Result<Task> {
        let pos = self.position(id)?;
        Ok(self.tasks.remove(pos))
    }

    /// Flips a task's completed flag, driving status in lockstep
    pub fn toggle_completed(&mut self, id: TaskId) -> Result<&Task> {
        let pos = self.position(id)?;
        self.tasks[pos].toggle_completed();
        Ok(&self.tasks[pos])
    }

    /// Optimistically moves a task to `dest_index` within `dest_status`.
    ///
    /// The move is applied to the store immediately. When the destination
    /// group's key gaps have collapsed below the precision floor the whole
    /// group is renumbered and the returned batch covers every member;
    /// otherwise only the moved task is in the batch. The caller persists
    /// the batch and calls [`TaskStore::revert`] with the snapshot if that
    /// fails.
    pub fn move_task(
        &mut self,
        id: TaskId,
        dest_status: Status,
        dest_index: usize,
    ) -> Result<MoveOutcome> {
        let snapshot = self.snapshot();
        let pos = self.position(id)?;

        let moved = apply_move(&self.tasks[pos], dest_status, dest_index, &self.tasks);
        self.tasks[pos] = moved;

        let mut orders: Vec<f64> = self
            .tasks
            .iter()
            .filter(|t| t.status == dest_status)
            .filter_map(|t| t.order)
            .collect();
        orders.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));

        let normalized = needs_normalization(&orders);
        let updates = if normalized {
            let assignments = {
                let group = self.get_group_tasks(dest_status);
                normalize_group(&group)
            };
            for (task_id, key) in &assignments {
                if let Some(task) = self.tasks.iter_mut().find(|t| t.id == *task_id) {
                    task.set_order(Some(*key));
                }
            }
            tracing::debug!(status = %dest_status, "renumbered group after gap collapse");
            assignments
                .into_iter()
                .map(|(task_id, key)| TaskUpdate {
                    id: task_id,
                    status: dest_status,
                    order: Some(key),
                })
                .collect()
        } else {
            vec![TaskUpdate {
                id,
                status: dest_status,
                order: self.tasks[pos].order,
            }]
        };

        tracing::debug!(
            task = %id,
            status = %dest_status,
            index = dest_index,
            normalized,
            "moved task"
        );

        Ok(MoveOutcome {
            task: self.tasks[pos].clone(),
            updates,
            snapshot,
            normalized,
        })
    }

    /// Copies the current state for a later [`TaskStore::revert`]
    pub fn snapshot(&self) -> StoreSnapshot {
        StoreSnapshot {
            tasks: self.tasks.clone(),
        }
    }

    /// Restores a snapshot, the compensating action for a failed persistence
    /// call
    pub fn revert(&mut self, snapshot: StoreSnapshot) {
        self.tasks = snapshot.tasks;
    }

    /// Number of tasks per status, in workflow order
    pub fn status_counts(&self) -> Vec<(Status, usize)> {
        Status::ALL
            .iter()
            .map(|&status| {
                let count = self.tasks.iter().filter(|t| t.status == status).count();
                (status, count)
            })
            .collect()
    }

    pub fn tasks_by_priority(&self, priority: Priority) -> Vec<&Task> {
        self.tasks.iter().filter(|t| t.priority == priority).collect()
    }

    pub fn tasks_by_completion(&self, completed: bool) -> Vec<&Task> {
        self.tasks.iter().filter(|t| t.completed == completed).collect()
    }

    fn position(&self, id: TaskId) -> Result<usize> {
        self.tasks
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| KanvasError::TaskNotFound(id.to_string()))
    }
}
