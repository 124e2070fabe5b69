//! Fractional ordering engine for drag-and-drop reordering.
//!
//! Positions within a status group are real-valued sort keys. Inserting a
//! task between two neighbors takes the midpoint of their keys, so sibling
//! records never need rewriting on a move. Repeated insertion at the same
//! spot halves the gap each time; [`needs_normalization`] detects when gaps
//! approach the precision floor and [`normalize_group`] compacts the group
//! back to integer keys.

use crate::domain::task::{Status, Task, TaskId};
use std::cmp::Ordering;

/// Smallest gap between adjacent order keys before a group should be
/// renumbered.
pub const MIN_GAP: f64 = 1e-9;

/// Effective sort key for drag arithmetic; a task without a key counts as 0.
pub fn effective_order(task: &Task) -> f64 {
    task.order.unwrap_or(0.0)
}

/// Display comparator for tasks in the same status group: ascending order
/// key, keyless tasks last, priority rank as the keyless tiebreak.
pub fn compare_in_group(a: &Task, b: &Task) -> Ordering {
    match (a.order, b.order) {
        (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.priority.rank().cmp(&b.priority.rank()),
    }
}

/// Computes the order key for inserting at `index` into a group whose
/// existing keys are `orders`, sorted ascending.
///
/// Midpoint insertion: an empty group gets 0; the front gets one below the
/// current minimum; the back gets one above the current maximum; anywhere
/// else gets the mean of the two neighbors. The index is clamped to
/// `[0, orders.len()]`. The result is strictly ordered relative to its
/// neighbors as long as the gap has not collapsed below f64 precision.
pub fn compute_order(orders: &[f64], index: usize) -> f64 {
    if orders.is_empty() {
        return 0.0;
    }
    let index = index.min(orders.len());
    if index == 0 {
        orders[0] - 1.0
    } else if index == orders.len() {
        orders[orders.len() - 1] + 1.0
    } else {
        (orders[index - 1] + orders[index]) / 2.0
    }
}

/// Order key for appending a newly created task to a group: one past the
/// group's maximum key, or 0 for an empty group.
pub fn append_order(orders: &[f64]) -> f64 {
    orders
        .iter()
        .fold(None::<f64>, |max, &o| Some(max.map_or(o, |m| m.max(o))))
        .map_or(0.0, |m| m + 1.0)
}

/// Applies a move intent to a task, returning the updated record.
///
/// The destination group is taken from `all_tasks` (the moved task itself is
/// excluded), sorted ascending by effective key, and the new key is computed
/// against it. Status and the completed flag follow the destination group.
/// Nothing in `all_tasks` is mutated; persisting and reconciling the result
/// is the caller's job.
pub fn apply_move(task: &Task, dest_status: Status, dest_index: usize, all_tasks: &[Task]) -> Task {
    let mut group: Vec<&Task> = all_tasks
        .iter()
        .filter(|t| t.status == dest_status && t.id != task.id)
        .collect();
    group.sort_by(|a, b| {
        effective_order(a)
            .partial_cmp(&effective_order(b))
            .unwrap_or(Ordering::Equal)
    });
    let orders: Vec<f64> = group.iter().map(|t| effective_order(t)).collect();

    let mut moved = task.clone();
    moved.set_status(dest_status);
    moved.set_order(Some(compute_order(&orders, dest_index)));
    moved
}

/// Compacts a group's order keys to consecutive integers 0, 1, 2, …
/// preserving the current visible sequence.
///
/// Returns the `(id, order)` assignments; the caller applies them to the
/// store and persists. Not invoked automatically by the engine.
pub fn normalize_group(tasks: &[&Task]) -> Vec<(TaskId, f64)> {
    let mut sequence: Vec<&Task> = tasks.to_vec();
    sequence.sort_by(|a, b| compare_in_group(a, b));
    sequence
        .iter()
        .enumerate()
        .map(|(i, t)| (t.id, i as f64))
        .collect()
}

/// Reports whether any adjacent gap in an ascending key sequence has shrunk
/// below [`MIN_GAP`], meaning the group should be renumbered before further
/// midpoint insertions.
pub fn needs_normalization(orders: &[f64]) -> bool {
    orders.windows(2).any(|pair| pair[1] - pair[0] < MIN_GAP)
}
