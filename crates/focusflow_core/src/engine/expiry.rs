//! Age-based expiry sweep.
//!
//! Removes every task created more than the horizon ago, regardless of
//! status, order or executor flag. Categories that lost tasks are reflowed
//! so their remaining active tasks stay dense.

use crate::engine::ordering;
use crate::model::task::{Category, Task, TaskId};
use crate::repo::task_repo::TaskRepository;
use std::collections::BTreeSet;

/// Default retention horizon.
pub const DEFAULT_EXPIRY_HORIZON_MS: i64 = 24 * 60 * 60 * 1000;

/// Returns whether a task has outlived the horizon at `now_ms`.
pub fn is_expired(task: &Task, now_ms: i64, horizon_ms: i64) -> bool {
    now_ms.saturating_sub(task.created_at) > horizon_ms
}

/// Removes expired tasks and returns them.
pub fn cleanup_expired<R: TaskRepository + ?Sized>(
    repo: &mut R,
    now_ms: i64,
    horizon_ms: i64,
) -> Vec<Task> {
    let expired: Vec<TaskId> = repo
        .all()
        .into_iter()
        .filter(|task| is_expired(task, now_ms, horizon_ms))
        .map(|task| task.id)
        .collect();

    let mut removed = Vec::with_capacity(expired.len());
    let mut touched = BTreeSet::<Category>::new();
    for id in expired {
        if let Some(task) = repo.delete(id) {
            if task.is_active() {
                touched.insert(task.category);
            }
            removed.push(task);
        }
    }
    for category in touched {
        ordering::reflow(repo, category, now_ms);
    }
    removed
}
