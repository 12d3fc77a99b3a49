//! Per-category dense ordering.
//!
//! # Responsibility
//! - Keep active tasks of every category ranked `1..=n` with no gaps.
//! - Implement classify, category change, positional reorder and move-to-top.
//!
//! # Invariants
//! - Only the task at `order == 1` of a classified category may execute.
//! - Any task whose priority slot is disturbed by these operations loses
//!   its executor flag; they never start execution implicitly, except
//!   classify into an empty category while no executor exists.
//! - Every function is a no-op for missing, completed or mismatched tasks.

use crate::model::task::{Category, Task, TaskId, TaskPatch};
use crate::repo::task_repo::TaskRepository;

/// Where a task landed after a category move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub task_id: TaskId,
    pub from: Category,
    pub to: Category,
    pub order: u32,
    pub is_executing: bool,
}

/// Positions before and after a reorder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reorder {
    pub task_id: TaskId,
    pub category: Category,
    pub from: u32,
    pub to: u32,
}

/// Moves a task into `target`, appending it at the tail.
///
/// A task arriving in an empty classified category takes the executor slot
/// when nobody holds it. Tasks that already sit in a classified category
/// are routed through [`change_category`].
pub fn classify<R: TaskRepository + ?Sized>(
    repo: &mut R,
    task_id: TaskId,
    target: Category,
    now_ms: i64,
) -> Option<Placement> {
    let task = active_task(repo, task_id)?;
    if task.category == target {
        return None;
    }
    if task.category.is_classified() {
        return change_category(repo, task_id, target, now_ms);
    }

    let from = task.category;
    let order = repo.next_order(target);
    let is_executing = order == 1 && target.is_classified() && repo.executing().is_none();
    repo.patch(
        task_id,
        TaskPatch::Placement {
            category: target,
            order,
            is_executing,
        },
        now_ms,
    );
    reflow(repo, from, now_ms);

    Some(Placement {
        task_id,
        from,
        to: target,
        order,
        is_executing,
    })
}

/// Moves a task between categories, closing the gap it leaves behind.
///
/// A task that held a classified priority slot (or the executor flag)
/// arrives without the executor flag. Inbox order carries no priority.
pub fn change_category<R: TaskRepository + ?Sized>(
    repo: &mut R,
    task_id: TaskId,
    target: Category,
    now_ms: i64,
) -> Option<Placement> {
    let task = active_task(repo, task_id)?;
    if task.category == target {
        return None;
    }

    let from = task.category;
    let disturbed_top =
        task.is_executing || (task.category.is_classified() && task.order == 1);
    let order = repo.next_order(target);
    let is_executing = !disturbed_top
        && order == 1
        && target.is_classified()
        && repo.executing().is_none();
    repo.patch(
        task_id,
        TaskPatch::Placement {
            category: target,
            order,
            is_executing,
        },
        now_ms,
    );
    reflow(repo, from, now_ms);

    Some(Placement {
        task_id,
        from,
        to: target,
        order,
        is_executing,
    })
}

/// Moves a task to a 1-based position inside its category.
///
/// Tasks between the old and new slot shift by one toward the vacated slot.
/// Positions outside `1..=n` are clamped. Equal positions are a no-op.
pub fn reorder_in_category<R: TaskRepository + ?Sized>(
    repo: &mut R,
    task_id: TaskId,
    new_position: u32,
    category: Category,
    now_ms: i64,
) -> Option<Reorder> {
    let task = active_task(repo, task_id)?;
    if task.category != category {
        return None;
    }

    let mut ids = active_ids(repo, category);
    let current_index = ids.iter().position(|id| *id == task_id)?;
    let target_index = (new_position.max(1) as usize - 1).min(ids.len() - 1);
    if current_index == target_index {
        return None;
    }

    ids.remove(current_index);
    ids.insert(target_index, task_id);
    assign_orders(repo, &ids, now_ms);

    let from = current_index as u32 + 1;
    let to = target_index as u32 + 1;
    if from == 1 || to == 1 {
        clear_executing(repo, task_id, now_ms);
    }

    Some(Reorder {
        task_id,
        category,
        from,
        to,
    })
}

/// Swaps a task with the current holder of `order == 1`.
///
/// Only the two tasks trade order values; both leave without the executor
/// flag. Returns the id of the displaced top task.
pub fn move_to_top<R: TaskRepository + ?Sized>(
    repo: &mut R,
    task_id: TaskId,
    now_ms: i64,
) -> Option<TaskId> {
    let task = active_task(repo, task_id)?;
    if task.order == 1 {
        return None;
    }
    let category = task.category;
    let current = task.order;
    let top_id = repo
        .active_in(category)
        .into_iter()
        .find(|candidate| candidate.order == 1)
        .map(|top| top.id)?;

    repo.patch(
        task_id,
        TaskPatch::Placement {
            category,
            order: 1,
            is_executing: false,
        },
        now_ms,
    );
    repo.patch(
        top_id,
        TaskPatch::Placement {
            category,
            order: current,
            is_executing: false,
        },
        now_ms,
    );
    Some(top_id)
}

/// Removes a task and closes the gap in its category.
///
/// Removing the executor does not promote anyone.
pub fn remove<R: TaskRepository + ?Sized>(
    repo: &mut R,
    task_id: TaskId,
    now_ms: i64,
) -> Option<Task> {
    let removed = repo.delete(task_id)?;
    if removed.is_active() {
        reflow(repo, removed.category, now_ms);
    }
    Some(removed)
}

/// Renumbers active tasks of one category to `1..=n`, stable by previous
/// order. Tasks pushed out of the priority slot lose the executor flag.
pub fn reflow<R: TaskRepository + ?Sized>(repo: &mut R, category: Category, now_ms: i64) {
    let ids = active_ids(repo, category);
    assign_orders(repo, &ids, now_ms);
}

/// Restores every ordering/executor invariant on an arbitrary collection.
///
/// Used after rehydration. Returns the number of tasks that were touched.
pub fn normalize<R: TaskRepository + ?Sized>(repo: &mut R, now_ms: i64) -> usize {
    let before: Vec<(TaskId, u32, bool)> = repo
        .all()
        .into_iter()
        .map(|task| (task.id, task.order, task.is_executing))
        .collect();

    let invalid: Vec<TaskId> = repo
        .all()
        .into_iter()
        .filter(|task| task.is_executing && !(task.is_active() && task.category.is_classified()))
        .map(|task| task.id)
        .collect();
    for id in invalid {
        clear_executing(repo, id, now_ms);
    }

    for category in Category::ALL {
        reflow(repo, category, now_ms);
    }

    let extra: Vec<TaskId> = repo
        .all()
        .into_iter()
        .filter(|task| task.is_executing)
        .skip(1)
        .map(|task| task.id)
        .collect();
    for id in extra {
        clear_executing(repo, id, now_ms);
    }

    before
        .into_iter()
        .filter(|(id, order, executing)| {
            repo.get(*id)
                .is_some_and(|task| task.order != *order || task.is_executing != *executing)
        })
        .count()
}

fn active_task<R: TaskRepository + ?Sized>(repo: &R, task_id: TaskId) -> Option<Task> {
    repo.get(task_id).filter(|task| task.is_active()).cloned()
}

fn active_ids<R: TaskRepository + ?Sized>(repo: &R, category: Category) -> Vec<TaskId> {
    repo.active_in(category)
        .into_iter()
        .map(|task| task.id)
        .collect()
}

fn assign_orders<R: TaskRepository + ?Sized>(repo: &mut R, ids: &[TaskId], now_ms: i64) {
    for (index, id) in ids.iter().enumerate() {
        let order = index as u32 + 1;
        let Some(task) = repo.get(*id) else {
            continue;
        };
        let keep_executing = task.is_executing && order == 1;
        if task.order == order && task.is_executing == keep_executing {
            continue;
        }
        let category = task.category;
        repo.patch(
            *id,
            TaskPatch::Placement {
                category,
                order,
                is_executing: keep_executing,
            },
            now_ms,
        );
    }
}

fn clear_executing<R: TaskRepository + ?Sized>(repo: &mut R, task_id: TaskId, now_ms: i64) {
    if repo.get(task_id).is_some_and(|task| task.is_executing) {
        repo.patch(task_id, TaskPatch::Executing(false), now_ms);
    }
}
