//! Store-wide executor slot.
//!
//! # Responsibility
//! - Start/pause the single executing task.
//! - Complete tasks and run the promotion cascade.
//!
//! # Invariants
//! - At most one task in the repository has `is_executing == true`.
//! - Only an active task at `order == 1` of a classified category can start.

use crate::engine::ordering;
use crate::model::task::{Category, TaskId, TaskPatch, TaskStatus};
use crate::repo::task_repo::TaskRepository;

/// Result of a successful toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    /// Target started; `paused` is the task that gave up the slot.
    Started { paused: Option<TaskId> },
    /// Target was executing and is now paused.
    Paused,
}

/// Result of completing one task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Completion {
    pub task_id: TaskId,
    pub category: Category,
    /// Task that inherited the executor slot through the cascade.
    pub promoted: Option<TaskId>,
}

/// Starts or pauses a task sitting in a priority slot.
pub fn toggle_executing<R: TaskRepository + ?Sized>(
    repo: &mut R,
    task_id: TaskId,
    now_ms: i64,
) -> Option<Toggle> {
    let task = repo.get(task_id)?;
    if !task.holds_priority_slot() {
        return None;
    }

    if task.is_executing {
        repo.patch(task_id, TaskPatch::Executing(false), now_ms);
        return Some(Toggle::Paused);
    }

    let paused = repo.executing().map(|current| current.id);
    if let Some(paused_id) = paused {
        repo.patch(paused_id, TaskPatch::Executing(false), now_ms);
    }
    repo.patch(task_id, TaskPatch::Executing(true), now_ms);
    Some(Toggle::Started { paused })
}

/// Marks a task done and closes its category gap.
///
/// When the completed task was the executor, whichever task lands at
/// `order == 1` inherits the executor slot. An emptied category leaves
/// the slot vacant.
pub fn complete_task<R: TaskRepository + ?Sized>(
    repo: &mut R,
    task_id: TaskId,
    now_ms: i64,
) -> Option<Completion> {
    let task = repo.get(task_id).filter(|task| task.is_active())?;
    let category = task.category;
    let was_executing = task.is_executing;

    repo.patch(task_id, TaskPatch::Status(TaskStatus::Done), now_ms);
    if was_executing {
        repo.patch(task_id, TaskPatch::Executing(false), now_ms);
    }
    ordering::reflow(repo, category, now_ms);

    let promoted = if was_executing {
        let next = repo.active_in(category).first().map(|next| next.id);
        if let Some(next_id) = next {
            repo.patch(next_id, TaskPatch::Executing(true), now_ms);
        }
        next
    } else {
        None
    };

    Some(Completion {
        task_id,
        category,
        promoted,
    })
}

#[cfg(test)]
mod tests {
    use super::{complete_task, toggle_executing, Toggle};
    use crate::engine::ordering::classify;
    use crate::model::task::{Category, TaskStatus};
    use crate::repo::task_repo::{InMemoryTaskRepository, TaskRepository};

    #[test]
    fn toggle_moves_executor_between_categories() {
        let mut repo = InMemoryTaskRepository::new();
        let work = repo.create("work", 1);
        let life = repo.create("life", 2);
        classify(&mut repo, work.id, Category::Work, 10).unwrap();
        classify(&mut repo, life.id, Category::Life, 10).unwrap();
        assert!(repo.get(work.id).unwrap().is_executing);
        assert!(!repo.get(life.id).unwrap().is_executing);

        let outcome = toggle_executing(&mut repo, life.id, 20).unwrap();
        assert_eq!(outcome, Toggle::Started { paused: Some(work.id) });
        assert_eq!(repo.executing().unwrap().id, life.id);

        assert_eq!(toggle_executing(&mut repo, life.id, 30), Some(Toggle::Paused));
        assert!(repo.executing().is_none());
    }

    #[test]
    fn toggle_ignores_inbox_tasks() {
        let mut repo = InMemoryTaskRepository::new();
        let task = repo.create("capture", 1);
        assert_eq!(toggle_executing(&mut repo, task.id, 2), None);
    }

    #[test]
    fn completing_non_executor_reflows_without_promotion() {
        let mut repo = InMemoryTaskRepository::new();
        let a = repo.create("a", 1);
        let b = repo.create("b", 2);
        classify(&mut repo, a.id, Category::Work, 10).unwrap();
        classify(&mut repo, b.id, Category::Work, 10).unwrap();
        toggle_executing(&mut repo, a.id, 15).unwrap();

        let completion = complete_task(&mut repo, a.id, 20).unwrap();
        assert_eq!(completion.promoted, None);
        let b = repo.get(b.id).unwrap();
        assert_eq!(b.order, 1);
        assert!(!b.is_executing);
        assert_eq!(repo.get(a.id).unwrap().status, TaskStatus::Done);
    }
}
