//! Task repository contract and in-memory implementation.
//!
//! # Responsibility
//! - Hold the flat task collection owned by the engine.
//! - Provide create/read/update/delete primitives without ordering policy.
//!
//! # Invariants
//! - Missing ids are never an error: `delete` and `patch` are no-ops.
//! - `patch` always refreshes `updated_at` and never touches `id`/`created_at`.
//! - Iteration order is insertion order, so results are deterministic.

use crate::model::task::{Category, Task, TaskId, TaskPatch};

/// Repository interface for the task collection.
pub trait TaskRepository {
    /// Creates one inbox task at the inbox tail.
    fn create(&mut self, title: &str, now_ms: i64) -> Task;
    /// Inserts an already-built task, replacing any task with the same id.
    fn insert(&mut self, task: Task);
    fn get(&self, id: TaskId) -> Option<&Task>;
    /// Removes one task, returning it when it existed.
    fn delete(&mut self, id: TaskId) -> Option<Task>;
    /// Applies one change. Returns `false` when the id is absent.
    fn patch(&mut self, id: TaskId, patch: TaskPatch, now_ms: i64) -> bool;
    fn all(&self) -> Vec<&Task>;

    fn len(&self) -> usize {
        self.all().len()
    }

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Active tasks of one category sorted by `order`, ties by creation.
    fn active_in(&self, category: Category) -> Vec<&Task> {
        let mut tasks: Vec<&Task> = self
            .all()
            .into_iter()
            .filter(|task| task.category == category && task.is_active())
            .collect();
        tasks.sort_by_key(|task| (task.order, task.created_at));
        tasks
    }

    /// Next tail slot for one category (`max(order) + 1`, or 1 when empty).
    fn next_order(&self, category: Category) -> u32 {
        self.active_in(category)
            .iter()
            .map(|task| task.order)
            .max()
            .map_or(1, |max| max + 1)
    }

    /// The task currently holding the executor flag, if any.
    fn executing(&self) -> Option<&Task> {
        self.all().into_iter().find(|task| task.is_executing)
    }
}

/// Vec-backed repository owned by the task service.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTaskRepository {
    tasks: Vec<Task>,
}

impl InMemoryTaskRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a repository from a persisted collection as-is.
    pub fn from_tasks(tasks: Vec<Task>) -> Self {
        let mut repo = Self::new();
        for task in tasks {
            repo.insert(task);
        }
        repo
    }

    /// Owned copy of the collection, in insertion order.
    pub fn snapshot(&self) -> Vec<Task> {
        self.tasks.clone()
    }

    fn position(&self, id: TaskId) -> Option<usize> {
        self.tasks.iter().position(|task| task.id == id)
    }
}

impl TaskRepository for InMemoryTaskRepository {
    fn create(&mut self, title: &str, now_ms: i64) -> Task {
        let order = self.next_order(Category::Inbox);
        let task = Task::new(title, order, now_ms);
        self.tasks.push(task.clone());
        task
    }

    fn insert(&mut self, task: Task) {
        match self.position(task.id) {
            Some(index) => self.tasks[index] = task,
            None => self.tasks.push(task),
        }
    }

    fn get(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    fn delete(&mut self, id: TaskId) -> Option<Task> {
        self.position(id).map(|index| self.tasks.remove(index))
    }

    fn patch(&mut self, id: TaskId, patch: TaskPatch, now_ms: i64) -> bool {
        match self.tasks.iter_mut().find(|task| task.id == id) {
            Some(task) => {
                task.apply_patch(patch, now_ms);
                true
            }
            None => false,
        }
    }

    fn all(&self) -> Vec<&Task> {
        self.tasks.iter().collect()
    }

    fn len(&self) -> usize {
        self.tasks.len()
    }
}
