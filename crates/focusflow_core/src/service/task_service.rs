//! Task operation facade.
//!
//! # Responsibility
//! - Be the only write path into the task collection.
//! - Route operations to the ordering/execution/expiry engine and publish
//!   one `TaskEvent` per settled change.
//! - Cache the latest stats snapshot.
//!
//! # Invariants
//! - Operations are total: unknown ids and redundant moves are no-ops.
//! - Every public call leaves the collection fully settled; callers never
//!   observe a half-reflowed category.

use crate::clock::Clock;
use crate::config::CoreConfig;
use crate::engine::execution::{self, Toggle};
use crate::engine::expiry::{self, DEFAULT_EXPIRY_HORIZON_MS};
use crate::engine::ordering;
use crate::engine::stats::{self, TaskStats};
use crate::model::task::{Category, Task, TaskId, TaskStatus};
use crate::repo::snapshot_store::{SnapshotStore, StoreResult};
use crate::repo::task_repo::{InMemoryTaskRepository, TaskRepository};
use crate::service::events::{EventBus, TaskEvent};
use log::{debug, info, warn};
use std::sync::mpsc::Receiver;

/// One facade call expressed as data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    AddTask { title: String },
    DeleteTask { id: TaskId },
    ClassifyTask { id: TaskId, category: Category },
    ChangeCategory { id: TaskId, category: Category },
    ReorderTasksInCategory {
        id: TaskId,
        new_position: u32,
        category: Category,
    },
    MoveToTop { id: TaskId },
    ToggleExecuting { id: TaskId },
    CompleteTask { id: TaskId },
    CleanupExpiredTasks,
    RefreshStats,
}

/// Filter for [`TaskService::list_tasks`]. `None` matches everything.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaskListQuery {
    pub category: Option<Category>,
    pub status: Option<TaskStatus>,
}

/// Facade over the owned task collection.
pub struct TaskService<C: Clock, R: TaskRepository = InMemoryTaskRepository> {
    repo: R,
    clock: C,
    expiry_horizon_ms: i64,
    stats: TaskStats,
    events: EventBus,
}

impl<C: Clock> TaskService<C, InMemoryTaskRepository> {
    /// Creates an empty in-memory service with default tunables.
    pub fn in_memory(clock: C) -> Self {
        Self::new(InMemoryTaskRepository::new(), clock)
    }
}

impl<C: Clock, R: TaskRepository> TaskService<C, R> {
    pub fn new(repo: R, clock: C) -> Self {
        Self {
            repo,
            clock,
            expiry_horizon_ms: DEFAULT_EXPIRY_HORIZON_MS,
            stats: TaskStats::empty(),
            events: EventBus::default(),
        }
    }

    /// Creates a service using tunables from a validated config.
    pub fn with_config(repo: R, clock: C, config: &CoreConfig) -> Self {
        let mut service = Self::new(repo, clock);
        service.expiry_horizon_ms = config.expiry_horizon_ms();
        service
    }

    /// Registers a receiver for future events.
    pub fn subscribe(&mut self) -> Receiver<TaskEvent> {
        self.events.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.events.subscriber_count()
    }

    /// Dispatches one operation. Returns whether state changed.
    pub fn apply(&mut self, operation: Operation) -> bool {
        match operation {
            Operation::AddTask { title } => self.add_task(&title).is_some(),
            Operation::DeleteTask { id } => self.delete_task(id),
            Operation::ClassifyTask { id, category } => self.classify_task(id, category),
            Operation::ChangeCategory { id, category } => self.change_category(id, category),
            Operation::ReorderTasksInCategory {
                id,
                new_position,
                category,
            } => self.reorder_tasks_in_category(id, new_position, category),
            Operation::MoveToTop { id } => self.move_to_top(id),
            Operation::ToggleExecuting { id } => self.toggle_executing(id),
            Operation::CompleteTask { id } => self.complete_task(id),
            Operation::CleanupExpiredTasks => self.cleanup_expired_tasks() > 0,
            Operation::RefreshStats => {
                let before = self.stats.clone();
                self.refresh_stats() != before
            }
        }
    }

    /// Captures a task into the inbox tail and bumps today's `created`.
    ///
    /// The title is stored as given; length limits belong to the input
    /// layer. Blank titles are ignored and return `None`.
    pub fn add_task(&mut self, title: &str) -> Option<Task> {
        if title.trim().is_empty() {
            debug!("event=task_add module=service status=noop reason=blank_title");
            return None;
        }

        let task = self.repo.create(title, self.clock.now_ms());
        self.stats.daily.created += 1;
        debug!(
            "event=task_add module=service status=ok task_id={} order={}",
            task.id, task.order
        );
        self.events.emit(TaskEvent::Added {
            task_id: task.id,
            order: task.order,
        });
        Some(task)
    }

    pub fn delete_task(&mut self, id: TaskId) -> bool {
        let Some(removed) = ordering::remove(&mut self.repo, id, self.clock.now_ms()) else {
            debug!("event=task_delete module=service status=noop task_id={id}");
            return false;
        };
        debug!(
            "event=task_delete module=service status=ok task_id={id} category={} was_executing={}",
            removed.category, removed.is_executing
        );
        self.events.emit(TaskEvent::Deleted {
            task_id: id,
            category: removed.category,
        });
        true
    }

    /// Routes a task into `category`. Leaving the inbox bumps today's
    /// `classified` counter.
    pub fn classify_task(&mut self, id: TaskId, category: Category) -> bool {
        let Some(placement) = ordering::classify(&mut self.repo, id, category, self.clock.now_ms())
        else {
            debug!("event=task_classify module=service status=noop task_id={id}");
            return false;
        };
        debug!(
            "event=task_classify module=service status=ok task_id={id} from={} to={} order={} executing={}",
            placement.from, placement.to, placement.order, placement.is_executing
        );
        if placement.from == Category::Inbox && placement.to.is_classified() {
            self.stats.daily.classified += 1;
        }
        self.events.emit(TaskEvent::Classified {
            task_id: id,
            category: placement.to,
            order: placement.order,
            is_executing: placement.is_executing,
        });
        true
    }

    pub fn change_category(&mut self, id: TaskId, new_category: Category) -> bool {
        let Some(placement) =
            ordering::change_category(&mut self.repo, id, new_category, self.clock.now_ms())
        else {
            debug!("event=task_change_category module=service status=noop task_id={id}");
            return false;
        };
        debug!(
            "event=task_change_category module=service status=ok task_id={id} from={} to={} order={}",
            placement.from, placement.to, placement.order
        );
        self.events.emit(TaskEvent::CategoryChanged {
            task_id: id,
            from: placement.from,
            to: placement.to,
            order: placement.order,
        });
        true
    }

    pub fn reorder_tasks_in_category(
        &mut self,
        id: TaskId,
        new_position: u32,
        category: Category,
    ) -> bool {
        let Some(moved) = ordering::reorder_in_category(
            &mut self.repo,
            id,
            new_position,
            category,
            self.clock.now_ms(),
        ) else {
            debug!("event=task_reorder module=service status=noop task_id={id}");
            return false;
        };
        debug!(
            "event=task_reorder module=service status=ok task_id={id} category={category} from={} to={}",
            moved.from, moved.to
        );
        self.events.emit(TaskEvent::Reordered {
            task_id: id,
            category,
            from: moved.from,
            to: moved.to,
        });
        true
    }

    pub fn move_to_top(&mut self, id: TaskId) -> bool {
        let Some(displaced) = ordering::move_to_top(&mut self.repo, id, self.clock.now_ms())
        else {
            debug!("event=task_move_to_top module=service status=noop task_id={id}");
            return false;
        };
        debug!(
            "event=task_move_to_top module=service status=ok task_id={id} displaced={displaced}"
        );
        self.events.emit(TaskEvent::MovedToTop {
            task_id: id,
            displaced,
        });
        true
    }

    pub fn toggle_executing(&mut self, id: TaskId) -> bool {
        let Some(toggle) = execution::toggle_executing(&mut self.repo, id, self.clock.now_ms())
        else {
            debug!("event=task_toggle_executing module=service status=noop task_id={id}");
            return false;
        };
        match toggle {
            Toggle::Started { paused } => {
                debug!(
                    "event=task_toggle_executing module=service status=started task_id={id} paused={}",
                    paused.map_or_else(|| "none".to_string(), |paused| paused.to_string())
                );
                if let Some(paused) = paused {
                    self.events.emit(TaskEvent::ExecutionToggled {
                        task_id: paused,
                        is_executing: false,
                    });
                }
                self.events.emit(TaskEvent::ExecutionToggled {
                    task_id: id,
                    is_executing: true,
                });
            }
            Toggle::Paused => {
                debug!("event=task_toggle_executing module=service status=paused task_id={id}");
                self.events.emit(TaskEvent::ExecutionToggled {
                    task_id: id,
                    is_executing: false,
                });
            }
        }
        true
    }

    /// Marks a task done, bumps today's counter and runs the cascade.
    pub fn complete_task(&mut self, id: TaskId) -> bool {
        let Some(completion) = execution::complete_task(&mut self.repo, id, self.clock.now_ms())
        else {
            debug!("event=task_complete module=service status=noop task_id={id}");
            return false;
        };

        self.stats.daily.completed += 1;
        *self
            .stats
            .daily
            .completed_by_category
            .entry(completion.category)
            .or_insert(0) += 1;

        debug!(
            "event=task_complete module=service status=ok task_id={id} category={} promoted={}",
            completion.category,
            completion
                .promoted
                .map_or_else(|| "none".to_string(), |promoted| promoted.to_string())
        );
        self.events.emit(TaskEvent::Completed {
            task_id: id,
            category: completion.category,
        });
        if let Some(promoted) = completion.promoted {
            self.events.emit(TaskEvent::Promoted {
                task_id: promoted,
                category: completion.category,
            });
        }
        true
    }

    /// Removes tasks older than the horizon. Returns the removed count.
    pub fn cleanup_expired_tasks(&mut self) -> usize {
        let removed =
            expiry::cleanup_expired(&mut self.repo, self.clock.now_ms(), self.expiry_horizon_ms);
        if removed.is_empty() {
            debug!("event=task_cleanup module=service status=noop removed=0");
            return 0;
        }
        info!(
            "event=task_cleanup module=service status=ok removed={} remaining={}",
            removed.len(),
            self.repo.len()
        );
        let count = removed.len();
        self.events.emit(TaskEvent::Expired {
            task_ids: removed.into_iter().map(|task| task.id).collect(),
        });
        count
    }

    /// Recomputes and caches stats from the full collection.
    pub fn refresh_stats(&mut self) -> TaskStats {
        let fresh = stats::compute(self.repo.all(), self.clock.now());
        if fresh != self.stats {
            self.stats = fresh.clone();
            self.events.emit(TaskEvent::StatsRefreshed(fresh.clone()));
        }
        debug!(
            "event=stats_refresh module=service status=ok created={} completed={} weekly_total={}",
            fresh.daily.created, fresh.daily.completed, fresh.weekly.total
        );
        fresh
    }

    /// Runs the startup sweep followed by a stats refresh.
    pub fn startup(&mut self) -> TaskStats {
        self.cleanup_expired_tasks();
        self.refresh_stats()
    }

    /// Last cached stats snapshot.
    pub fn stats(&self) -> &TaskStats {
        &self.stats
    }

    pub fn get_task(&self, id: TaskId) -> Option<Task> {
        self.repo.get(id).cloned()
    }

    /// Active tasks of one category in rank order.
    pub fn list_by_category(&self, category: Category) -> Vec<Task> {
        self.repo
            .active_in(category)
            .into_iter()
            .cloned()
            .collect()
    }

    pub fn list_executing(&self) -> Option<Task> {
        self.repo.executing().cloned()
    }

    /// Priority-slot task of each classified category, in display order.
    pub fn list_top_tasks(&self) -> Vec<Task> {
        Category::CLASSIFIED
            .into_iter()
            .filter_map(|category| {
                self.repo
                    .active_in(category)
                    .first()
                    .map(|task| (*task).clone())
            })
            .collect()
    }

    /// Tasks matching `query`, sorted by category, rank, then creation.
    pub fn list_tasks(&self, query: &TaskListQuery) -> Vec<Task> {
        let mut tasks: Vec<Task> = self
            .repo
            .all()
            .into_iter()
            .filter(|task| query.category.map_or(true, |category| task.category == category))
            .filter(|task| query.status.map_or(true, |status| task.status == status))
            .cloned()
            .collect();
        tasks.sort_by_key(|task| {
            (
                task.category,
                task.status != TaskStatus::Active,
                task.order,
                task.created_at,
            )
        });
        tasks
    }

    /// Owned copy of the full collection for persistence.
    pub fn snapshot(&self) -> Vec<Task> {
        self.repo.all().into_iter().cloned().collect()
    }

    /// Replaces the collection with a persisted one and repairs it.
    pub fn hydrate(&mut self, tasks: Vec<Task>) -> usize {
        let existing: Vec<TaskId> = self.repo.all().into_iter().map(|task| task.id).collect();
        for id in existing {
            self.repo.delete(id);
        }

        let task_count = tasks.len();
        for task in tasks {
            self.repo.insert(task);
        }
        let repaired = ordering::normalize(&mut self.repo, self.clock.now_ms());
        if repaired > 0 {
            warn!(
                "event=task_hydrate module=service status=repaired task_count={task_count} repaired={repaired}"
            );
        } else {
            info!("event=task_hydrate module=service status=ok task_count={task_count}");
        }
        self.events.emit(TaskEvent::Hydrated {
            task_count,
            repaired,
        });
        repaired
    }

    /// Loads the collection from a persistence collaborator.
    pub fn load_from<S: SnapshotStore + ?Sized>(&mut self, store: &S) -> StoreResult<usize> {
        let tasks = store.load_tasks()?;
        Ok(self.hydrate(tasks))
    }

    /// Writes the collection to a persistence collaborator.
    pub fn save_to<S: SnapshotStore + ?Sized>(&self, store: &S) -> StoreResult<()> {
        store.save_tasks(&self.snapshot())
    }
}
