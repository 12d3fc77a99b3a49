//! Core task ordering and execution-state engine for FocusFlow.
//! This crate is the single source of truth for task invariants.

pub mod clock;
pub mod config;
pub mod db;
pub mod engine;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{ConfigError, ConfigResult, CoreConfig};
pub use engine::stats::{CategoryCounts, DailyStats, TaskStats, WeeklyStats};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::task::{Category, Task, TaskId, TaskPatch, TaskStatus, TaskValidationError};
pub use repo::snapshot_store::{SnapshotStore, SqliteSnapshotStore, StoreError, StoreResult};
pub use repo::task_repo::{InMemoryTaskRepository, TaskRepository};
pub use service::events::TaskEvent;
pub use service::task_service::{Operation, TaskListQuery, TaskService};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
