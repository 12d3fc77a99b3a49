//! Task domain model.
//!
//! # Responsibility
//! - Define the single entity handled by the ordering/execution engine.
//! - Provide the enumerated update contract (`TaskPatch`) used by repositories.
//!
//! # Invariants
//! - `id` and `created_at` never change after construction.
//! - Active tasks in one category hold dense `order` values `1..=n`.
//! - `is_executing == true` implies `order == 1`, a classified category and
//!   `status == Active`. At most one task store-wide is executing.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier for every task.
pub type TaskId = Uuid;

/// Task bucket. `Inbox` is the capture area, the rest are classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Work,
    Life,
    Study,
    Hobby,
    Inbox,
}

impl Category {
    /// Every category, classified ones first.
    pub const ALL: [Category; 5] = [
        Category::Work,
        Category::Life,
        Category::Study,
        Category::Hobby,
        Category::Inbox,
    ];

    /// Destination categories in display order.
    pub const CLASSIFIED: [Category; 4] = [
        Category::Work,
        Category::Life,
        Category::Study,
        Category::Hobby,
    ];

    /// Returns whether tasks in this category may hold the executor slot.
    pub fn is_classified(self) -> bool {
        !matches!(self, Category::Inbox)
    }

    /// Stable lowercase name, shared by storage and log lines.
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Work => "work",
            Category::Life => "life",
            Category::Study => "study",
            Category::Hobby => "hobby",
            Category::Inbox => "inbox",
        }
    }

    /// Parses the lowercase name produced by [`Category::as_str`].
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "work" => Some(Category::Work),
            "life" => Some(Category::Life),
            "study" => Some(Category::Study),
            "hobby" => Some(Category::Hobby),
            "inbox" => Some(Category::Inbox),
            _ => None,
        }
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Task lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Participates in category ordering.
    Active,
    /// Completed; kept for stats, excluded from ordering.
    Done,
}

impl TaskStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            TaskStatus::Active => "active",
            TaskStatus::Done => "done",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "active" => Some(TaskStatus::Active),
            "done" => Some(TaskStatus::Done),
            _ => None,
        }
    }
}

/// Canonical task record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    /// Author-supplied title. Length is bounded by the input layer.
    pub title: String,
    pub category: Category,
    /// Unix epoch milliseconds.
    pub created_at: i64,
    /// Unix epoch milliseconds, refreshed on every mutation.
    pub updated_at: i64,
    /// 1-based rank among active tasks of the same category.
    pub order: u32,
    pub status: TaskStatus,
    /// Serialized as `isExecuting` to match the persisted collection shape.
    #[serde(rename = "isExecuting", default)]
    pub is_executing: bool,
}

impl Task {
    /// Creates an inbox task with a generated id.
    pub fn new(title: impl Into<String>, order: u32, now_ms: i64) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            category: Category::Inbox,
            created_at: now_ms,
            updated_at: now_ms,
            order,
            status: TaskStatus::Active,
            is_executing: false,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == TaskStatus::Active
    }

    /// Returns whether this task sits in the priority slot of a classified
    /// category, i.e. whether it may be started.
    pub fn holds_priority_slot(&self) -> bool {
        self.is_active() && self.order == 1 && self.category.is_classified()
    }

    /// Checks record-level invariants. Cross-task invariants (density,
    /// single executor) are owned by the engine.
    pub fn validate(&self) -> Result<(), TaskValidationError> {
        if self.id.is_nil() {
            return Err(TaskValidationError::NilId);
        }
        if self.title.trim().is_empty() {
            return Err(TaskValidationError::EmptyTitle);
        }
        if self.is_active() && self.order == 0 {
            return Err(TaskValidationError::ZeroOrder);
        }
        if self.updated_at < self.created_at {
            return Err(TaskValidationError::UpdatedBeforeCreated {
                created_at: self.created_at,
                updated_at: self.updated_at,
            });
        }
        if self.is_executing && !self.holds_priority_slot() {
            return Err(TaskValidationError::ExecutingOutsidePrioritySlot);
        }
        Ok(())
    }

    /// Applies one enumerated change and refreshes `updated_at`.
    pub fn apply_patch(&mut self, patch: TaskPatch, now_ms: i64) {
        match patch {
            TaskPatch::Title(title) => self.title = title,
            TaskPatch::Category(category) => self.category = category,
            TaskPatch::Order(order) => self.order = order,
            TaskPatch::Status(status) => self.status = status,
            TaskPatch::Executing(flag) => self.is_executing = flag,
            TaskPatch::Placement {
                category,
                order,
                is_executing,
            } => {
                self.category = category;
                self.order = order;
                self.is_executing = is_executing;
            }
        }
        self.updated_at = now_ms.max(self.created_at);
    }
}

/// Allowed field changes for an existing task.
///
/// `id` and `created_at` have no variant and therefore cannot be patched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskPatch {
    Title(String),
    Category(Category),
    Order(u32),
    Status(TaskStatus),
    Executing(bool),
    /// Moves a task into a slot in one step.
    Placement {
        category: Category,
        order: u32,
        is_executing: bool,
    },
}

/// Record-level validation failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskValidationError {
    NilId,
    EmptyTitle,
    ZeroOrder,
    UpdatedBeforeCreated { created_at: i64, updated_at: i64 },
    ExecutingOutsidePrioritySlot,
}

impl Display for TaskValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NilId => write!(f, "task id must not be nil"),
            Self::EmptyTitle => write!(f, "task title must not be blank"),
            Self::ZeroOrder => write!(f, "active task order must be positive"),
            Self::UpdatedBeforeCreated {
                created_at,
                updated_at,
            } => write!(
                f,
                "task updated_at ({updated_at}) is earlier than created_at ({created_at})"
            ),
            Self::ExecutingOutsidePrioritySlot => write!(
                f,
                "executing task must be active, classified and at order 1"
            ),
        }
    }
}

impl Error for TaskValidationError {}
