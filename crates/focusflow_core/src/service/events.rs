//! Change notifications emitted by the task service.
//!
//! Subscribers receive one event per settled state transition. No-op calls
//! emit nothing.

use crate::engine::stats::TaskStats;
use crate::model::task::{Category, TaskId};
use std::sync::mpsc::{self, Receiver, Sender};

#[derive(Debug, Clone, PartialEq)]
pub enum TaskEvent {
    Added {
        task_id: TaskId,
        order: u32,
    },
    Deleted {
        task_id: TaskId,
        category: Category,
    },
    Classified {
        task_id: TaskId,
        category: Category,
        order: u32,
        is_executing: bool,
    },
    CategoryChanged {
        task_id: TaskId,
        from: Category,
        to: Category,
        order: u32,
    },
    Reordered {
        task_id: TaskId,
        category: Category,
        from: u32,
        to: u32,
    },
    MovedToTop {
        task_id: TaskId,
        displaced: TaskId,
    },
    ExecutionToggled {
        task_id: TaskId,
        is_executing: bool,
    },
    Completed {
        task_id: TaskId,
        category: Category,
    },
    /// Emitted right after `Completed` when the cascade fills the slot.
    Promoted {
        task_id: TaskId,
        category: Category,
    },
    Expired {
        task_ids: Vec<TaskId>,
    },
    StatsRefreshed(TaskStats),
    Hydrated {
        task_count: usize,
        repaired: usize,
    },
}

/// Fan-out list of event receivers.
#[derive(Debug, Default)]
pub(crate) struct EventBus {
    senders: Vec<Sender<TaskEvent>>,
}

impl EventBus {
    pub(crate) fn subscribe(&mut self) -> Receiver<TaskEvent> {
        let (tx, rx) = mpsc::channel();
        self.senders.push(tx);
        rx
    }

    /// Delivers to every live receiver and drops disconnected ones.
    pub(crate) fn emit(&mut self, event: TaskEvent) {
        self.senders.retain(|tx| tx.send(event.clone()).is_ok());
    }

    pub(crate) fn subscriber_count(&self) -> usize {
        self.senders.len()
    }
}
