//! Public operation surface for collaborators.
//!
//! # Responsibility
//! - Expose the task facade and its change notifications.
//! - Keep UI/scheduler/persistence callers away from engine internals.

pub mod events;
pub mod task_service;
