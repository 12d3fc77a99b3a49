//! Domain model for the task organizer.
//!
//! # Responsibility
//! - Define canonical data structures used by the engine and storage.
//!
//! # Invariants
//! - Every task is identified by a stable `TaskId`.
//! - Completion keeps the record; only deletion and expiry remove it.

pub mod task;
