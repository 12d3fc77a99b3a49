//! Repository layer: the owned task collection and its persistence.
//!
//! # Responsibility
//! - `task_repo`: in-process CRUD primitives the engine mutates.
//! - `snapshot_store`: serialize/rehydrate the collection through SQLite.
//!
//! # Invariants
//! - Repositories hold no ordering or execution policy.

pub mod snapshot_store;
pub mod task_repo;
