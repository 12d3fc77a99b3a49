//! Task ordering and execution-state engine.
//!
//! # Responsibility
//! - Implement state transitions as functions over a `TaskRepository`.
//! - Keep ordering, executor and expiry policy out of the repository.
//!
//! # Invariants
//! - Every function leaves the repository dense per category with at most
//!   one valid executor, or leaves it untouched.

pub mod execution;
pub mod expiry;
pub mod ordering;
pub mod stats;
