#![allow(dead_code)]

use chrono::{DateTime, FixedOffset};
use focusflow_core::{Category, Clock, FixedClock, Task, TaskRepository, TaskService};
use std::collections::BTreeSet;

pub const HOUR_MS: i64 = 60 * 60 * 1000;

pub fn clock_at(rfc3339: &str) -> FixedClock {
    FixedClock::new(parse(rfc3339))
}

pub fn parse(rfc3339: &str) -> DateTime<FixedOffset> {
    DateTime::parse_from_rfc3339(rfc3339).unwrap()
}

/// Noon on a fixed day, so "today" never crosses midnight in a test.
pub fn noon_clock() -> FixedClock {
    clock_at("2026-04-15T12:00:00+09:00")
}

pub fn add_to<C: Clock, R: TaskRepository>(
    service: &mut TaskService<C, R>,
    title: &str,
    category: Category,
) -> Task {
    let task = service.add_task(title).unwrap();
    if category != Category::Inbox {
        assert!(service.classify_task(task.id, category));
    }
    service.get_task(task.id).unwrap()
}

pub fn ids_of(tasks: &[Task]) -> Vec<focusflow_core::TaskId> {
    tasks.iter().map(|task| task.id).collect()
}

/// Panics with a description when any ordering/executor invariant fails.
pub fn assert_invariants(tasks: &[Task]) {
    for category in Category::ALL {
        let orders: BTreeSet<u32> = tasks
            .iter()
            .filter(|task| task.category == category && task.is_active())
            .map(|task| task.order)
            .collect();
        let count = tasks
            .iter()
            .filter(|task| task.category == category && task.is_active())
            .count();
        let expected: BTreeSet<u32> = (1..=count as u32).collect();
        assert_eq!(orders, expected, "orders in {category} are not dense");
    }

    let executing: Vec<&Task> = tasks.iter().filter(|task| task.is_executing).collect();
    assert!(executing.len() <= 1, "more than one executing task");
    for task in executing {
        assert_eq!(task.order, 1, "executor is not at order 1");
        assert!(task.category.is_classified(), "executor sits in inbox");
        assert!(task.is_active(), "executor is done");
    }
}
