mod common;

use chrono::Duration;
use common::{add_to, assert_invariants, noon_clock, HOUR_MS};
use focusflow_core::{Category, Task, TaskService, TaskStatus};

#[test]
fn add_task_captures_into_inbox_tail() {
    let clock = noon_clock();
    let mut service = TaskService::in_memory(&clock);

    let task = service.add_task("Buy milk").unwrap();
    assert_eq!(task.category, Category::Inbox);
    assert_eq!(task.order, 1);
    assert!(!task.is_executing);
    assert_eq!(task.title, "Buy milk");

    let second = service.add_task("Call bank").unwrap();
    assert_eq!(second.order, 2);
    assert_invariants(&service.snapshot());
}

#[test]
fn blank_titles_are_ignored_and_long_titles_kept_intact() {
    let clock = noon_clock();
    let mut service = TaskService::in_memory(&clock);

    assert!(service.add_task("   ").is_none());
    assert!(service.snapshot().is_empty());

    let long = "y".repeat(150);
    let task = service.add_task(&long).unwrap();
    assert_eq!(task.title, long);
    assert_eq!(service.get_task(task.id).unwrap().title.chars().count(), 150);
}

#[test]
fn first_classified_task_becomes_executor() {
    let clock = noon_clock();
    let mut service = TaskService::in_memory(&clock);

    let first = add_to(&mut service, "Buy milk", Category::Work);
    assert_eq!(first.order, 1);
    assert!(first.is_executing);

    let second = add_to(&mut service, "Write report", Category::Work);
    assert_eq!(second.order, 2);
    assert!(!second.is_executing);

    assert_eq!(service.list_executing().unwrap().id, first.id);
    assert_invariants(&service.snapshot());
}

#[test]
fn empty_category_does_not_steal_executor() {
    let clock = noon_clock();
    let mut service = TaskService::in_memory(&clock);

    let work = add_to(&mut service, "work", Category::Work);
    let life = add_to(&mut service, "life", Category::Life);

    assert!(service.get_task(work.id).unwrap().is_executing);
    assert_eq!(life.order, 1);
    assert!(!life.is_executing);
    assert_invariants(&service.snapshot());
}

#[test]
fn completing_executor_promotes_next_task() {
    let clock = noon_clock();
    let mut service = TaskService::in_memory(&clock);

    let first = add_to(&mut service, "Buy milk", Category::Work);
    let second = add_to(&mut service, "Write report", Category::Work);
    let third = add_to(&mut service, "File expenses", Category::Work);

    assert!(service.complete_task(first.id));

    let done = service.get_task(first.id).unwrap();
    assert_eq!(done.status, TaskStatus::Done);
    assert!(!done.is_executing);

    let promoted = service.get_task(second.id).unwrap();
    assert_eq!(promoted.order, 1);
    assert!(promoted.is_executing);
    assert_eq!(service.get_task(third.id).unwrap().order, 2);
    assert_eq!(service.stats().daily.completed, 1);
    assert_invariants(&service.snapshot());
}

#[test]
fn completing_sole_executor_leaves_slot_empty() {
    let clock = noon_clock();
    let mut service = TaskService::in_memory(&clock);

    let only = add_to(&mut service, "Only", Category::Study);
    assert!(service.complete_task(only.id));

    assert!(service.list_executing().is_none());
    assert!(service.list_by_category(Category::Study).is_empty());
    assert_invariants(&service.snapshot());
}

#[test]
fn completing_twice_is_a_noop() {
    let clock = noon_clock();
    let mut service = TaskService::in_memory(&clock);

    let task = add_to(&mut service, "Once", Category::Hobby);
    assert!(service.complete_task(task.id));
    assert!(!service.complete_task(task.id));
    assert_eq!(service.stats().daily.completed, 1);
}

#[test]
fn reorder_to_current_position_changes_nothing() {
    let clock = noon_clock();
    let mut service = TaskService::in_memory(&clock);

    let first = add_to(&mut service, "Buy milk", Category::Work);
    let second = add_to(&mut service, "Write report", Category::Work);
    service.complete_task(first.id);

    let before = service.snapshot();
    clock.advance(Duration::minutes(1));
    assert!(!service.reorder_tasks_in_category(second.id, 1, Category::Work));
    assert_eq!(service.snapshot(), before);
}

#[test]
fn sweep_removes_only_tasks_older_than_a_day() {
    let clock = noon_clock();
    let mut service = TaskService::in_memory(&clock);

    let old = add_to(&mut service, "old", Category::Study);
    clock.advance(Duration::hours(24));
    let fresh = add_to(&mut service, "fresh", Category::Study);
    clock.advance(Duration::hours(1));

    assert!(service.get_task(old.id).unwrap().is_executing);
    assert_eq!(service.cleanup_expired_tasks(), 1);

    assert!(service.get_task(old.id).is_none());
    let fresh = service.get_task(fresh.id).unwrap();
    assert_eq!(fresh.order, 1);
    assert!(!fresh.is_executing);
    assert!(service.list_executing().is_none());
    assert_invariants(&service.snapshot());
}

#[test]
fn sweep_keeps_task_exactly_at_horizon() {
    let clock = noon_clock();
    let mut service = TaskService::in_memory(&clock);

    let task = service.add_task("edge").unwrap();
    clock.advance(Duration::milliseconds(24 * HOUR_MS));
    assert_eq!(service.cleanup_expired_tasks(), 0);
    assert!(service.get_task(task.id).is_some());

    clock.advance(Duration::milliseconds(1));
    assert_eq!(service.cleanup_expired_tasks(), 1);
}

#[test]
fn sweep_and_stats_are_idempotent() {
    let clock = noon_clock();
    let mut service = TaskService::in_memory(&clock);

    add_to(&mut service, "old", Category::Life);
    clock.advance(Duration::hours(30));
    let keep = add_to(&mut service, "keep", Category::Life);
    service.complete_task(keep.id);

    service.cleanup_expired_tasks();
    let swept = service.snapshot();
    assert_eq!(service.cleanup_expired_tasks(), 0);
    assert_eq!(service.snapshot(), swept);

    let first = service.refresh_stats();
    let second = service.refresh_stats();
    assert_eq!(first, second);
    assert_eq!(service.stats(), &second);
}

#[test]
fn delete_closes_gap_without_promotion() {
    let clock = noon_clock();
    let mut service = TaskService::in_memory(&clock);

    let first = add_to(&mut service, "a", Category::Work);
    let second = add_to(&mut service, "b", Category::Work);

    assert!(service.delete_task(first.id));
    let second = service.get_task(second.id).unwrap();
    assert_eq!(second.order, 1);
    assert!(!second.is_executing);
    assert!(!service.delete_task(first.id));
    assert_invariants(&service.snapshot());
}

#[test]
fn sweep_survives_extreme_hydrated_timestamps() {
    let clock = noon_clock();
    let mut service = TaskService::in_memory(&clock);
    let ancient = Task::new("ancient", 1, i64::MIN);
    let future = Task::new("future", 2, i64::MAX);
    service.hydrate(vec![ancient.clone(), future.clone()]);

    assert_eq!(service.cleanup_expired_tasks(), 1);
    assert!(service.get_task(ancient.id).is_none());
    assert_eq!(service.get_task(future.id).unwrap().order, 1);
    assert_invariants(&service.snapshot());
}
