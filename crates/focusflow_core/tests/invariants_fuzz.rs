mod common;

use chrono::Duration;
use common::{assert_invariants, noon_clock};
use focusflow_core::{Category, FixedClock, Operation, TaskId, TaskService};
use proptest::prelude::*;
use proptest::sample::Index;

/// One generated action. Targets are resolved against the tasks alive
/// when the step runs, so shrinking keeps every step meaningful.
#[derive(Debug, Clone)]
enum Step {
    Add(String),
    Classify(Index, Category),
    ChangeCategory(Index, Category),
    Reorder(Index, u32, Category),
    MoveToTop(Index),
    Toggle(Index),
    Complete(Index),
    Delete(Index),
    Cleanup,
    RefreshStats,
    AdvanceHours(u8),
}

impl Step {
    fn operation(&self, ids: &[TaskId]) -> Option<Operation> {
        let operation = match self {
            Step::Add(title) => Operation::AddTask {
                title: title.clone(),
            },
            Step::Classify(target, category) => Operation::ClassifyTask {
                id: pick(target, ids),
                category: *category,
            },
            Step::ChangeCategory(target, category) => Operation::ChangeCategory {
                id: pick(target, ids),
                category: *category,
            },
            Step::Reorder(target, new_position, category) => Operation::ReorderTasksInCategory {
                id: pick(target, ids),
                new_position: *new_position,
                category: *category,
            },
            Step::MoveToTop(target) => Operation::MoveToTop {
                id: pick(target, ids),
            },
            Step::Toggle(target) => Operation::ToggleExecuting {
                id: pick(target, ids),
            },
            Step::Complete(target) => Operation::CompleteTask {
                id: pick(target, ids),
            },
            Step::Delete(target) => Operation::DeleteTask {
                id: pick(target, ids),
            },
            Step::Cleanup => Operation::CleanupExpiredTasks,
            Step::RefreshStats => Operation::RefreshStats,
            Step::AdvanceHours(_) => return None,
        };
        Some(operation)
    }
}

fn pick(target: &Index, ids: &[TaskId]) -> TaskId {
    if ids.is_empty() {
        return TaskId::nil();
    }
    ids[target.index(ids.len())]
}

fn category() -> impl Strategy<Value = Category> {
    prop::sample::select(Category::ALL.to_vec())
}

fn step() -> impl Strategy<Value = Step> {
    prop_oneof![
        3 => "[a-z ]{0,12}".prop_map(Step::Add),
        2 => (any::<Index>(), category()).prop_map(|(target, c)| Step::Classify(target, c)),
        1 => (any::<Index>(), category())
            .prop_map(|(target, c)| Step::ChangeCategory(target, c)),
        2 => (any::<Index>(), 0_u32..8, category())
            .prop_map(|(target, position, c)| Step::Reorder(target, position, c)),
        1 => any::<Index>().prop_map(Step::MoveToTop),
        1 => any::<Index>().prop_map(Step::Toggle),
        2 => any::<Index>().prop_map(Step::Complete),
        1 => any::<Index>().prop_map(Step::Delete),
        1 => Just(Step::Cleanup),
        1 => Just(Step::RefreshStats),
        1 => (1_u8..=30).prop_map(Step::AdvanceHours),
    ]
}

fn run(steps: &[Step], service: &mut TaskService<&FixedClock>, clock: &FixedClock) {
    for step in steps {
        let ids: Vec<TaskId> = service.snapshot().iter().map(|task| task.id).collect();
        match step.operation(&ids) {
            Some(operation) => {
                service.apply(operation);
            }
            None => {
                if let Step::AdvanceHours(hours) = step {
                    clock.advance(Duration::hours(i64::from(*hours)));
                }
            }
        }
        assert_invariants(&service.snapshot());
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn generated_histories_keep_invariants(steps in prop::collection::vec(step(), 1..120)) {
        let clock = noon_clock();
        let mut service = TaskService::in_memory(&clock);
        run(&steps, &mut service, &clock);
    }

    #[test]
    fn sweep_and_refresh_are_idempotent_after_any_history(
        steps in prop::collection::vec(step(), 0..60)
    ) {
        let clock = noon_clock();
        let mut service = TaskService::in_memory(&clock);
        run(&steps, &mut service, &clock);

        service.cleanup_expired_tasks();
        let swept = service.snapshot();
        prop_assert_eq!(service.cleanup_expired_tasks(), 0);
        prop_assert_eq!(service.snapshot(), swept);

        let first = service.refresh_stats();
        let second = service.refresh_stats();
        prop_assert_eq!(first, second);
    }
}

#[test]
fn classifying_into_inbox_steals_nothing() {
    let clock = noon_clock();
    let mut service = TaskService::in_memory(&clock);
    let task = service.add_task("stay").unwrap();

    assert!(!service.apply(Operation::ClassifyTask {
        id: task.id,
        category: Category::Inbox
    }));
    assert!(service.list_executing().is_none());
    assert_invariants(&service.snapshot());
}
