//! Daily and weekly counters derived from a repository snapshot.
//!
//! # Invariants
//! - Pure function of the task collection and "now".
//! - Every category key is present in breakdown maps, zero when unused.

use crate::model::task::{Category, Task, TaskStatus};
use chrono::{DateTime, Duration, FixedOffset, NaiveTime, TimeZone};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const WEEK_DAYS: i64 = 7;

/// Per-category counter map.
pub type CategoryCounts = BTreeMap<Category, u32>;

/// Counters for tasks created since local midnight.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DailyStats {
    pub created: u32,
    /// Created today and no longer in the inbox.
    pub classified: u32,
    /// Created today and done.
    pub completed: u32,
    pub completed_by_category: CategoryCounts,
}

/// Counters over the trailing seven days before local midnight plus today.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct WeeklyStats {
    pub total: u32,
    pub completed: u32,
    /// `completed / total`, `0.0` for an empty window.
    pub completion_rate: f64,
    pub category_breakdown: CategoryCounts,
}

/// Cached statistics snapshot.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TaskStats {
    pub daily: DailyStats,
    pub weekly: WeeklyStats,
}

impl TaskStats {
    /// Zeroed stats with every category key present.
    pub fn empty() -> Self {
        Self {
            daily: DailyStats {
                completed_by_category: zeroed_counts(),
                ..DailyStats::default()
            },
            weekly: WeeklyStats {
                category_breakdown: zeroed_counts(),
                ..WeeklyStats::default()
            },
        }
    }
}

/// Computes stats for `tasks` as seen at `now`.
pub fn compute<'a, I>(tasks: I, now: DateTime<FixedOffset>) -> TaskStats
where
    I: IntoIterator<Item = &'a Task>,
{
    let today_start_ms = local_midnight(now).timestamp_millis();
    let week_start_ms = today_start_ms - Duration::days(WEEK_DAYS).num_milliseconds();
    let mut stats = TaskStats::empty();

    for task in tasks {
        let done = task.status == TaskStatus::Done;

        if task.created_at >= today_start_ms {
            stats.daily.created += 1;
            if task.category.is_classified() {
                stats.daily.classified += 1;
            }
            if done {
                stats.daily.completed += 1;
                bump(&mut stats.daily.completed_by_category, task.category);
            }
        }

        if task.created_at >= week_start_ms {
            stats.weekly.total += 1;
            if done {
                stats.weekly.completed += 1;
                bump(&mut stats.weekly.category_breakdown, task.category);
            }
        }
    }

    stats.weekly.completion_rate = if stats.weekly.total == 0 {
        0.0
    } else {
        f64::from(stats.weekly.completed) / f64::from(stats.weekly.total)
    };
    stats
}

/// Midnight of `now`'s calendar day in `now`'s offset.
pub fn local_midnight(now: DateTime<FixedOffset>) -> DateTime<FixedOffset> {
    let midnight = now.date_naive().and_time(NaiveTime::MIN);
    now.timezone()
        .from_local_datetime(&midnight)
        .earliest()
        .unwrap_or(now)
}

fn zeroed_counts() -> CategoryCounts {
    Category::ALL.into_iter().map(|category| (category, 0)).collect()
}

fn bump(counts: &mut CategoryCounts, category: Category) {
    *counts.entry(category).or_insert(0) += 1;
}
