//! Active / snoozed / completed partition of a list snapshot.
//!
//! # Invariants
//! - `active` and `completed` are disjoint.
//! - A completed task still hidden by a snooze appears in both `snoozed` and
//!   `completed`; it never appears in `active`.
//! - `active` is sorted by `created_at DESC`.
//! - `completed` puts periodic tasks first, then `completed_at DESC`.
//! - `snoozed` keeps query order.

use crate::model::task::Task;

/// Partitioned view of one list at a given instant.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskBuckets {
    pub active: Vec<Task>,
    pub snoozed: Vec<Task>,
    pub completed: Vec<Task>,
}

impl TaskBuckets {
    /// Splits `tasks` into buckets as seen at `now_ms`.
    pub fn partition(tasks: &[Task], now_ms: i64) -> Self {
        let mut buckets = TaskBuckets::default();
        for task in tasks {
            let visible = task.is_visible(now_ms);
            if task.is_snoozed && !visible {
                buckets.snoozed.push(task.clone());
            }
            if task.is_completed {
                buckets.completed.push(task.clone());
            } else if visible {
                buckets.active.push(task.clone());
            }
        }

        buckets
            .active
            .sort_by(|a, b| b.created_at.cmp(&a.created_at));
        buckets.completed.sort_by(|a, b| {
            b.is_periodic
                .cmp(&a.is_periodic)
                .then_with(|| b.completed_at.cmp(&a.completed_at))
        });
        buckets
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty() && self.snoozed.is_empty() && self.completed.is_empty()
    }

    /// Entries across all buckets, so a task listed twice counts twice.
    pub fn len(&self) -> usize {
        self.active.len() + self.snoozed.len() + self.completed.len()
    }
}
