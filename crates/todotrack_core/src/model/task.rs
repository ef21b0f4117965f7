//! Task domain model and lifecycle transitions.
//!
//! # Responsibility
//! - Define the canonical `Task` row shared by repositories and views.
//! - Compute state transitions (complete, snooze, unsnooze) as patches.
//! - Derive visibility, "days on list" aging and display labels.
//!
//! # Invariants
//! - `completed_at` is set iff `is_completed`.
//! - `period_type` is set iff `is_periodic`; `period_days` iff `Custom`.
//! - `snoozed_until` is set iff `is_snoozed`.
//! - Transitions are pure; callers persist the returned `TaskPatch`.

use crate::clock::DAY_MS;
use crate::model::period::{period_label, PeriodType, MAX_PERIOD_DAYS, MIN_PERIOD_DAYS};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier of a task row.
pub type TaskId = Uuid;
/// Stable identifier of a list row.
pub type ListId = Uuid;
/// Stable identifier of an authenticated user.
pub type UserId = Uuid;

/// Smallest accepted snooze duration in days.
pub const MIN_SNOOZE_DAYS: u32 = 1;
/// Largest accepted snooze duration in days.
pub const MAX_SNOOZE_DAYS: u32 = 365;

/// Validation failures for task rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskValidationError {
    NilId,
    BlankTitle,
    /// `completed_at` presence disagrees with `is_completed`.
    CompletionMismatch { is_completed: bool },
    /// `period_type` presence disagrees with `is_periodic`.
    PeriodTypeMismatch { is_periodic: bool },
    /// `period_days` set for a non-custom cadence.
    UnexpectedPeriodDays,
    /// `Custom` cadence without `period_days`.
    MissingPeriodDays,
    PeriodDaysOutOfRange(u16),
    /// `snoozed_until` presence disagrees with `is_snoozed`.
    SnoozeMismatch { is_snoozed: bool },
}

impl Display for TaskValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NilId => write!(f, "task id must not be nil"),
            Self::BlankTitle => write!(f, "task title must not be blank"),
            Self::CompletionMismatch { is_completed: true } => {
                write!(f, "completed task must carry completed_at")
            }
            Self::CompletionMismatch { is_completed: false } => {
                write!(f, "incomplete task must not carry completed_at")
            }
            Self::PeriodTypeMismatch { is_periodic: true } => {
                write!(f, "periodic task must carry period_type")
            }
            Self::PeriodTypeMismatch { is_periodic: false } => {
                write!(f, "non-periodic task must not carry period_type")
            }
            Self::UnexpectedPeriodDays => {
                write!(f, "period_days is only valid for custom period_type")
            }
            Self::MissingPeriodDays => write!(f, "custom period_type requires period_days"),
            Self::PeriodDaysOutOfRange(days) => write!(
                f,
                "period_days {days} out of range {MIN_PERIOD_DAYS}..={MAX_PERIOD_DAYS}"
            ),
            Self::SnoozeMismatch { is_snoozed: true } => {
                write!(f, "snoozed task must carry snoozed_until")
            }
            Self::SnoozeMismatch { is_snoozed: false } => {
                write!(f, "task that is not snoozed must not carry snoozed_until")
            }
        }
    }
}

impl Error for TaskValidationError {}

/// Rejected lifecycle transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionError {
    SnoozeDaysOutOfRange(u32),
}

impl Display for TransitionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SnoozeDaysOutOfRange(days) => write!(
                f,
                "snooze days {days} out of range {MIN_SNOOZE_DAYS}..={MAX_SNOOZE_DAYS}"
            ),
        }
    }
}

impl Error for TransitionError {}

/// Canonical task row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub list_id: ListId,
    pub user_id: UserId,
    pub title: String,
    pub is_completed: bool,
    /// Epoch milliseconds; set iff `is_completed`.
    pub completed_at: Option<i64>,
    /// Epoch milliseconds. Doubles as the aging anchor and is reset when a
    /// completed task is reopened.
    pub created_at: i64,
    pub is_periodic: bool,
    pub period_type: Option<PeriodType>,
    /// Meaningful only for `PeriodType::Custom`.
    pub period_days: Option<u16>,
    pub is_snoozed: bool,
    /// Epoch milliseconds; set iff `is_snoozed`.
    pub snoozed_until: Option<i64>,
}

/// Insert payload for a new task. The backend assigns `id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    pub list_id: ListId,
    pub title: String,
    pub is_periodic: bool,
    pub period_type: Option<PeriodType>,
    pub period_days: Option<u16>,
    pub created_at: i64,
}

impl NewTask {
    /// Materializes the row the backend stores for this payload.
    pub fn into_task(self, id: TaskId, user_id: UserId) -> Task {
        Task {
            id,
            list_id: self.list_id,
            user_id,
            title: self.title,
            is_completed: false,
            completed_at: None,
            created_at: self.created_at,
            is_periodic: self.is_periodic,
            period_type: self.period_type,
            period_days: self.period_days,
            is_snoozed: false,
            snoozed_until: None,
        }
    }
}

/// Column-level update produced by lifecycle transitions.
///
/// `None` leaves a column untouched; `Some(None)` clears a nullable column.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskPatch {
    pub is_completed: Option<bool>,
    pub completed_at: Option<Option<i64>>,
    pub created_at: Option<i64>,
    pub is_snoozed: Option<bool>,
    pub snoozed_until: Option<Option<i64>>,
}

impl TaskPatch {
    pub fn is_empty(&self) -> bool {
        self == &TaskPatch::default()
    }
}

impl Task {
    /// Checks row-level invariants.
    pub fn validate(&self) -> Result<(), TaskValidationError> {
        if self.id.is_nil() {
            return Err(TaskValidationError::NilId);
        }
        if self.title.trim().is_empty() {
            return Err(TaskValidationError::BlankTitle);
        }
        if self.is_completed != self.completed_at.is_some() {
            return Err(TaskValidationError::CompletionMismatch {
                is_completed: self.is_completed,
            });
        }
        if self.is_periodic != self.period_type.is_some() {
            return Err(TaskValidationError::PeriodTypeMismatch {
                is_periodic: self.is_periodic,
            });
        }
        validate_period_days(self.period_type, self.period_days)?;
        if self.is_snoozed != self.snoozed_until.is_some() {
            return Err(TaskValidationError::SnoozeMismatch {
                is_snoozed: self.is_snoozed,
            });
        }
        Ok(())
    }

    /// Flips completion.
    ///
    /// Completing stamps `completed_at = now`. Reopening clears it and resets
    /// `created_at = now`, restarting the aging clock.
    pub fn toggle_complete(&self, now_ms: i64) -> TaskPatch {
        if self.is_completed {
            TaskPatch {
                is_completed: Some(false),
                completed_at: Some(None),
                created_at: Some(now_ms),
                ..TaskPatch::default()
            }
        } else {
            TaskPatch {
                is_completed: Some(true),
                completed_at: Some(Some(now_ms)),
                ..TaskPatch::default()
            }
        }
    }

    /// Hides the task for `days` whole days starting at `now`.
    pub fn snooze(&self, days: u32, now_ms: i64) -> Result<TaskPatch, TransitionError> {
        if !(MIN_SNOOZE_DAYS..=MAX_SNOOZE_DAYS).contains(&days) {
            return Err(TransitionError::SnoozeDaysOutOfRange(days));
        }
        Ok(TaskPatch {
            is_snoozed: Some(true),
            snoozed_until: Some(Some(now_ms + i64::from(days) * DAY_MS)),
            ..TaskPatch::default()
        })
    }

    /// Clears snooze state regardless of expiry.
    pub fn unsnooze(&self) -> TaskPatch {
        TaskPatch {
            is_snoozed: Some(false),
            snoozed_until: Some(None),
            ..TaskPatch::default()
        }
    }

    /// Applies a patch in memory, mirroring what the backend stores.
    pub fn apply_patch(&mut self, patch: &TaskPatch) {
        if let Some(value) = patch.is_completed {
            self.is_completed = value;
        }
        if let Some(value) = patch.completed_at {
            self.completed_at = value;
        }
        if let Some(value) = patch.created_at {
            self.created_at = value;
        }
        if let Some(value) = patch.is_snoozed {
            self.is_snoozed = value;
        }
        if let Some(value) = patch.snoozed_until {
            self.snoozed_until = value;
        }
    }

    /// Whether the task shows up outside the snoozed section.
    ///
    /// An expired snooze counts as visible without an explicit unsnooze.
    pub fn is_visible(&self, now_ms: i64) -> bool {
        match (self.is_snoozed, self.snoozed_until) {
            (true, Some(until)) => now_ms >= until,
            _ => true,
        }
    }

    /// Not completed and visible.
    pub fn is_active(&self, now_ms: i64) -> bool {
        !self.is_completed && self.is_visible(now_ms)
    }

    /// Not completed and hidden by a pending snooze.
    pub fn is_snoozed_hidden(&self, now_ms: i64) -> bool {
        !self.is_completed && self.is_snoozed && !self.is_visible(now_ms)
    }

    /// Whole days since `created_at`; always `0` for completed tasks.
    pub fn days_on_list(&self, now_ms: i64) -> i64 {
        if self.is_completed {
            return 0;
        }
        (now_ms - self.created_at).abs() / DAY_MS
    }

    /// Cadence badge text, empty for non-periodic tasks.
    pub fn period_label(&self) -> String {
        period_label(self.is_periodic, self.period_type, self.period_days)
    }

    /// Remaining snooze rendered as `Ready`, `Tomorrow` or `N days`.
    ///
    /// Returns an empty string when the task is not snoozed.
    pub fn snooze_label(&self, now_ms: i64) -> String {
        let Some(until) = self.snoozed_until.filter(|_| self.is_snoozed) else {
            return String::new();
        };
        let remaining = until - now_ms;
        if remaining <= 0 {
            return "Ready".to_string();
        }
        match (remaining + DAY_MS - 1) / DAY_MS {
            1 => "Tomorrow".to_string(),
            days => format!("{days} days"),
        }
    }
}

/// Checks `period_days` against the cadence it belongs to.
pub fn validate_period_days(
    period_type: Option<PeriodType>,
    period_days: Option<u16>,
) -> Result<(), TaskValidationError> {
    match (period_type, period_days) {
        (Some(PeriodType::Custom), None) => Err(TaskValidationError::MissingPeriodDays),
        (Some(PeriodType::Custom), Some(days))
            if !(MIN_PERIOD_DAYS..=MAX_PERIOD_DAYS).contains(&days) =>
        {
            Err(TaskValidationError::PeriodDaysOutOfRange(days))
        }
        (Some(PeriodType::Custom), Some(_)) | (_, None) => Ok(()),
        (_, Some(_)) => Err(TaskValidationError::UnexpectedPeriodDays),
    }
}

#[cfg(test)]
mod tests {
    use super::{NewTask, Task, TransitionError};
    use crate::clock::DAY_MS;
    use uuid::Uuid;

    fn sample(created_at: i64) -> Task {
        NewTask {
            list_id: Uuid::new_v4(),
            title: "Buy milk".to_string(),
            is_periodic: false,
            period_type: None,
            period_days: None,
            created_at,
        }
        .into_task(Uuid::new_v4(), Uuid::new_v4())
    }

    #[test]
    fn snooze_label_counts_partial_days_up() {
        let mut task = sample(0);
        task.apply_patch(&task.snooze(3, 0).expect("snooze days in range"));

        assert_eq!(task.snooze_label(0), "3 days");
        assert_eq!(task.snooze_label(DAY_MS + 1), "2 days");
        assert_eq!(task.snooze_label(2 * DAY_MS + 1), "Tomorrow");
        assert_eq!(task.snooze_label(3 * DAY_MS), "Ready");
    }

    #[test]
    fn snooze_label_is_empty_when_not_snoozed() {
        assert_eq!(sample(0).snooze_label(0), "");
    }

    #[test]
    fn snooze_rejects_zero_and_more_than_a_year() {
        let task = sample(0);
        assert_eq!(
            task.snooze(0, 0),
            Err(TransitionError::SnoozeDaysOutOfRange(0))
        );
        assert_eq!(
            task.snooze(366, 0),
            Err(TransitionError::SnoozeDaysOutOfRange(366))
        );
        assert!(task.snooze(365, 0).is_ok());
    }

    #[test]
    fn days_on_list_uses_absolute_difference() {
        let task = sample(10 * DAY_MS);
        assert_eq!(task.days_on_list(8 * DAY_MS), 2);
        assert_eq!(task.days_on_list(10 * DAY_MS + DAY_MS - 1), 0);
    }
}
