//! Add-task form state.
//!
//! # Invariants
//! - `custom_days` always lies in `1..=365`.
//! - Only periodic drafts produce a `period_type`; only custom ones produce
//!   `period_days`.

use crate::model::period::{PeriodType, MAX_PERIOD_DAYS, MIN_PERIOD_DAYS};
use crate::model::task::{ListId, NewTask};

/// Pending input for a new task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDraft {
    pub title: String,
    pub is_periodic: bool,
    /// Selected cadence; ignored unless `is_periodic`.
    pub period_type: PeriodType,
    /// Days for `PeriodType::Custom`; ignored otherwise.
    pub custom_days: u16,
}

impl Default for TaskDraft {
    fn default() -> Self {
        Self {
            title: String::new(),
            is_periodic: false,
            period_type: PeriodType::Daily,
            custom_days: MIN_PERIOD_DAYS,
        }
    }
}

impl TaskDraft {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// Marks the draft periodic with `period_type`.
    pub fn periodic(mut self, period_type: PeriodType) -> Self {
        self.is_periodic = true;
        self.period_type = period_type;
        self
    }

    /// Marks the draft as a custom cadence of `days`, clamped to range.
    pub fn every_days(mut self, days: u16) -> Self {
        self.is_periodic = true;
        self.period_type = PeriodType::Custom;
        self.custom_days = clamp_days(days);
        self
    }

    /// Accepts free-form numeric input; unparsable input falls back to 1.
    pub fn set_custom_days_input(&mut self, input: &str) {
        self.custom_days = match input.trim().parse::<i64>() {
            Ok(value) if value >= i64::from(MAX_PERIOD_DAYS) => MAX_PERIOD_DAYS,
            Ok(value) if value >= i64::from(MIN_PERIOD_DAYS) => {
                u16::try_from(value).unwrap_or(MIN_PERIOD_DAYS)
            }
            _ => MIN_PERIOD_DAYS,
        };
    }

    /// Restores defaults.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn is_submittable(&self) -> bool {
        !self.title.trim().is_empty()
    }

    /// Builds the insert payload, or `None` when the title is blank.
    pub fn to_new_task(&self, list_id: ListId, created_at: i64) -> Option<NewTask> {
        if !self.is_submittable() {
            return None;
        }
        let period_type = self.is_periodic.then_some(self.period_type);
        let period_days = match period_type {
            Some(PeriodType::Custom) => Some(self.custom_days),
            _ => None,
        };
        Some(NewTask {
            list_id,
            title: self.title.trim().to_string(),
            is_periodic: self.is_periodic,
            period_type,
            period_days,
            created_at,
        })
    }
}

fn clamp_days(days: u16) -> u16 {
    days.clamp(MIN_PERIOD_DAYS, MAX_PERIOD_DAYS)
}
