//! Periodic cadence model and display labels.
//!
//! Recurrence is descriptive only: completing a periodic task does not
//! create a follow-up task.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Smallest accepted `period_days` for custom cadences.
pub const MIN_PERIOD_DAYS: u16 = 1;
/// Largest accepted `period_days` for custom cadences.
pub const MAX_PERIOD_DAYS: u16 = 365;

/// Recurrence cadence of a periodic task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeriodType {
    Daily,
    Weekly,
    Monthly,
    Quarterly,
    Yearly,
    /// Every `period_days` days.
    Custom,
}

impl PeriodType {
    pub const ALL: [PeriodType; 6] = [
        PeriodType::Daily,
        PeriodType::Weekly,
        PeriodType::Monthly,
        PeriodType::Quarterly,
        PeriodType::Yearly,
        PeriodType::Custom,
    ];

    /// Storage and wire name.
    pub fn as_str(self) -> &'static str {
        match self {
            PeriodType::Daily => "daily",
            PeriodType::Weekly => "weekly",
            PeriodType::Monthly => "monthly",
            PeriodType::Quarterly => "quarterly",
            PeriodType::Yearly => "yearly",
            PeriodType::Custom => "custom",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "daily" => Some(PeriodType::Daily),
            "weekly" => Some(PeriodType::Weekly),
            "monthly" => Some(PeriodType::Monthly),
            "quarterly" => Some(PeriodType::Quarterly),
            "yearly" => Some(PeriodType::Yearly),
            "custom" => Some(PeriodType::Custom),
            _ => None,
        }
    }
}

impl Display for PeriodType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for unknown cadence names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownPeriodType(pub String);

impl Display for UnknownPeriodType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "unknown period type `{}`; expected daily|weekly|monthly|quarterly|yearly|custom",
            self.0
        )
    }
}

impl Error for UnknownPeriodType {}

impl FromStr for PeriodType {
    type Err = UnknownPeriodType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        Self::parse(normalized.as_str()).ok_or_else(|| UnknownPeriodType(s.to_string()))
    }
}

/// Maps periodic fields to the badge shown next to a task.
///
/// - not periodic -> `""`
/// - fixed cadences -> `Daily`, `Weekly`, `Monthly`, `Quarterly`, `Yearly`
/// - custom with days -> `Every N days`
/// - periodic without a usable cadence -> `Periodic`
pub fn period_label(
    is_periodic: bool,
    period_type: Option<PeriodType>,
    period_days: Option<u16>,
) -> String {
    if !is_periodic {
        return String::new();
    }

    match (period_type, period_days) {
        (Some(PeriodType::Daily), _) => "Daily".to_string(),
        (Some(PeriodType::Weekly), _) => "Weekly".to_string(),
        (Some(PeriodType::Monthly), _) => "Monthly".to_string(),
        (Some(PeriodType::Quarterly), _) => "Quarterly".to_string(),
        (Some(PeriodType::Yearly), _) => "Yearly".to_string(),
        (Some(PeriodType::Custom), Some(days)) => format!("Every {days} days"),
        (Some(PeriodType::Custom), None) | (None, _) => "Periodic".to_string(),
    }
}
