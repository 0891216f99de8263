//! Engine output types
//!
//! A [`GoalCalculation`] is everything a dashboard, progress bar, warning
//! banner or export needs about one goal on one "as of" date.

use jiff::civil::Date;
use serde::{Deserialize, Serialize};

use super::ids::TripId;

/// Derived goal status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalStatus {
    InProgress,
    AtRisk,
    LimitExceeded,
    Eligible,
}

impl GoalStatus {
    pub fn label(self) -> &'static str {
        match self {
            GoalStatus::InProgress => "In progress",
            GoalStatus::AtRisk => "At risk",
            GoalStatus::LimitExceeded => "Limit exceeded",
            GoalStatus::Eligible => "Eligible",
        }
    }
}

/// Traffic-light state of a single metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricStatus {
    Ok,
    Warning,
    Exceeded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricUnit {
    Days,
    Percent,
}

/// One key/label/value/limit/status tuple.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metric {
    pub key: String,
    pub label: String,
    pub value: i64,
    pub limit: Option<i64>,
    pub unit: MetricUnit,
    pub status: MetricStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningSeverity {
    Info,
    Warning,
    Error,
}

/// A 12-month (or other fixed-length) window and the absence counted in it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowTotal {
    pub start: Date,
    pub end: Date,
    pub days: i64,
}

/// Structured payload behind a warning, for UI rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum WarningDetails {
    ExcessiveAbsence {
        limit: i64,
        worst_window: WindowTotal,
        offending_windows: Vec<WindowTotal>,
    },
    TooEarly {
        required_days: i32,
        current_days: i32,
        earliest_allowed_date: Date,
    },
    IncompleteTrips {
        trip_ids: Vec<TripId>,
    },
    IncorrectInput {
        missing_fields: Vec<String>,
    },
    WindowUsage {
        window: WindowTotal,
        limit: i64,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Warning {
    pub severity: WarningSeverity,
    pub title: String,
    pub message: String,
    pub details: Option<WarningDetails>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequirementStatus {
    Met,
    NotMet,
    /// Not yet determinable from the data supplied
    Pending,
}

/// A checklist item for goals with several independent conditions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Requirement {
    pub key: String,
    pub label: String,
    pub status: RequirementStatus,
    pub detail: String,
}

/// Result of evaluating one goal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalCalculation {
    pub status: GoalStatus,
    /// 0..=100
    pub progress_percent: u8,
    pub eligibility_date: Option<Date>,
    pub days_until_eligible: Option<i64>,
    pub metrics: Vec<Metric>,
    pub warnings: Vec<Warning>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requirements: Option<Vec<Requirement>>,
}

impl GoalCalculation {
    pub fn metric(&self, key: &str) -> Option<&Metric> {
        self.metrics.iter().find(|m| m.key == key)
    }

    pub fn metric_value(&self, key: &str) -> Option<i64> {
        self.metric(key).map(|m| m.value)
    }

    pub fn requirement(&self, key: &str) -> Option<&Requirement> {
        self.requirements
            .as_ref()
            .and_then(|reqs| reqs.iter().find(|r| r.key == key))
    }

    pub fn has_errors(&self) -> bool {
        self.warnings
            .iter()
            .any(|w| w.severity == WarningSeverity::Error)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalCategory {
    Immigration,
    Tax,
    Travel,
    Tracking,
}

/// Static presentation metadata for a goal kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayInfo {
    pub name: &'static str,
    pub icon: &'static str,
    pub description: &'static str,
    pub category: GoalCategory,
}
