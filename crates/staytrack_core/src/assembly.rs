//! Builders that turn a calculator's raw numbers into user-facing pieces:
//! metrics, warnings, checklist items and rounded percentages.

use jiff::civil::Date;

use crate::dates::days_between;
use crate::model::{
    Metric, MetricStatus, MetricUnit, Requirement, RequirementStatus, Warning, WarningDetails,
    WarningSeverity,
};

/// `round(part / whole × 100)`, half rounding up. Zero when `whole <= 0`.
pub fn percentage(part: i64, whole: i64) -> i64 {
    if whole <= 0 || part <= 0 {
        return 0;
    }
    (200 * part + whole) / (2 * whole)
}

/// [`percentage`] capped to 0..=100.
pub fn progress_percent(part: i64, whole: i64) -> u8 {
    percentage(part, whole).clamp(0, 100) as u8
}

/// Days from `as_of` until `target`, never negative.
pub fn days_until(as_of: Date, target: Date) -> i64 {
    (days_between(as_of, target) as i64).max(0)
}

/// `Exceeded` above `limit`, `Warning` from `warn_at`, else `Ok`.
pub fn threshold_status(value: i64, warn_at: i64, limit: i64) -> MetricStatus {
    if value > limit {
        MetricStatus::Exceeded
    } else if value >= warn_at {
        MetricStatus::Warning
    } else {
        MetricStatus::Ok
    }
}

impl Metric {
    pub fn days(key: &str, label: impl Into<String>, value: i64) -> Self {
        Self {
            key: key.to_string(),
            label: label.into(),
            value,
            limit: None,
            unit: MetricUnit::Days,
            status: MetricStatus::Ok,
        }
    }

    pub fn percent(key: &str, label: impl Into<String>, value: i64) -> Self {
        Self {
            unit: MetricUnit::Percent,
            ..Self::days(key, label, value)
        }
    }

    pub fn with_limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_status(mut self, status: MetricStatus) -> Self {
        self.status = status;
        self
    }
}

impl Warning {
    fn new(severity: WarningSeverity, title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity,
            title: title.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn info(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(WarningSeverity::Info, title, message)
    }

    pub fn warning(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(WarningSeverity::Warning, title, message)
    }

    pub fn error(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(WarningSeverity::Error, title, message)
    }

    pub fn with_details(mut self, details: WarningDetails) -> Self {
        self.details = Some(details);
        self
    }
}

impl Requirement {
    pub fn new(
        key: &str,
        label: impl Into<String>,
        status: RequirementStatus,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            key: key.to_string(),
            label: label.into(),
            status,
            detail: detail.into(),
        }
    }

    pub fn check(key: &str, label: impl Into<String>, met: bool, detail: impl Into<String>) -> Self {
        let status = if met {
            RequirementStatus::Met
        } else {
            RequirementStatus::NotMet
        };
        Self::new(key, label, status, detail)
    }

    pub fn is_met(&self) -> bool {
        self.status == RequirementStatus::Met
    }
}

/// "1 day" / "3 days".
pub fn plural_days(n: i64) -> String {
    if n == 1 {
        "1 day".to_string()
    } else {
        format!("{n} days")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jiff::civil::date;

    #[test]
    fn test_percentage_rounds_half_up() {
        assert_eq!(percentage(18, 61), 30);
        assert_eq!(percentage(1, 2), 50);
        assert_eq!(percentage(1, 8), 13);
        assert_eq!(percentage(0, 10), 0);
        assert_eq!(percentage(5, 0), 0);
    }

    #[test]
    fn test_progress_is_capped() {
        assert_eq!(progress_percent(3650, 1825), 100);
        assert_eq!(progress_percent(-5, 1825), 0);
        assert_eq!(progress_percent(912, 1825), 50);
    }

    #[test]
    fn test_threshold_status_boundaries() {
        assert_eq!(threshold_status(149, 150, 180), MetricStatus::Ok);
        assert_eq!(threshold_status(150, 150, 180), MetricStatus::Warning);
        assert_eq!(threshold_status(180, 150, 180), MetricStatus::Warning);
        assert_eq!(threshold_status(181, 150, 180), MetricStatus::Exceeded);
    }

    #[test]
    fn test_days_until_never_negative() {
        assert_eq!(days_until(date(2024, 1, 1), date(2024, 1, 11)), 10);
        assert_eq!(days_until(date(2024, 1, 11), date(2024, 1, 1)), 0);
    }

    #[test]
    fn test_metric_builders() {
        let m = Metric::days("max_rolling_absence", "Max absence", 160)
            .with_limit(180)
            .with_status(MetricStatus::Warning);
        assert_eq!(m.limit, Some(180));
        assert_eq!(m.unit, MetricUnit::Days);
        let p = Metric::percent("percentage", "Share", 30);
        assert_eq!(p.unit, MetricUnit::Percent);
        assert_eq!(p.status, MetricStatus::Ok);
    }
}
