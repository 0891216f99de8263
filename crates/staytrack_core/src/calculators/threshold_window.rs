//! Fixed-length trailing window with a day cap, e.g. Schengen 90/180.
//!
//! The window ending on `as_of` is `[as_of - window_days + 1, as_of]`. Trips
//! that began before the goal start still count towards it.

use jiff::civil::Date;

use super::GoalCalculator;
use crate::assembly::{days_until, plural_days, percentage, progress_percent, threshold_status};
use crate::dates::{add_days, day_number, from_day_number, min_date};
use crate::intervals::DateWindow;
use crate::ledger::AbsenceLedger;
use crate::model::{
    CountDirection, DisplayInfo, GoalCalculation, GoalCategory, GoalConfig, GoalKind, GoalStatus,
    Metric, ThresholdWindowConfig, TripRecord, Warning, WarningDetails, WindowTotal,
};

/// Usage share of the threshold at which the goal is at risk.
pub const AT_RISK_PERCENT: i64 = 80;

struct WindowCounter {
    ledger: AbsenceLedger,
    length: i32,
    direction: CountDirection,
}

impl WindowCounter {
    fn count(&self, window: DateWindow) -> i64 {
        match self.direction {
            CountDirection::DaysAway => self.ledger.days_away(window),
            CountDirection::DaysPresent => self.ledger.days_present(window),
        }
    }

    fn ending_on(&self, end: Date) -> WindowTotal {
        let window = AbsenceLedger::trailing_window(end, self.length, Date::MIN);
        WindowTotal {
            start: window.start,
            end,
            days: self.count(window),
        }
    }

    /// Worst window ending in `ends`, earliest on ties.
    fn worst(&self, ends: DateWindow) -> Option<WindowTotal> {
        (day_number(ends.start)..=day_number(ends.end))
            .map(|rd| self.ending_on(from_day_number(rd)))
            .fold(None, |worst: Option<WindowTotal>, w| match worst {
                Some(best) if best.days >= w.days => Some(best),
                _ => Some(w),
            })
    }
}

/// Smallest usage at which the goal turns at risk: `ceil(threshold × 80%)`.
fn at_risk_from(threshold: i64) -> i64 {
    (threshold * AT_RISK_PERCENT + 99) / 100
}

pub fn derive_status(used: i64, threshold: i64) -> GoalStatus {
    if used > threshold {
        GoalStatus::LimitExceeded
    } else if used >= at_risk_from(threshold) {
        GoalStatus::AtRisk
    } else {
        GoalStatus::InProgress
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ThresholdWindowCalculator;

impl GoalCalculator for ThresholdWindowCalculator {
    type Config = ThresholdWindowConfig;
    const KIND: GoalKind = GoalKind::ThresholdWindow;

    fn calculate(
        &self,
        trips: &[TripRecord],
        config: &Self::Config,
        start_date: Date,
        as_of: Date,
    ) -> GoalCalculation {
        let length = config.window_days.max(1) as i32;
        let threshold = config.threshold_days as i64;
        let first_end = min_date(start_date, as_of);

        let range = DateWindow {
            start: add_days(first_end, -(length - 1)),
            end: add_days(as_of, length),
        };
        let counter = WindowCounter {
            ledger: AbsenceLedger::build(trips, range),
            length,
            direction: config.count_direction,
        };

        let current = counter.ending_on(as_of);
        let used = current.days;
        let worst = counter
            .worst(DateWindow {
                start: first_end,
                end: as_of,
            })
            .unwrap_or(current);
        let status = derive_status(used, threshold);

        // Only absence can fall out of the window without new travel.
        let recovery_date = match (status, config.count_direction) {
            (GoalStatus::LimitExceeded, CountDirection::DaysAway) => (1..=length)
                .map(|offset| counter.ending_on(add_days(as_of, offset)))
                .find(|w| w.days <= threshold)
                .map(|w| w.end),
            _ => None,
        };

        let counted = match config.count_direction {
            CountDirection::DaysAway => "away",
            CountDirection::DaysPresent => "present",
        };
        let metrics = vec![
            Metric::days("days_used", format!("Days {counted} in window"), used)
                .with_limit(threshold)
                .with_status(threshold_status(used, at_risk_from(threshold), threshold)),
            Metric::days(
                "days_remaining",
                "Days left in window",
                (threshold - used).max(0),
            ),
            Metric::days("max_window_usage", "Most days in any window", worst.days)
                .with_limit(threshold)
                .with_status(threshold_status(worst.days, at_risk_from(threshold), threshold)),
            Metric::percent(
                "usage_percent",
                "Share of allowance used",
                percentage(used, threshold),
            ),
        ];

        let mut warnings = Vec::new();
        match status {
            GoalStatus::LimitExceeded => {
                let recovery = match recovery_date {
                    Some(date) => format!(" You are back within the limit from {date}."),
                    None => String::new(),
                };
                warnings.push(
                    Warning::error(
                        "Window limit exceeded",
                        format!(
                            "{} {counted} between {} and {}, over the {threshold}-day limit for \
                             any {length}-day period.{recovery}",
                            plural_days(used),
                            current.start,
                            current.end,
                        ),
                    )
                    .with_details(WarningDetails::WindowUsage {
                        window: current,
                        limit: threshold,
                    }),
                );
            }
            GoalStatus::AtRisk => warnings.push(
                Warning::warning(
                    "Close to the window limit",
                    format!("{used} of {threshold} days used in the current {length}-day window."),
                )
                .with_details(WarningDetails::WindowUsage {
                    window: current,
                    limit: threshold,
                }),
            ),
            _ => {}
        }
        if status != GoalStatus::LimitExceeded && worst.days > threshold {
            warnings.push(
                Warning::warning(
                    "Earlier breach",
                    format!(
                        "The {length}-day window from {} to {} held {}, over the \
                         {threshold}-day limit.",
                        worst.start,
                        worst.end,
                        plural_days(worst.days),
                    ),
                )
                .with_details(WarningDetails::WindowUsage {
                    window: worst,
                    limit: threshold,
                }),
            );
        }

        GoalCalculation {
            status,
            progress_percent: progress_percent(used, threshold),
            eligibility_date: recovery_date,
            days_until_eligible: recovery_date.map(|d| days_until(as_of, d)),
            metrics,
            warnings,
            requirements: None,
        }
    }

    fn display_info(&self) -> DisplayInfo {
        DisplayInfo {
            name: "Rolling stay limit",
            icon: "globe",
            description: "Keep days within a cap over any trailing window, such as 90 days in 180.",
            category: GoalCategory::Travel,
        }
    }

    fn extract(config: GoalConfig) -> Option<Self::Config> {
        match config {
            GoalConfig::ThresholdWindow(c) => Some(c),
            _ => None,
        }
    }
}
