//! Presence within a single tax year.

use jiff::civil::Date;

use super::GoalCalculator;
use crate::assembly::{days_until, plural_days, progress_percent};
use crate::dates::{add_days, days_between, min_date};
use crate::intervals::DateWindow;
use crate::ledger::AbsenceLedger;
use crate::model::{
    DisplayInfo, GoalCalculation, GoalCategory, GoalConfig, GoalKind, GoalStatus, Metric,
    MetricStatus, TaxYearConfig, TripRecord, Warning, WarningDetails,
};

/// Projected surplus below which the goal is at risk.
pub const AT_RISK_MARGIN_DAYS: i64 = 30;

/// Inclusive bounds of the tax year, `None` for an impossible start date.
pub fn tax_year_window(config: &TaxYearConfig) -> Option<DateWindow> {
    let start = config.year_start(config.tax_year)?;
    let next = config.year_start(config.tax_year.checked_add(1)?)?;
    DateWindow::new(start, add_days(next, -1))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaxYearPresence {
    pub year: DateWindow,
    pub days_present: i64,
    pub days_away: i64,
    pub projected_present: i64,
    pub remaining_days: i64,
    /// First date on which presence reaches the threshold
    pub threshold_date: Option<Date>,
}

pub fn presence(
    trips: &[TripRecord],
    config: &TaxYearConfig,
    year: DateWindow,
    as_of: Date,
) -> TaxYearPresence {
    let ledger = AbsenceLedger::build(trips, year);
    let threshold = config.threshold_days as i64;

    let (days_present, days_away) = match DateWindow::new(year.start, min_date(as_of, year.end)) {
        Some(to_date) => (ledger.days_present(to_date), ledger.days_away(to_date)),
        None => (0, 0),
    };
    let projected_present = ledger.days_present(year);
    let remaining_days = days_between(as_of, year.end).clamp(0, year.total_days() as i32) as i64;

    // Cumulative presence grows by at most one a day, so a linear scan finds
    // the first crossing.
    let threshold_date = (projected_present >= threshold)
        .then(|| {
            (0..year.total_days() as i32)
                .map(|offset| add_days(year.start, offset))
                .find(|&day| {
                    let so_far = DateWindow {
                        start: year.start,
                        end: day,
                    };
                    ledger.days_present(so_far) >= threshold
                })
        })
        .flatten();

    TaxYearPresence {
        year,
        days_present,
        days_away,
        projected_present,
        remaining_days,
        threshold_date,
    }
}

pub fn derive_status(presence: &TaxYearPresence, threshold: i64) -> GoalStatus {
    if presence.days_present >= threshold {
        GoalStatus::Eligible
    } else if presence.projected_present < threshold {
        GoalStatus::LimitExceeded
    } else if presence.projected_present - threshold < AT_RISK_MARGIN_DAYS {
        GoalStatus::AtRisk
    } else {
        GoalStatus::InProgress
    }
}

fn invalid_year(config: &TaxYearConfig) -> GoalCalculation {
    GoalCalculation {
        status: GoalStatus::InProgress,
        progress_percent: 0,
        eligibility_date: None,
        days_until_eligible: None,
        metrics: Vec::new(),
        warnings: vec![
            Warning::error(
                "Invalid tax year",
                format!(
                    "{:02}-{:02} is not a valid start date for tax year {}.",
                    config.year_start_month, config.year_start_day, config.tax_year
                ),
            )
            .with_details(WarningDetails::IncorrectInput {
                missing_fields: vec!["yearStartDay".to_string()],
            }),
        ],
        requirements: None,
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TaxYearCalculator;

impl GoalCalculator for TaxYearCalculator {
    type Config = TaxYearConfig;
    const KIND: GoalKind = GoalKind::TaxYear;

    fn calculate(
        &self,
        trips: &[TripRecord],
        config: &Self::Config,
        _start_date: Date,
        as_of: Date,
    ) -> GoalCalculation {
        let Some(year) = tax_year_window(config) else {
            return invalid_year(config);
        };
        let threshold = config.threshold_days as i64;
        let p = presence(trips, config, year, as_of);
        let status = derive_status(&p, threshold);

        let projected_status = match status {
            GoalStatus::LimitExceeded => MetricStatus::Exceeded,
            GoalStatus::AtRisk => MetricStatus::Warning,
            _ => MetricStatus::Ok,
        };
        let metrics = vec![
            Metric::days("days_present", "Days present so far", p.days_present)
                .with_limit(threshold),
            Metric::days("days_away", "Days away so far", p.days_away),
            Metric::days(
                "projected_present",
                "Projected days present",
                p.projected_present,
            )
            .with_limit(threshold)
            .with_status(projected_status),
            Metric::days("remaining_days", "Days left in the tax year", p.remaining_days),
        ];

        let mut warnings = Vec::new();
        match status {
            GoalStatus::LimitExceeded => warnings.push(Warning::error(
                "Threshold out of reach",
                format!(
                    "With the trips recorded you will be present for {} in the {}/{} tax \
                     year, short of the {threshold}-day threshold.",
                    plural_days(p.projected_present),
                    config.tax_year,
                    config.tax_year as i32 + 1,
                ),
            )),
            GoalStatus::AtRisk => warnings.push(Warning::warning(
                "Little margin left",
                format!(
                    "Projected presence of {} clears the {threshold}-day threshold by only {}.",
                    plural_days(p.projected_present),
                    plural_days(p.projected_present - threshold),
                ),
            )),
            _ => {}
        }
        if as_of < year.start {
            warnings.push(Warning::info(
                "Tax year not started",
                format!("The tax year starts on {}.", year.start),
            ));
        } else if as_of > year.end {
            warnings.push(Warning::info(
                "Tax year ended",
                format!("The tax year ended on {}; these totals are final.", year.end),
            ));
        }

        GoalCalculation {
            status,
            progress_percent: progress_percent(p.days_present, threshold),
            eligibility_date: p.threshold_date,
            days_until_eligible: p.threshold_date.map(|d| days_until(as_of, d)),
            metrics,
            warnings,
            requirements: None,
        }
    }

    fn display_info(&self) -> DisplayInfo {
        DisplayInfo {
            name: "Tax residence",
            icon: "receipt",
            description: "Count days present in a tax year against a residence threshold.",
            category: GoalCategory::Tax,
        }
    }

    fn extract(config: GoalConfig) -> Option<Self::Config> {
        match config {
            GoalConfig::TaxYear(c) => Some(c),
            _ => None,
        }
    }
}
