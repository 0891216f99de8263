//! Naturalisation calculator.
//!
//! For an application date `D` the qualifying window is `[D - period, D]`.
//! Absence is counted with the shared clipping rule, both across the whole
//! window and across the final 12 months `[D - 364, D]`.

use jiff::civil::Date;

use super::GoalCalculator;
use crate::assembly::{days_until, plural_days, progress_percent, threshold_status};
use crate::dates::{add_days, days_between, max_date, min_date};
use crate::intervals::DateWindow;
use crate::ledger::AbsenceLedger;
use crate::model::{
    CitizenshipConfig, CitizenshipRoute, DisplayInfo, GoalCalculation, GoalCategory, GoalConfig,
    GoalKind, GoalStatus, Metric, Requirement, RequirementStatus, TripRecord, Warning,
};

/// Maximum absence in the 12 months before applying, on every route.
pub const FINAL_YEAR_ABSENCE_LIMIT: i64 = 90;
pub const FINAL_YEAR_DAYS: i32 = 365;
/// Margin below a limit at which a total counts as at risk.
pub const AT_RISK_MARGIN_DAYS: i64 = 30;

/// Computed requirements for one candidate application date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApplicationCheck {
    pub application_date: Date,
    pub residence_started: bool,
    /// `None` while no settled-status date is known
    pub settled_long_enough: Option<bool>,
    pub total_absence: i64,
    pub final_year_absence: i64,
}

impl ApplicationCheck {
    /// The four requirements derived from dates and trips.
    pub fn computed_met(&self, route: CitizenshipRoute) -> bool {
        self.residence_started
            && self.settled_long_enough == Some(true)
            && self.total_absence <= route.total_absence_limit()
            && self.final_year_absence <= FINAL_YEAR_ABSENCE_LIMIT
    }
}

struct Evaluator<'a> {
    config: &'a CitizenshipConfig,
    residence_start: Date,
    ledger: AbsenceLedger,
}

impl Evaluator<'_> {
    fn check(&self, application_date: Date) -> ApplicationCheck {
        let route = self.config.route;
        let period = route.qualifying_days();
        let window_start = add_days(application_date, -period);

        let qualifying = DateWindow::new(
            max_date(window_start, self.residence_start),
            application_date,
        );
        let final_year = AbsenceLedger::trailing_window(
            application_date,
            FINAL_YEAR_DAYS,
            self.residence_start,
        );

        ApplicationCheck {
            application_date,
            residence_started: self.residence_start <= window_start,
            settled_long_enough: self
                .config
                .settled_status_date
                .map(|settled| add_days(settled, route.settled_wait_days()) <= application_date),
            total_absence: qualifying.map_or(0, |w| self.ledger.days_away(w)),
            final_year_absence: if application_date >= self.residence_start {
                self.ledger.days_away(final_year)
            } else {
                0
            },
        }
    }
}

/// Last date the forward search needs to look at.
///
/// Past this point every recorded trip has left both windows and the date
/// requirements hold, so an unmet search cannot succeed later.
fn search_horizon(
    trips: &[TripRecord],
    config: &CitizenshipConfig,
    residence_start: Date,
    as_of: Date,
) -> Date {
    let route = config.route;
    let period = route.qualifying_days();
    let last_return = trips
        .iter()
        .filter_map(TripRecord::span)
        .map(|span| span.in_date)
        .max()
        .unwrap_or(residence_start);

    let mut horizon = max_date(as_of, add_days(residence_start, period));
    horizon = max_date(horizon, add_days(last_return, period + 1));
    if let Some(settled) = config.settled_status_date {
        horizon = max_date(horizon, add_days(settled, route.settled_wait_days()));
    }
    horizon
}

fn status(current: &ApplicationCheck, config: &CitizenshipConfig, all_met: bool) -> GoalStatus {
    let total_limit = config.route.total_absence_limit();
    if all_met {
        GoalStatus::Eligible
    } else if current.total_absence > total_limit
        || current.final_year_absence > FINAL_YEAR_ABSENCE_LIMIT
    {
        GoalStatus::LimitExceeded
    } else if total_limit - current.total_absence < AT_RISK_MARGIN_DAYS
        || FINAL_YEAR_ABSENCE_LIMIT - current.final_year_absence < AT_RISK_MARGIN_DAYS
    {
        GoalStatus::AtRisk
    } else {
        GoalStatus::InProgress
    }
}

fn requirements(
    current: &ApplicationCheck,
    config: &CitizenshipConfig,
    residence_start: Date,
) -> Vec<Requirement> {
    let route = config.route;
    let period = route.qualifying_days();

    let settled = match (config.settled_status_date, current.settled_long_enough) {
        (Some(date), Some(met)) => Requirement::check(
            "settled_status",
            "Settled status held long enough",
            met,
            format!(
                "Granted {date}, may apply from {}",
                add_days(date, route.settled_wait_days())
            ),
        ),
        _ => Requirement::new(
            "settled_status",
            "Settled status held long enough",
            RequirementStatus::Pending,
            "No settled-status date recorded",
        ),
    };

    vec![
        Requirement::check(
            "residence_period",
            format!("{} years' residence", period / 365),
            current.residence_started,
            format!("Residence counted from {residence_start}"),
        ),
        settled,
        Requirement::check(
            "total_absence",
            format!(
                "No more than {} days away in the qualifying period",
                route.total_absence_limit()
            ),
            current.total_absence <= route.total_absence_limit(),
            format!("{} away", plural_days(current.total_absence)),
        ),
        Requirement::check(
            "final_year_absence",
            format!("No more than {FINAL_YEAR_ABSENCE_LIMIT} days away in the last 12 months"),
            current.final_year_absence <= FINAL_YEAR_ABSENCE_LIMIT,
            format!("{} away", plural_days(current.final_year_absence)),
        ),
        Requirement::check(
            "life_in_uk_test",
            "Life in the UK test passed",
            config.life_in_uk_test_passed,
            if config.life_in_uk_test_passed {
                "Passed"
            } else {
                "Not yet passed"
            },
        ),
        Requirement::check(
            "english_language",
            "English language requirement met",
            config.english_requirement_met,
            if config.english_requirement_met {
                "Met"
            } else {
                "Not yet met"
            },
        ),
    ]
}

fn warnings(current: &ApplicationCheck, config: &CitizenshipConfig) -> Vec<Warning> {
    let route = config.route;
    let total_limit = route.total_absence_limit();
    let mut warnings = Vec::new();

    for (label, used, limit) in [
        ("the qualifying period", current.total_absence, total_limit),
        (
            "the last 12 months",
            current.final_year_absence,
            FINAL_YEAR_ABSENCE_LIMIT,
        ),
    ] {
        if used > limit {
            warnings.push(Warning::error(
                "Absence limit exceeded",
                format!(
                    "{} away in {label}, over the {limit}-day limit. The application would \
                     normally be refused unless discretion applies.",
                    plural_days(used)
                ),
            ));
        } else if limit - used < AT_RISK_MARGIN_DAYS {
            warnings.push(Warning::warning(
                "Close to the absence limit",
                format!(
                    "{} away in {label}; only {} left before the {limit}-day limit.",
                    plural_days(used),
                    plural_days(limit - used)
                ),
            ));
        }
    }

    if config.settled_status_date.is_none() {
        warnings.push(Warning::info(
            "Settled status date missing",
            "Add the date settled status was granted to estimate an application date.",
        ));
    }
    if !config.life_in_uk_test_passed || !config.english_requirement_met {
        warnings.push(Warning::info(
            "Outstanding requirements",
            "The Life in the UK test and the English language requirement must both be met \
             before applying.",
        ));
    }
    warnings
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CitizenshipCalculator;

impl GoalCalculator for CitizenshipCalculator {
    type Config = CitizenshipConfig;
    const KIND: GoalKind = GoalKind::Citizenship;

    fn calculate(
        &self,
        trips: &[TripRecord],
        config: &Self::Config,
        start_date: Date,
        as_of: Date,
    ) -> GoalCalculation {
        let route = config.route;
        let residence_start = config.residence_start_date.unwrap_or(start_date);
        let horizon = search_horizon(trips, config, residence_start, as_of);
        let range = DateWindow {
            start: min_date(residence_start, as_of),
            end: horizon,
        };
        let evaluator = Evaluator {
            config,
            residence_start,
            ledger: AbsenceLedger::build(trips, range),
        };

        let current = evaluator.check(as_of);
        let all_met = current.computed_met(route)
            && config.life_in_uk_test_passed
            && config.english_requirement_met;

        let eligibility_date = config.settled_status_date.and_then(|_| {
            (0..=days_between(as_of, horizon))
                .map(|offset| evaluator.check(add_days(as_of, offset)))
                .find(|check| check.computed_met(route))
                .map(|check| check.application_date)
        });

        let total_limit = route.total_absence_limit();
        let elapsed = days_between(residence_start, as_of).max(0) as i64;
        let period = route.qualifying_days() as i64;

        let mut metrics = vec![
            Metric::days("residence_days", "Days of residence", elapsed).with_limit(period),
            Metric::days(
                "total_absence",
                "Days away in qualifying period",
                current.total_absence,
            )
            .with_limit(total_limit)
            .with_status(threshold_status(
                current.total_absence,
                total_limit - AT_RISK_MARGIN_DAYS + 1,
                total_limit,
            )),
            Metric::days(
                "final_year_absence",
                "Days away in the last 12 months",
                current.final_year_absence,
            )
            .with_limit(FINAL_YEAR_ABSENCE_LIMIT)
            .with_status(threshold_status(
                current.final_year_absence,
                FINAL_YEAR_ABSENCE_LIMIT - AT_RISK_MARGIN_DAYS + 1,
                FINAL_YEAR_ABSENCE_LIMIT,
            )),
        ];
        if let Some(settled) = config.settled_status_date {
            metrics.push(
                Metric::days(
                    "settled_days",
                    "Days since settled status",
                    days_between(settled, as_of).max(0) as i64,
                )
                .with_limit(route.settled_wait_days() as i64),
            );
        }

        GoalCalculation {
            status: status(&current, config, all_met),
            progress_percent: progress_percent(elapsed, period),
            eligibility_date,
            days_until_eligible: eligibility_date.map(|d| days_until(as_of, d)),
            metrics,
            warnings: warnings(&current, config),
            requirements: Some(requirements(&current, config, residence_start)),
        }
    }

    fn display_info(&self) -> DisplayInfo {
        DisplayInfo {
            name: "British citizenship",
            icon: "passport",
            description: "Check residence, absence and settled-status requirements for naturalisation.",
            category: GoalCategory::Immigration,
        }
    }

    fn extract(config: GoalConfig) -> Option<Self::Config> {
        match config {
            GoalConfig::Citizenship(c) => Some(c),
            _ => None,
        }
    }
}
