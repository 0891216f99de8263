//! Continuous-residence (settlement) calculator.
//!
//! Qualifying period: `track_years × 365` days counted from the first entry
//! on the visa (or the visa start date). Absence is tested over trailing
//! 365-day windows `[D - 364, D]` for *every* end day D from the qualifying
//! start to the later of the "as of" date and the qualifying end, so planned
//! trips are tested too. Windows that would begin before the qualifying start
//! are truncated to it. Each trip contributes its clipped full days.

use jiff::civil::Date;
use serde::Serialize;

use super::GoalCalculator;
use crate::assembly::{days_until, plural_days, progress_percent, threshold_status};
use crate::dates::{add_days, days_between, max_date};
use crate::intervals::{DateWindow, incomplete_trip_ids};
use crate::ledger::AbsenceLedger;
use crate::model::{
    ContinuousResidenceConfig, DisplayInfo, GoalCalculation, GoalCategory, GoalConfig, GoalKind,
    GoalStatus, Metric, MetricStatus, Requirement, TrackYears, TripId, TripRecord, Warning,
    WarningDetails, WindowTotal,
};

/// Length of a rolling 12-month window.
pub const ROLLING_WINDOW_DAYS: i32 = 365;
/// Worst-window absence at which a goal is flagged at risk.
pub const AT_RISK_ABSENCE_DAYS: i64 = 150;
/// Remaining allowance below which the allowance metric warns.
pub const LOW_ALLOWANCE_DAYS: i64 = 30;
/// Applications are accepted this many days before the qualifying end.
pub const EARLY_APPLICATION_DAYS: i32 = 28;

/// Why a continuous-residence goal is not yet met.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(
    tag = "reason",
    rename_all = "SCREAMING_SNAKE_CASE",
    rename_all_fields = "camelCase"
)]
pub enum IneligibilityReason {
    /// At least one rolling window exceeded the limit
    ExcessiveAbsence {
        limit: i64,
        worst_window: WindowTotal,
        offending_windows: Vec<WindowTotal>,
    },
    /// Qualifying period not yet elapsed
    TooEarly {
        required_days: i32,
        current_days: i32,
        earliest_allowed_date: Date,
        qualifying_end_date: Date,
    },
    /// Trips with missing dates make the totals unreliable
    IncompletedTrips { trip_ids: Vec<TripId> },
    /// Required configuration fields are missing
    IncorrectInput { missing_fields: Vec<String> },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "detail", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResidenceValidation {
    Eligible,
    Ineligible(IneligibilityReason),
}

impl ResidenceValidation {
    pub fn is_eligible(&self) -> bool {
        matches!(self, ResidenceValidation::Eligible)
    }

    pub fn reason(&self) -> Option<&IneligibilityReason> {
        match self {
            ResidenceValidation::Eligible => None,
            ResidenceValidation::Ineligible(reason) => Some(reason),
        }
    }
}

/// Raw numbers behind a continuous-residence result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContinuousResidenceAnalysis {
    pub track_years: TrackYears,
    pub qualifying_start: Option<Date>,
    pub qualifying_end: Option<Date>,
    pub required_days: i32,
    /// Days elapsed since the qualifying start, up to the "as of" date
    pub elapsed_days: i32,
    pub total_full_days: i64,
    pub continuous_leave_days: i64,
    pub max_absence_in_any_12_months: i64,
    pub worst_window: Option<WindowTotal>,
    pub offending_windows: Vec<WindowTotal>,
    pub current_rolling_absence_today: i64,
    pub absence_limit: i64,
    pub remaining_180_limit_today: i64,
    #[serde(rename = "hasExceededAllowedAbsense")]
    pub has_exceeded_allowed_absence: bool,
    pub ilr_eligibility_date: Option<Date>,
    pub days_until_eligible: Option<i64>,
    pub incomplete_trip_ids: Vec<TripId>,
    pub validation: ResidenceValidation,
}

/// Worst window overall plus one representative per run of exceeding windows.
#[derive(Debug, Default)]
struct RollingSweep {
    worst: Option<WindowTotal>,
    offending: Vec<WindowTotal>,
}

/// Consecutive exceeding end days form one run, reported by its worst
/// window. Ties keep the earliest window.
fn sweep_rolling_windows(ledger: &AbsenceLedger, limit: i64) -> RollingSweep {
    let mut sweep = RollingSweep::default();
    let mut run: Option<WindowTotal> = None;

    for window in ledger.rolling(ROLLING_WINDOW_DAYS, ledger.range()) {
        if sweep.worst.is_none_or(|w| window.days > w.days) {
            sweep.worst = Some(window);
        }
        if window.days > limit {
            if run.is_none_or(|r| window.days > r.days) {
                run = Some(window);
            }
        } else if let Some(r) = run.take() {
            sweep.offending.push(r);
        }
    }
    if let Some(r) = run {
        sweep.offending.push(r);
    }
    sweep
}

pub fn analyze(
    trips: &[TripRecord],
    config: &ContinuousResidenceConfig,
    as_of: Date,
) -> ContinuousResidenceAnalysis {
    let track_years = config.track_years;
    let required_days = track_years.qualifying_days();
    let absence_limit = track_years.absence_limit();
    let incomplete = incomplete_trip_ids(trips);

    let start = match (config.visa_start_date, config.qualifying_start()) {
        (Some(_), Some(start)) => start,
        _ => {
            return ContinuousResidenceAnalysis {
                track_years,
                qualifying_start: None,
                qualifying_end: None,
                required_days,
                elapsed_days: 0,
                total_full_days: 0,
                continuous_leave_days: 0,
                max_absence_in_any_12_months: 0,
                worst_window: None,
                offending_windows: Vec::new(),
                current_rolling_absence_today: 0,
                absence_limit,
                remaining_180_limit_today: absence_limit,
                has_exceeded_allowed_absence: false,
                ilr_eligibility_date: None,
                days_until_eligible: None,
                incomplete_trip_ids: incomplete,
                validation: ResidenceValidation::Ineligible(IneligibilityReason::IncorrectInput {
                    missing_fields: vec!["visaStartDate".to_string()],
                }),
            };
        }
    };

    let qualifying_end = add_days(start, required_days);
    let range = DateWindow {
        start,
        end: max_date(as_of, qualifying_end),
    };
    let ledger = AbsenceLedger::build(trips, range);

    let elapsed_days = days_between(start, as_of).max(0);
    let total_full_days = DateWindow::new(start, as_of).map_or(0, |w| ledger.days_away(w));
    let continuous_leave_days = (elapsed_days as i64 - total_full_days).max(0);

    let sweep = sweep_rolling_windows(&ledger, absence_limit);
    let max_absence = sweep.worst.map_or(0, |w| w.days);
    let has_exceeded = !sweep.offending.is_empty();

    let current_rolling = if as_of >= start {
        ledger.days_away(AbsenceLedger::trailing_window(as_of, ROLLING_WINDOW_DAYS, start))
    } else {
        0
    };

    let ilr_eligibility_date = (!has_exceeded).then_some(qualifying_end);
    let days_until_eligible = ilr_eligibility_date.map(|d| days_until(as_of, d));

    let validation = if !incomplete.is_empty() {
        ResidenceValidation::Ineligible(IneligibilityReason::IncompletedTrips {
            trip_ids: incomplete.clone(),
        })
    } else if let (true, Some(worst)) = (has_exceeded, sweep.worst) {
        ResidenceValidation::Ineligible(IneligibilityReason::ExcessiveAbsence {
            limit: absence_limit,
            worst_window: worst,
            offending_windows: sweep.offending.clone(),
        })
    } else if as_of < qualifying_end {
        ResidenceValidation::Ineligible(IneligibilityReason::TooEarly {
            required_days,
            current_days: elapsed_days,
            earliest_allowed_date: add_days(qualifying_end, -EARLY_APPLICATION_DAYS),
            qualifying_end_date: qualifying_end,
        })
    } else {
        ResidenceValidation::Eligible
    };

    ContinuousResidenceAnalysis {
        track_years,
        qualifying_start: Some(start),
        qualifying_end: Some(qualifying_end),
        required_days,
        elapsed_days,
        total_full_days,
        continuous_leave_days,
        max_absence_in_any_12_months: max_absence,
        worst_window: sweep.worst,
        offending_windows: sweep.offending,
        current_rolling_absence_today: current_rolling,
        absence_limit,
        remaining_180_limit_today: absence_limit - current_rolling,
        has_exceeded_allowed_absence: has_exceeded,
        ilr_eligibility_date,
        days_until_eligible,
        incomplete_trip_ids: incomplete,
        validation,
    }
}

/// | validation == Eligible      | eligible       |
/// | exceeded allowed absence    | limit_exceeded |
/// | worst window >= 150 days    | at_risk        |
/// | otherwise                   | in_progress    |
pub fn derive_status(
    validation: &ResidenceValidation,
    has_exceeded_allowed_absence: bool,
    max_absence_in_any_12_months: i64,
) -> GoalStatus {
    if validation.is_eligible() {
        GoalStatus::Eligible
    } else if has_exceeded_allowed_absence {
        GoalStatus::LimitExceeded
    } else if max_absence_in_any_12_months >= AT_RISK_ABSENCE_DAYS {
        GoalStatus::AtRisk
    } else {
        GoalStatus::InProgress
    }
}

fn metrics(a: &ContinuousResidenceAnalysis) -> Vec<Metric> {
    let remaining_status = if a.remaining_180_limit_today < 0 {
        MetricStatus::Exceeded
    } else if a.remaining_180_limit_today < LOW_ALLOWANCE_DAYS {
        MetricStatus::Warning
    } else {
        MetricStatus::Ok
    };

    vec![
        Metric::days("total_days_outside", "Days outside the UK", a.total_full_days),
        Metric::days("days_present", "Days in the UK", a.continuous_leave_days),
        Metric::days(
            "max_rolling_absence",
            "Most days away in any 12 months",
            a.max_absence_in_any_12_months,
        )
        .with_limit(a.absence_limit)
        .with_status(threshold_status(
            a.max_absence_in_any_12_months,
            AT_RISK_ABSENCE_DAYS,
            a.absence_limit,
        )),
        Metric::days(
            "current_rolling_absence",
            "Days away in the last 12 months",
            a.current_rolling_absence_today,
        )
        .with_limit(a.absence_limit)
        .with_status(threshold_status(
            a.current_rolling_absence_today,
            AT_RISK_ABSENCE_DAYS,
            a.absence_limit,
        )),
        Metric::days(
            "remaining_allowance",
            "Absence allowance left today",
            a.remaining_180_limit_today,
        )
        .with_limit(a.absence_limit)
        .with_status(remaining_status),
        Metric::days("qualifying_days", "Qualifying days completed", a.elapsed_days as i64)
            .with_limit(a.required_days as i64),
    ]
}

fn excessive_absence_warning(limit: i64, worst: WindowTotal, offending: &[WindowTotal]) -> Warning {
    let periods = match offending.len() {
        1 => "One rolling 12-month period exceeds".to_string(),
        n => format!("{n} separate rolling 12-month periods exceed"),
    };
    Warning::error(
        "Absence limit exceeded",
        format!(
            "You were outside the UK for {} between {} and {}, more than the {}-day limit \
             for any 12-month period. {} the limit, which normally breaks continuous residence.",
            plural_days(worst.days),
            worst.start,
            worst.end,
            limit,
            periods,
        ),
    )
    .with_details(WarningDetails::ExcessiveAbsence {
        limit,
        worst_window: worst,
        offending_windows: offending.to_vec(),
    })
}

fn warnings(a: &ContinuousResidenceAnalysis, as_of: Date) -> Vec<Warning> {
    let mut warnings = Vec::new();

    if let Some(IneligibilityReason::IncorrectInput { missing_fields }) = a.validation.reason() {
        warnings.push(
            Warning::error(
                "Missing goal details",
                "Add the visa start date to calculate continuous residence.",
            )
            .with_details(WarningDetails::IncorrectInput {
                missing_fields: missing_fields.clone(),
            }),
        );
        return warnings;
    }

    if !a.incomplete_trip_ids.is_empty() {
        let ids: Vec<&str> = a.incomplete_trip_ids.iter().map(TripId::as_str).collect();
        warnings.push(
            Warning::warning(
                "Incomplete trips",
                format!(
                    "{} trip(s) are missing a departure or return date ({}). They are left out \
                     of every total until both dates are filled in.",
                    ids.len(),
                    ids.join(", "),
                ),
            )
            .with_details(WarningDetails::IncompleteTrips {
                trip_ids: a.incomplete_trip_ids.clone(),
            }),
        );
    }

    match a.worst_window {
        Some(worst) if a.has_exceeded_allowed_absence => {
            warnings.push(excessive_absence_warning(
                a.absence_limit,
                worst,
                &a.offending_windows,
            ));
        }
        Some(worst) if a.max_absence_in_any_12_months >= AT_RISK_ABSENCE_DAYS => {
            warnings.push(
                Warning::warning(
                    "Approaching the absence limit",
                    format!(
                        "Your longest 12-month absence is {} ({} to {}), within {} of the \
                         {}-day limit.",
                        plural_days(worst.days),
                        worst.start,
                        worst.end,
                        plural_days(a.absence_limit - worst.days),
                        a.absence_limit,
                    ),
                )
                .with_details(WarningDetails::WindowUsage {
                    window: worst,
                    limit: a.absence_limit,
                }),
            );
        }
        _ => {}
    }

    let started = a.qualifying_start.is_some_and(|start| as_of >= start);
    if started
        && !a.has_exceeded_allowed_absence
        && (0..LOW_ALLOWANCE_DAYS).contains(&a.remaining_180_limit_today)
    {
        warnings.push(Warning::warning(
            "Low absence allowance",
            format!(
                "Only {} of absence remain in the current 12-month period.",
                plural_days(a.remaining_180_limit_today),
            ),
        ));
    }

    if !a.has_exceeded_allowed_absence
        && let (Some(end), Some(start)) = (a.qualifying_end, a.qualifying_start)
        && as_of < end
    {
        let earliest = add_days(end, -EARLY_APPLICATION_DAYS);
        let message = if as_of < start {
            format!("The qualifying period starts on {start} and ends on {end}.")
        } else {
            format!(
                "{} of {} qualifying days completed. The qualifying period ends on {end}; \
                 applications are accepted from {earliest}.",
                a.elapsed_days, a.required_days,
            )
        };
        warnings.push(
            Warning::info("Qualifying period in progress", message).with_details(
                WarningDetails::TooEarly {
                    required_days: a.required_days,
                    current_days: a.elapsed_days,
                    earliest_allowed_date: earliest,
                },
            ),
        );
    }

    warnings
}

fn requirements(a: &ContinuousResidenceAnalysis, as_of: Date) -> Vec<Requirement> {
    let period_met = a.qualifying_end.is_some_and(|end| as_of >= end);
    let period_detail = match a.qualifying_end {
        Some(end) => format!("{} of {} days, ends {end}", a.elapsed_days, a.required_days),
        None => "Visa start date missing".to_string(),
    };
    vec![
        Requirement::check(
            "qualifying_period",
            format!("{} years' continuous residence", a.track_years.years()),
            period_met,
            period_detail,
        ),
        Requirement::check(
            "absence_limit",
            format!("No more than {} days away in any 12 months", a.absence_limit),
            a.qualifying_start.is_some() && !a.has_exceeded_allowed_absence,
            format!(
                "Longest 12-month absence: {}",
                plural_days(a.max_absence_in_any_12_months)
            ),
        ),
        Requirement::check(
            "complete_trip_records",
            "All trips have departure and return dates",
            a.incomplete_trip_ids.is_empty(),
            format!("{} incomplete trip(s)", a.incomplete_trip_ids.len()),
        ),
    ]
}

/// Turn an analysis into a user-facing result.
pub fn assemble(analysis: &ContinuousResidenceAnalysis, as_of: Date) -> GoalCalculation {
    GoalCalculation {
        status: derive_status(
            &analysis.validation,
            analysis.has_exceeded_allowed_absence,
            analysis.max_absence_in_any_12_months,
        ),
        progress_percent: progress_percent(
            analysis.elapsed_days as i64,
            analysis.required_days as i64,
        ),
        eligibility_date: analysis.ilr_eligibility_date,
        days_until_eligible: analysis.days_until_eligible,
        metrics: metrics(analysis),
        warnings: warnings(analysis, as_of),
        requirements: Some(requirements(analysis, as_of)),
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ContinuousResidenceCalculator;

impl GoalCalculator for ContinuousResidenceCalculator {
    type Config = ContinuousResidenceConfig;
    const KIND: GoalKind = GoalKind::ContinuousResidence;

    /// The qualifying period comes from the config; `start_date` is unused.
    fn calculate(
        &self,
        trips: &[TripRecord],
        config: &Self::Config,
        _start_date: Date,
        as_of: Date,
    ) -> GoalCalculation {
        assemble(&analyze(trips, config, as_of), as_of)
    }

    fn display_info(&self) -> DisplayInfo {
        DisplayInfo {
            name: "Indefinite leave to remain",
            icon: "home",
            description: "Track continuous residence and the 12-month absence limit towards settlement.",
            category: GoalCategory::Immigration,
        }
    }

    fn extract(config: GoalConfig) -> Option<Self::Config> {
        match config {
            GoalConfig::ContinuousResidence(c) => Some(c),
            _ => None,
        }
    }
}
