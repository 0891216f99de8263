//! Continuous-residence tests
//!
//! Rolling windows are trailing 365-day periods checked for every end day of
//! the qualifying period, with trips clipped at the window edges.

use jiff::civil::{Date, date};

use crate::calculators::continuous_residence::{
    ContinuousResidenceAnalysis, IneligibilityReason, ResidenceValidation, analyze, assemble,
};
use crate::calculators::{ContinuousResidenceCalculator, GoalCalculator};
use crate::dates::{add_days, max_date};
use crate::intervals::{DateWindow, days_away_in_window};
use crate::model::{
    ContinuousResidenceConfig, GoalStatus, MetricStatus, RequirementStatus, TrackYears, TripId,
    TripRecord, WarningDetails, WarningSeverity,
};

fn five_year() -> ContinuousResidenceConfig {
    ContinuousResidenceConfig::new(TrackYears::Five, date(2020, 1, 1))
}

fn trip(id: &str, out: Date, back: Date) -> TripRecord {
    TripRecord::between(id, out, back)
}

fn run(trips: &[TripRecord], config: &ContinuousResidenceConfig, as_of: Date) -> ContinuousResidenceAnalysis {
    analyze(trips, config, as_of)
}

// ============================================================================
// Scenario C / D: status table
// ============================================================================

#[test]
fn test_scenario_c_excessive_absence() {
    // 191 calendar days, 190 full days away
    let trips = vec![trip("long", date(2021, 3, 1), date(2021, 9, 8))];
    let analysis = run(&trips, &five_year(), date(2025, 6, 1));

    assert_eq!(analysis.max_absence_in_any_12_months, 190);
    assert!(analysis.has_exceeded_allowed_absence);
    assert_eq!(analysis.ilr_eligibility_date, None);
    assert_eq!(analysis.days_until_eligible, None);

    let worst = analysis.worst_window.unwrap();
    assert_eq!(worst.days, 190);
    assert_eq!(worst.start, date(2020, 9, 9));
    assert_eq!(worst.end, date(2021, 9, 8));

    match &analysis.validation {
        ResidenceValidation::Ineligible(IneligibilityReason::ExcessiveAbsence {
            limit,
            worst_window,
            offending_windows,
        }) => {
            assert_eq!(*limit, 180);
            assert_eq!(*worst_window, worst);
            assert!(!offending_windows.is_empty());
            assert!(offending_windows.contains(&worst));
        }
        other => panic!("expected EXCESSIVE_ABSENCE, got {other:?}"),
    }

    let result = assemble(&analysis, date(2025, 6, 1));
    assert_eq!(result.status, GoalStatus::LimitExceeded);
    assert_eq!(result.eligibility_date, None);
    assert!(result.has_errors());
    assert_eq!(
        result.metric("max_rolling_absence").unwrap().status,
        MetricStatus::Exceeded
    );
    let details = result.warnings.iter().find_map(|w| w.details.as_ref());
    assert!(matches!(
        details,
        Some(WarningDetails::ExcessiveAbsence { limit: 180, .. })
    ));
}

#[test]
fn test_scenario_d_at_risk() {
    // 160 full days away, qualifying period still running
    let trips = vec![trip("long", date(2021, 3, 1), date(2021, 8, 9))];
    let analysis = run(&trips, &five_year(), date(2023, 6, 1));

    assert_eq!(analysis.max_absence_in_any_12_months, 160);
    assert!(!analysis.has_exceeded_allowed_absence);
    assert!(analysis.offending_windows.is_empty());

    let result = assemble(&analysis, date(2023, 6, 1));
    assert_eq!(result.status, GoalStatus::AtRisk);
    assert_eq!(
        result.metric("max_rolling_absence").unwrap().status,
        MetricStatus::Warning
    );
    assert!(
        result
            .warnings
            .iter()
            .any(|w| w.title == "Approaching the absence limit")
    );
}

#[test]
fn test_at_risk_period_becomes_eligible_once_complete() {
    let trips = vec![trip("long", date(2021, 3, 1), date(2021, 8, 9))];
    let result = ContinuousResidenceCalculator.calculate(
        &trips,
        &five_year(),
        date(2020, 1, 1),
        date(2025, 1, 2),
    );
    assert_eq!(result.status, GoalStatus::Eligible);
    assert_eq!(result.eligibility_date, Some(date(2024, 12, 30)));
    assert_eq!(result.days_until_eligible, Some(0));
}

#[test]
fn test_separate_breaches_are_reported_separately() {
    let trips = vec![
        trip("first", date(2021, 1, 1), date(2021, 7, 11)),
        trip("second", date(2023, 1, 1), date(2023, 7, 11)),
    ];
    let analysis = run(&trips, &five_year(), date(2025, 6, 1));
    assert_eq!(analysis.offending_windows.len(), 2);
    assert!(analysis.offending_windows.iter().all(|w| w.days == 190));
    assert!(analysis.offending_windows[0].end < analysis.offending_windows[1].start);
    // Ties keep the earliest window
    assert_eq!(analysis.worst_window, Some(analysis.offending_windows[0]));
}

#[test]
fn test_ten_year_track_allows_184_days() {
    // 182 full days away
    let trips = vec![trip("long", date(2021, 3, 1), date(2021, 8, 31))];

    let five = run(&trips, &five_year(), date(2022, 6, 1));
    assert!(five.has_exceeded_allowed_absence);
    assert_eq!(five.absence_limit, 180);

    let ten_config = ContinuousResidenceConfig::new(TrackYears::Ten, date(2020, 1, 1));
    let ten = run(&trips, &ten_config, date(2022, 6, 1));
    assert!(!ten.has_exceeded_allowed_absence);
    assert_eq!(ten.absence_limit, 184);
    assert_eq!(assemble(&ten, date(2022, 6, 1)).status, GoalStatus::AtRisk);
}

#[test]
fn test_planned_trip_beyond_as_of_is_tested() {
    let trips = vec![trip("planned", date(2025, 2, 1), date(2025, 8, 11))];
    let config = ContinuousResidenceConfig::new(TrackYears::Five, date(2022, 1, 1));
    let analysis = run(&trips, &config, date(2024, 6, 1));

    assert!(analysis.has_exceeded_allowed_absence);
    assert_eq!(analysis.total_full_days, 0, "future days are not yet absence");
    assert_eq!(analysis.current_rolling_absence_today, 0);
}

// ============================================================================
// Totals
// ============================================================================

#[test]
fn test_current_rolling_absence_and_allowance() {
    let trips = vec![trip("ski", date(2024, 1, 10), date(2024, 1, 21))];
    let config = ContinuousResidenceConfig::new(TrackYears::Three, date(2022, 1, 1));
    let analysis = run(&trips, &config, date(2024, 6, 1));

    assert_eq!(analysis.elapsed_days, 882);
    assert_eq!(analysis.total_full_days, 10);
    assert_eq!(analysis.continuous_leave_days, 872);
    assert_eq!(analysis.current_rolling_absence_today, 10);
    assert_eq!(analysis.remaining_180_limit_today, 170);
    assert_eq!(analysis.qualifying_end, Some(date(2024, 12, 31)));

    let result = assemble(&analysis, date(2024, 6, 1));
    assert_eq!(result.status, GoalStatus::InProgress);
    // round(882 / 1095 × 100) = 81
    assert_eq!(result.progress_percent, 81);
    assert_eq!(result.metric_value("total_days_outside"), Some(10));
    assert_eq!(result.metric_value("days_present"), Some(872));
    assert_eq!(result.metric_value("remaining_allowance"), Some(170));
    assert_eq!(result.days_until_eligible, Some(213));
}

#[test]
fn test_trip_before_visa_start_is_clipped() {
    let trips = vec![trip("arrival", date(2019, 12, 1), date(2020, 1, 10))];
    let analysis = run(&trips, &five_year(), date(2020, 6, 1));
    assert_eq!(analysis.total_full_days, 8);
    assert_eq!(analysis.max_absence_in_any_12_months, 8);
}

#[test]
fn test_low_allowance_warns() {
    // 165 full days in the current window leaves 15
    let trips = vec![trip("long", date(2024, 1, 1), date(2024, 6, 15))];
    let config = ContinuousResidenceConfig::new(TrackYears::Five, date(2022, 1, 1));
    let result = ContinuousResidenceCalculator.calculate(
        &trips,
        &config,
        date(2022, 1, 1),
        date(2024, 7, 1),
    );
    assert_eq!(result.metric_value("remaining_allowance"), Some(15));
    assert_eq!(
        result.metric("remaining_allowance").unwrap().status,
        MetricStatus::Warning
    );
    assert!(result.warnings.iter().any(|w| w.title == "Low absence allowance"));
}

// ============================================================================
// Validation outcomes
// ============================================================================

#[test]
fn test_too_early_reports_earliest_allowed_date() {
    let config = ContinuousResidenceConfig::new(TrackYears::Two, date(2020, 1, 1));
    let analysis = run(&[], &config, date(2021, 6, 1));
    assert_eq!(
        analysis.validation,
        ResidenceValidation::Ineligible(IneligibilityReason::TooEarly {
            required_days: 730,
            current_days: 517,
            earliest_allowed_date: date(2021, 12, 3),
            qualifying_end_date: date(2021, 12, 31),
        })
    );
    assert_eq!(analysis.ilr_eligibility_date, Some(date(2021, 12, 31)));
    assert_eq!(assemble(&analysis, date(2021, 6, 1)).status, GoalStatus::InProgress);
}

#[test]
fn test_eligible_after_qualifying_end() {
    let config = ContinuousResidenceConfig::new(TrackYears::Two, date(2020, 1, 1));
    let trips = vec![trip("short", date(2020, 6, 1), date(2020, 6, 15))];
    let analysis = run(&trips, &config, date(2022, 1, 1));
    assert_eq!(analysis.validation, ResidenceValidation::Eligible);

    let result = assemble(&analysis, date(2022, 1, 1));
    assert_eq!(result.status, GoalStatus::Eligible);
    assert_eq!(result.progress_percent, 100);
    let reqs = result.requirements.as_ref().unwrap();
    assert!(reqs.iter().all(|r| r.status == RequirementStatus::Met));
}

#[test]
fn test_vignette_entry_moves_qualifying_start() {
    let config = ContinuousResidenceConfig::new(TrackYears::Two, date(2020, 1, 1))
        .with_vignette_entry(date(2020, 2, 1));
    let analysis = run(&[], &config, date(2021, 6, 1));
    assert_eq!(analysis.qualifying_start, Some(date(2020, 2, 1)));
    assert_eq!(analysis.qualifying_end, Some(date(2022, 1, 31)));
}

#[test]
fn test_incomplete_trips_take_precedence_over_breach() {
    let trips = vec![
        trip("long", date(2021, 3, 1), date(2021, 9, 8)),
        TripRecord::new("open", "2024-02-01", ""),
    ];
    let analysis = run(&trips, &five_year(), date(2024, 6, 1));
    assert_eq!(
        analysis.validation,
        ResidenceValidation::Ineligible(IneligibilityReason::IncompletedTrips {
            trip_ids: vec![TripId::from("open")],
        })
    );

    // The breach still drives the status and is still explained
    let result = assemble(&analysis, date(2024, 6, 1));
    assert_eq!(result.status, GoalStatus::LimitExceeded);
    assert!(result.warnings.iter().any(|w| w.title == "Incomplete trips"));
    assert!(result.warnings.iter().any(|w| w.title == "Absence limit exceeded"));
    assert_eq!(
        result.requirement("complete_trip_records").unwrap().status,
        RequirementStatus::NotMet
    );
}

#[test]
fn test_missing_visa_start_is_incorrect_input() {
    let config = ContinuousResidenceConfig {
        track_years: TrackYears::Five,
        visa_start_date: None,
        vignette_entry_date: Some(date(2020, 1, 1)),
    };
    let analysis = run(&[], &config, date(2024, 6, 1));
    assert_eq!(
        analysis.validation,
        ResidenceValidation::Ineligible(IneligibilityReason::IncorrectInput {
            missing_fields: vec!["visaStartDate".to_string()],
        })
    );

    let result = assemble(&analysis, date(2024, 6, 1));
    assert_eq!(result.status, GoalStatus::InProgress);
    assert_eq!(result.eligibility_date, None);
    assert_eq!(result.warnings.len(), 1);
    assert_eq!(result.warnings[0].severity, WarningSeverity::Error);
}

// ============================================================================
// Wire format
// ============================================================================

#[test]
fn test_analysis_wire_names() {
    let trips = vec![trip("long", date(2021, 3, 1), date(2021, 9, 8))];
    let json = serde_json::to_value(run(&trips, &five_year(), date(2025, 6, 1))).unwrap();

    assert_eq!(json["hasExceededAllowedAbsense"], true);
    assert_eq!(json["maxAbsenceInAny12Months"], 190);
    assert_eq!(json["remaining180LimitToday"], 180);
    assert_eq!(json["validation"]["outcome"], "INELIGIBLE");
    assert_eq!(json["validation"]["detail"]["reason"], "EXCESSIVE_ABSENCE");
    assert_eq!(json["validation"]["detail"]["worstWindow"]["days"], 190);
    assert_eq!(json["validation"]["detail"]["worstWindow"]["end"], "2021-09-08");
}

// ============================================================================
// Windows spanning several trips
// ============================================================================

#[test]
fn test_worst_window_sums_several_clipped_trips() {
    let trips = vec![
        trip("a", date(2021, 1, 1), date(2021, 4, 11)),
        trip("b", date(2021, 10, 1), date(2022, 1, 9)),
        trip("c", date(2022, 3, 1), date(2022, 3, 30)),
    ];
    let config = five_year();
    let as_of = date(2022, 6, 1);
    let analysis = run(&trips, &config, as_of);

    // Re-sum every trailing window trip by trip
    let start = date(2020, 1, 1);
    let last_end = max_date(as_of, analysis.qualifying_end.unwrap());
    let mut best: Option<(DateWindow, i64)> = None;
    let mut end = start;
    while end <= last_end {
        let window = DateWindow::new(max_date(add_days(end, -364), start), end).unwrap();
        let days = days_away_in_window(&trips, window);
        if best.is_none_or(|(_, most)| days > most) {
            best = Some((window, days));
        }
        end = add_days(end, 1);
    }
    let (best_window, best_days) = best.unwrap();

    assert_eq!(best_days, 189);
    assert_eq!(analysis.max_absence_in_any_12_months, best_days);
    let worst = analysis.worst_window.unwrap();
    assert_eq!((worst.start, worst.end), (best_window.start, best_window.end));
    assert_eq!((worst.start, worst.end), (date(2021, 1, 1), date(2021, 12, 31)));

    assert!(analysis.has_exceeded_allowed_absence);
    for w in &analysis.offending_windows {
        let window = DateWindow::new(w.start, w.end).unwrap();
        assert_eq!(w.days, days_away_in_window(&trips, window));
        assert!(w.days > 180);
    }
}
