//! Threshold-window tests, mostly the 90-in-180 rule

use jiff::civil::{Date, date};

use crate::calculators::{GoalCalculator, ThresholdWindowCalculator};
use crate::model::{
    CountDirection, GoalCalculation, GoalStatus, ThresholdWindowConfig, TripRecord, WarningDetails,
};

fn schengen() -> ThresholdWindowConfig {
    ThresholdWindowConfig::new(90, 180, CountDirection::DaysAway)
}

fn run(trips: &[TripRecord], config: &ThresholdWindowConfig, as_of: Date) -> GoalCalculation {
    ThresholdWindowCalculator.calculate(trips, config, date(2024, 1, 1), as_of)
}

#[test]
fn test_usage_inside_window() {
    // 59 full days away
    let trips = vec![TripRecord::between("winter", date(2024, 1, 1), date(2024, 3, 1))];
    let result = run(&trips, &schengen(), date(2024, 3, 15));

    assert_eq!(result.status, GoalStatus::InProgress);
    assert_eq!(result.metric_value("days_used"), Some(59));
    assert_eq!(result.metric_value("days_remaining"), Some(31));
    assert_eq!(result.metric_value("usage_percent"), Some(66));
    assert!(result.warnings.is_empty());
}

#[test]
fn test_eighty_percent_is_at_risk() {
    // 75 full days away
    let trips = vec![TripRecord::between("winter", date(2024, 1, 1), date(2024, 3, 17))];
    let result = run(&trips, &schengen(), date(2024, 4, 1));
    assert_eq!(result.metric_value("days_used"), Some(75));
    assert_eq!(result.status, GoalStatus::AtRisk);
}

#[test]
fn test_breach_reports_recovery_date() {
    // 99 full days away
    let trips = vec![TripRecord::between("long", date(2024, 1, 1), date(2024, 4, 10))];
    let result = run(&trips, &schengen(), date(2024, 4, 15));

    assert_eq!(result.status, GoalStatus::LimitExceeded);
    assert_eq!(result.metric_value("days_used"), Some(99));
    assert_eq!(result.metric_value("days_remaining"), Some(0));
    assert_eq!(result.eligibility_date, Some(date(2024, 7, 7)));
    assert_eq!(result.days_until_eligible, Some(83));
    assert!(result.has_errors());
}

#[test]
fn test_historical_breach_is_flagged() {
    let trips = vec![TripRecord::between("long", date(2024, 1, 1), date(2024, 4, 10))];
    let result = run(&trips, &schengen(), date(2024, 12, 1));

    assert_eq!(result.status, GoalStatus::InProgress);
    assert_eq!(result.metric_value("days_used"), Some(0));
    assert_eq!(result.metric_value("max_window_usage"), Some(99));
    let breach = result
        .warnings
        .iter()
        .find(|w| w.title == "Earlier breach")
        .unwrap();
    assert!(matches!(
        breach.details,
        Some(WarningDetails::WindowUsage { limit: 90, .. })
    ));
}

#[test]
fn test_trips_before_goal_start_still_count() {
    let trips = vec![TripRecord::between("autumn", date(2023, 11, 1), date(2023, 12, 31))];
    // 59 full days, all before the goal starts on 2024-01-01
    let result = run(&trips, &schengen(), date(2024, 1, 15));
    assert_eq!(result.metric_value("days_used"), Some(59));
}

#[test]
fn test_presence_cap_has_no_recovery_date() {
    let config = ThresholdWindowConfig::new(90, 180, CountDirection::DaysPresent);
    let result = run(&[], &config, date(2024, 6, 1));

    assert_eq!(result.metric_value("days_used"), Some(180));
    assert_eq!(result.status, GoalStatus::LimitExceeded);
    assert_eq!(result.eligibility_date, None);
    assert_eq!(result.progress_percent, 100);
}
