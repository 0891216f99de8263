//! Worked examples and properties shared by every calculator

use jiff::civil::date;

use crate::calculators::calculate;
use crate::intervals::{DateWindow, full_days_in_window, has_overlapping_trips, tally_window};
use crate::model::{
    ContinuousResidenceConfig, CountDirection, DaysCounterConfig, GoalConfig, GoalStatus,
    MetricUnit, TrackYears, TripRecord, TripSpan,
};

fn counter(direction: CountDirection) -> GoalConfig {
    GoalConfig::DaysCounter(DaysCounterConfig::new(direction, "UK"))
}

fn scenario_a_trips() -> Vec<TripRecord> {
    vec![
        TripRecord::between("t1", date(2024, 1, 5), date(2024, 1, 15)),
        TripRecord::between("t2", date(2024, 2, 10), date(2024, 2, 20)),
    ]
}

// ============================================================================
// Days counter scenarios
// ============================================================================

#[test]
fn test_scenario_a_days_away() {
    let result = calculate(
        &scenario_a_trips(),
        &counter(CountDirection::DaysAway),
        date(2024, 1, 1),
        date(2024, 3, 1),
    );

    assert_eq!(result.metrics[0].key, "days_away", "primary metric follows direction");
    assert_eq!(result.metric_value("days_away"), Some(18));
    assert_eq!(result.metric_value("days_present"), Some(43));
    assert_eq!(result.metric_value("total_days"), Some(61));
    assert_eq!(result.metric_value("percentage"), Some(30));
    assert_eq!(result.metric("percentage").unwrap().unit, MetricUnit::Percent);
    assert_eq!(result.progress_percent, 30);

    assert_eq!(result.status, GoalStatus::InProgress);
    assert_eq!(result.eligibility_date, None);
    assert_eq!(result.days_until_eligible, None);
    assert!(result.warnings.is_empty());
    assert!(result.requirements.is_none());
}

#[test]
fn test_scenario_a_days_present_is_primary() {
    let result = calculate(
        &scenario_a_trips(),
        &counter(CountDirection::DaysPresent),
        date(2024, 1, 1),
        date(2024, 3, 1),
    );
    assert_eq!(result.metrics[0].key, "days_present");
    assert_eq!(result.metrics[0].label, "Days in UK");
    // round(43 / 61 × 100) = 70
    assert_eq!(result.metric_value("percentage"), Some(70));
}

#[test]
fn test_scenario_b_clipped_contribution() {
    let span = TripSpan::new(date(2023, 12, 25), date(2024, 1, 5)).unwrap();
    let window = DateWindow::new(date(2024, 1, 1), date(2024, 2, 29)).unwrap();
    assert_eq!(full_days_in_window(span, window), 3);

    let trips = vec![TripRecord::between("xmas", date(2023, 12, 25), date(2024, 1, 5))];
    let result = calculate(
        &trips,
        &counter(CountDirection::DaysAway),
        date(2024, 1, 1),
        date(2024, 2, 29),
    );
    assert_eq!(result.metric_value("days_away"), Some(3));
    assert_eq!(result.metric_value("total_days"), Some(60));
}

#[test]
fn test_scenario_e_single_day_without_trips() {
    let result = calculate(
        &[],
        &counter(CountDirection::DaysAway),
        date(2024, 5, 1),
        date(2024, 5, 1),
    );
    assert_eq!(result.metric_value("total_days"), Some(1));
    assert_eq!(result.metric_value("days_away"), Some(0));
    assert_eq!(result.metric_value("days_present"), Some(1));
}

#[test]
fn test_counter_starting_after_as_of_is_empty() {
    let result = calculate(
        &scenario_a_trips(),
        &counter(CountDirection::DaysAway),
        date(2024, 6, 1),
        date(2024, 1, 1),
    );
    assert_eq!(result.metric_value("total_days"), Some(0));
    assert_eq!(result.metric_value("days_away"), Some(0));
    assert_eq!(result.progress_percent, 0);
}

#[test]
fn test_counter_without_location_uses_plain_labels() {
    let config = GoalConfig::DaysCounter(DaysCounterConfig::new(CountDirection::DaysAway, ""));
    let result = calculate(&[], &config, date(2024, 1, 1), date(2024, 1, 31));
    assert_eq!(result.metrics[0].label, "Days away");
}

// ============================================================================
// Properties
// ============================================================================

#[test]
fn test_partition_law_over_many_windows() {
    let trips = vec![
        TripRecord::between("a", date(2023, 11, 20), date(2024, 1, 3)),
        TripRecord::between("b", date(2024, 2, 1), date(2024, 2, 2)),
        TripRecord::between("c", date(2024, 4, 30), date(2024, 7, 1)),
        TripRecord::new("d", "2024-08-01", ""),
    ];
    let bounds = [
        date(2023, 12, 1),
        date(2024, 1, 3),
        date(2024, 2, 1),
        date(2024, 5, 15),
        date(2024, 12, 31),
    ];
    for &start in &bounds {
        for &end in bounds.iter().filter(|e| **e >= start) {
            let tally = tally_window(&trips, DateWindow::new(start, end).unwrap());
            assert_eq!(
                tally.days_away + tally.days_present,
                tally.total_days,
                "window {start}..{end}"
            );
            assert!(tally.days_away >= 0 && tally.days_present >= 0);
        }
    }
}

#[test]
fn test_day_invariant_for_complete_trips() {
    for days in 0..40 {
        let out = date(2024, 1, 1);
        let span = TripSpan::new(out, crate::dates::add_days(out, days)).unwrap();
        assert!(span.full_days() >= 0);
        assert!(span.full_days() <= span.calendar_days());
        if span.calendar_days() >= 1 {
            assert_eq!(span.full_days(), span.calendar_days() - 1);
        }
    }
}

#[test]
fn test_overlap_check_is_symmetric() {
    let cases = [
        ((1, 1, 1, 10), (1, 10, 1, 20)),
        ((1, 1, 1, 10), (1, 11, 1, 20)),
        ((1, 1, 3, 1), (1, 5, 1, 6)),
        ((2, 1, 2, 1), (2, 1, 2, 1)),
        ((3, 1, 3, 5), (1, 1, 2, 1)),
    ];
    for ((am, ad, bm, bd), (cm, cd, dm, dd)) in cases {
        let a = TripRecord::between("a", date(2024, am, ad), date(2024, bm, bd));
        let b = TripRecord::between("b", date(2024, cm, cd), date(2024, dm, dd));
        assert_eq!(
            has_overlapping_trips(&[a.clone(), b.clone()]),
            has_overlapping_trips(&[b, a])
        );
    }
}

#[test]
fn test_calculate_is_idempotent() {
    let trips = vec![
        TripRecord::between("a", date(2021, 3, 1), date(2021, 9, 8)),
        TripRecord::between("b", date(2022, 6, 1), date(2022, 6, 20)),
        TripRecord::new("c", "2023-01-01", ""),
    ];
    let config = GoalConfig::ContinuousResidence(ContinuousResidenceConfig::new(
        TrackYears::Five,
        date(2020, 1, 1),
    ));
    let first = calculate(&trips, &config, date(2020, 1, 1), date(2024, 6, 1));
    let second = calculate(&trips, &config, date(2020, 1, 1), date(2024, 6, 1));
    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[test]
fn test_progress_is_capped_at_100() {
    let config = GoalConfig::ContinuousResidence(ContinuousResidenceConfig::new(
        TrackYears::Two,
        date(2010, 1, 1),
    ));
    let result = calculate(&[], &config, date(2010, 1, 1), date(2024, 1, 1));
    assert_eq!(result.progress_percent, 100);
    assert_eq!(result.status, GoalStatus::Eligible);
}

#[test]
fn test_overlapping_trips_still_produce_a_result() {
    let trips = vec![
        TripRecord::between("a", date(2024, 1, 1), date(2024, 1, 20)),
        TripRecord::between("b", date(2024, 1, 10), date(2024, 1, 30)),
    ];
    let result = calculate(
        &trips,
        &counter(CountDirection::DaysAway),
        date(2024, 1, 1),
        date(2024, 1, 31),
    );
    let away = result.metric_value("days_away").unwrap();
    let total = result.metric_value("total_days").unwrap();
    assert!(away <= total);
    assert_eq!(result.metric_value("days_present"), Some(total - away));
}
