//! Plain day accounting over `[start_date, as_of]`. No limits, no eligibility.

use jiff::civil::Date;

use super::GoalCalculator;
use crate::assembly::{percentage, progress_percent};
use crate::intervals::{DateWindow, WindowTally, tally_window};
use crate::model::{
    CountDirection, DaysCounterConfig, DisplayInfo, GoalCalculation, GoalCategory, GoalConfig,
    GoalKind, GoalStatus, Metric, TripRecord,
};

/// Tally for the counter window; all zeros when the goal starts after `as_of`.
pub fn count(trips: &[TripRecord], start_date: Date, as_of: Date) -> WindowTally {
    match DateWindow::new(start_date, as_of) {
        Some(window) => tally_window(trips, window),
        None => WindowTally {
            total_days: 0,
            days_away: 0,
            days_present: 0,
        },
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DaysCounterCalculator;

impl GoalCalculator for DaysCounterCalculator {
    type Config = DaysCounterConfig;
    const KIND: GoalKind = GoalKind::DaysCounter;

    fn calculate(
        &self,
        trips: &[TripRecord],
        config: &Self::Config,
        start_date: Date,
        as_of: Date,
    ) -> GoalCalculation {
        let tally = count(trips, start_date, as_of);
        let place = config.reference_location.trim();

        let away_label = if place.is_empty() {
            "Days away".to_string()
        } else {
            format!("Days outside {place}")
        };
        let present_label = if place.is_empty() {
            "Days present".to_string()
        } else {
            format!("Days in {place}")
        };
        let away = Metric::days("days_away", away_label, tally.days_away);
        let present = Metric::days("days_present", present_label, tally.days_present);

        let (primary, secondary) = match config.count_direction {
            CountDirection::DaysAway => (away, present),
            CountDirection::DaysPresent => (present, away),
        };
        let share = percentage(primary.value, tally.total_days);

        GoalCalculation {
            status: GoalStatus::InProgress,
            progress_percent: progress_percent(primary.value, tally.total_days),
            eligibility_date: None,
            days_until_eligible: None,
            metrics: vec![
                primary,
                secondary,
                Metric::days("total_days", "Days tracked", tally.total_days),
                Metric::percent("percentage", "Share of tracked days", share),
            ],
            warnings: Vec::new(),
            requirements: None,
        }
    }

    fn display_info(&self) -> DisplayInfo {
        DisplayInfo {
            name: "Day counter",
            icon: "calendar",
            description: "Count days away or present since a start date.",
            category: GoalCategory::Tracking,
        }
    }

    fn extract(config: GoalConfig) -> Option<Self::Config> {
        match config {
            GoalConfig::DaysCounter(c) => Some(c),
            _ => None,
        }
    }
}
