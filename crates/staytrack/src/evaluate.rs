//! Run a profile's goals through the engine and check its data.

use std::collections::HashSet;

use jiff::civil::Date;
use serde::Serialize;
use staytrack_core::{
    DisplayInfo, GoalCalculation, GoalKind, GoalRequest, TripId, calculate_many, display_info,
    narrow_config, overlapping_pairs,
};

use crate::profile::{GoalEntry, Profile};

/// Outcome for one stored goal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalReport {
    pub name: String,
    pub kind: Option<GoalKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display: Option<DisplayInfo>,
    pub start_date: Date,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<GoalCalculation>,
    /// Why the stored configuration could not be used
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

fn start_date_for(goal: &GoalEntry, profile: &Profile, as_of: Date) -> Date {
    goal.start_date
        .or_else(|| profile.first_departure())
        .unwrap_or(as_of)
}

/// Evaluate every goal whose name contains `filter` (case-insensitive).
///
/// Goals with an invalid configuration are reported, not dropped.
pub fn evaluate_profile(profile: &Profile, as_of: Date, filter: Option<&str>) -> Vec<GoalReport> {
    let needle = filter.map(str::to_lowercase);
    let selected: Vec<&GoalEntry> = profile
        .goals
        .iter()
        .filter(|g| {
            needle
                .as_deref()
                .is_none_or(|n| g.name.to_lowercase().contains(n))
        })
        .collect();

    let mut reports = Vec::with_capacity(selected.len());
    let mut requests = Vec::new();
    let mut slots = Vec::new();

    for goal in selected {
        let start_date = start_date_for(goal, profile, as_of);
        match narrow_config(&goal.config) {
            Ok(config) => {
                let kind = config.kind();
                tracing::debug!(goal = %goal.name, %kind, %start_date, "evaluating goal");
                slots.push(reports.len());
                requests.push(GoalRequest::new(config, start_date, as_of));
                reports.push(GoalReport {
                    name: goal.name.clone(),
                    kind: Some(kind),
                    display: Some(display_info(kind)),
                    start_date,
                    result: None,
                    error: None,
                });
            }
            Err(err) => {
                tracing::warn!(goal = %goal.name, "skipping goal: {err}");
                reports.push(GoalReport {
                    name: goal.name.clone(),
                    kind: err.kind(),
                    display: None,
                    start_date,
                    result: None,
                    error: Some(err.to_string()),
                });
            }
        }
    }

    let results = calculate_many(&profile.trips, &requests);
    for (slot, result) in slots.into_iter().zip(results) {
        reports[slot].result = Some(result);
    }

    tracing::info!(
        goals = reports.len(),
        trips = profile.trips.len(),
        %as_of,
        "profile evaluated"
    );
    reports
}

/// Something in the profile the engine tolerates but the user should fix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Issue {
    IncompleteTrip { trip: TripId },
    DuplicateTripId { trip: TripId },
    OverlappingTrips { first: TripId, second: TripId },
    InvalidGoal { goal: String, reason: String },
    DuplicateGoalName { goal: String },
}

impl std::fmt::Display for Issue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Issue::IncompleteTrip { trip } => {
                write!(f, "trip {trip} is missing a departure or return date")
            }
            Issue::DuplicateTripId { trip } => write!(f, "trip id {trip} is used more than once"),
            Issue::OverlappingTrips { first, second } => {
                write!(f, "trips {first} and {second} overlap")
            }
            Issue::InvalidGoal { goal, reason } => write!(f, "goal \"{goal}\": {reason}"),
            Issue::DuplicateGoalName { goal } => {
                write!(f, "goal name \"{goal}\" is used more than once")
            }
        }
    }
}

pub fn check_profile(profile: &Profile) -> Vec<Issue> {
    let mut issues = Vec::new();

    let mut seen = HashSet::new();
    for trip in &profile.trips {
        if !seen.insert(&trip.id) {
            issues.push(Issue::DuplicateTripId {
                trip: trip.id.clone(),
            });
        }
        if trip.is_incomplete() {
            issues.push(Issue::IncompleteTrip {
                trip: trip.id.clone(),
            });
        }
    }
    issues.extend(
        overlapping_pairs(&profile.trips)
            .into_iter()
            .map(|(first, second)| Issue::OverlappingTrips { first, second }),
    );

    let mut names = HashSet::new();
    for goal in &profile.goals {
        if !names.insert(goal.name.as_str()) {
            issues.push(Issue::DuplicateGoalName {
                goal: goal.name.clone(),
            });
        }
        if let Err(err) = narrow_config(&goal.config) {
            issues.push(Issue::InvalidGoal {
                goal: goal.name.clone(),
                reason: err.to_string(),
            });
        }
    }
    issues
}
