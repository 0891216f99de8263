//! Interval utilities shared by every calculator.
//!
//! Three rules live here and nowhere else:
//! - overlap: after sorting by departure, a trip overlaps when it departs on
//!   or before the latest return seen so far (touching boundaries overlap);
//! - day counts: `full_days = max(0, calendar_days - 1)`, so travel days are
//!   never days absent;
//! - clipping: a trip's contribution to a window is the full days of the trip
//!   after its ends are pulled inside the window.

use jiff::civil::Date;
use serde::{Deserialize, Serialize};

use crate::dates::{days_between, max_date, min_date};
use crate::model::{TripId, TripRecord, TripSpan, TripWithCalculations};

/// Inclusive analysis window. Invariant: `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateWindow {
    pub start: Date,
    pub end: Date,
}

impl DateWindow {
    pub fn new(start: Date, end: Date) -> Option<Self> {
        (start <= end).then_some(Self { start, end })
    }

    /// Single-day window.
    pub fn day(date: Date) -> Self {
        Self {
            start: date,
            end: date,
        }
    }

    /// Inclusive day count, always at least 1.
    pub fn total_days(&self) -> i64 {
        days_between(self.start, self.end) as i64 + 1
    }

    pub fn contains(&self, date: Date) -> bool {
        self.start <= date && date <= self.end
    }
}

/// Day accounting for one window. `days_away + days_present == total_days`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowTally {
    pub total_days: i64,
    pub days_away: i64,
    pub days_present: i64,
}

pub fn with_calculations(trips: &[TripRecord]) -> Vec<TripWithCalculations> {
    trips.iter().map(TripWithCalculations::from_record).collect()
}

/// Ids of trips with a missing, unparseable or inverted date.
pub fn incomplete_trip_ids(trips: &[TripRecord]) -> Vec<TripId> {
    trips
        .iter()
        .filter(|t| t.is_incomplete())
        .map(|t| t.id.clone())
        .collect()
}

/// Complete trips sorted by departure, then return.
fn sorted_spans(trips: &[TripRecord]) -> Vec<(&TripId, TripSpan)> {
    let mut spans: Vec<_> = trips
        .iter()
        .filter_map(|t| t.span().map(|s| (&t.id, s)))
        .collect();
    spans.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(b.0)));
    spans
}

/// Whether any two complete trips overlap. Incomplete trips are ignored.
pub fn has_overlapping_trips(trips: &[TripRecord]) -> bool {
    let spans = sorted_spans(trips);
    let mut latest_return: Option<Date> = None;
    for (_, span) in spans {
        if latest_return.is_some_and(|back| span.out_date <= back) {
            return true;
        }
        latest_return = Some(latest_return.map_or(span.in_date, |back| max_date(back, span.in_date)));
    }
    false
}

/// Every overlapping pair, each reported as (earlier trip, later trip).
///
/// The earlier trip is whichever complete trip still extends furthest when
/// the later one departs.
pub fn overlapping_pairs(trips: &[TripRecord]) -> Vec<(TripId, TripId)> {
    let spans = sorted_spans(trips);
    let mut pairs = Vec::new();
    let mut holder: Option<(&TripId, Date)> = None;
    for (id, span) in spans {
        match holder {
            Some((held_id, back)) if span.out_date <= back => {
                pairs.push((held_id.clone(), id.clone()));
                if span.in_date > back {
                    holder = Some((id, span.in_date));
                }
            }
            _ => holder = Some((id, span.in_date)),
        }
    }
    pairs
}

/// Pull a trip's ends inside `window`; `None` when the trip lies entirely
/// outside it.
pub fn clip_to_window(span: TripSpan, window: DateWindow) -> Option<TripSpan> {
    if span.in_date < window.start || span.out_date > window.end {
        return None;
    }
    Some(TripSpan {
        out_date: max_date(span.out_date, window.start),
        in_date: min_date(span.in_date, window.end),
    })
}

/// A trip's contribution to `window`: `max(0, diff(effectiveIn, effectiveOut) - 1)`.
pub fn full_days_in_window(span: TripSpan, window: DateWindow) -> i64 {
    clip_to_window(span, window).map_or(0, |clipped| clipped.full_days() as i64)
}

/// Sum of clipped contributions of all complete trips.
pub fn days_away_in_window(trips: &[TripRecord], window: DateWindow) -> i64 {
    trips
        .iter()
        .filter_map(TripRecord::span)
        .map(|span| full_days_in_window(span, window))
        .sum()
}

pub fn tally_window(trips: &[TripRecord], window: DateWindow) -> WindowTally {
    let total_days = window.total_days();
    let days_away = days_away_in_window(trips, window).min(total_days);
    WindowTally {
        total_days,
        days_away,
        days_present: total_days - days_away,
    }
}
