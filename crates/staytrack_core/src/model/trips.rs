//! Trip records and their derived day counts.

use jiff::civil::Date;
use serde::{Deserialize, Serialize};

use super::ids::TripId;
use crate::dates::{days_between, parse_iso_date};

/// One round trip away from the tracked jurisdiction, as supplied by the
/// import or manual-entry layer.
///
/// Dates stay as the raw ISO strings the caller stored; a missing or
/// unparseable date marks the trip incomplete rather than failing the
/// calculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripRecord {
    pub id: TripId,
    /// Departure date
    #[serde(default)]
    pub out_date: String,
    /// Return date
    #[serde(default)]
    pub in_date: String,
    #[serde(default)]
    pub out_route: String,
    #[serde(default)]
    pub in_route: String,
}

impl TripRecord {
    pub fn new(id: impl Into<String>, out_date: impl Into<String>, in_date: impl Into<String>) -> Self {
        Self {
            id: TripId::new(id),
            out_date: out_date.into(),
            in_date: in_date.into(),
            out_route: String::new(),
            in_route: String::new(),
        }
    }

    /// Convenience constructor from parsed dates.
    pub fn between(id: impl Into<String>, out_date: Date, in_date: Date) -> Self {
        Self::new(id, out_date.to_string(), in_date.to_string())
    }

    pub fn with_routes(mut self, out_route: impl Into<String>, in_route: impl Into<String>) -> Self {
        self.out_route = out_route.into();
        self.in_route = in_route.into();
        self
    }

    /// Parsed interval, or `None` when the trip is incomplete.
    ///
    /// A trip is complete when both dates parse and `out_date <= in_date`.
    pub fn span(&self) -> Option<TripSpan> {
        let out_date = parse_iso_date(&self.out_date)?;
        let in_date = parse_iso_date(&self.in_date)?;
        TripSpan::new(out_date, in_date)
    }

    pub fn is_incomplete(&self) -> bool {
        self.span().is_none()
    }
}

/// A complete trip interval. Invariant: `out_date <= in_date`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripSpan {
    pub out_date: Date,
    pub in_date: Date,
}

impl TripSpan {
    pub fn new(out_date: Date, in_date: Date) -> Option<Self> {
        (out_date <= in_date).then_some(Self { out_date, in_date })
    }

    /// `diff(in_date, out_date)`.
    pub fn calendar_days(&self) -> i32 {
        days_between(self.out_date, self.in_date)
    }

    /// Days absent: the departure and return days do not count.
    pub fn full_days(&self) -> i32 {
        (self.calendar_days() - 1).max(0)
    }
}

/// A trip record enriched with its derived day counts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripWithCalculations {
    #[serde(flatten)]
    pub trip: TripRecord,
    pub calendar_days: i32,
    pub full_days: i32,
    pub is_incomplete: bool,
}

impl TripWithCalculations {
    pub fn from_record(trip: &TripRecord) -> Self {
        let (calendar_days, full_days, is_incomplete) = match trip.span() {
            Some(span) => (span.calendar_days(), span.full_days(), false),
            None => (0, 0, true),
        };
        Self {
            trip: trip.clone(),
            calendar_days,
            full_days,
            is_incomplete,
        }
    }
}
