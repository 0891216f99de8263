//! Day-indexed absence ledger for rolling-window sweeps.
//!
//! The ledger marks every day that lies strictly inside a complete trip and
//! keeps a prefix sum over those marks. For any window `[ws, we]` the clipped
//! contribution of all trips (see [`crate::intervals::full_days_in_window`])
//! is then
//!
//! ```text
//! marked(ws..=we) - marked(ws) - marked(we)
//! ```
//!
//! because a trip straddling a window edge loses exactly that edge day to
//! clipping, and an edge day is marked exactly when some trip straddles it.
//! Each window costs O(1) after an O(days + trips) build, so sweeping every
//! 12-month window of a ten-year track is linear in the track length.

use jiff::civil::Date;

use crate::dates::{DayNumber, add_days, day_number, from_day_number, max_date, min_date};
use crate::intervals::DateWindow;
use crate::model::{TripRecord, WindowTotal};

#[derive(Debug, Clone)]
pub struct AbsenceLedger {
    range: DateWindow,
    origin: DayNumber,
    /// Number of trips each day lies strictly inside (0 or 1 for valid input)
    marks: Vec<u32>,
    /// `prefix[i]` = sum of `marks[..i]`
    prefix: Vec<i64>,
}

impl AbsenceLedger {
    /// Build over `range`. Days outside it are treated as present.
    pub fn build(trips: &[TripRecord], range: DateWindow) -> Self {
        let origin = day_number(range.start);
        let len = (day_number(range.end) - origin + 1).max(1) as usize;
        let mut marks = vec![0u32; len];

        for span in trips.iter().filter_map(TripRecord::span) {
            let first = (day_number(span.out_date) + 1).max(origin);
            let last = (day_number(span.in_date) - 1).min(origin + len as i32 - 1);
            for day in first..=last {
                marks[(day - origin) as usize] += 1;
            }
        }

        let mut prefix = Vec::with_capacity(len + 1);
        prefix.push(0i64);
        let mut running = 0i64;
        for &m in &marks {
            running += m as i64;
            prefix.push(running);
        }

        Self {
            range,
            origin,
            marks,
            prefix,
        }
    }

    pub fn range(&self) -> DateWindow {
        self.range
    }

    fn index(&self, date: Date) -> usize {
        (day_number(date) - self.origin) as usize
    }

    /// Whether `date` is a full day away. Days outside the range are not.
    pub fn is_away(&self, date: Date) -> bool {
        self.range.contains(date) && self.marks[self.index(date)] > 0
    }

    fn mark(&self, date: Date) -> i64 {
        if self.range.contains(date) {
            self.marks[self.index(date)] as i64
        } else {
            0
        }
    }

    /// Clip `window` to the ledger range; `None` when they do not meet.
    fn clamp(&self, window: DateWindow) -> Option<DateWindow> {
        DateWindow::new(
            max_date(window.start, self.range.start),
            min_date(window.end, self.range.end),
        )
    }

    /// Clipped full days away within `window`.
    ///
    /// `window` is first truncated to the ledger range, so callers must build
    /// the ledger over every day their windows can reach.
    pub fn days_away(&self, window: DateWindow) -> i64 {
        let Some(w) = self.clamp(window) else {
            return 0;
        };
        if w.start == w.end {
            return 0;
        }
        let marked = self.prefix[self.index(w.end) + 1] - self.prefix[self.index(w.start)];
        marked - self.mark(w.start) - self.mark(w.end)
    }

    /// Days present within `window` (the complement of [`Self::days_away`]).
    pub fn days_present(&self, window: DateWindow) -> i64 {
        window.total_days() - self.days_away(window)
    }

    /// Trailing window of `length` days ending on `end`, never starting
    /// before `floor`.
    pub fn trailing_window(end: Date, length: i32, floor: Date) -> DateWindow {
        let start = max_date(add_days(end, -(length - 1)), floor);
        DateWindow {
            start: min_date(start, end),
            end,
        }
    }

    /// Every trailing window of `length` days whose end lies in `ends`,
    /// truncated so no window starts before the ledger range.
    pub fn rolling(&self, length: i32, ends: DateWindow) -> impl Iterator<Item = WindowTotal> + '_ {
        let floor = self.range.start;
        let first = day_number(ends.start);
        let last = day_number(ends.end);
        (first..=last).map(move |rd| {
            let window = Self::trailing_window(from_day_number(rd), length, floor);
            WindowTotal {
                start: window.start,
                end: window.end,
                days: self.days_away(window),
            }
        })
    }
}
