//! Calendar-day arithmetic for trip intervals and analysis windows.
//!
//! Every window bound check and day count in the engine reduces to integer
//! math on Rata Die day numbers (days since 0001-01-01), so a ten-year sweep
//! never touches `jiff::Span`. Dates cross the API boundary as
//! `jiff::civil::Date`; day numbers stay internal to the sweep code.

use jiff::civil::Date;

/// Rata Die day number. Day 1 is 0001-01-01.
pub type DayNumber = i32;

/// Convert a civil date to its Rata Die day number.
///
/// Proleptic Gregorian, March-based year so February is the last month and
/// the leap day needs no special case.
#[inline]
pub fn day_number(d: Date) -> DayNumber {
    let y = d.year() as i32;
    let m = d.month() as i32;
    let day = d.day() as i32;

    let a = (14 - m) / 12;
    let y2 = y - a;
    let m2 = m + 12 * a - 3;

    day + (153 * m2 + 2) / 5 + 365 * y2 + y2 / 4 - y2 / 100 + y2 / 400 - 306
}

/// Inverse of [`day_number`]. Out-of-range numbers saturate to
/// `Date::MIN` / `Date::MAX` instead of panicking.
pub fn from_day_number(rd: DayNumber) -> Date {
    let lo = day_number(Date::MIN);
    let hi = day_number(Date::MAX);
    if rd <= lo {
        return Date::MIN;
    }
    if rd >= hi {
        return Date::MAX;
    }

    let z = rd + 306;
    let h = 100 * z - 25;
    let a = h.div_euclid(3_652_425);
    let b = a - a.div_euclid(4);
    let y = (100 * b + h).div_euclid(36_525);
    let c = b + z - 365 * y - y.div_euclid(4);
    let m = (5 * c + 456) / 153;
    let day = c - (153 * m - 457) / 5;

    let (year, month) = if m > 12 { (y + 1, m - 12) } else { (y, m) };

    Date::new(year as i16, month as i8, day as i8).unwrap_or(Date::MAX)
}

/// Signed number of days from `from` to `to` (`to - from`).
#[inline]
pub fn days_between(from: Date, to: Date) -> i32 {
    day_number(to) - day_number(from)
}

/// Shift a date by `n` days (negative moves backwards).
#[inline]
pub fn add_days(d: Date, n: i32) -> Date {
    from_day_number(day_number(d).saturating_add(n))
}

/// Parse an ISO calendar date.
///
/// Accepts `YYYY-MM-DD`, with or without surrounding whitespace, and drops a
/// trailing `T...` time component so timestamps serialized by browsers
/// (`2024-01-05T00:00:00.000Z`) still resolve to their calendar date.
/// Anything else returns `None`.
pub fn parse_iso_date(raw: &str) -> Option<Date> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    let date_part = match trimmed.find(['T', 't', ' ']) {
        Some(idx) => &trimmed[..idx],
        None => trimmed,
    };
    date_part.parse::<Date>().ok()
}

/// Earlier of two dates.
#[inline]
pub fn min_date(a: Date, b: Date) -> Date {
    if a <= b { a } else { b }
}

/// Later of two dates.
#[inline]
pub fn max_date(a: Date, b: Date) -> Date {
    if a >= b { a } else { b }
}
