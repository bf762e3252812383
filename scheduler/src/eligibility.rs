//! Decides whether a target date is inside the currently bookable window.
//
//  The site releases the next month's slots around the 28th, so the window
//  reaches one month further once that day has passed. Pure: no async, no IO.

use chrono::{Datelike, Months, NaiveDate};

/// Day of month from which the window reaches one month further.
pub const RELEASE_DAY: u32 = 28;

/// Result of an eligibility check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Eligibility {
    Eligible,
    /// The target lies on or after the window's end.
    NotYetOpen,
}

impl Eligibility {
    pub fn is_eligible(&self) -> bool {
        matches!(self, Eligibility::Eligible)
    }
}

/// First day after the bookable window (exclusive bound).
///
/// Before the release day this is the first of the month three months out
/// (the window covers through the end of today + 2 months); from the release
/// day on it is four months out.
pub fn window_end(today: NaiveDate) -> NaiveDate {
    let months_out = if today.day() < RELEASE_DAY { 3 } else { 4 };
    today
        .with_day(1)
        .and_then(|first| first.checked_add_months(Months::new(months_out)))
        .unwrap_or(NaiveDate::MAX)
}

pub fn check_date_eligibility(today: NaiveDate, target: NaiveDate) -> Eligibility {
    if target < window_end(today) {
        Eligibility::Eligible
    } else {
        Eligibility::NotYetOpen
    }
}
