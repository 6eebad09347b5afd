use std::fmt;

use chrono::{Days, NaiveDate};

use crate::error::FlightError;

/// Widest span the availability endpoint accepts in one request (start day plus six).
pub const MAX_SPAN: u32 = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub span: u32,
}

impl DateWindow {
    /// Last day covered by the window, inclusive.
    pub fn end(&self) -> NaiveDate {
        self.start + Days::new(u64::from(self.span))
    }
}

impl fmt::Display for DateWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..={}", self.start, self.end())
    }
}

/// Inclusive calendar range with `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, FlightError> {
        if start > end {
            return Err(FlightError::Validation(format!(
                "start date {start} is after end date {end}"
            )));
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn windows(&self) -> Vec<DateWindow> {
        plan_windows(self.start, self.end)
    }
}

/// Tiles `[start, end]` with the fewest windows of at most `MAX_SPAN + 1` days.
///
/// Windows are contiguous and non-overlapping, and the last one ends on `end`.
/// Returns nothing when `start > end`.
pub fn plan_windows(start: NaiveDate, end: NaiveDate) -> Vec<DateWindow> {
    let total = (end - start).num_days();
    let mut windows = Vec::new();
    let mut current = start;
    let mut consumed: i64 = 0;

    while consumed <= total {
        let span = (total - consumed).min(i64::from(MAX_SPAN)) as u32;
        windows.push(DateWindow {
            start: current,
            span,
        });
        consumed += i64::from(span) + 1;
        match current.checked_add_days(Days::new(u64::from(span) + 1)) {
            Some(next) => current = next,
            None => break,
        }
    }

    windows
}
