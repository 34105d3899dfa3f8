//! Time handling types
//!
//! All instants stored by the domain are normalised to UTC. Billing-cycle
//! arithmetic in [`crate::billing_cycle`] is the only place that works in
//! the caller's own time zone.

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors related to temporal operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TemporalError {
    #[error("Invalid time range: start {start} must be before end {end}")]
    InvalidTimeRange {
        start: String,
        end: String,
    },

    #[error("Invalid date: {year}-{month:02}-{day:02}")]
    InvalidDate {
        year: i32,
        month: u32,
        day: u32,
    },

    #[error("Local time {0} does not exist in the target time zone")]
    NonexistentLocalTime(String),
}

/// Normalises any zoned timestamp to UTC
pub fn to_utc<Tz: TimeZone>(moment: &DateTime<Tz>) -> DateTime<Utc> {
    moment.with_timezone(&Utc)
}

/// Builds a validated calendar date
///
/// # Errors
///
/// Returns `InvalidDate` for dates that do not exist (e.g. February 30)
pub fn calendar_date(year: i32, month: u32, day: u32) -> Result<NaiveDate, TemporalError> {
    NaiveDate::from_ymd_opt(year, month, day).ok_or(TemporalError::InvalidDate { year, month, day })
}

/// Returns the last day number of the given month
pub fn last_day_of_month(year: i32, month: u32) -> Result<u32, TemporalError> {
    let (next_year, next_month) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
    calendar_date(next_year, next_month, 1)?
        .pred_opt()
        .map(|d| chrono::Datelike::day(&d))
        .ok_or(TemporalError::InvalidDate { year, month, day: 1 })
}

/// A closed interval of UTC time
///
/// The end is strictly after the start, so the duration is always positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeRange {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl TimeRange {
    /// Creates a new range, normalising both bounds to UTC
    pub fn new<Tz: TimeZone>(start: DateTime<Tz>, end: DateTime<Tz>) -> Result<Self, TemporalError> {
        let start = to_utc(&start);
        let end = to_utc(&end);
        if end <= start {
            return Err(TemporalError::InvalidTimeRange {
                start: start.to_rfc3339(),
                end: end.to_rfc3339(),
            });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// Returns true if the moment lies within the range, bounds included
    pub fn contains(&self, moment: DateTime<Utc>) -> bool {
        moment >= self.start && moment <= self.end
    }

    /// Returns true if the two ranges share at least one instant
    pub fn overlaps(&self, other: &TimeRange) -> bool {
        self.start <= other.end && other.start <= self.end
    }
}
