//! Injected wall-clock abstraction
//!
//! Aggregates never read the system time themselves; every mutating method
//! receives a `&dyn Clock`.

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};

/// Source of the current time
pub trait Clock: Send + Sync {
    /// Returns the current instant in UTC
    fn now(&self) -> DateTime<Utc>;

    /// Returns the current calendar date in UTC
    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

/// Clock backed by the operating system
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock frozen at a fixed instant, for deterministic tests and replays
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock {
    now: DateTime<Utc>,
}

impl FixedClock {
    pub fn new<Tz: TimeZone>(now: DateTime<Tz>) -> Self {
        Self {
            now: now.with_timezone(&Utc),
        }
    }

    /// Moves the clock to a new instant
    pub fn set<Tz: TimeZone>(&mut self, now: DateTime<Tz>) {
        self.now = now.with_timezone(&Utc);
    }

    /// Moves the clock forward by `step`
    pub fn advance(&mut self, step: Duration) {
        self.now += step;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.now
    }
}
