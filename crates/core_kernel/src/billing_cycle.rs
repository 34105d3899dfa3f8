//! Billing cycles and calendar-correct advancement

use chrono::{DateTime, Datelike, Duration, TimeZone};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::temporal::{calendar_date, last_day_of_month, TemporalError};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BillingCycleError {
    #[error("Unsupported billing cycle type: {0}")]
    UnsupportedBillingCycleType(String),

    #[error(transparent)]
    Temporal(#[from] TemporalError),
}

/// How often a tariff is charged
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BillingCycle {
    Hourly,
    Monthly,
    OneTime,
}

impl BillingCycle {
    /// Whether the cycle produces further billing dates
    pub fn is_recurring(&self) -> bool {
        !matches!(self, BillingCycle::OneTime)
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            BillingCycle::Hourly => "Hourly",
            BillingCycle::Monthly => "Monthly",
            BillingCycle::OneTime => "OneTime",
        }
    }

    /// Computes the next billing instant after `current`
    ///
    /// Hourly adds exactly one hour. Monthly moves to the same day of the
    /// following month, clamped to that month's last day, keeping the
    /// time of day and the time zone of `current`. OneTime has no next
    /// date and yields `None`.
    ///
    /// # Errors
    ///
    /// Fails only when the reconstructed local time does not exist in the
    /// caller's time zone (a DST gap).
    pub fn calculate_next_billing_date<Tz: TimeZone>(
        &self,
        current: &DateTime<Tz>,
    ) -> Result<Option<DateTime<Tz>>, BillingCycleError> {
        match self {
            BillingCycle::OneTime => Ok(None),
            BillingCycle::Hourly => Ok(Some(current.clone() + Duration::hours(1))),
            BillingCycle::Monthly => {
                let (year, month) = if current.month() == 12 {
                    (current.year() + 1, 1)
                } else {
                    (current.year(), current.month() + 1)
                };
                let day = current.day().min(last_day_of_month(year, month)?);
                let local = calendar_date(year, month, day)?.and_time(current.time());

                current
                    .timezone()
                    .from_local_datetime(&local)
                    .earliest()
                    .map(Some)
                    .ok_or_else(|| TemporalError::NonexistentLocalTime(local.to_string()).into())
            }
        }
    }
}

impl fmt::Display for BillingCycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for BillingCycle {
    type Err = BillingCycleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Hourly" => Ok(BillingCycle::Hourly),
            "Monthly" => Ok(BillingCycle::Monthly),
            "OneTime" => Ok(BillingCycle::OneTime),
            other => Err(BillingCycleError::UnsupportedBillingCycleType(other.to_string())),
        }
    }
}
