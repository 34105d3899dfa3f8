//! Quota definitions attached to tariffs
//!
//! A `QuotaDefinition` is a pure policy object. Actual usage is tracked
//! elsewhere and passed in as a plain number.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum QuotaError {
    #[error("Quota limit must be greater than zero")]
    InvalidLimit,

    #[error("Resource type cannot be empty")]
    InvalidResourceType,

    #[error("Unit cannot be empty")]
    InvalidUnit,

    #[error("Reset period must be positive for recurring quotas")]
    InvalidResetPeriod,

    #[error("Non-recurring quota cannot have a reset period")]
    NonRecurringWithReset,
}

/// Serde helper storing a `chrono::Duration` as whole seconds
mod duration_secs {
    use chrono::Duration;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(value.num_seconds())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = i64::deserialize(deserializer)?;
        Duration::try_seconds(secs).ok_or_else(|| serde::de::Error::custom("reset period out of range"))
    }
}

/// Limit on a resource granted by a tariff
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotaDefinition {
    resource_type: String,
    limit: Decimal,
    unit: String,
    is_recurring: bool,
    #[serde(with = "duration_secs")]
    reset_period: Duration,
}

impl QuotaDefinition {
    /// Creates a validated quota
    ///
    /// Recurring quotas need a positive reset period, one-shot quotas must
    /// have none.
    pub fn new(
        resource_type: impl Into<String>,
        limit: Decimal,
        unit: impl Into<String>,
        is_recurring: bool,
        reset_period: Duration,
    ) -> Result<Self, QuotaError> {
        let quota = Self {
            resource_type: resource_type.into(),
            limit,
            unit: unit.into(),
            is_recurring,
            reset_period,
        };
        quota.validate()?;
        Ok(quota)
    }

    /// Convenience constructor for a recurring quota
    pub fn recurring(
        resource_type: impl Into<String>,
        limit: Decimal,
        unit: impl Into<String>,
        reset_period: Duration,
    ) -> Result<Self, QuotaError> {
        Self::new(resource_type, limit, unit, true, reset_period)
    }

    /// Convenience constructor for a one-shot quota
    pub fn one_shot(
        resource_type: impl Into<String>,
        limit: Decimal,
        unit: impl Into<String>,
    ) -> Result<Self, QuotaError> {
        Self::new(resource_type, limit, unit, false, Duration::zero())
    }

    /// Re-checks the invariants
    pub fn validate(&self) -> Result<(), QuotaError> {
        if self.resource_type.trim().is_empty() {
            return Err(QuotaError::InvalidResourceType);
        }
        if self.unit.trim().is_empty() {
            return Err(QuotaError::InvalidUnit);
        }
        if self.limit <= Decimal::ZERO {
            return Err(QuotaError::InvalidLimit);
        }
        if self.is_recurring && self.reset_period <= Duration::zero() {
            return Err(QuotaError::InvalidResetPeriod);
        }
        if !self.is_recurring && self.reset_period != Duration::zero() {
            return Err(QuotaError::NonRecurringWithReset);
        }
        Ok(())
    }

    pub fn resource_type(&self) -> &str {
        &self.resource_type
    }

    pub fn limit(&self) -> Decimal {
        self.limit
    }

    pub fn unit(&self) -> &str {
        &self.unit
    }

    pub fn is_recurring(&self) -> bool {
        self.is_recurring
    }

    pub fn reset_period(&self) -> Duration {
        self.reset_period
    }

    /// Whether adding a positive `increment` keeps usage within the limit
    pub fn is_within_limit(&self, current_usage: Decimal, increment: Decimal) -> bool {
        if increment <= Decimal::ZERO {
            return false;
        }
        current_usage + increment <= self.limit
    }

    /// Whether `amount` may be consumed
    ///
    /// One-shot quotas only check the single request against the limit.
    pub fn can_use(&self, current_usage: Decimal, amount: Decimal) -> bool {
        if amount <= Decimal::ZERO {
            return false;
        }
        if !self.is_recurring {
            return amount <= self.limit;
        }
        self.is_within_limit(current_usage, amount)
    }

    pub fn calculate_remaining(&self, current_usage: Decimal) -> Decimal {
        if current_usage >= self.limit {
            return Decimal::ZERO;
        }
        self.limit - current_usage
    }

    pub fn is_exceeded(&self, current_usage: Decimal) -> bool {
        current_usage >= self.limit
    }

    /// Usage as a percentage of the limit, capped at 100
    pub fn usage_percentage(&self, current_usage: Decimal) -> Decimal {
        if current_usage >= self.limit {
            return dec!(100);
        }
        if current_usage <= Decimal::ZERO {
            return Decimal::ZERO;
        }
        (current_usage / self.limit * dec!(100)).round_dp(2)
    }

    /// Whether a recurring quota's period has elapsed since `last_reset`
    pub fn needs_reset(&self, last_reset: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        self.is_recurring && now - last_reset >= self.reset_period
    }

    pub fn next_reset_time(&self, last_reset: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.is_recurring.then(|| last_reset + self.reset_period)
    }

    pub fn format_limit(&self) -> String {
        format!("{} {}", self.limit.normalize(), self.unit)
    }

    pub fn format_remaining(&self, current_usage: Decimal) -> String {
        format!("{} {}", self.calculate_remaining(current_usage).normalize(), self.unit)
    }

    /// Renders e.g. `"500/1000 tokens"`, with usage capped at the limit
    pub fn format_usage(&self, current_usage: Decimal) -> String {
        let used = current_usage.min(self.limit);
        format!("{}/{} {}", used.normalize(), self.limit.normalize(), self.unit)
    }
}
