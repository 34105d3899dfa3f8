//! Core error types used across the system

use thiserror::Error;

use crate::billing_cycle::BillingCycleError;
use crate::identifiers::IdError;
use crate::money::MoneyError;
use crate::quota::QuotaError;
use crate::temporal::TemporalError;

/// Core error type for the kernel
///
/// Aggregates the value-type errors so callers that only touch the kernel
/// can use a single error type with `?`.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Money error: {0}")]
    Money(#[from] MoneyError),

    #[error("Temporal error: {0}")]
    Temporal(#[from] TemporalError),

    #[error("Identifier error: {0}")]
    Id(#[from] IdError),

    #[error("Quota error: {0}")]
    Quota(#[from] QuotaError),

    #[error("Billing cycle error: {0}")]
    BillingCycle(#[from] BillingCycleError),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl CoreError {
    pub fn validation(message: impl Into<String>) -> Self {
        CoreError::Validation(message.into())
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        CoreError::Configuration(message.into())
    }
}

impl From<::config::ConfigError> for CoreError {
    fn from(err: ::config::ConfigError) -> Self {
        CoreError::Configuration(err.to_string())
    }
}
