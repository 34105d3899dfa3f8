//! Organization domain errors
//!
//! This module defines all error types that can occur within the
//! organization domain.

use thiserror::Error;

use core_kernel::{BillingCycleError, Currency, Money, MoneyError, TariffId};
use domain_tariff::TariffError;

/// Errors that can occur in the organization domain
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum OrganizationError {
    #[error("Organization name cannot be empty")]
    InvalidName,

    /// Deposit amount is zero or otherwise unusable
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// The organization is suspended or terminated
    #[error("Organization is suspended")]
    OrganizationSuspended,

    #[error("Insufficient balance: required {required}, available {available}")]
    InsufficientBalance {
        required: Money,
        available: Money,
    },

    #[error("Billing period must be positive")]
    InvalidBillingPeriod,

    #[error("Cannot resume with zero balance")]
    ZeroBalanceResume,

    #[error("Organization is already terminated")]
    AlreadyTerminated,

    #[error("Organization is terminated")]
    Terminated,

    /// Invalid state transition attempted
    #[error("Invalid state transition from {from} to {to}")]
    InvalidStateTransition {
        from: String,
        to: String,
    },

    #[error("Tariff {0} is archived")]
    TariffArchived(TariffId),

    /// The tariff has prices, but none in the balance currency
    #[error("Tariff {tariff_id} has no price in {currency}")]
    TariffCurrencyMismatch {
        tariff_id: TariffId,
        currency: Currency,
    },

    #[error("Money error: {0}")]
    Money(#[from] MoneyError),

    #[error("Tariff error: {0}")]
    Tariff(#[from] TariffError),

    #[error("Billing cycle error: {0}")]
    BillingCycle(#[from] BillingCycleError),
}

impl OrganizationError {
    /// Creates an invalid state transition error
    pub fn invalid_transition(from: impl std::fmt::Debug, to: &str) -> Self {
        OrganizationError::InvalidStateTransition {
            from: format!("{:?}", from),
            to: to.to_string(),
        }
    }
}
