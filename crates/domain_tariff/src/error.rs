//! Tariff domain errors

use thiserror::Error;

use core_kernel::{Currency, MoneyError};

/// Errors that can occur in the tariff domain
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TariffError {
    /// Tariff name is empty or blank
    #[error("Tariff name cannot be empty")]
    InvalidName,

    /// Recurring billing cycle without any price
    #[error("Missing prices for periodic billing cycle")]
    MissingPrices,

    /// A one-shot quota on a recurring tariff
    #[error("Quota definition for {resource_type} is incompatible with the billing cycle")]
    IncompatibleQuotaDefinition {
        resource_type: String,
    },

    #[error("Price for currency {0} already exists")]
    CurrencyAlreadyExists(Currency),

    /// Mutation attempted on an archived tariff
    #[error("Tariff is archived")]
    ArchivedTariff,

    #[error("Tariff is already archived")]
    AlreadyArchived,

    #[error("Cannot remove the last price")]
    LastPriceRemoval,

    #[error("Price for currency {0} not found")]
    PriceNotFound(Currency),

    #[error("Only one price can be marked as default")]
    MultipleDefaultPrices,

    /// Currency exists in the registry but cannot be used for pricing
    #[error("Currency {0} is not supported for pricing")]
    UnsupportedCurrency(Currency),

    #[error("Cannot set price for past dates")]
    EffectiveDateInPast,

    #[error("Billing period must not be negative")]
    InvalidBillingPeriod,

    #[error("Money error: {0}")]
    Money(#[from] MoneyError),
}
