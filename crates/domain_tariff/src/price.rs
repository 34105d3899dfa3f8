//! Price value object

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use core_kernel::{Currency, Money};

use crate::error::TariffError;

/// A tariff price in one currency
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    id: Uuid,
    amount: Money,
    is_default: bool,
}

impl Price {
    /// Creates a price
    ///
    /// # Errors
    ///
    /// `UnsupportedCurrency` if the amount's currency cannot be used for pricing
    pub fn new(id: Uuid, amount: Money, is_default: bool) -> Result<Self, TariffError> {
        if !amount.currency().is_supported() {
            return Err(TariffError::UnsupportedCurrency(amount.currency()));
        }
        Ok(Self {
            id,
            amount,
            is_default,
        })
    }

    /// Creates a price with a fresh identifier
    pub fn generate(amount: Money, is_default: bool) -> Result<Self, TariffError> {
        Self::new(Uuid::new_v4(), amount, is_default)
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn amount(&self) -> Money {
        self.amount
    }

    pub fn currency(&self) -> Currency {
        self.amount.currency()
    }

    pub fn is_default(&self) -> bool {
        self.is_default
    }

    pub fn format(&self) -> String {
        self.amount.format()
    }

    /// Whether this price can bill an account held in `currency`
    pub fn is_compatible_with(&self, currency: Currency) -> bool {
        self.currency() == currency
    }

    pub(crate) fn with_default(&self, is_default: bool) -> Self {
        Self {
            is_default,
            ..self.clone()
        }
    }

    /// Same price id, new amount in the same currency
    pub(crate) fn with_amount(&self, amount: Money) -> Self {
        Self {
            amount,
            ..self.clone()
        }
    }
}
