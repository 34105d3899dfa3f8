//! Organization balance

use serde::{Deserialize, Serialize};

use core_kernel::{Currency, Money};

use crate::error::OrganizationError;

/// Funds held by an organization
///
/// Never negative; debits that would overdraw are refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Balance {
    amount: Money,
}

impl Balance {
    pub fn new(amount: Money) -> Self {
        Self { amount }
    }

    pub fn zero(currency: Currency) -> Self {
        Self::new(Money::zero(currency))
    }

    pub fn amount(&self) -> Money {
        self.amount
    }

    pub fn currency(&self) -> Currency {
        self.amount.currency()
    }

    pub fn is_zero(&self) -> bool {
        self.amount.is_zero()
    }

    pub fn is_positive(&self) -> bool {
        self.amount.is_positive()
    }

    /// Returns the balance increased by `amount`
    ///
    /// # Panics
    ///
    /// Panics if `amount` is negative. Callers must only credit
    /// non-negative money.
    pub fn credit(&self, amount: Money) -> Result<Balance, OrganizationError> {
        assert!(!amount.is_negative(), "cannot credit a negative amount to a balance");
        Ok(Self::new(self.amount.add(&amount)?))
    }

    /// Returns the balance decreased by `amount`
    ///
    /// # Errors
    ///
    /// * `InsufficientBalance` if the balance does not cover `amount`
    /// * `Money` on currency mismatch
    pub fn debit(&self, amount: Money) -> Result<Balance, OrganizationError> {
        if !self.amount.can_cover(&amount)? {
            return Err(OrganizationError::InsufficientBalance {
                required: amount,
                available: self.amount,
            });
        }
        Ok(Self::new(self.amount.subtract(&amount)?))
    }

    /// Whether the balance covers `amount`; false on currency mismatch
    ///
    /// # Panics
    ///
    /// Panics if `amount` is negative.
    pub fn covers(&self, amount: &Money) -> bool {
        assert!(!amount.is_negative(), "cannot check a balance against a negative amount");
        self.amount.can_cover(amount).unwrap_or(false)
    }
}
