//! Money types with precise decimal arithmetic
//!
//! This module provides a type-safe representation of monetary values
//! using rust_decimal for precise calculations without floating-point errors.
//!
//! A `Money` value is never negative. Debits and credits are modelled as
//! direction on the owning record, not as signed amounts.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Currencies known to the billing system
///
/// The registry is fixed. A currency that is listed but not supported
/// (KZT) can still carry amounts, but cannot be used for tariff prices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    RUB,
    KZT,
    USD,
    EUR,
    JPY,
}

impl Currency {
    /// Returns the number of decimal places for this currency
    pub fn decimal_places(&self) -> u32 {
        match self {
            Currency::JPY => 0,
            _ => 2,
        }
    }

    /// Returns the currency symbol
    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::RUB => "₽",
            Currency::KZT => "₸",
            Currency::USD => "$",
            Currency::EUR => "€",
            Currency::JPY => "¥",
        }
    }

    /// Returns the ISO 4217 code
    pub fn code(&self) -> &'static str {
        match self {
            Currency::RUB => "RUB",
            Currency::KZT => "KZT",
            Currency::USD => "USD",
            Currency::EUR => "EUR",
            Currency::JPY => "JPY",
        }
    }

    /// Whether the currency may be used for pricing
    pub fn is_supported(&self) -> bool {
        !matches!(self, Currency::KZT)
    }

    /// Looks a currency up by its code, ignoring case
    pub fn from_code(code: &str) -> Result<Self, MoneyError> {
        match code.trim().to_ascii_uppercase().as_str() {
            "RUB" => Ok(Currency::RUB),
            "KZT" => Ok(Currency::KZT),
            "USD" => Ok(Currency::USD),
            "EUR" => Ok(Currency::EUR),
            "JPY" => Ok(Currency::JPY),
            _ => Err(MoneyError::UnsupportedCurrency(code.to_string())),
        }
    }

    /// The smallest representable amount, `10^-decimal_places`
    pub fn minimal_unit(&self) -> Decimal {
        Decimal::new(1, self.decimal_places())
    }

    /// Returns true if the amount is non-negative and an exact multiple
    /// of the minimal unit
    pub fn is_valid_amount(&self, amount: Decimal) -> bool {
        amount >= Decimal::ZERO && amount.round_dp(self.decimal_places()) == amount
    }

    /// Formats an amount as `"<fixed amount> <symbol>"`
    pub fn format_amount(&self, amount: Decimal) -> String {
        let dp = self.decimal_places();
        let rounded = round_half_up(amount, dp);
        format!("{:.dp$} {}", rounded, self.symbol(), dp = dp as usize)
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for Currency {
    type Err = MoneyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Currency::from_code(s)
    }
}

/// Errors that can occur during money operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MoneyError {
    #[error("Currency mismatch: cannot operate on {0} and {1}")]
    CurrencyMismatch(String, String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Amount {amount} has invalid decimal places for {currency}")]
    InvalidDecimalPlaces {
        amount: Decimal,
        currency: String,
    },

    #[error("Unsupported currency: {0}")]
    UnsupportedCurrency(String),

    #[error("Division by zero")]
    DivisionByZero,

    #[error("Overflow during calculation")]
    Overflow,
}

/// Rounds half away from zero; for the non-negative amounts used here this
/// is plain round-half-up
fn round_half_up(amount: Decimal, dp: u32) -> Decimal {
    amount.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero)
}

/// A non-negative monetary amount with associated currency
///
/// Amounts are always held at the currency's decimal places. Every operation
/// returns a new value and rounds its result immediately, so chained
/// calculations accumulate on already-rounded intermediates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "MoneyRepr", into = "MoneyRepr")]
pub struct Money {
    amount: Decimal,
    currency: Currency,
}

#[derive(Serialize, Deserialize)]
struct MoneyRepr {
    amount: Decimal,
    currency: Currency,
}

impl TryFrom<MoneyRepr> for Money {
    type Error = MoneyError;

    fn try_from(repr: MoneyRepr) -> Result<Self, Self::Error> {
        Money::new(repr.amount, repr.currency)
    }
}

impl From<Money> for MoneyRepr {
    fn from(money: Money) -> Self {
        MoneyRepr {
            amount: money.amount,
            currency: money.currency,
        }
    }
}

impl Money {
    /// Creates a new Money value from an exact amount
    ///
    /// # Errors
    ///
    /// * `InvalidAmount` if the amount is negative
    /// * `InvalidDecimalPlaces` if the amount is not a multiple of the
    ///   currency's minimal unit
    pub fn new(amount: Decimal, currency: Currency) -> Result<Self, MoneyError> {
        if amount < Decimal::ZERO {
            return Err(MoneyError::InvalidAmount(format!(
                "amount must be non-negative, got {}",
                amount
            )));
        }
        if !currency.is_valid_amount(amount) {
            return Err(MoneyError::InvalidDecimalPlaces {
                amount,
                currency: currency.to_string(),
            });
        }
        Ok(Self {
            amount: amount.round_dp(currency.decimal_places()),
            currency,
        })
    }

    /// Creates Money by rounding half-up to the currency's decimal places
    ///
    /// This is the construction boundary used by arithmetic results.
    pub fn rounded(amount: Decimal, currency: Currency) -> Result<Self, MoneyError> {
        if amount < Decimal::ZERO {
            return Err(MoneyError::InvalidAmount(format!(
                "amount must be non-negative, got {}",
                amount
            )));
        }
        Ok(Self {
            amount: round_half_up(amount, currency.decimal_places()),
            currency,
        })
    }

    /// Creates Money from an integer amount in minor units (e.g., kopecks)
    pub fn from_minor(minor_units: i64, currency: Currency) -> Result<Self, MoneyError> {
        Self::new(Decimal::new(minor_units, currency.decimal_places()), currency)
    }

    /// Creates a zero amount in the specified currency
    pub fn zero(currency: Currency) -> Self {
        Self {
            amount: Decimal::ZERO,
            currency,
        }
    }

    /// Returns the amount
    pub fn amount(&self) -> Decimal {
        self.amount
    }

    /// Returns the currency
    pub fn currency(&self) -> Currency {
        self.currency
    }

    /// Returns true if the amount is zero
    pub fn is_zero(&self) -> bool {
        self.amount.is_zero()
    }

    /// Returns true if the amount is strictly positive
    pub fn is_positive(&self) -> bool {
        self.amount > Decimal::ZERO
    }

    /// Returns true if the amount is below zero.
    ///
    /// Always false for values built through the public constructors; kept
    /// for precondition checks on the aggregate boundaries.
    pub fn is_negative(&self) -> bool {
        self.amount < Decimal::ZERO
    }

    fn ensure_same_currency(&self, other: &Money) -> Result<(), MoneyError> {
        if self.currency != other.currency {
            return Err(MoneyError::CurrencyMismatch(
                self.currency.to_string(),
                other.currency.to_string(),
            ));
        }
        Ok(())
    }

    /// Adds two amounts of the same currency
    pub fn add(&self, other: &Money) -> Result<Money, MoneyError> {
        self.ensure_same_currency(other)?;
        let sum = self
            .amount
            .checked_add(other.amount)
            .ok_or(MoneyError::Overflow)?;
        Self::rounded(sum, self.currency)
    }

    /// Subtracts an amount of the same currency
    ///
    /// # Errors
    ///
    /// `InvalidAmount` if the result would be negative
    pub fn subtract(&self, other: &Money) -> Result<Money, MoneyError> {
        self.ensure_same_currency(other)?;
        let difference = self
            .amount
            .checked_sub(other.amount)
            .ok_or(MoneyError::Overflow)?;
        if difference < Decimal::ZERO {
            return Err(MoneyError::InvalidAmount(format!(
                "subtracting {} from {} would be negative",
                other, self
            )));
        }
        Self::rounded(difference, self.currency)
    }

    /// Multiplies by a non-negative scalar, rounding the result half-up
    pub fn multiply(&self, factor: Decimal) -> Result<Money, MoneyError> {
        if factor < Decimal::ZERO {
            return Err(MoneyError::InvalidAmount(format!(
                "multiplication factor must be non-negative, got {}",
                factor
            )));
        }
        let product = self
            .amount
            .checked_mul(factor)
            .ok_or(MoneyError::Overflow)?;
        Self::rounded(product, self.currency)
    }

    /// Divides by a positive scalar, rounding the result half-up
    pub fn divide(&self, divisor: Decimal) -> Result<Money, MoneyError> {
        if divisor.is_zero() {
            return Err(MoneyError::DivisionByZero);
        }
        if divisor < Decimal::ZERO {
            return Err(MoneyError::InvalidAmount(format!(
                "divisor must be positive, got {}",
                divisor
            )));
        }
        let quotient = self
            .amount
            .checked_div(divisor)
            .ok_or(MoneyError::Overflow)?;
        Self::rounded(quotient, self.currency)
    }

    /// Compares two amounts of the same currency
    pub fn try_cmp(&self, other: &Money) -> Result<Ordering, MoneyError> {
        self.ensure_same_currency(other)?;
        Ok(self.amount.cmp(&other.amount))
    }

    /// Returns true if this amount is strictly less than `other`
    pub fn is_less_than(&self, other: &Money) -> Result<bool, MoneyError> {
        Ok(self.try_cmp(other)? == Ordering::Less)
    }

    /// Returns true if this amount covers `other`
    pub fn can_cover(&self, other: &Money) -> Result<bool, MoneyError> {
        Ok(self.try_cmp(other)? != Ordering::Less)
    }

    /// Renders `"<amount with fixed decimal places> <symbol>"`, e.g. `100.00 ₽`
    pub fn format(&self) -> String {
        self.currency.format_amount(self.amount)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format())
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn rounded_amount_matches_currency_rounding(
            mantissa in 0i64..10_000_000_000i64,
            scale in 0u32..6u32
        ) {
            let amount = Decimal::new(mantissa, scale);
            let money = Money::rounded(amount, Currency::RUB).unwrap();
            prop_assert_eq!(
                money.amount(),
                amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
            );
            prop_assert!(Currency::RUB.is_valid_amount(money.amount()));
        }

        #[test]
        fn add_then_subtract_restores_original(
            a in 0i64..1_000_000_000i64,
            b in 0i64..1_000_000_000i64
        ) {
            let ma = Money::from_minor(a, Currency::RUB).unwrap();
            let mb = Money::from_minor(b, Currency::RUB).unwrap();

            let sum = ma.add(&mb).unwrap();
            prop_assert_eq!(sum.subtract(&mb).unwrap(), ma);
        }
    }
}
