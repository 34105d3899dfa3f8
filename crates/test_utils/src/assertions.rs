//! Custom Test Assertions
//!
//! Provides specialized assertion helpers for domain types that give
//! more meaningful error messages than standard assertions.

use chrono::{DateTime, Utc};
use core_kernel::{Money, TimeRange};
use domain_organization::OrganizationEvent;
use domain_tariff::TariffEvent;
use domain_transaction::TransactionEvent;

/// Domain events that can report their type name
pub trait NamedEvent {
    fn name(&self) -> &'static str;
}

impl NamedEvent for OrganizationEvent {
    fn name(&self) -> &'static str {
        self.event_type()
    }
}

impl NamedEvent for TariffEvent {
    fn name(&self) -> &'static str {
        self.event_type()
    }
}

impl NamedEvent for TransactionEvent {
    fn name(&self) -> &'static str {
        self.event_type()
    }
}

/// Asserts that two Money values have the same currency and amount
///
/// Scale is ignored, so `100` and `100.00` are equal.
pub fn assert_money_eq(actual: &Money, expected: &Money) {
    assert_eq!(
        actual.currency(),
        expected.currency(),
        "Currency mismatch: actual={}, expected={}",
        actual.currency(),
        expected.currency()
    );
    assert_eq!(
        actual.amount(),
        expected.amount(),
        "Amount mismatch: actual={}, expected={}",
        actual,
        expected
    );
}

/// Asserts that a Money value is zero
pub fn assert_money_zero(money: &Money) {
    assert!(money.is_zero(), "Expected zero money, got {}", money);
}

/// Asserts that a Money value is positive
pub fn assert_money_positive(money: &Money) {
    assert!(money.is_positive(), "Expected positive money, got {}", money);
}

/// Asserts that `events` have exactly the given type names, in order
pub fn assert_event_types<E: NamedEvent>(events: &[E], expected: &[&str]) {
    let actual: Vec<&str> = events.iter().map(NamedEvent::name).collect();
    assert_eq!(actual, expected, "Unexpected event sequence");
}

/// Asserts that a version advanced by exactly one
pub fn assert_version_bumped(before: u64, after: u64) {
    assert_eq!(
        after,
        before + 1,
        "Expected version {} after one mutation, got {}",
        before + 1,
        after
    );
}

/// Asserts that a TimeRange contains a specific timestamp
pub fn assert_range_contains(range: &TimeRange, moment: DateTime<Utc>) {
    assert!(
        range.contains(moment),
        "Range {:?} does not contain timestamp {}",
        range,
        moment
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{MoneyFixtures, TemporalFixtures};
    use core_kernel::Currency;
    use rust_decimal_macros::dec;

    #[test]
    fn test_money_eq_ignores_scale() {
        let plain = Money::new(dec!(100), Currency::RUB).unwrap();
        assert_money_eq(&plain, &MoneyFixtures::rub_100());
    }

    #[test]
    #[should_panic(expected = "Currency mismatch")]
    fn test_money_eq_catches_currency() {
        assert_money_eq(&MoneyFixtures::rub_100(), &MoneyFixtures::usd_100());
    }

    #[test]
    fn test_range_contains_end() {
        let range = TemporalFixtures::ten_hours();
        assert_range_contains(&range, range.end());
    }
}
