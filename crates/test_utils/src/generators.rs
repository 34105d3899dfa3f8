//! Property-Based Test Generators
//!
//! Provides proptest strategies for generating random test data
//! that maintains domain invariants.

use chrono::{DateTime, Duration, TimeZone, Utc};
use core_kernel::{BillingCycle, Currency, IdempotencyKey, Money, OrganizationId, TimeRange};
use proptest::prelude::*;
use rust_decimal::Decimal;

/// Strategy for currencies that can be used in prices
pub fn currency_strategy() -> impl Strategy<Value = Currency> {
    prop_oneof![
        Just(Currency::RUB),
        Just(Currency::USD),
        Just(Currency::EUR),
        Just(Currency::JPY),
    ]
}

/// Strategy for positive amounts in minor units
pub fn positive_amount_minor_strategy() -> impl Strategy<Value = i64> {
    1i64..1_000_000_000i64
}

/// Strategy for Money values with positive amounts
pub fn positive_money_strategy() -> impl Strategy<Value = Money> {
    (positive_amount_minor_strategy(), currency_strategy()).prop_map(|(amount, currency)| {
        Money::from_minor(amount, currency).expect("Generated invalid money")
    })
}

/// Strategy for non-negative RUB amounts, zero included
pub fn rub_money_strategy() -> impl Strategy<Value = Money> {
    (0i64..10_000_000i64)
        .prop_map(|amount| Money::from_minor(amount, Currency::RUB).expect("Generated invalid money"))
}

/// Strategy for decimals with up to six fractional digits
pub fn fractional_decimal_strategy() -> impl Strategy<Value = Decimal> {
    (0i64..1_000_000_000i64, 0u32..=6u32).prop_map(|(m, s)| Decimal::new(m, s))
}

pub fn billing_cycle_strategy() -> impl Strategy<Value = BillingCycle> {
    prop_oneof![
        Just(BillingCycle::Hourly),
        Just(BillingCycle::Monthly),
        Just(BillingCycle::OneTime),
    ]
}

/// Strategy for timestamps within 2024, at minute resolution
pub fn timestamp_2024_strategy() -> impl Strategy<Value = DateTime<Utc>> {
    (0i64..366 * 24 * 60).prop_map(|minutes| {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::minutes(minutes)
    })
}

/// Strategy for non-empty time ranges of up to 90 days
pub fn time_range_strategy() -> impl Strategy<Value = TimeRange> {
    (timestamp_2024_strategy(), 1i64..90 * 24 * 60).prop_map(|(start, minutes)| {
        TimeRange::new(start, start + Duration::minutes(minutes)).expect("Generated invalid range")
    })
}

/// Strategy for organization ids with mixed-case suffixes
pub fn organization_id_strategy() -> impl Strategy<Value = OrganizationId> {
    "[A-Za-z0-9]{8}".prop_map(|suffix| {
        OrganizationId::new(&format!("org-{}", suffix)).expect("Generated invalid organization id")
    })
}

/// Strategy for valid UUID v4 idempotency keys
pub fn idempotency_key_strategy() -> impl Strategy<Value = IdempotencyKey> {
    any::<[u8; 16]>().prop_map(|bytes| {
        let uuid = uuid::Builder::from_random_bytes(bytes).into_uuid();
        IdempotencyKey::new(&uuid.to_string()).expect("Generated invalid idempotency key")
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    proptest! {
        #[test]
        fn test_generated_money_is_positive(money in positive_money_strategy()) {
            prop_assert!(money.is_positive());
        }

        #[test]
        fn test_generated_ranges_have_duration(range in time_range_strategy()) {
            prop_assert!(range.duration() > Duration::zero());
        }

        #[test]
        fn test_generated_keys_validate(key in idempotency_key_strategy()) {
            prop_assert!(key.validate().is_ok());
        }

        #[test]
        fn test_generated_ids_are_upper_case(id in organization_id_strategy()) {
            prop_assert_eq!(id.as_str(), id.as_str().to_ascii_uppercase());
        }
    }
}
