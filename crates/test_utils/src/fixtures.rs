//! Pre-built Test Fixtures
//!
//! Provides ready-to-use test data for common values across the billing core.
//! These fixtures are consistent and predictable for unit tests.

use chrono::{DateTime, TimeZone, Utc};
use core_kernel::{
    Currency, FixedClock, IdempotencyKey, Money, OrganizationId, TariffId, TimeRange, TransactionId,
};
use rust_decimal_macros::dec;

/// Fixture for Money test data
pub struct MoneyFixtures;

impl MoneyFixtures {
    pub fn rub_100() -> Money {
        Money::new(dec!(100.00), Currency::RUB).expect("valid fixture amount")
    }

    pub fn rub_1000() -> Money {
        Money::new(dec!(1000.00), Currency::RUB).expect("valid fixture amount")
    }

    /// Hourly rate used by the default test tariff
    pub fn rub_hourly_rate() -> Money {
        Money::new(dec!(10.00), Currency::RUB).expect("valid fixture amount")
    }

    pub fn rub_zero() -> Money {
        Money::zero(Currency::RUB)
    }

    /// Creates a USD amount for currency mismatch tests
    pub fn usd_100() -> Money {
        Money::new(dec!(100.00), Currency::USD).expect("valid fixture amount")
    }

    /// Creates a JPY amount (zero decimal places)
    pub fn jpy_10000() -> Money {
        Money::new(dec!(10000), Currency::JPY).expect("valid fixture amount")
    }
}

/// Fixture for temporal test data
pub struct TemporalFixtures;

impl TemporalFixtures {
    /// Reference instant for tests (Jan 1, 2025, 00:00 UTC)
    pub fn epoch() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()
    }

    /// Last day of a 31-day month, for month-end billing tests
    pub fn january_31() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 31, 12, 0, 0).unwrap()
    }

    pub fn leap_day() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 2, 29, 12, 0, 0).unwrap()
    }

    /// Clock frozen at [`TemporalFixtures::epoch`]
    pub fn clock() -> FixedClock {
        FixedClock::new(Self::epoch())
    }

    /// Ten hours starting at the epoch
    pub fn ten_hours() -> TimeRange {
        TimeRange::new(Self::epoch(), Self::epoch() + chrono::Duration::hours(10))
            .expect("valid fixture range")
    }
}

/// Fixture for identifier test data
pub struct IdFixtures;

impl IdFixtures {
    pub fn organization_id() -> OrganizationId {
        OrganizationId::new("ORG-TEST0001").expect("valid fixture id")
    }

    pub fn tariff_id() -> TariffId {
        TariffId::new("TAR-TEST0001").expect("valid fixture id")
    }

    pub fn transaction_id() -> TransactionId {
        TransactionId::new("TR-TEST0001").expect("valid fixture id")
    }

    pub fn idempotency_key() -> IdempotencyKey {
        IdempotencyKey::new("550e8400-e29b-41d4-a716-446655440001").expect("valid fixture key")
    }
}
