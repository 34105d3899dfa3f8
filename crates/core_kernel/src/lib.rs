//! Core Kernel - Foundational types for the billing system
//!
//! This crate provides the value types shared by every domain crate:
//! - Money and Currency with precise decimal arithmetic
//! - Time ranges, calendar helpers and the injected Clock
//! - Billing cycles and quota definitions
//! - Prefixed identifiers and idempotency keys
//! - Port error types and runtime settings

pub mod money;
pub mod temporal;
pub mod clock;
pub mod billing_cycle;
pub mod quota;
pub mod identifiers;
pub mod error;
pub mod config;
pub mod ports;

pub use money::{Money, Currency, MoneyError};
pub use temporal::{TimeRange, TemporalError, calendar_date, last_day_of_month, to_utc};
pub use clock::{Clock, SystemClock, FixedClock};
pub use billing_cycle::{BillingCycle, BillingCycleError};
pub use quota::{QuotaDefinition, QuotaError};
pub use identifiers::{
    OrganizationId, TariffId, TransactionId, IdempotencyKey, PrefixedId, IdError,
};
pub use error::CoreError;
pub use config::BillingSettings;
pub use ports::{PortError, DomainPort};
