//! Organization Domain
//!
//! This crate implements the organization aggregate: a balance holder bound
//! to a tariff, with a suspend/resume/terminate lifecycle driven by deposits
//! and billing.
//!
//! # Organization Lifecycle
//!
//! ```text
//! Active <-> Suspended
//!    \          |
//!     \-> Terminated (terminal)
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use domain_organization::Organization;
//!
//! let mut org = Organization::new(id, "Acme", opening_balance, tariff, &clock)?;
//! org.deposit(Money::new(dec!(500), Currency::RUB)?, &clock)?;
//! org.process_billing(&period, &clock)?;
//!
//! for event in org.pop_events() {
//!     outbox.push(event);
//! }
//! ```

pub mod organization;
pub mod balance;
pub mod events;
pub mod error;
pub mod ports;
pub mod services;

pub use organization::{Organization, OrganizationStatus, BillingInfo, ZERO_BALANCE_REASON};
pub use balance::Balance;
pub use events::{OrganizationEvent, BalanceChangeType};
pub use error::OrganizationError;
pub use ports::OrganizationRepository;
pub use services::{BillingRunPlanner, PlannedCharge, PlannedOutcome};
