//! Tariff Domain
//!
//! This crate implements the tariff catalog: what an organization pays per
//! billing cycle and which resource quotas it is granted.
//!
//! # Tariff Lifecycle
//!
//! ```text
//! Active -> (update name, prices, quotas) -> Active
//!        \-> Archived (terminal)
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use domain_tariff::{Tariff, Price};
//!
//! let mut tariff = Tariff::builder(TariffId::generate(), "Pro", BillingCycle::Hourly)
//!     .price(Price::generate(Money::new(dec!(10), Currency::RUB)?, true)?)
//!     .build(&clock)?;
//!
//! let cost = tariff.calculate_cost(Duration::hours(10), Currency::RUB)?;
//! tariff.archive(Some("superseded".into()), &clock)?;
//! ```

pub mod tariff;
pub mod price;
pub mod events;
pub mod error;
pub mod ports;

pub use tariff::{Tariff, TariffBuilder, TariffStatus, HOURS_PER_MONTH};
pub use price::Price;
pub use events::TariffEvent;
pub use error::TariffError;
pub use ports::TariffRepository;
