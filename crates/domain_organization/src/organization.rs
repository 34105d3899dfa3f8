//! Organization Aggregate Root
//!
//! An organization holds a balance and is billed according to its tariff.
//!
//! # State Machine
//!
//! ```text
//! Active --deposit--> Active
//! Active --process_billing--> Active | Suspended (balance reached zero)
//! Active --suspend--> Suspended
//! Suspended --resume (balance > 0)--> Active
//! Active | Suspended --terminate--> Terminated (terminal)
//! ```
//!
//! Deposits and billing are refused while suspended. Resumption is always
//! an explicit call.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use core_kernel::{Clock, Money, OrganizationId, TimeRange};
use domain_tariff::Tariff;

use crate::balance::Balance;
use crate::error::OrganizationError;
use crate::events::{BalanceChangeType, OrganizationEvent};

/// Reason recorded when billing drains the balance
pub const ZERO_BALANCE_REASON: &str = "zero balance";

/// Organization lifecycle states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrganizationStatus {
    Active,
    Suspended,
    /// Terminal
    Terminated,
}

/// When the organization was last billed and is next due
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillingInfo {
    pub last_billing_time: DateTime<Utc>,
    /// `None` for one-time tariffs
    pub next_billing_time: Option<DateTime<Utc>>,
}

impl BillingInfo {
    fn starting_at(now: DateTime<Utc>, tariff: &Tariff) -> Result<Self, OrganizationError> {
        Ok(Self {
            last_billing_time: now,
            next_billing_time: tariff.billing_cycle().calculate_next_billing_date(&now)?,
        })
    }
}

/// The Organization aggregate root
///
/// Holds a shared reference to its tariff, used for cost computation only.
#[derive(Debug, Clone)]
pub struct Organization {
    id: OrganizationId,
    name: String,
    balance: Balance,
    tariff: Arc<Tariff>,
    status: OrganizationStatus,
    billing_info: BillingInfo,
    /// Domain events to be published
    events: Vec<OrganizationEvent>,
    /// Version for optimistic concurrency
    version: u64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Organization {
    /// Creates an active organization with an initial balance
    ///
    /// # Arguments
    ///
    /// * `id` - Organization identifier
    /// * `name` - Display name, must not be blank
    /// * `initial_balance` - Opening balance; its currency is the account currency
    /// * `tariff` - Tariff to bill against
    /// * `clock` - Time source for the first billing schedule
    ///
    /// # Errors
    ///
    /// * `InvalidName` if the name is blank
    /// * `TariffArchived` if the tariff is archived
    /// * `TariffCurrencyMismatch` if the tariff is priced, but not in the
    ///   balance currency
    pub fn new(
        id: OrganizationId,
        name: impl Into<String>,
        initial_balance: Money,
        tariff: Arc<Tariff>,
        clock: &dyn Clock,
    ) -> Result<Self, OrganizationError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(OrganizationError::InvalidName);
        }
        if tariff.is_archived() {
            return Err(OrganizationError::TariffArchived(tariff.id().clone()));
        }
        let currency = initial_balance.currency();
        if tariff.has_prices() && tariff.get_price_by_currency(currency).is_none() {
            return Err(OrganizationError::TariffCurrencyMismatch {
                tariff_id: tariff.id().clone(),
                currency,
            });
        }

        let now = clock.now();
        let billing_info = BillingInfo::starting_at(now, &tariff)?;
        info!(organization_id = %id, tariff_id = %tariff.id(), balance = %initial_balance, "organization created");

        Ok(Self {
            id,
            name,
            balance: Balance::new(initial_balance),
            tariff,
            status: OrganizationStatus::Active,
            billing_info,
            events: Vec::new(),
            version: 1,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn id(&self) -> &OrganizationId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the current balance
    pub fn balance(&self) -> Money {
        self.balance.amount()
    }

    pub fn tariff(&self) -> &Arc<Tariff> {
        &self.tariff
    }

    pub fn status(&self) -> OrganizationStatus {
        self.status
    }

    pub fn billing_info(&self) -> &BillingInfo {
        &self.billing_info
    }

    /// Returns the version for optimistic concurrency
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// True while suspended or terminated
    pub fn is_suspended(&self) -> bool {
        self.status != OrganizationStatus::Active
    }

    pub fn is_terminated(&self) -> bool {
        self.status == OrganizationStatus::Terminated
    }

    /// Returns accumulated domain events and clears them
    pub fn pop_events(&mut self) -> Vec<OrganizationEvent> {
        std::mem::take(&mut self.events)
    }

    /// Buffered events not yet drained
    pub fn pending_events(&self) -> &[OrganizationEvent] {
        &self.events
    }

    /// Whether an operation costing `amount` can be afforded right now
    ///
    /// False while suspended and for amounts in another currency.
    ///
    /// # Panics
    ///
    /// Panics if `amount` is negative.
    pub fn check_balance(&self, amount: &Money) -> bool {
        self.balance.covers(amount) && !self.is_suspended()
    }

    /// Whether an active organization's next billing time has been reached
    pub fn is_due_for_billing(&self, now: DateTime<Utc>) -> bool {
        self.status == OrganizationStatus::Active
            && self.billing_info.next_billing_time.is_some_and(|next| next <= now)
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
        self.version += 1;
    }

    /// Tops up the balance
    ///
    /// # Errors
    ///
    /// * `InvalidAmount` if `amount` is zero
    /// * `OrganizationSuspended` if the organization is suspended or terminated
    /// * `Money` if `amount` is in another currency
    pub fn deposit(&mut self, amount: Money, clock: &dyn Clock) -> Result<(), OrganizationError> {
        if !amount.is_positive() {
            return Err(OrganizationError::InvalidAmount(format!(
                "deposit amount must be positive, got {}",
                amount
            )));
        }
        if self.is_suspended() {
            return Err(OrganizationError::OrganizationSuspended);
        }

        let previous_balance = self.balance.amount();
        self.balance = self.balance.credit(amount)?;

        let now = clock.now();
        self.touch(now);

        debug!(organization_id = %self.id, %amount, balance = %self.balance.amount(), "deposit applied");
        self.events.push(OrganizationEvent::BalanceUpdated {
            organization_id: self.id.clone(),
            previous_balance,
            new_balance: self.balance.amount(),
            change_amount: amount,
            change_type: BalanceChangeType::Deposit,
            timestamp: now,
        });
        Ok(())
    }

    /// Charges the tariff cost for `period`
    ///
    /// On success records `BalanceUpdated` and `BillingProcessed`. When the
    /// charge leaves the balance at exactly zero the organization is
    /// suspended in the same step and `OrganizationSuspended` follows.
    ///
    /// # Errors
    ///
    /// * `OrganizationSuspended` if the organization is suspended or terminated
    /// * `InvalidBillingPeriod` if the period has no positive duration
    /// * `Tariff` if the cost cannot be computed in the balance currency
    /// * `InsufficientBalance` if the balance does not cover the cost
    pub fn process_billing(&mut self, period: &TimeRange, clock: &dyn Clock) -> Result<(), OrganizationError> {
        if self.is_suspended() {
            return Err(OrganizationError::OrganizationSuspended);
        }
        let duration = period.duration();
        if duration <= chrono::Duration::zero() {
            return Err(OrganizationError::InvalidBillingPeriod);
        }

        let cost = self.tariff.calculate_cost(duration, self.balance.currency())?;
        let new_balance = self.balance.debit(cost)?;

        let now = clock.now();
        let billing_info = BillingInfo::starting_at(now, &self.tariff)?;

        let previous_balance = self.balance.amount();
        self.balance = new_balance;
        self.billing_info = billing_info;
        self.touch(now);

        debug!(organization_id = %self.id, %cost, balance = %new_balance.amount(), "billing processed");
        self.events.push(OrganizationEvent::BalanceUpdated {
            organization_id: self.id.clone(),
            previous_balance,
            new_balance: new_balance.amount(),
            change_amount: cost,
            change_type: BalanceChangeType::Billing,
            timestamp: now,
        });
        self.events.push(OrganizationEvent::BillingProcessed {
            organization_id: self.id.clone(),
            amount: cost,
            period_start: period.start(),
            period_end: period.end(),
            timestamp: now,
        });

        if self.balance.is_zero() {
            self.enter_suspension(ZERO_BALANCE_REASON.to_string(), now);
        }
        Ok(())
    }

    /// Suspends an active organization
    ///
    /// # Errors
    ///
    /// `InvalidStateTransition` unless the organization is Active
    pub fn suspend(&mut self, reason: impl Into<String>, clock: &dyn Clock) -> Result<(), OrganizationError> {
        if self.status != OrganizationStatus::Active {
            return Err(OrganizationError::invalid_transition(self.status, "Suspended"));
        }
        let now = clock.now();
        self.touch(now);
        self.enter_suspension(reason.into(), now);
        Ok(())
    }

    fn enter_suspension(&mut self, reason: String, now: DateTime<Utc>) {
        self.status = OrganizationStatus::Suspended;
        info!(organization_id = %self.id, %reason, "organization suspended");
        self.events.push(OrganizationEvent::OrganizationSuspended {
            organization_id: self.id.clone(),
            reason,
            timestamp: now,
        });
    }

    /// Lifts a suspension
    ///
    /// Resuming an active organization does nothing.
    ///
    /// # Errors
    ///
    /// * `Terminated` if the organization is terminated
    /// * `ZeroBalanceResume` if the balance is zero
    pub fn resume(&mut self, clock: &dyn Clock) -> Result<(), OrganizationError> {
        match self.status {
            OrganizationStatus::Terminated => return Err(OrganizationError::Terminated),
            OrganizationStatus::Active => return Ok(()),
            OrganizationStatus::Suspended => {}
        }
        if !self.balance.is_positive() {
            return Err(OrganizationError::ZeroBalanceResume);
        }

        let now = clock.now();
        self.status = OrganizationStatus::Active;
        self.touch(now);

        info!(organization_id = %self.id, balance = %self.balance.amount(), "organization resumed");
        self.events.push(OrganizationEvent::OrganizationResumed {
            organization_id: self.id.clone(),
            timestamp: now,
        });
        Ok(())
    }

    /// Closes the organization for good
    ///
    /// # Errors
    ///
    /// `AlreadyTerminated` on a second call
    pub fn terminate(&mut self, clock: &dyn Clock) -> Result<(), OrganizationError> {
        if self.is_terminated() {
            return Err(OrganizationError::AlreadyTerminated);
        }

        let now = clock.now();
        self.status = OrganizationStatus::Terminated;
        self.touch(now);

        info!(organization_id = %self.id, final_balance = %self.balance.amount(), "organization terminated");
        self.events.push(OrganizationEvent::OrganizationTerminated {
            organization_id: self.id.clone(),
            final_balance: self.balance.amount(),
            timestamp: now,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use core_kernel::{BillingCycle, Currency, FixedClock, TariffId};
    use domain_tariff::Price;
    use rust_decimal_macros::dec;

    fn clock() -> FixedClock {
        FixedClock::new(Utc.with_ymd_and_hms(2025, 1, 1, 10, 0, 0).unwrap())
    }

    fn monthly_tariff() -> Arc<Tariff> {
        let price = Price::generate(Money::new(dec!(730), Currency::RUB).unwrap(), true).unwrap();
        Arc::new(
            Tariff::builder(TariffId::generate(), "Monthly", BillingCycle::Monthly)
                .price(price)
                .build(&clock())
                .unwrap(),
        )
    }

    #[test]
    fn test_next_billing_time_follows_tariff_cycle() {
        let org = Organization::new(
            OrganizationId::generate(),
            "Acme",
            Money::new(dec!(100), Currency::RUB).unwrap(),
            monthly_tariff(),
            &clock(),
        )
        .unwrap();

        assert_eq!(
            org.billing_info().next_billing_time,
            Some(Utc.with_ymd_and_hms(2025, 2, 1, 10, 0, 0).unwrap())
        );
        assert!(!org.is_due_for_billing(clock().now()));
        assert!(org.is_due_for_billing(clock().now() + Duration::days(31)));
    }

    #[test]
    fn test_balance_currency_must_match_tariff() {
        let result = Organization::new(
            OrganizationId::generate(),
            "Acme",
            Money::new(dec!(100), Currency::USD).unwrap(),
            monthly_tariff(),
            &clock(),
        );
        assert!(matches!(result, Err(OrganizationError::TariffCurrencyMismatch { .. })));
    }
}
