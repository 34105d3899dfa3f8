//! Tariff Aggregate Root
//!
//! A tariff is a catalog entry: the prices an organization pays per billing
//! cycle, in one or more currencies, and the resource quotas it grants.
//!
//! # Invariants
//!
//! - Recurring billing cycles (Hourly, Monthly) have at least one price
//! - Prices are unique per currency and exactly one is the default
//! - Quotas on recurring tariffs are themselves recurring
//! - An archived tariff is never mutated again

use chrono::{DateTime, Duration, Months, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use core_kernel::{BillingCycle, Clock, Currency, Money, MoneyError, QuotaDefinition, TariffId};

use crate::error::TariffError;
use crate::events::TariffEvent;
use crate::price::Price;

/// Hours in an average month, used to prorate monthly prices
pub const HOURS_PER_MONTH: Decimal = dec!(730);

const MILLIS_PER_HOUR: Decimal = dec!(3600000);

/// Tariff lifecycle states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TariffStatus {
    Active,
    /// Terminal
    Archived,
}

/// The Tariff aggregate root
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tariff {
    id: TariffId,
    name: String,
    description: Option<String>,
    status: TariffStatus,
    billing_cycle: BillingCycle,
    is_extendable: bool,
    prices: Vec<Price>,
    quotas: Vec<QuotaDefinition>,
    /// Domain events to be published
    #[serde(skip)]
    events: Vec<TariffEvent>,
    /// Version for optimistic concurrency
    version: u64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    archived_at: Option<DateTime<Utc>>,
}

impl Tariff {
    /// Starts building a new tariff
    pub fn builder(id: TariffId, name: impl Into<String>, billing_cycle: BillingCycle) -> TariffBuilder {
        TariffBuilder::new(id, name, billing_cycle)
    }

    pub fn id(&self) -> &TariffId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn status(&self) -> TariffStatus {
        self.status
    }

    pub fn billing_cycle(&self) -> BillingCycle {
        self.billing_cycle
    }

    pub fn is_extendable(&self) -> bool {
        self.is_extendable
    }

    pub fn prices(&self) -> &[Price] {
        &self.prices
    }

    pub fn quotas(&self) -> &[QuotaDefinition] {
        &self.quotas
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

    pub fn archived_at(&self) -> Option<DateTime<Utc>> {
        self.archived_at
    }

    /// Returns accumulated domain events and clears them
    pub fn pop_events(&mut self) -> Vec<TariffEvent> {
        std::mem::take(&mut self.events)
    }

    /// Buffered events not yet drained
    pub fn pending_events(&self) -> &[TariffEvent] {
        &self.events
    }

    pub fn is_active(&self) -> bool {
        self.status == TariffStatus::Active
    }

    pub fn is_archived(&self) -> bool {
        self.status == TariffStatus::Archived
    }

    pub fn has_prices(&self) -> bool {
        !self.prices.is_empty()
    }

    /// Recurring tariffs can only back subscriptions once they are priced
    pub fn can_support_subscriptions(&self) -> bool {
        !self.billing_cycle.is_recurring() || self.has_prices()
    }

    pub fn get_price_by_currency(&self, currency: Currency) -> Option<&Price> {
        self.prices.iter().find(|p| p.currency() == currency)
    }

    /// Returns the default price, falling back to the first one
    pub fn get_default_price(&self) -> Option<&Price> {
        self.prices
            .iter()
            .find(|p| p.is_default())
            .or_else(|| self.prices.first())
    }

    pub fn get_quota_definition(&self, resource_type: &str) -> Option<&QuotaDefinition> {
        self.quotas.iter().find(|q| q.resource_type() == resource_type)
    }

    /// Computes the charge for `duration` of usage in `currency`
    ///
    /// Hourly tariffs charge the price per hour, monthly tariffs prorate the
    /// price over [`HOURS_PER_MONTH`], one-time tariffs charge the flat price
    /// (or nothing when unpriced). The result is rounded once.
    ///
    /// # Errors
    ///
    /// * `InvalidBillingPeriod` if `duration` is negative
    /// * `PriceNotFound` if the tariff has no price in `currency`
    pub fn calculate_cost(&self, duration: Duration, currency: Currency) -> Result<Money, TariffError> {
        if duration < Duration::zero() {
            return Err(TariffError::InvalidBillingPeriod);
        }
        if self.billing_cycle == BillingCycle::OneTime && self.prices.is_empty() {
            return Ok(Money::zero(currency));
        }

        let price = self
            .get_price_by_currency(currency)
            .ok_or(TariffError::PriceNotFound(currency))?
            .amount();

        let divisor = match self.billing_cycle {
            BillingCycle::Hourly => MILLIS_PER_HOUR,
            BillingCycle::Monthly => MILLIS_PER_HOUR * HOURS_PER_MONTH,
            BillingCycle::OneTime => return Ok(price),
        };
        // One division of the full product, one rounding
        let exact = price
            .amount()
            .checked_mul(Decimal::from(duration.num_milliseconds()))
            .and_then(|scaled| scaled.checked_div(divisor))
            .ok_or(MoneyError::Overflow)?;
        Ok(Money::rounded(exact, currency)?)
    }

    fn ensure_active(&self) -> Result<(), TariffError> {
        if self.is_archived() {
            return Err(TariffError::ArchivedTariff);
        }
        Ok(())
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
        self.version += 1;
    }

    /// Renames the tariff and/or replaces its description
    ///
    /// Does nothing (no version bump, no event) when both values are
    /// unchanged.
    ///
    /// # Errors
    ///
    /// * `ArchivedTariff` if the tariff is archived
    /// * `InvalidName` if `name` is blank
    pub fn update_name_and_description(
        &mut self,
        name: impl Into<String>,
        description: Option<String>,
        clock: &dyn Clock,
    ) -> Result<(), TariffError> {
        self.ensure_active()?;
        let name = name.into();
        if name.trim().is_empty() {
            return Err(TariffError::InvalidName);
        }

        let mut changed_fields = Vec::new();
        if self.name != name {
            changed_fields.push("name".to_string());
        }
        if self.description != description {
            changed_fields.push("description".to_string());
        }
        if changed_fields.is_empty() {
            return Ok(());
        }

        let now = clock.now();
        self.name = name;
        self.description = description;
        self.touch(now);

        debug!(tariff_id = %self.id, fields = ?changed_fields, "tariff updated");
        self.events.push(TariffEvent::TariffUpdated {
            tariff_id: self.id.clone(),
            changed_fields,
            requires_notification: false,
            new_version: self.version,
            timestamp: now,
        });
        Ok(())
    }

    /// Adds a price in a currency the tariff is not yet priced in
    ///
    /// The first price ever added becomes the default regardless of
    /// `is_default`. Adding a new default demotes the previous one.
    ///
    /// # Errors
    ///
    /// * `ArchivedTariff` if the tariff is archived
    /// * `CurrencyAlreadyExists` if a price in that currency exists
    pub fn add_price(&mut self, price: Price, is_default: bool, clock: &dyn Clock) -> Result<(), TariffError> {
        self.ensure_active()?;
        let currency = price.currency();
        if self.get_price_by_currency(currency).is_some() {
            return Err(TariffError::CurrencyAlreadyExists(currency));
        }

        let is_default = is_default || self.prices.is_empty();
        if is_default {
            for existing in self.prices.iter_mut() {
                *existing = existing.with_default(false);
            }
        }
        let amount = price.amount();
        self.prices.push(price.with_default(is_default));

        let now = clock.now();
        self.touch(now);

        debug!(tariff_id = %self.id, %currency, %amount, is_default, "price added");
        self.events.push(TariffEvent::PriceAdded {
            tariff_id: self.id.clone(),
            currency,
            amount,
            is_default,
            new_version: self.version,
            timestamp: now,
        });
        Ok(())
    }

    /// Removes the price in `currency`
    ///
    /// If the removed price was the default, the first remaining price is
    /// promoted.
    ///
    /// # Errors
    ///
    /// * `ArchivedTariff` if the tariff is archived
    /// * `LastPriceRemoval` if only one price is left
    /// * `PriceNotFound` if no price exists in `currency`
    pub fn remove_price(&mut self, currency: Currency, clock: &dyn Clock) -> Result<(), TariffError> {
        self.ensure_active()?;
        if self.prices.len() <= 1 {
            return Err(TariffError::LastPriceRemoval);
        }
        let index = self
            .prices
            .iter()
            .position(|p| p.currency() == currency)
            .ok_or(TariffError::PriceNotFound(currency))?;

        let removed = self.prices.remove(index);
        let was_default = removed.is_default();
        let new_default_currency = if was_default {
            self.prices.first_mut().map(|first| {
                *first = first.with_default(true);
                first.currency()
            })
        } else {
            None
        };

        let now = clock.now();
        self.touch(now);

        debug!(tariff_id = %self.id, %currency, was_default, "price removed");
        self.events.push(TariffEvent::PriceRemoved {
            tariff_id: self.id.clone(),
            currency,
            price: removed,
            was_default,
            new_default_currency,
            new_version: self.version,
            timestamp: now,
        });
        Ok(())
    }

    /// Changes the amount of the price in `currency`
    ///
    /// The new amount applies immediately; `effective_at` is carried on the
    /// event for downstream consumers. Setting the current amount again is a
    /// no-op.
    ///
    /// # Errors
    ///
    /// * `ArchivedTariff` if the tariff is archived
    /// * `PriceNotFound` if no price exists in `currency`
    /// * `Money` if `new_amount` is not a valid amount in `currency`
    /// * `EffectiveDateInPast` if `effective_at` is before the clock's now
    pub fn update_price(
        &mut self,
        currency: Currency,
        new_amount: Decimal,
        effective_at: DateTime<Utc>,
        clock: &dyn Clock,
    ) -> Result<(), TariffError> {
        self.ensure_active()?;
        let index = self
            .prices
            .iter()
            .position(|p| p.currency() == currency)
            .ok_or(TariffError::PriceNotFound(currency))?;
        let new_price = Money::new(new_amount, currency)?;

        let now = clock.now();
        if effective_at < now {
            return Err(TariffError::EffectiveDateInPast);
        }
        let old_price = self.prices[index].amount();
        if old_price == new_price {
            return Ok(());
        }

        self.prices[index] = self.prices[index].with_amount(new_price);
        self.touch(now);

        debug!(tariff_id = %self.id, %old_price, %new_price, %effective_at, "price updated");
        self.events.push(TariffEvent::PriceUpdated {
            tariff_id: self.id.clone(),
            currency,
            old_price,
            new_price,
            effective_date: effective_at,
            new_version: self.version,
            timestamp: now,
        });
        Ok(())
    }

    /// Replaces the quota set atomically
    ///
    /// Replacing the set with an identical one is a no-op.
    ///
    /// # Errors
    ///
    /// * `ArchivedTariff` if the tariff is archived
    /// * `IncompatibleQuotaDefinition` if a one-shot quota is given for a
    ///   recurring billing cycle
    pub fn update_quotas(&mut self, quotas: Vec<QuotaDefinition>, clock: &dyn Clock) -> Result<(), TariffError> {
        self.ensure_active()?;
        validate_quotas(&quotas, self.billing_cycle)?;
        if quotas == self.quotas {
            return Ok(());
        }

        let old_quotas = std::mem::replace(&mut self.quotas, quotas);
        let now = clock.now();
        self.touch(now);

        debug!(tariff_id = %self.id, count = self.quotas.len(), "quotas updated");
        self.events.push(TariffEvent::QuotasUpdated {
            tariff_id: self.id.clone(),
            old_quotas,
            new_quotas: self.quotas.clone(),
            new_version: self.version,
            timestamp: now,
        });
        Ok(())
    }

    /// Archives the tariff
    ///
    /// Archival is terminal. The emitted event announces a deprecation date
    /// one calendar month after archival.
    ///
    /// # Errors
    ///
    /// `AlreadyArchived` if called on an archived tariff
    pub fn archive(&mut self, reason: Option<String>, clock: &dyn Clock) -> Result<(), TariffError> {
        if self.is_archived() {
            return Err(TariffError::AlreadyArchived);
        }

        let now = clock.now();
        let deprecation_date = now.checked_add_months(Months::new(1)).unwrap_or(now);
        self.status = TariffStatus::Archived;
        self.archived_at = Some(now);
        self.touch(now);

        info!(tariff_id = %self.id, reason = ?reason, "tariff archived");
        self.events.push(TariffEvent::TariffArchived {
            tariff_id: self.id.clone(),
            reason,
            deprecation_date,
            new_version: self.version,
            timestamp: now,
        });
        Ok(())
    }
}

/// Recurring tariffs only accept recurring quotas
fn validate_quotas(quotas: &[QuotaDefinition], billing_cycle: BillingCycle) -> Result<(), TariffError> {
    if !billing_cycle.is_recurring() {
        return Ok(());
    }
    match quotas.iter().find(|q| !q.is_recurring()) {
        Some(quota) => Err(TariffError::IncompatibleQuotaDefinition {
            resource_type: quota.resource_type().to_string(),
        }),
        None => Ok(()),
    }
}

/// Builder for creating new tariffs
///
/// # Example
///
/// ```rust,ignore
/// let tariff = Tariff::builder(TariffId::generate(), "Basic", BillingCycle::Monthly)
///     .description("Entry plan")
///     .price(Price::generate(Money::new(dec!(990), Currency::RUB)?, true)?)
///     .quota(QuotaDefinition::recurring("api_tokens", dec!(1000), "tokens", Duration::days(30))?)
///     .build(&clock)?;
/// ```
#[derive(Debug, Clone)]
pub struct TariffBuilder {
    id: TariffId,
    name: String,
    description: Option<String>,
    billing_cycle: BillingCycle,
    is_extendable: bool,
    prices: Vec<Price>,
    quotas: Vec<QuotaDefinition>,
}

impl TariffBuilder {
    pub fn new(id: TariffId, name: impl Into<String>, billing_cycle: BillingCycle) -> Self {
        Self {
            id,
            name: name.into(),
            description: None,
            billing_cycle,
            is_extendable: false,
            prices: Vec::new(),
            quotas: Vec::new(),
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn extendable(mut self, is_extendable: bool) -> Self {
        self.is_extendable = is_extendable;
        self
    }

    /// Adds a price
    pub fn price(mut self, price: Price) -> Self {
        self.prices.push(price);
        self
    }

    /// Replaces all prices
    pub fn prices(mut self, prices: Vec<Price>) -> Self {
        self.prices = prices;
        self
    }

    /// Adds a quota
    pub fn quota(mut self, quota: QuotaDefinition) -> Self {
        self.quotas.push(quota);
        self
    }

    /// Replaces all quotas
    pub fn quotas(mut self, quotas: Vec<QuotaDefinition>) -> Self {
        self.quotas = quotas;
        self
    }

    /// Builds the tariff in the Active state and records `TariffCreated`
    ///
    /// When no price is flagged default, the first one becomes default.
    ///
    /// # Errors
    ///
    /// * `InvalidName` if the name is blank
    /// * `MissingPrices` if a recurring tariff has no price
    /// * `CurrencyAlreadyExists` if two prices share a currency
    /// * `MultipleDefaultPrices` if more than one price is flagged default
    /// * `IncompatibleQuotaDefinition` for one-shot quotas on a recurring tariff
    pub fn build(self, clock: &dyn Clock) -> Result<Tariff, TariffError> {
        if self.name.trim().is_empty() {
            return Err(TariffError::InvalidName);
        }
        if self.billing_cycle.is_recurring() && self.prices.is_empty() {
            return Err(TariffError::MissingPrices);
        }
        for (i, price) in self.prices.iter().enumerate() {
            if self.prices[..i].iter().any(|p| p.currency() == price.currency()) {
                return Err(TariffError::CurrencyAlreadyExists(price.currency()));
            }
        }
        let mut prices = self.prices;
        match prices.iter().filter(|p| p.is_default()).count() {
            0 => {
                if let Some(first) = prices.first_mut() {
                    *first = first.with_default(true);
                }
            }
            1 => {}
            _ => return Err(TariffError::MultipleDefaultPrices),
        }
        validate_quotas(&self.quotas, self.billing_cycle)?;

        let now = clock.now();
        info!(tariff_id = %self.id, billing_cycle = %self.billing_cycle, "tariff created");

        let created = TariffEvent::TariffCreated {
            tariff_id: self.id.clone(),
            name: self.name.clone(),
            description: self.description.clone(),
            billing_cycle: self.billing_cycle,
            prices: prices.clone(),
            quotas: self.quotas.clone(),
            timestamp: now,
        };

        Ok(Tariff {
            id: self.id,
            name: self.name,
            description: self.description,
            status: TariffStatus::Active,
            billing_cycle: self.billing_cycle,
            is_extendable: self.is_extendable,
            prices,
            quotas: self.quotas,
            events: vec![created],
            version: 1,
            created_at: now,
            updated_at: now,
            archived_at: None,
        })
    }
}
