//! Test Data Builders
//!
//! Provides builder patterns for constructing aggregates with sensible
//! defaults. Tests set only the fields they care about. Every builder
//! drains the creation events so that tests start from an empty buffer.

use std::sync::Arc;

use core_kernel::{
    BillingCycle, Clock, IdempotencyKey, Money, OrganizationId, QuotaDefinition, TariffId, TransactionId,
};
use domain_organization::{Organization, OrganizationError};
use domain_tariff::{Price, Tariff, TariffError};
use domain_transaction::{Transaction, TransactionError, TransactionType};

use crate::fixtures::MoneyFixtures;

/// Builder for test tariffs
///
/// Defaults to an hourly tariff priced at 10 RUB per hour.
pub struct TestTariffBuilder {
    id: TariffId,
    name: String,
    billing_cycle: BillingCycle,
    prices: Vec<Money>,
    quotas: Vec<QuotaDefinition>,
}

impl Default for TestTariffBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TestTariffBuilder {
    pub fn new() -> Self {
        Self {
            id: TariffId::generate(),
            name: "Test tariff".to_string(),
            billing_cycle: BillingCycle::Hourly,
            prices: vec![MoneyFixtures::rub_hourly_rate()],
            quotas: Vec::new(),
        }
    }

    pub fn with_id(mut self, id: TariffId) -> Self {
        self.id = id;
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_billing_cycle(mut self, billing_cycle: BillingCycle) -> Self {
        self.billing_cycle = billing_cycle;
        self
    }

    /// Replaces the prices; the first one becomes the default
    pub fn with_prices(mut self, prices: Vec<Money>) -> Self {
        self.prices = prices;
        self
    }

    pub fn with_quota(mut self, quota: QuotaDefinition) -> Self {
        self.quotas.push(quota);
        self
    }

    pub fn build(self, clock: &dyn Clock) -> Result<Tariff, TariffError> {
        let prices = self
            .prices
            .into_iter()
            .enumerate()
            .map(|(i, amount)| Price::generate(amount, i == 0))
            .collect::<Result<Vec<_>, _>>()?;

        let mut tariff = Tariff::builder(self.id, self.name, self.billing_cycle)
            .prices(prices)
            .quotas(self.quotas)
            .build(clock)?;
        tariff.pop_events();
        Ok(tariff)
    }
}

/// Builder for test organizations
///
/// Defaults to 1000 RUB on the default [`TestTariffBuilder`] tariff.
pub struct TestOrganizationBuilder {
    id: OrganizationId,
    name: String,
    balance: Money,
    tariff: Option<Arc<Tariff>>,
}

impl Default for TestOrganizationBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TestOrganizationBuilder {
    pub fn new() -> Self {
        Self {
            id: OrganizationId::generate(),
            name: "Acme".to_string(),
            balance: MoneyFixtures::rub_1000(),
            tariff: None,
        }
    }

    pub fn with_id(mut self, id: OrganizationId) -> Self {
        self.id = id;
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_balance(mut self, balance: Money) -> Self {
        self.balance = balance;
        self
    }

    pub fn with_tariff(mut self, tariff: Arc<Tariff>) -> Self {
        self.tariff = Some(tariff);
        self
    }

    pub fn build(self, clock: &dyn Clock) -> Result<Organization, OrganizationError> {
        let tariff = match self.tariff {
            Some(tariff) => tariff,
            None => Arc::new(TestTariffBuilder::new().build(clock)?),
        };
        let mut organization = Organization::new(self.id, self.name, self.balance, tariff, clock)?;
        organization.pop_events();
        Ok(organization)
    }
}

/// Builder for test transactions
///
/// Defaults to a pending 100 RUB debit.
pub struct TestTransactionBuilder {
    id: TransactionId,
    organization_id: OrganizationId,
    amount: Money,
    transaction_type: TransactionType,
    idempotency_key: IdempotencyKey,
}

impl Default for TestTransactionBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TestTransactionBuilder {
    pub fn new() -> Self {
        Self {
            id: TransactionId::generate(),
            organization_id: OrganizationId::generate(),
            amount: MoneyFixtures::rub_100(),
            transaction_type: TransactionType::Debit,
            idempotency_key: IdempotencyKey::generate(),
        }
    }

    pub fn with_id(mut self, id: TransactionId) -> Self {
        self.id = id;
        self
    }

    pub fn for_organization(mut self, organization_id: OrganizationId) -> Self {
        self.organization_id = organization_id;
        self
    }

    pub fn with_amount(mut self, amount: Money) -> Self {
        self.amount = amount;
        self
    }

    pub fn credit(mut self) -> Self {
        self.transaction_type = TransactionType::Credit;
        self
    }

    pub fn with_idempotency_key(mut self, key: IdempotencyKey) -> Self {
        self.idempotency_key = key;
        self
    }

    pub fn build(self, clock: &dyn Clock) -> Result<Transaction, TransactionError> {
        let mut transaction = Transaction::new(
            self.id,
            self.organization_id,
            self.amount,
            self.transaction_type,
            self.idempotency_key,
            clock,
        )?;
        transaction.pop_events();
        Ok(transaction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::TemporalFixtures;
    use core_kernel::Currency;
    use domain_transaction::TransactionStatus;

    #[test]
    fn test_default_organization_is_billable() {
        let clock = TemporalFixtures::clock();
        let org = TestOrganizationBuilder::new().build(&clock).unwrap();

        assert_eq!(org.balance(), MoneyFixtures::rub_1000());
        assert!(org.tariff().get_price_by_currency(Currency::RUB).is_some());
        assert!(org.pending_events().is_empty());
    }

    #[test]
    fn test_first_price_is_default() {
        let tariff = TestTariffBuilder::new()
            .with_prices(vec![MoneyFixtures::usd_100(), MoneyFixtures::rub_100()])
            .build(&TemporalFixtures::clock())
            .unwrap();

        assert_eq!(tariff.get_default_price().unwrap().currency(), Currency::USD);
    }

    #[test]
    fn test_transaction_builder_defaults() {
        let tx = TestTransactionBuilder::new().credit().build(&TemporalFixtures::clock()).unwrap();
        assert_eq!(tx.status(), TransactionStatus::Pending);
        assert_eq!(tx.transaction_type(), TransactionType::Credit);
    }
}
