//! In-memory Repository Adapters
//!
//! Version-checked implementations of the domain repository ports, backed by
//! a `tokio::sync::RwLock<HashMap>`. They follow the same `save` contract as
//! a database adapter would: a write is rejected with `PortError::Conflict`
//! unless the incoming version is newer than the stored one.
//!
//! Stored copies never carry pending events.
//!
//! # Example
//!
//! ```rust,ignore
//! let repo: Arc<dyn OrganizationRepository> = Arc::new(InMemoryOrganizationRepository::new());
//! repo.save(&organization).await?;
//! ```

use std::collections::HashMap;
use std::hash::Hash;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;
use tracing::debug;

use core_kernel::{
    DomainPort, IdempotencyKey, OrganizationId, PortError, TariffId, TimeRange, TransactionId,
};
use domain_organization::{Organization, OrganizationRepository, OrganizationStatus};
use domain_tariff::{Tariff, TariffRepository};
use domain_transaction::{Transaction, TransactionRepository};

/// What the store needs to know about an aggregate
pub trait Versioned: Clone + Send + Sync {
    type Id: Clone + Eq + Hash + std::fmt::Display + Send + Sync;

    const ENTITY_TYPE: &'static str;

    fn key(&self) -> &Self::Id;

    fn current_version(&self) -> u64;

    /// Copy suitable for storage, with the event buffer drained
    fn snapshot(&self) -> Self;
}

impl Versioned for Organization {
    type Id = OrganizationId;

    const ENTITY_TYPE: &'static str = "Organization";

    fn key(&self) -> &OrganizationId {
        self.id()
    }

    fn current_version(&self) -> u64 {
        self.version()
    }

    fn snapshot(&self) -> Self {
        let mut copy = self.clone();
        copy.pop_events();
        copy
    }
}

impl Versioned for Tariff {
    type Id = TariffId;

    const ENTITY_TYPE: &'static str = "Tariff";

    fn key(&self) -> &TariffId {
        self.id()
    }

    fn current_version(&self) -> u64 {
        self.version()
    }

    fn snapshot(&self) -> Self {
        let mut copy = self.clone();
        copy.pop_events();
        copy
    }
}

impl Versioned for Transaction {
    type Id = TransactionId;

    const ENTITY_TYPE: &'static str = "Transaction";

    fn key(&self) -> &TransactionId {
        self.id()
    }

    fn current_version(&self) -> u64 {
        self.version()
    }

    fn snapshot(&self) -> Self {
        let mut copy = self.clone();
        copy.pop_events();
        copy
    }
}

/// Version-checked map of aggregates
pub struct VersionedStore<T: Versioned> {
    items: RwLock<HashMap<T::Id, T>>,
}

impl<T: Versioned> Default for VersionedStore<T> {
    fn default() -> Self {
        Self {
            items: RwLock::new(HashMap::new()),
        }
    }
}

impl<T: Versioned> VersionedStore<T> {
    pub async fn get(&self, id: &T::Id) -> Option<T> {
        self.items.read().await.get(id).cloned()
    }

    /// All stored items matching `predicate`
    pub async fn filter<F>(&self, predicate: F) -> Vec<T>
    where
        F: Fn(&T) -> bool,
    {
        self.items
            .read()
            .await
            .values()
            .filter(|item| predicate(item))
            .cloned()
            .collect()
    }

    pub async fn len(&self) -> usize {
        self.items.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.items.read().await.is_empty()
    }

    /// Inserts or replaces `item` if its version is newer than the stored one
    pub async fn put(&self, item: &T) -> Result<(), PortError> {
        let mut items = self.items.write().await;
        let incoming = item.current_version();

        if let Some(stored) = items.get(item.key()) {
            let stored = stored.current_version();
            if stored >= incoming {
                return Err(PortError::version_conflict(T::ENTITY_TYPE, item.key(), stored, incoming));
            }
        }

        debug!(entity_type = T::ENTITY_TYPE, id = %item.key(), version = incoming, "saved");
        items.insert(item.key().clone(), item.snapshot());
        Ok(())
    }
}

/// In-memory [`OrganizationRepository`]
#[derive(Default)]
pub struct InMemoryOrganizationRepository {
    store: VersionedStore<Organization>,
}

impl InMemoryOrganizationRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn store(&self) -> &VersionedStore<Organization> {
        &self.store
    }
}

impl DomainPort for InMemoryOrganizationRepository {}

#[async_trait]
impl OrganizationRepository for InMemoryOrganizationRepository {
    async fn find_by_id(&self, id: &OrganizationId) -> Result<Option<Organization>, PortError> {
        Ok(self.store.get(id).await)
    }

    async fn find_by_status(&self, status: OrganizationStatus) -> Result<Vec<Organization>, PortError> {
        Ok(self.store.filter(|org| org.status() == status).await)
    }

    async fn find_for_billing(&self, max_billing_time: DateTime<Utc>) -> Result<Vec<Organization>, PortError> {
        let mut due = self.store.filter(|org| org.is_due_for_billing(max_billing_time)).await;
        due.sort_by_key(|org| org.billing_info().next_billing_time);
        Ok(due)
    }

    async fn save(&self, organization: &Organization) -> Result<(), PortError> {
        self.store.put(organization).await
    }
}

/// In-memory [`TariffRepository`]
#[derive(Default)]
pub struct InMemoryTariffRepository {
    store: VersionedStore<Tariff>,
}

impl InMemoryTariffRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn store(&self) -> &VersionedStore<Tariff> {
        &self.store
    }
}

impl DomainPort for InMemoryTariffRepository {}

#[async_trait]
impl TariffRepository for InMemoryTariffRepository {
    async fn find_by_id(&self, id: &TariffId) -> Result<Option<Tariff>, PortError> {
        Ok(self.store.get(id).await)
    }

    async fn find_active(&self) -> Result<Vec<Tariff>, PortError> {
        Ok(self.store.filter(|tariff| tariff.is_active()).await)
    }

    async fn find_by_period(&self, range: &TimeRange) -> Result<Vec<Tariff>, PortError> {
        Ok(self.store.filter(|tariff| range.contains(tariff.created_at())).await)
    }

    async fn save(&self, tariff: &Tariff) -> Result<(), PortError> {
        self.store.put(tariff).await
    }
}

/// In-memory [`TransactionRepository`]
#[derive(Default)]
pub struct InMemoryTransactionRepository {
    store: VersionedStore<Transaction>,
}

impl InMemoryTransactionRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn store(&self) -> &VersionedStore<Transaction> {
        &self.store
    }
}

impl DomainPort for InMemoryTransactionRepository {}

#[async_trait]
impl TransactionRepository for InMemoryTransactionRepository {
    async fn find_by_id(&self, id: &TransactionId) -> Result<Option<Transaction>, PortError> {
        Ok(self.store.get(id).await)
    }

    async fn find_by_organization(
        &self,
        organization_id: &OrganizationId,
        range: &TimeRange,
    ) -> Result<Vec<Transaction>, PortError> {
        let mut found = self
            .store
            .filter(|tx| tx.organization_id() == organization_id && range.contains(tx.created_at()))
            .await;
        found.sort_by_key(|tx| tx.created_at());
        Ok(found)
    }

    async fn find_pending(&self, max_age: Duration, now: DateTime<Utc>) -> Result<Vec<Transaction>, PortError> {
        let mut stale = self.store.filter(|tx| tx.is_stale(max_age, now)).await;
        stale.sort_by_key(|tx| tx.created_at());
        Ok(stale)
    }

    async fn find_by_idempotency_key(&self, key: &IdempotencyKey) -> Result<Option<Transaction>, PortError> {
        let matching = self.store.filter(|tx| tx.validate_idempotency(key).is_ok()).await;
        Ok(matching
            .into_iter()
            .min_by_key(|tx| (tx.compensates().is_some(), tx.created_at())))
    }

    async fn save(&self, transaction: &Transaction) -> Result<(), PortError> {
        self.store.put(transaction).await
    }
}
