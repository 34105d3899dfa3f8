//! Transaction Domain Ports

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};

use core_kernel::{DomainPort, IdempotencyKey, OrganizationId, PortError, TimeRange, TransactionId};

use crate::transaction::Transaction;

#[async_trait]
pub trait TransactionRepository: DomainPort {
    async fn find_by_id(&self, id: &TransactionId) -> Result<Option<Transaction>, PortError>;

    /// Transactions of one organization created within `range`, bounds included
    async fn find_by_organization(
        &self,
        organization_id: &OrganizationId,
        range: &TimeRange,
    ) -> Result<Vec<Transaction>, PortError>;

    /// Pending transactions created more than `max_age` before `now`
    async fn find_pending(&self, max_age: Duration, now: DateTime<Utc>) -> Result<Vec<Transaction>, PortError>;

    /// The transaction first recorded under `key`
    ///
    /// A compensation shares its original's key; the original is returned.
    async fn find_by_idempotency_key(&self, key: &IdempotencyKey) -> Result<Option<Transaction>, PortError>;

    /// Persists the transaction
    ///
    /// # Errors
    ///
    /// `Conflict` if the stored version is not older than `transaction.version()`
    async fn save(&self, transaction: &Transaction) -> Result<(), PortError>;
}
