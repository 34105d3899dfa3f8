//! Transaction Aggregate Root
//!
//! A transaction is a single ledger entry against an organization. Its
//! amount, direction and organization are fixed at creation; only the
//! status moves.
//!
//! A completed transaction is never reopened. It is reversed by creating a
//! second transaction in the opposite direction (a compensation) and
//! marking the original `Compensated`.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use core_kernel::{Clock, IdempotencyKey, Money, OrganizationId, TransactionId};

use crate::error::TransactionError;
use crate::events::TransactionEvent;
use crate::status::{TransactionStatus, TransactionType};

/// The Transaction aggregate root
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    id: TransactionId,
    organization_id: OrganizationId,
    amount: Money,
    transaction_type: TransactionType,
    status: TransactionStatus,
    idempotency_key: IdempotencyKey,
    /// The transaction this one reverses
    compensates: Option<TransactionId>,
    failure_reason: Option<String>,
    created_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
    /// Version for optimistic concurrency
    version: u64,
    #[serde(skip)]
    events: Vec<TransactionEvent>,
}

impl Transaction {
    /// Creates a pending transaction
    ///
    /// # Arguments
    ///
    /// * `id` - Transaction identifier
    /// * `organization_id` - Organization the entry belongs to
    /// * `amount` - Strictly positive amount
    /// * `transaction_type` - Debit or credit
    /// * `idempotency_key` - Client key used to detect duplicate requests
    /// * `clock` - Time source
    ///
    /// # Errors
    ///
    /// `InvalidTransactionAmount` if `amount` is zero
    pub fn new(
        id: TransactionId,
        organization_id: OrganizationId,
        amount: Money,
        transaction_type: TransactionType,
        idempotency_key: IdempotencyKey,
        clock: &dyn Clock,
    ) -> Result<Self, TransactionError> {
        Self::create(id, organization_id, amount, transaction_type, idempotency_key, None, clock)
    }

    fn create(
        id: TransactionId,
        organization_id: OrganizationId,
        amount: Money,
        transaction_type: TransactionType,
        idempotency_key: IdempotencyKey,
        compensates: Option<TransactionId>,
        clock: &dyn Clock,
    ) -> Result<Self, TransactionError> {
        if !amount.is_positive() {
            return Err(TransactionError::InvalidTransactionAmount);
        }

        let now = clock.now();
        debug!(transaction_id = %id, organization_id = %organization_id, %amount, %transaction_type, "transaction created");

        let created = TransactionEvent::TransactionCreated {
            transaction_id: id.clone(),
            organization_id: organization_id.clone(),
            amount,
            transaction_type,
            idempotency_key: idempotency_key.clone(),
            compensates: compensates.clone(),
            timestamp: now,
        };

        Ok(Self {
            id,
            organization_id,
            amount,
            transaction_type,
            status: TransactionStatus::Pending,
            idempotency_key,
            compensates,
            failure_reason: None,
            created_at: now,
            completed_at: None,
            version: 1,
            events: vec![created],
        })
    }

    pub fn id(&self) -> &TransactionId {
        &self.id
    }

    pub fn organization_id(&self) -> &OrganizationId {
        &self.organization_id
    }

    pub fn amount(&self) -> Money {
        self.amount
    }

    pub fn transaction_type(&self) -> TransactionType {
        self.transaction_type
    }

    pub fn status(&self) -> TransactionStatus {
        self.status
    }

    pub fn idempotency_key(&self) -> &IdempotencyKey {
        &self.idempotency_key
    }

    /// The original transaction, if this is a compensation
    pub fn compensates(&self) -> Option<&TransactionId> {
        self.compensates.as_ref()
    }

    pub fn failure_reason(&self) -> Option<&str> {
        self.failure_reason.as_deref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    /// Returns the version for optimistic concurrency
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Returns accumulated domain events and clears them
    pub fn pop_events(&mut self) -> Vec<TransactionEvent> {
        std::mem::take(&mut self.events)
    }

    /// Buffered events not yet drained
    pub fn pending_events(&self) -> &[TransactionEvent] {
        &self.events
    }

    pub fn is_pending(&self) -> bool {
        self.status == TransactionStatus::Pending
    }

    pub fn is_completed(&self) -> bool {
        self.status == TransactionStatus::Completed
    }

    pub fn can_be_completed(&self) -> bool {
        self.status.can_transition_to(TransactionStatus::Completed)
    }

    /// Whether the transaction is still pending after more than `max_age`
    pub fn is_stale(&self, max_age: Duration, now: DateTime<Utc>) -> bool {
        self.is_pending() && now - self.created_at > max_age
    }

    fn transition(&mut self, target: TransactionStatus) -> Result<(), TransactionError> {
        if !self.status.can_transition_to(target) {
            return Err(TransactionError::invalid_transition(self.status, target));
        }
        self.status = target;
        self.version += 1;
        Ok(())
    }

    /// Marks a pending transaction as completed
    ///
    /// # Errors
    ///
    /// `InvalidStatusTransition` unless the transaction is Pending
    pub fn complete(&mut self, clock: &dyn Clock) -> Result<(), TransactionError> {
        self.transition(TransactionStatus::Completed)?;

        let now = clock.now();
        self.completed_at = Some(now);

        debug!(transaction_id = %self.id, "transaction completed");
        self.events.push(TransactionEvent::TransactionCompleted {
            transaction_id: self.id.clone(),
            timestamp: now,
        });
        Ok(())
    }

    /// Marks a pending transaction as failed
    ///
    /// # Errors
    ///
    /// `InvalidStatusTransition` unless the transaction is Pending
    pub fn fail(&mut self, reason: impl Into<String>, clock: &dyn Clock) -> Result<(), TransactionError> {
        self.transition(TransactionStatus::Failed)?;

        let reason = reason.into();
        self.failure_reason = Some(reason.clone());

        info!(transaction_id = %self.id, %reason, "transaction failed");
        self.events.push(TransactionEvent::TransactionFailed {
            transaction_id: self.id.clone(),
            reason,
            timestamp: clock.now(),
        });
        Ok(())
    }

    /// Reverses a completed transaction
    ///
    /// Returns a new pending transaction with the opposite direction, the
    /// same amount and the same idempotency key. The original becomes
    /// `Compensated`. Each side records exactly one event.
    ///
    /// # Errors
    ///
    /// `InvalidStatusTransition` unless the transaction is Completed
    pub fn compensate(&mut self, compensation_id: TransactionId, clock: &dyn Clock) -> Result<Transaction, TransactionError> {
        if !self.status.can_transition_to(TransactionStatus::Compensated) {
            return Err(TransactionError::invalid_transition(self.status, TransactionStatus::Compensated));
        }

        let compensation = Self::create(
            compensation_id,
            self.organization_id.clone(),
            self.amount,
            self.transaction_type.opposite(),
            self.idempotency_key.clone(),
            Some(self.id.clone()),
            clock,
        )?;

        self.transition(TransactionStatus::Compensated)?;

        info!(transaction_id = %self.id, compensation_id = %compensation.id, "transaction compensated");
        self.events.push(TransactionEvent::TransactionCompensated {
            transaction_id: self.id.clone(),
            compensation_id: compensation.id.clone(),
            timestamp: clock.now(),
        });
        Ok(compensation)
    }

    /// Checks that a repeated request carries this transaction's key
    ///
    /// # Errors
    ///
    /// `IdempotencyKeyMismatch` if the keys differ
    pub fn validate_idempotency(&self, key: &IdempotencyKey) -> Result<(), TransactionError> {
        if self.idempotency_key.equals(key) {
            Ok(())
        } else {
            Err(TransactionError::IdempotencyKeyMismatch)
        }
    }
}
