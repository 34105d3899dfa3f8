//! Domain events for the transaction aggregate

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{IdempotencyKey, Money, OrganizationId, TransactionId};

use crate::status::TransactionType;

/// Domain events emitted by the Transaction aggregate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionEvent {
    TransactionCreated {
        transaction_id: TransactionId,
        organization_id: OrganizationId,
        amount: Money,
        transaction_type: TransactionType,
        idempotency_key: IdempotencyKey,
        /// Set when this transaction reverses another
        compensates: Option<TransactionId>,
        timestamp: DateTime<Utc>,
    },

    TransactionCompleted {
        transaction_id: TransactionId,
        timestamp: DateTime<Utc>,
    },

    TransactionFailed {
        transaction_id: TransactionId,
        reason: String,
        timestamp: DateTime<Utc>,
    },

    /// Emitted on the original when a compensating transaction is created
    TransactionCompensated {
        transaction_id: TransactionId,
        compensation_id: TransactionId,
        timestamp: DateTime<Utc>,
    },
}

impl TransactionEvent {
    pub fn transaction_id(&self) -> &TransactionId {
        match self {
            TransactionEvent::TransactionCreated { transaction_id, .. } => transaction_id,
            TransactionEvent::TransactionCompleted { transaction_id, .. } => transaction_id,
            TransactionEvent::TransactionFailed { transaction_id, .. } => transaction_id,
            TransactionEvent::TransactionCompensated { transaction_id, .. } => transaction_id,
        }
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            TransactionEvent::TransactionCreated { timestamp, .. } => *timestamp,
            TransactionEvent::TransactionCompleted { timestamp, .. } => *timestamp,
            TransactionEvent::TransactionFailed { timestamp, .. } => *timestamp,
            TransactionEvent::TransactionCompensated { timestamp, .. } => *timestamp,
        }
    }

    /// Returns the event type name
    pub fn event_type(&self) -> &'static str {
        match self {
            TransactionEvent::TransactionCreated { .. } => "TransactionCreated",
            TransactionEvent::TransactionCompleted { .. } => "TransactionCompleted",
            TransactionEvent::TransactionFailed { .. } => "TransactionFailed",
            TransactionEvent::TransactionCompensated { .. } => "TransactionCompensated",
        }
    }
}
