//! Transaction domain errors

use thiserror::Error;

use core_kernel::MoneyError;

/// Errors that can occur in the transaction domain
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransactionError {
    #[error("Transaction amount must be positive")]
    InvalidTransactionAmount,

    #[error("Invalid transaction type: {0}")]
    InvalidTransactionType(String),

    #[error("Invalid transaction status: {0}")]
    InvalidTransactionStatus(String),

    /// The status table does not allow this move
    #[error("Invalid status transition from {from} to {to}")]
    InvalidStatusTransition {
        from: String,
        to: String,
    },

    #[error("Idempotency key mismatch")]
    IdempotencyKeyMismatch,

    #[error("Money error: {0}")]
    Money(#[from] MoneyError),
}

impl TransactionError {
    pub fn invalid_transition(from: impl std::fmt::Display, to: impl std::fmt::Display) -> Self {
        TransactionError::InvalidStatusTransition {
            from: from.to_string(),
            to: to.to_string(),
        }
    }
}
