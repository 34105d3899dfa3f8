//! Transaction domain services
//!
//! Helpers for monitoring stuck transactions and recognising duplicate
//! requests. They read through the repository port and never mutate.

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use core_kernel::{BillingSettings, Clock, IdempotencyKey, PortError};

use crate::ports::TransactionRepository;
use crate::transaction::Transaction;

/// Pending transactions created before this instant are stale
pub fn stale_pending_cutoff(clock: &dyn Clock, settings: &BillingSettings) -> DateTime<Utc> {
    clock.now() - settings.pending_max_age()
}

/// Loads pending transactions older than the configured maximum age
pub async fn find_stale_pending(
    repository: &dyn TransactionRepository,
    clock: &dyn Clock,
    settings: &BillingSettings,
) -> Result<Vec<Transaction>, PortError> {
    let now = clock.now();
    let stale = repository.find_pending(settings.pending_max_age(), now).await?;
    if !stale.is_empty() {
        warn!(
            count = stale.len(),
            cutoff = %stale_pending_cutoff(clock, settings),
            "stale pending transactions found"
        );
    }
    Ok(stale)
}

/// Returns the transaction already recorded under `key`, if any
///
/// A hit means the request is a duplicate and must not be applied again.
pub async fn find_duplicate(
    repository: &dyn TransactionRepository,
    key: &IdempotencyKey,
) -> Result<Option<Transaction>, PortError> {
    let existing = repository
        .find_by_idempotency_key(key)
        .await?
        .filter(|tx| tx.validate_idempotency(key).is_ok());

    if let Some(tx) = &existing {
        debug!(transaction_id = %tx.id(), idempotency_key = %key, "duplicate request detected");
    }
    Ok(existing)
}
