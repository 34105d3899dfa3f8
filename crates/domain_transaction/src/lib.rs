//! Transaction Domain
//!
//! This crate implements the ledger transaction aggregate: a debit or credit
//! against an organization that moves through a fixed status table and is
//! reversed by compensation rather than reopened.
//!
//! # Transaction Lifecycle
//!
//! ```text
//! Pending --> Completed --> Compensated
//!    \
//!     `-----> Failed
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use domain_transaction::{Transaction, TransactionType};
//!
//! if let Some(existing) = find_duplicate(repo.as_ref(), &key).await? {
//!     return Ok(existing);
//! }
//! let mut tx = Transaction::new(id, org_id, amount, TransactionType::Debit, key, &clock)?;
//! tx.complete(&clock)?;
//! let refund = tx.compensate(TransactionId::generate(), &clock)?;
//! ```

pub mod transaction;
pub mod status;
pub mod events;
pub mod error;
pub mod ports;
pub mod services;

pub use transaction::Transaction;
pub use status::{TransactionStatus, TransactionType};
pub use events::TransactionEvent;
pub use error::TransactionError;
pub use ports::TransactionRepository;
pub use services::{find_duplicate, find_stale_pending, stale_pending_cutoff};
