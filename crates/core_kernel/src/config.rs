//! Runtime settings for billing services
//!
//! Settings are read from environment variables prefixed with `BILLING_`
//! (e.g. `BILLING_PENDING_MAX_AGE_SECS=600`). Missing values fall back to
//! the defaults below. Aggregates never read settings; services receive
//! them explicitly.

use chrono::Duration;
use serde::Deserialize;

use crate::error::CoreError;

/// Default age in seconds after which a pending transaction is stale
pub const DEFAULT_PENDING_MAX_AGE_SECS: i64 = 900;

/// Default cap on organizations handled by one billing run
pub const DEFAULT_BILLING_BATCH_SIZE: usize = 500;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BillingSettings {
    pub pending_max_age_secs: i64,
    pub billing_batch_size: usize,
}

impl Default for BillingSettings {
    fn default() -> Self {
        Self {
            pending_max_age_secs: DEFAULT_PENDING_MAX_AGE_SECS,
            billing_batch_size: DEFAULT_BILLING_BATCH_SIZE,
        }
    }
}

impl BillingSettings {
    /// Loads settings from the `BILLING_` environment
    pub fn from_env() -> Result<Self, CoreError> {
        let source = ::config::Environment::with_prefix("BILLING").try_parsing(true);
        Self::load(source)
    }

    /// Loads settings from an arbitrary `config` source
    ///
    /// # Errors
    ///
    /// `Configuration` if a value cannot be parsed, or if the loaded values
    /// are out of range (non-positive age or a zero batch size).
    pub fn load<S>(source: S) -> Result<Self, CoreError>
    where
        S: ::config::Source + Send + Sync + 'static,
    {
        let settings: BillingSettings = ::config::Config::builder()
            .add_source(source)
            .build()?
            .try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        if self.pending_max_age_secs <= 0 {
            return Err(CoreError::configuration(format!(
                "pending_max_age_secs must be positive, got {}",
                self.pending_max_age_secs
            )));
        }
        if self.billing_batch_size == 0 {
            return Err(CoreError::configuration("billing_batch_size must be at least 1"));
        }
        Ok(())
    }

    /// Pending age threshold as a duration
    pub fn pending_max_age(&self) -> Duration {
        Duration::try_seconds(self.pending_max_age_secs)
            .unwrap_or_else(|| Duration::seconds(DEFAULT_PENDING_MAX_AGE_SECS))
    }
}
