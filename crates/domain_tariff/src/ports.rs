//! Tariff Domain Ports
//!
//! Repository interface for loading and persisting tariffs. Application
//! services hold an `Arc<dyn TariffRepository>`; the adapter behind it is
//! chosen at startup.

use async_trait::async_trait;

use core_kernel::{DomainPort, PortError, TariffId, TimeRange};

use crate::tariff::Tariff;

#[async_trait]
pub trait TariffRepository: DomainPort {
    async fn find_by_id(&self, id: &TariffId) -> Result<Option<Tariff>, PortError>;

    /// Tariffs that are not archived
    async fn find_active(&self) -> Result<Vec<Tariff>, PortError>;

    /// Tariffs created within `range`, bounds included
    async fn find_by_period(&self, range: &TimeRange) -> Result<Vec<Tariff>, PortError>;

    /// Persists the tariff
    ///
    /// # Errors
    ///
    /// `Conflict` if the stored version is not older than `tariff.version()`
    async fn save(&self, tariff: &Tariff) -> Result<(), PortError>;
}
