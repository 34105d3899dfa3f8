//! Organization Domain Ports
//!
//! Repository interface for organizations. Implementations must compare
//! versions on `save` so that two writers racing on the same organization
//! cannot both succeed.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use core_kernel::{DomainPort, OrganizationId, PortError};

use crate::organization::{Organization, OrganizationStatus};

#[async_trait]
pub trait OrganizationRepository: DomainPort {
    async fn find_by_id(&self, id: &OrganizationId) -> Result<Option<Organization>, PortError>;

    async fn find_by_status(&self, status: OrganizationStatus) -> Result<Vec<Organization>, PortError>;

    /// Active organizations whose next billing time is at or before `max_billing_time`
    async fn find_for_billing(&self, max_billing_time: DateTime<Utc>) -> Result<Vec<Organization>, PortError>;

    /// Persists the organization
    ///
    /// # Errors
    ///
    /// `Conflict` if the stored version is not older than `organization.version()`
    async fn save(&self, organization: &Organization) -> Result<(), PortError>;
}
