//! Domain events for the organization aggregate

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{Money, OrganizationId};

/// Why a balance changed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BalanceChangeType {
    Deposit,
    Billing,
}

/// Domain events emitted by the Organization aggregate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrganizationEvent {
    BalanceUpdated {
        organization_id: OrganizationId,
        previous_balance: Money,
        new_balance: Money,
        change_amount: Money,
        change_type: BalanceChangeType,
        timestamp: DateTime<Utc>,
    },

    /// A billing period has been charged
    BillingProcessed {
        organization_id: OrganizationId,
        amount: Money,
        period_start: DateTime<Utc>,
        period_end: DateTime<Utc>,
        timestamp: DateTime<Utc>,
    },

    OrganizationSuspended {
        organization_id: OrganizationId,
        reason: String,
        timestamp: DateTime<Utc>,
    },

    OrganizationResumed {
        organization_id: OrganizationId,
        timestamp: DateTime<Utc>,
    },

    OrganizationTerminated {
        organization_id: OrganizationId,
        final_balance: Money,
        timestamp: DateTime<Utc>,
    },
}

impl OrganizationEvent {
    /// Returns the organization ID associated with this event
    pub fn organization_id(&self) -> &OrganizationId {
        match self {
            OrganizationEvent::BalanceUpdated { organization_id, .. } => organization_id,
            OrganizationEvent::BillingProcessed { organization_id, .. } => organization_id,
            OrganizationEvent::OrganizationSuspended { organization_id, .. } => organization_id,
            OrganizationEvent::OrganizationResumed { organization_id, .. } => organization_id,
            OrganizationEvent::OrganizationTerminated { organization_id, .. } => organization_id,
        }
    }

    /// Returns the timestamp of this event
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            OrganizationEvent::BalanceUpdated { timestamp, .. } => *timestamp,
            OrganizationEvent::BillingProcessed { timestamp, .. } => *timestamp,
            OrganizationEvent::OrganizationSuspended { timestamp, .. } => *timestamp,
            OrganizationEvent::OrganizationResumed { timestamp, .. } => *timestamp,
            OrganizationEvent::OrganizationTerminated { timestamp, .. } => *timestamp,
        }
    }

    /// Returns the event type name
    pub fn event_type(&self) -> &'static str {
        match self {
            OrganizationEvent::BalanceUpdated { .. } => "BalanceUpdated",
            OrganizationEvent::BillingProcessed { .. } => "BillingProcessed",
            OrganizationEvent::OrganizationSuspended { .. } => "OrganizationSuspended",
            OrganizationEvent::OrganizationResumed { .. } => "OrganizationResumed",
            OrganizationEvent::OrganizationTerminated { .. } => "OrganizationTerminated",
        }
    }
}
