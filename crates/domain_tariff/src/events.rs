//! Domain events for the tariff aggregate

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{BillingCycle, Currency, Money, QuotaDefinition, TariffId};

use crate::price::Price;

/// Domain events emitted by the Tariff aggregate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TariffEvent {
    /// Tariff has been created
    TariffCreated {
        tariff_id: TariffId,
        name: String,
        description: Option<String>,
        billing_cycle: BillingCycle,
        prices: Vec<Price>,
        quotas: Vec<QuotaDefinition>,
        timestamp: DateTime<Utc>,
    },

    /// Name and/or description changed
    TariffUpdated {
        tariff_id: TariffId,
        changed_fields: Vec<String>,
        requires_notification: bool,
        new_version: u64,
        timestamp: DateTime<Utc>,
    },

    /// Tariff has been archived
    TariffArchived {
        tariff_id: TariffId,
        reason: Option<String>,
        deprecation_date: DateTime<Utc>,
        new_version: u64,
        timestamp: DateTime<Utc>,
    },

    /// A price in a new currency was added
    PriceAdded {
        tariff_id: TariffId,
        currency: Currency,
        amount: Money,
        is_default: bool,
        new_version: u64,
        timestamp: DateTime<Utc>,
    },

    /// The amount of an existing price changed
    PriceUpdated {
        tariff_id: TariffId,
        currency: Currency,
        old_price: Money,
        new_price: Money,
        effective_date: DateTime<Utc>,
        new_version: u64,
        timestamp: DateTime<Utc>,
    },

    /// A price was removed
    PriceRemoved {
        tariff_id: TariffId,
        currency: Currency,
        price: Price,
        was_default: bool,
        new_default_currency: Option<Currency>,
        new_version: u64,
        timestamp: DateTime<Utc>,
    },

    /// The quota set was replaced
    QuotasUpdated {
        tariff_id: TariffId,
        old_quotas: Vec<QuotaDefinition>,
        new_quotas: Vec<QuotaDefinition>,
        new_version: u64,
        timestamp: DateTime<Utc>,
    },
}

impl TariffEvent {
    /// Returns the tariff ID associated with this event
    pub fn tariff_id(&self) -> &TariffId {
        match self {
            TariffEvent::TariffCreated { tariff_id, .. } => tariff_id,
            TariffEvent::TariffUpdated { tariff_id, .. } => tariff_id,
            TariffEvent::TariffArchived { tariff_id, .. } => tariff_id,
            TariffEvent::PriceAdded { tariff_id, .. } => tariff_id,
            TariffEvent::PriceUpdated { tariff_id, .. } => tariff_id,
            TariffEvent::PriceRemoved { tariff_id, .. } => tariff_id,
            TariffEvent::QuotasUpdated { tariff_id, .. } => tariff_id,
        }
    }

    /// Returns the timestamp of this event
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            TariffEvent::TariffCreated { timestamp, .. } => *timestamp,
            TariffEvent::TariffUpdated { timestamp, .. } => *timestamp,
            TariffEvent::TariffArchived { timestamp, .. } => *timestamp,
            TariffEvent::PriceAdded { timestamp, .. } => *timestamp,
            TariffEvent::PriceUpdated { timestamp, .. } => *timestamp,
            TariffEvent::PriceRemoved { timestamp, .. } => *timestamp,
            TariffEvent::QuotasUpdated { timestamp, .. } => *timestamp,
        }
    }

    /// Returns the event type name
    pub fn event_type(&self) -> &'static str {
        match self {
            TariffEvent::TariffCreated { .. } => "TariffCreated",
            TariffEvent::TariffUpdated { .. } => "TariffUpdated",
            TariffEvent::TariffArchived { .. } => "TariffArchived",
            TariffEvent::PriceAdded { .. } => "PriceAdded",
            TariffEvent::PriceUpdated { .. } => "PriceUpdated",
            TariffEvent::PriceRemoved { .. } => "PriceRemoved",
            TariffEvent::QuotasUpdated { .. } => "QuotasUpdated",
        }
    }
}
