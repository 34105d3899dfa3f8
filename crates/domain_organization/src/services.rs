//! Organization domain services
//!
//! This module contains services that look across many organizations at
//! once. They compute, they never mutate.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use core_kernel::{BillingSettings, Clock, Money, OrganizationId, TimeRange};

use crate::organization::Organization;

/// Predicted result of billing one organization
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlannedOutcome {
    /// The balance covers the cost and stays positive
    Charge,
    /// The balance covers the cost exactly and the organization will be suspended
    ChargeAndSuspend,
    /// Billing would fail for lack of funds
    InsufficientBalance,
    /// No charge can be computed
    Skipped { reason: String },
}

/// One line of a billing run plan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannedCharge {
    pub organization_id: OrganizationId,
    pub period: Option<TimeRange>,
    pub cost: Option<Money>,
    pub outcome: PlannedOutcome,
}

impl PlannedCharge {
    fn skipped(organization_id: OrganizationId, period: Option<TimeRange>, reason: impl Into<String>) -> Self {
        Self {
            organization_id,
            period,
            cost: None,
            outcome: PlannedOutcome::Skipped { reason: reason.into() },
        }
    }
}

/// Works out what a billing run would do
///
/// The planner picks the organizations whose next billing time has been
/// reached, most overdue first, and prices the period since their last
/// billing against their tariff. The plan is capped at the configured
/// batch size.
#[derive(Debug, Clone)]
pub struct BillingRunPlanner {
    settings: BillingSettings,
}

impl BillingRunPlanner {
    pub fn new(settings: BillingSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &BillingSettings {
        &self.settings
    }

    /// Plans a billing run at the clock's current time
    ///
    /// # Arguments
    ///
    /// * `organizations` - Candidates, typically from `find_for_billing`
    /// * `clock` - Time source; the billing period of each organization ends now
    pub fn plan(&self, organizations: &[Organization], clock: &dyn Clock) -> Vec<PlannedCharge> {
        let now = clock.now();
        let mut due: Vec<&Organization> = organizations
            .iter()
            .filter(|org| org.is_due_for_billing(now))
            .collect();
        due.sort_by_key(|org| org.billing_info().next_billing_time);
        due.truncate(self.settings.billing_batch_size);

        let plan: Vec<PlannedCharge> = due.into_iter().map(|org| plan_one(org, now)).collect();
        info!(
            candidates = organizations.len(),
            planned = plan.len(),
            batch_size = self.settings.billing_batch_size,
            "billing run planned"
        );
        plan
    }
}

fn plan_one(org: &Organization, now: DateTime<Utc>) -> PlannedCharge {
    let organization_id = org.id().clone();
    let period = match TimeRange::new(org.billing_info().last_billing_time, now) {
        Ok(period) => period,
        Err(err) => return PlannedCharge::skipped(organization_id, None, err.to_string()),
    };
    let cost = match org.tariff().calculate_cost(period.duration(), org.balance().currency()) {
        Ok(cost) => cost,
        Err(err) => return PlannedCharge::skipped(organization_id, Some(period), err.to_string()),
    };

    let outcome = match org.balance().try_cmp(&cost) {
        Ok(std::cmp::Ordering::Greater) => PlannedOutcome::Charge,
        Ok(std::cmp::Ordering::Equal) => PlannedOutcome::ChargeAndSuspend,
        Ok(std::cmp::Ordering::Less) => PlannedOutcome::InsufficientBalance,
        Err(err) => return PlannedCharge::skipped(organization_id, Some(period), err.to_string()),
    };
    debug!(organization_id = %organization_id, %cost, outcome = ?outcome, "organization planned");

    PlannedCharge {
        organization_id,
        period: Some(period),
        cost: Some(cost),
        outcome,
    }
}
