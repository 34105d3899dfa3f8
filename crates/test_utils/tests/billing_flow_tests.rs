//! Cross-aggregate billing flows
//!
//! These tests drive the aggregates through the in-memory repositories the
//! way an application service would: load, mutate, drain events, save.

use std::sync::Arc;

use chrono::Duration;
use core_kernel::{BillingSettings, Clock, Currency, IdempotencyKey, Money, TimeRange, TransactionId};
use domain_organization::{BillingRunPlanner, OrganizationRepository, OrganizationStatus, PlannedOutcome};
use domain_tariff::TariffRepository;
use domain_transaction::{
    find_duplicate, find_stale_pending, TransactionRepository, TransactionStatus, TransactionType,
};
use rust_decimal_macros::dec;
use test_utils::*;

fn rub(amount: rust_decimal::Decimal) -> Money {
    Money::new(amount, Currency::RUB).unwrap()
}

mod billing_run {
    use super::*;

    /// Plans a run, applies it and checks what was persisted
    #[tokio::test]
    async fn test_billing_run_charges_due_organizations() {
        init_test_tracing();
        let mut clock = TemporalFixtures::clock();
        let tariffs = InMemoryTariffRepository::new();
        let organizations = InMemoryOrganizationRepository::new();

        // 10 RUB per hour
        let tariff = Arc::new(TestTariffBuilder::new().build(&clock).unwrap());
        tariffs.save(&tariff).await.unwrap();

        let rich = TestOrganizationBuilder::new().with_tariff(tariff.clone()).build(&clock).unwrap();
        let exact = TestOrganizationBuilder::new()
            .with_tariff(tariff.clone())
            .with_balance(rub(dec!(20)))
            .build(&clock)
            .unwrap();
        let poor = TestOrganizationBuilder::new()
            .with_tariff(tariff.clone())
            .with_balance(rub(dec!(5)))
            .build(&clock)
            .unwrap();
        for org in [&rich, &exact, &poor] {
            organizations.save(org).await.unwrap();
        }

        clock.advance(Duration::hours(2));
        let due = organizations.find_for_billing(clock.now()).await.unwrap();
        assert_eq!(due.len(), 3);

        let plan = BillingRunPlanner::new(BillingSettings::default()).plan(&due, &clock);
        assert_eq!(plan.len(), 3);

        for planned in &plan {
            if !matches!(planned.outcome, PlannedOutcome::Charge | PlannedOutcome::ChargeAndSuspend) {
                continue;
            }
            let mut org = organizations.find_by_id(&planned.organization_id).await.unwrap().unwrap();
            org.process_billing(planned.period.as_ref().unwrap(), &clock).unwrap();
            org.pop_events();
            organizations.save(&org).await.unwrap();
        }

        let rich = organizations.find_by_id(rich.id()).await.unwrap().unwrap();
        assert_money_eq(&rich.balance(), &rub(dec!(980)));
        assert_eq!(rich.version(), 2);
        assert_eq!(rich.billing_info().last_billing_time, clock.now());

        let exact = organizations.find_by_id(exact.id()).await.unwrap().unwrap();
        assert_money_zero(&exact.balance());
        assert_eq!(exact.status(), OrganizationStatus::Suspended);

        let poor = organizations.find_by_id(poor.id()).await.unwrap().unwrap();
        assert_money_eq(&poor.balance(), &rub(dec!(5)));
        assert_eq!(poor.version(), 1);

        let suspended = organizations.find_by_status(OrganizationStatus::Suspended).await.unwrap();
        assert_eq!(suspended.len(), 1);
        assert_eq!(suspended[0].id(), exact.id());

        // Only the unpaid organization is still due
        let still_due = organizations.find_for_billing(clock.now()).await.unwrap();
        assert_eq!(still_due.len(), 1);
        assert_eq!(still_due[0].id(), poor.id());
    }

    #[tokio::test]
    async fn test_draining_to_zero_emits_suspension() {
        init_test_tracing();
        let clock = TemporalFixtures::clock();
        let mut org = TestOrganizationBuilder::new()
            .with_balance(MoneyFixtures::rub_100())
            .build(&clock)
            .unwrap();

        org.process_billing(&TemporalFixtures::ten_hours(), &clock).unwrap();

        assert_event_types(
            &org.pop_events(),
            &["BalanceUpdated", "BillingProcessed", "OrganizationSuspended"],
        );
        assert!(org.deposit(MoneyFixtures::rub_100(), &clock).is_err());
        assert!(org.resume(&clock).is_err());
    }

    /// Two writers load the same version; the second save loses
    #[tokio::test]
    async fn test_stale_write_is_rejected() {
        init_test_tracing();
        let clock = TemporalFixtures::clock();
        let organizations = InMemoryOrganizationRepository::new();
        let org = TestOrganizationBuilder::new().build(&clock).unwrap();
        organizations.save(&org).await.unwrap();

        let mut first = organizations.find_by_id(org.id()).await.unwrap().unwrap();
        let mut second = first.clone();
        first.deposit(rub(dec!(100)), &clock).unwrap();
        second.deposit(rub(dec!(300)), &clock).unwrap();
        assert_version_bumped(org.version(), first.version());

        organizations.save(&first).await.unwrap();
        let err = organizations.save(&second).await.unwrap_err();
        assert!(err.is_conflict());

        let stored = organizations.find_by_id(org.id()).await.unwrap().unwrap();
        assert_money_eq(&stored.balance(), &rub(dec!(1100)));
    }
}

mod transactions {
    use super::*;

    #[tokio::test]
    async fn test_duplicate_request_is_detected() {
        init_test_tracing();
        let clock = TemporalFixtures::clock();
        let transactions = InMemoryTransactionRepository::new();

        let tx = TestTransactionBuilder::new()
            .with_idempotency_key(IdFixtures::idempotency_key())
            .build(&clock)
            .unwrap();
        transactions.save(&tx).await.unwrap();

        let repeated = IdempotencyKey::new("550E8400-E29B-41D4-A716-446655440001").unwrap();
        let duplicate = find_duplicate(&transactions, &repeated).await.unwrap();
        assert_eq!(duplicate.map(|d| d.id().clone()), Some(tx.id().clone()));

        let fresh = find_duplicate(&transactions, &IdempotencyKey::generate()).await.unwrap();
        assert!(fresh.is_none());
    }

    #[tokio::test]
    async fn test_compensation_is_persisted() {
        init_test_tracing();
        let clock = TemporalFixtures::clock();
        let transactions = InMemoryTransactionRepository::new();
        let org_id = IdFixtures::organization_id();

        let mut original = TestTransactionBuilder::new()
            .for_organization(org_id.clone())
            .build(&clock)
            .unwrap();
        original.complete(&clock).unwrap();
        transactions.save(&original).await.unwrap();

        let mut compensation = original.compensate(TransactionId::generate(), &clock).unwrap();
        assert_event_types(&original.pop_events(), &["TransactionCompleted", "TransactionCompensated"]);
        assert_event_types(&compensation.pop_events(), &["TransactionCreated"]);

        transactions.save(&original).await.unwrap();
        transactions.save(&compensation).await.unwrap();

        let by_key = transactions
            .find_by_idempotency_key(original.idempotency_key())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(by_key.id(), original.id());
        assert_eq!(by_key.status(), TransactionStatus::Compensated);

        let range = TimeRange::new(clock.now() - Duration::hours(1), clock.now()).unwrap();
        let history = transactions.find_by_organization(&org_id, &range).await.unwrap();
        assert_eq!(history.len(), 2);
        assert!(history
            .iter()
            .any(|tx| tx.transaction_type() == TransactionType::Credit && tx.compensates() == Some(original.id())));
    }

    #[tokio::test]
    async fn test_stale_pending_sweep() {
        init_test_tracing();
        let mut clock = TemporalFixtures::clock();
        let transactions = InMemoryTransactionRepository::new();
        let settings = BillingSettings {
            pending_max_age_secs: 900,
            ..BillingSettings::default()
        };

        let stuck = TestTransactionBuilder::new().build(&clock).unwrap();
        let mut done = TestTransactionBuilder::new().build(&clock).unwrap();
        done.complete(&clock).unwrap();
        transactions.save(&stuck).await.unwrap();
        transactions.save(&done).await.unwrap();

        clock.advance(Duration::minutes(20));
        let recent = TestTransactionBuilder::new().build(&clock).unwrap();
        transactions.save(&recent).await.unwrap();

        let stale = find_stale_pending(&transactions, &clock, &settings).await.unwrap();
        assert_eq!(stale.len(), 1);
        assert_eq!(stale[0].id(), stuck.id());

        let mut stuck = stale.into_iter().next().unwrap();
        stuck.fail("gateway timeout", &clock).unwrap();
        transactions.save(&stuck).await.unwrap();

        assert!(find_stale_pending(&transactions, &clock, &settings).await.unwrap().is_empty());
    }
}

mod tariffs {
    use super::*;

    #[tokio::test]
    async fn test_archived_tariffs_leave_active_list() {
        init_test_tracing();
        let clock = TemporalFixtures::clock();
        let tariffs = InMemoryTariffRepository::new();

        let kept = TestTariffBuilder::new().with_name("Kept").build(&clock).unwrap();
        let mut retired = TestTariffBuilder::new().with_name("Retired").build(&clock).unwrap();
        tariffs.save(&kept).await.unwrap();
        tariffs.save(&retired).await.unwrap();

        retired.archive(Some("replaced".to_string()), &clock).unwrap();
        assert_event_types(&retired.pop_events(), &["TariffArchived"]);
        tariffs.save(&retired).await.unwrap();

        let active = tariffs.find_active().await.unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id(), kept.id());

        let range = TimeRange::new(clock.now(), clock.now() + Duration::days(1)).unwrap();
        assert_eq!(tariffs.find_by_period(&range).await.unwrap().len(), 2);
        assert_eq!(tariffs.store().len().await, 2);
    }
}
