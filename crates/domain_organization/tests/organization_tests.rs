//! Tests for the Organization aggregate and billing run planning

use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use core_kernel::{
    BillingCycle, BillingSettings, Clock, Currency, FixedClock, Money, OrganizationId, TariffId,
    TimeRange,
};
use domain_organization::{
    BalanceChangeType, BillingRunPlanner, Organization, OrganizationError, OrganizationEvent,
    OrganizationStatus, PlannedOutcome,
};
use domain_tariff::{Price, Tariff, TariffError};
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()
}

fn clock() -> FixedClock {
    FixedClock::new(start() + Duration::hours(10))
}

fn rub(amount: Decimal) -> Money {
    Money::new(amount, Currency::RUB).unwrap()
}

/// 10 RUB per hour
fn hourly_tariff() -> Arc<Tariff> {
    let price = Price::generate(rub(dec!(10)), true).unwrap();
    Arc::new(
        Tariff::builder(TariffId::generate(), "Hourly", BillingCycle::Hourly)
            .price(price)
            .build(&clock())
            .unwrap(),
    )
}

fn organization(balance: Decimal) -> Organization {
    Organization::new(
        OrganizationId::generate(),
        "Acme",
        rub(balance),
        hourly_tariff(),
        &clock(),
    )
    .unwrap()
}

fn ten_hours() -> TimeRange {
    TimeRange::new(start(), start() + Duration::hours(10)).unwrap()
}

mod creation {
    use super::*;

    #[test]
    fn test_new_organization_is_active() {
        let mut org = organization(dec!(100));
        assert_eq!(org.status(), OrganizationStatus::Active);
        assert!(!org.is_suspended());
        assert_eq!(org.balance(), rub(dec!(100)));
        assert_eq!(org.version(), 1);
        assert!(org.pop_events().is_empty());
        assert_eq!(
            org.billing_info().next_billing_time,
            Some(clock().now() + Duration::hours(1))
        );
    }

    #[test]
    fn test_blank_name_rejected() {
        let result = Organization::new(
            OrganizationId::generate(),
            " ",
            rub(dec!(1)),
            hourly_tariff(),
            &clock(),
        );
        assert_eq!(result.unwrap_err(), OrganizationError::InvalidName);
    }

    #[test]
    fn test_archived_tariff_rejected() {
        let mut tariff = (*hourly_tariff()).clone();
        tariff.archive(None, &clock()).unwrap();
        let result = Organization::new(
            OrganizationId::generate(),
            "Acme",
            rub(dec!(1)),
            Arc::new(tariff),
            &clock(),
        );
        assert!(matches!(result, Err(OrganizationError::TariffArchived(_))));
    }

    #[test]
    fn test_unpriced_tariff_accepts_any_currency() {
        let trial = Arc::new(
            Tariff::builder(TariffId::generate(), "Trial", BillingCycle::OneTime)
                .build(&clock())
                .unwrap(),
        );
        let org = Organization::new(
            OrganizationId::generate(),
            "Acme",
            Money::new(dec!(5), Currency::USD).unwrap(),
            trial,
            &clock(),
        )
        .unwrap();
        assert_eq!(org.billing_info().next_billing_time, None);
        assert!(!org.is_due_for_billing(clock().now() + Duration::days(365)));
    }
}

mod deposits {
    use super::*;

    #[test]
    fn test_deposit_updates_balance_and_emits_event() {
        let mut org = organization(dec!(1000));
        org.deposit(rub(dec!(500)), &clock()).unwrap();

        assert_eq!(org.balance(), rub(dec!(1500)));
        assert_eq!(org.version(), 2);
        let events = org.pop_events();
        assert_eq!(
            events,
            vec![OrganizationEvent::BalanceUpdated {
                organization_id: org.id().clone(),
                previous_balance: rub(dec!(1000)),
                new_balance: rub(dec!(1500)),
                change_amount: rub(dec!(500)),
                change_type: BalanceChangeType::Deposit,
                timestamp: clock().now(),
            }]
        );
    }

    #[test]
    fn test_zero_deposit_rejected() {
        let mut org = organization(dec!(1000));
        let result = org.deposit(Money::zero(Currency::RUB), &clock());

        assert!(matches!(result, Err(OrganizationError::InvalidAmount(_))));
        assert_eq!(org.balance(), rub(dec!(1000)));
        assert_eq!(org.version(), 1);
        assert!(org.pending_events().is_empty());
    }

    #[test]
    fn test_foreign_currency_deposit_rejected() {
        let mut org = organization(dec!(1000));
        let usd = Money::new(dec!(5), Currency::USD).unwrap();

        assert!(matches!(org.deposit(usd, &clock()), Err(OrganizationError::Money(_))));
        assert_eq!(org.version(), 1);
        assert!(org.pending_events().is_empty());
    }

    #[test]
    fn test_repeated_deposits_accumulate() {
        let mut org = organization(dec!(0));
        for _ in 0..4 {
            org.deposit(rub(dec!(250)), &clock()).unwrap();
        }
        assert_eq!(org.balance(), rub(dec!(1000)));
        assert_eq!(org.version(), 5);
        assert_eq!(org.pop_events().len(), 4);
    }

    #[test]
    fn test_sub_unit_amounts_stay_exact() {
        let mut org = organization(dec!(1000.01));
        org.deposit(rub(dec!(0.01)), &clock()).unwrap();
        org.process_billing(&ten_hours(), &clock()).unwrap();
        assert_eq!(org.balance(), rub(dec!(900.02)));
    }
}

mod billing {
    use super::*;

    #[test]
    fn test_billing_charges_tariff_cost() {
        let mut org = organization(dec!(250));
        let mut later = clock();
        later.advance(Duration::minutes(5));
        org.process_billing(&ten_hours(), &later).unwrap();

        assert_eq!(org.balance(), rub(dec!(150)));
        assert!(!org.is_suspended());
        assert_eq!(org.version(), 2);
        assert_eq!(org.billing_info().last_billing_time, later.now());
        assert_eq!(
            org.billing_info().next_billing_time,
            Some(later.now() + Duration::hours(1))
        );

        let events = org.pop_events();
        let kinds: Vec<_> = events.iter().map(|e| e.event_type()).collect();
        assert_eq!(kinds, ["BalanceUpdated", "BillingProcessed"]);
        match &events[1] {
            OrganizationEvent::BillingProcessed { amount, period_start, period_end, .. } => {
                assert_eq!(*amount, rub(dec!(100)));
                assert_eq!(*period_start, start());
                assert_eq!(*period_end, start() + Duration::hours(10));
            }
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[test]
    fn test_insufficient_balance_leaves_state_untouched() {
        let mut org = organization(dec!(99.99));
        let before = *org.billing_info();
        let result = org.process_billing(&ten_hours(), &clock());

        assert_eq!(
            result,
            Err(OrganizationError::InsufficientBalance {
                required: rub(dec!(100)),
                available: rub(dec!(99.99)),
            })
        );
        assert_eq!(org.balance(), rub(dec!(99.99)));
        assert_eq!(*org.billing_info(), before);
        assert_eq!(org.version(), 1);
        assert!(org.pending_events().is_empty());
    }

    #[test]
    fn test_tariff_without_balance_currency_fails() {
        let trial = Arc::new(
            Tariff::builder(TariffId::generate(), "Usd only", BillingCycle::Hourly)
                .price(Price::generate(Money::new(dec!(1), Currency::USD).unwrap(), true).unwrap())
                .build(&clock())
                .unwrap(),
        );
        let result = Organization::new(OrganizationId::generate(), "Acme", rub(dec!(1)), trial, &clock());
        assert!(matches!(result, Err(OrganizationError::TariffCurrencyMismatch { .. })));
    }

    #[test]
    fn test_unpriced_one_time_tariff_bills_nothing() {
        let trial = Arc::new(
            Tariff::builder(TariffId::generate(), "Trial", BillingCycle::OneTime)
                .build(&clock())
                .unwrap(),
        );
        let mut org =
            Organization::new(OrganizationId::generate(), "Acme", rub(dec!(5)), trial, &clock()).unwrap();
        org.process_billing(&ten_hours(), &clock()).unwrap();
        assert_eq!(org.balance(), rub(dec!(5)));
    }

    #[test]
    fn test_missing_price_error_is_wrapped() {
        let err = OrganizationError::from(TariffError::PriceNotFound(Currency::RUB));
        assert!(err.to_string().contains("RUB"));
    }
}

mod suspension {
    use super::*;

    #[test]
    fn test_billing_to_zero_suspends() {
        let mut org = organization(dec!(100));
        org.process_billing(&ten_hours(), &clock()).unwrap();

        assert!(org.balance().is_zero());
        assert!(org.is_suspended());
        assert_eq!(org.status(), OrganizationStatus::Suspended);
        assert_eq!(org.version(), 2);

        let kinds: Vec<_> = org.pop_events().iter().map(|e| e.event_type()).collect();
        assert_eq!(kinds, ["BalanceUpdated", "BillingProcessed", "OrganizationSuspended"]);

        assert_eq!(
            org.deposit(rub(dec!(50)), &clock()),
            Err(OrganizationError::OrganizationSuspended)
        );
        assert_eq!(
            org.process_billing(&ten_hours(), &clock()),
            Err(OrganizationError::OrganizationSuspended)
        );
        assert_eq!(org.resume(&clock()), Err(OrganizationError::ZeroBalanceResume));
        assert!(org.balance().is_zero());
        assert_eq!(org.version(), 2);
        assert!(org.pop_events().is_empty());
    }

    #[test]
    fn test_explicit_suspend_then_resume_with_funds() {
        let mut org = organization(dec!(100));
        org.suspend("manual review", &clock()).unwrap();
        assert!(org.is_suspended());
        assert!(!org.check_balance(&rub(dec!(1))));

        assert_eq!(
            org.deposit(rub(dec!(50)), &clock()),
            Err(OrganizationError::OrganizationSuspended)
        );

        org.resume(&clock()).unwrap();
        assert_eq!(org.status(), OrganizationStatus::Active);
        assert_eq!(org.version(), 3);

        let events = org.pop_events();
        assert!(matches!(
            &events[0],
            OrganizationEvent::OrganizationSuspended { reason, .. } if reason == "manual review"
        ));
        assert_eq!(events[1].event_type(), "OrganizationResumed");

        org.deposit(rub(dec!(50)), &clock()).unwrap();
        assert!(org.check_balance(&rub(dec!(150))));
    }

    #[test]
    fn test_suspend_requires_active() {
        let mut org = organization(dec!(100));
        org.suspend("first", &clock()).unwrap();
        assert!(matches!(
            org.suspend("second", &clock()),
            Err(OrganizationError::InvalidStateTransition { .. })
        ));
    }

    #[test]
    fn test_resume_active_organization_is_noop() {
        let mut org = organization(dec!(100));
        assert_eq!(org.resume(&clock()), Ok(()));
        assert_eq!(org.status(), OrganizationStatus::Active);
        assert_eq!(org.version(), 1);
        assert!(org.pending_events().is_empty());
    }
}

mod termination {
    use super::*;

    #[test]
    fn test_terminate_is_terminal() {
        let mut org = organization(dec!(42));
        org.terminate(&clock()).unwrap();

        assert_eq!(org.status(), OrganizationStatus::Terminated);
        assert!(org.is_suspended());
        assert!(matches!(
            org.pop_events().as_slice(),
            [OrganizationEvent::OrganizationTerminated { final_balance, .. }] if *final_balance == rub(dec!(42))
        ));

        assert_eq!(org.terminate(&clock()), Err(OrganizationError::AlreadyTerminated));
        assert_eq!(org.resume(&clock()), Err(OrganizationError::Terminated));
        assert_eq!(
            org.deposit(rub(dec!(1)), &clock()),
            Err(OrganizationError::OrganizationSuspended)
        );
        assert_eq!(org.version(), 2);
    }

    #[test]
    fn test_suspended_organization_can_be_terminated() {
        let mut org = organization(dec!(100));
        org.process_billing(&ten_hours(), &clock()).unwrap();
        org.terminate(&clock()).unwrap();
        assert!(org.is_terminated());
    }
}

mod check_balance {
    use super::*;

    #[test]
    fn test_check_balance_boundaries() {
        let org = organization(dec!(1000));
        assert!(org.check_balance(&rub(dec!(1000))));
        assert!(org.check_balance(&Money::zero(Currency::RUB)));
        assert!(!org.check_balance(&rub(dec!(1000.01))));
        assert!(!org.check_balance(&Money::new(dec!(1), Currency::USD).unwrap()));
    }

    #[test]
    fn test_check_balance_is_read_only() {
        let org = organization(dec!(1000));
        let first = org.check_balance(&rub(dec!(500)));
        let second = org.check_balance(&rub(dec!(500)));
        assert_eq!(first, second);
        assert_eq!(org.version(), 1);
        assert!(org.pending_events().is_empty());
    }
}

mod planning {
    use super::*;

    fn planner(batch: usize) -> BillingRunPlanner {
        BillingRunPlanner::new(BillingSettings {
            billing_batch_size: batch,
            ..BillingSettings::default()
        })
    }

    #[test]
    fn test_plan_predicts_outcomes() {
        let rich = organization(dec!(500));
        let exact = organization(dec!(20));
        let poor = organization(dec!(5));
        let mut run_clock = clock();
        run_clock.advance(Duration::hours(2));

        let plan = planner(10).plan(&[rich.clone(), exact.clone(), poor.clone()], &run_clock);

        assert_eq!(plan.len(), 3);
        let outcome_of = |id: &OrganizationId| {
            plan.iter().find(|p| &p.organization_id == id).map(|p| p.outcome.clone())
        };
        assert_eq!(outcome_of(rich.id()), Some(PlannedOutcome::Charge));
        assert_eq!(outcome_of(exact.id()), Some(PlannedOutcome::ChargeAndSuspend));
        assert_eq!(outcome_of(poor.id()), Some(PlannedOutcome::InsufficientBalance));
        assert!(plan.iter().all(|p| p.cost == Some(rub(dec!(20)))));
    }

    #[test]
    fn test_plan_skips_not_due_and_suspended() {
        let not_due = organization(dec!(500));
        let mut suspended = organization(dec!(500));
        suspended.suspend("review", &clock()).unwrap();

        let mut run_clock = clock();
        run_clock.advance(Duration::minutes(30));
        assert!(planner(10).plan(&[not_due.clone()], &run_clock).is_empty());

        run_clock.advance(Duration::hours(1));
        let plan = planner(10).plan(&[not_due, suspended], &run_clock);
        assert_eq!(plan.len(), 1);
    }

    #[test]
    fn test_plan_is_capped_at_batch_size() {
        let orgs: Vec<_> = (0..5).map(|_| organization(dec!(100))).collect();
        let mut run_clock = clock();
        run_clock.advance(Duration::hours(1));

        assert_eq!(planner(2).plan(&orgs, &run_clock).len(), 2);
    }

    #[test]
    fn test_plan_does_not_mutate() {
        let org = organization(dec!(100));
        let mut run_clock = clock();
        run_clock.advance(Duration::hours(3));

        planner(10).plan(std::slice::from_ref(&org), &run_clock);
        assert_eq!(org.version(), 1);
        assert_eq!(org.balance(), rub(dec!(100)));
    }
}

mod serialization {
    use super::*;

    #[test]
    fn test_change_type_is_snake_case() {
        assert_eq!(serde_json::to_string(&BalanceChangeType::Deposit).unwrap(), "\"deposit\"");
        assert_eq!(serde_json::to_string(&BalanceChangeType::Billing).unwrap(), "\"billing\"");
    }

    #[test]
    fn test_events_round_trip() {
        let mut org = organization(dec!(100));
        org.process_billing(&ten_hours(), &clock()).unwrap();

        for event in org.pop_events() {
            let json = serde_json::to_string(&event).unwrap();
            let restored: OrganizationEvent = serde_json::from_str(&json).unwrap();
            assert_eq!(restored, event);
        }
    }
}

#[derive(Debug, Clone)]
enum Op {
    Deposit(i64),
    Bill(i64),
    Suspend,
    Resume,
    Terminate,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0i64..5_000).prop_map(Op::Deposit),
        (1i64..48).prop_map(Op::Bill),
        Just(Op::Suspend),
        Just(Op::Resume),
        Just(Op::Terminate),
    ]
}

proptest! {
    #[test]
    fn prop_version_and_invariants_hold(
        opening in 0i64..50_000,
        ops in prop::collection::vec(op_strategy(), 1..30)
    ) {
        let clock = clock();
        let mut org = organization(Decimal::new(opening, 2));

        for op in ops {
            let version = org.version();
            let events = org.pending_events().len();
            let balance = org.balance();

            let noop = matches!(op, Op::Resume) && org.status() == OrganizationStatus::Active;
            let result = match op {
                Op::Deposit(minor) => org.deposit(Money::from_minor(minor, Currency::RUB).unwrap(), &clock),
                Op::Bill(hours) => {
                    let period = TimeRange::new(start(), start() + Duration::hours(hours)).unwrap();
                    org.process_billing(&period, &clock)
                }
                Op::Suspend => org.suspend("test", &clock),
                Op::Resume => org.resume(&clock),
                Op::Terminate => org.terminate(&clock),
            };

            match result {
                Ok(()) if noop => {
                    prop_assert_eq!(org.version(), version);
                    prop_assert_eq!(org.pending_events().len(), events);
                }
                Ok(()) => {
                    prop_assert_eq!(org.version(), version + 1);
                    prop_assert!(org.pending_events().len() > events);
                }
                Err(_) => {
                    prop_assert_eq!(org.version(), version);
                    prop_assert_eq!(org.pending_events().len(), events);
                    prop_assert_eq!(org.balance(), balance);
                }
            }
            prop_assert!(!org.balance().is_negative());
            prop_assert_eq!(org.is_suspended(), org.status() != OrganizationStatus::Active);
        }
    }
}
