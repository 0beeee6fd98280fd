mod common;

use chrono::{TimeZone, Utc, Weekday};
use common::{at, day, household, twd};
use rust_decimal_macros::dec;
use shared_ledger::{
    core::services::{ScheduleState, SubscriptionService, TransactionService},
    errors::LedgerError,
    ledger::{
        BillingCycle, CategoryId, Ledger, MemberId, ProjectId, SplitPolicy, Subscription,
        SubscriptionDraft,
    },
};

fn streaming(cycle: BillingCycle) -> SubscriptionDraft {
    SubscriptionDraft {
        name: "Streaming".into(),
        amount: dec!(390),
        currency: twd(),
        category_id: CategoryId::new("entertainment"),
        payer: MemberId::new("host"),
        cycle,
        split: SplitPolicy::Even,
        project_id: ProjectId::default_project(),
    }
}

fn registered(ledger: &mut Ledger, cycle: BillingCycle, created_on: chrono::NaiveDate) -> Subscription {
    let id = SubscriptionService::create(ledger, streaming(cycle), created_on).unwrap();
    ledger.subscription(id).cloned().unwrap()
}

#[test]
fn pay_day_thirty_one_clamps_through_a_backlog() {
    let mut ledger = household();
    let mut sub = registered(&mut ledger, BillingCycle::Monthly { pay_day: 31 }, day(2024, 1, 31));
    sub.last_materialized = Some(day(2024, 2, 29));
    let now = at(2024, 4, 30);

    let first = SubscriptionService::tick(&sub, now);
    assert_eq!(first.subscription.last_materialized, Some(day(2024, 3, 31)));
    assert_eq!(
        SubscriptionService::next_due_date(&first.subscription),
        Some(day(2024, 4, 30))
    );

    let second = SubscriptionService::tick(&first.subscription, now);
    assert_eq!(second.subscription.last_materialized, Some(day(2024, 4, 30)));
    assert_eq!(
        SubscriptionService::state(&second.subscription, now),
        ScheduleState::Idle {
            next_due: day(2024, 5, 31)
        }
    );
    assert_eq!(SubscriptionService::drain(&[sub], now).len(), 2);
}

#[test]
fn ticking_is_deterministic_and_does_not_repeat() {
    let mut ledger = household();
    let sub = registered(&mut ledger, BillingCycle::Monthly { pay_day: 10 }, day(2024, 6, 1));
    let now = Utc.with_ymd_and_hms(2024, 7, 10, 6, 30, 0).unwrap();

    let once = SubscriptionService::tick(&sub, now);
    let again = SubscriptionService::tick(&sub, now);
    assert!(once.materialized());
    assert_eq!(once, again);

    let after = SubscriptionService::tick(&once.subscription, now);
    assert!(!after.materialized());
    assert_eq!(after.subscription, once.subscription);
}

#[test]
fn materialized_charge_copies_the_template() {
    let mut ledger = household();
    let sub = registered(&mut ledger, BillingCycle::Monthly { pay_day: 5 }, day(2024, 6, 20));
    let now = at(2024, 7, 5);
    let charge = SubscriptionService::tick(&sub, now)
        .new_transaction
        .expect("due on the fifth");
    assert_eq!(charge.amount, dec!(390));
    assert_eq!(charge.note, "Streaming");
    assert_eq!(charge.occurred_at, now);
    assert!(charge.is_subscription());
    assert_eq!(charge.id, SubscriptionService::charge_id(sub.id, day(2024, 7, 5)));
}

#[test]
fn retried_ticks_are_stored_once_and_award_no_xp() {
    let mut ledger = household();
    let sub = registered(&mut ledger, BillingCycle::Monthly { pay_day: 1 }, day(2024, 1, 15));
    let now = at(2024, 4, 2);

    let created = TransactionService::materialize_due(&mut ledger, now).unwrap();
    assert_eq!(created.len(), 3);
    assert_eq!(ledger.subscription(sub.id).unwrap().last_materialized, Some(day(2024, 4, 1)));

    let stale = SubscriptionService::tick(&sub, now);
    assert!(!TransactionService::apply_tick(&mut ledger, stale).unwrap());
    assert!(TransactionService::materialize_due(&mut ledger, now).unwrap().is_empty());
    assert_eq!(ledger.transaction_count(), 3);
    assert_eq!(ledger.gamification.xp(), 0);
}

#[test]
fn lagging_marker_catches_up_to_stored_charges() {
    let mut ledger = household();
    let sub = registered(&mut ledger, BillingCycle::Monthly { pay_day: 1 }, day(2024, 1, 15));
    let now = at(2024, 4, 2);
    assert_eq!(TransactionService::materialize_due(&mut ledger, now).unwrap().len(), 3);

    // Charges persisted, marker lost.
    ledger.subscription_mut(sub.id).unwrap().last_materialized = None;

    assert!(TransactionService::materialize_due(&mut ledger, now).unwrap().is_empty());
    let repaired = ledger.subscription(sub.id).unwrap();
    assert_eq!(repaired.last_materialized, Some(day(2024, 4, 1)));
    assert_eq!(
        SubscriptionService::state(repaired, now),
        ScheduleState::Idle {
            next_due: day(2024, 5, 1)
        }
    );
    assert_eq!(ledger.transaction_count(), 3);

    let created = TransactionService::materialize_due(&mut ledger, at(2024, 5, 1)).unwrap();
    assert_eq!(created, [SubscriptionService::charge_id(sub.id, day(2024, 5, 1))]);
    assert_eq!(ledger.transaction_count(), 4);
}

#[test]
fn weekly_cycle_lands_on_the_pay_weekday() {
    let mut ledger = household();
    // 2024-07-03 is a Wednesday.
    let sub = registered(
        &mut ledger,
        BillingCycle::Weekly {
            weekday: Weekday::Mon,
        },
        day(2024, 7, 3),
    );
    assert_eq!(SubscriptionService::next_due_date(&sub), Some(day(2024, 7, 8)));
    let outcomes = SubscriptionService::drain(&[sub], at(2024, 7, 22));
    let dates: Vec<_> = outcomes
        .iter()
        .filter_map(|outcome| outcome.subscription.last_materialized)
        .collect();
    assert_eq!(dates, [day(2024, 7, 8), day(2024, 7, 15), day(2024, 7, 22)]);
}

#[test]
fn paused_subscriptions_stay_quiet_until_resumed() {
    let mut ledger = household();
    let sub = registered(&mut ledger, BillingCycle::Monthly { pay_day: 1 }, day(2024, 1, 1));
    SubscriptionService::set_active(&mut ledger, sub.id, false).unwrap();
    assert!(TransactionService::materialize_due(&mut ledger, at(2024, 3, 1)).unwrap().is_empty());

    SubscriptionService::set_active(&mut ledger, sub.id, true).unwrap();
    assert_eq!(
        TransactionService::materialize_due(&mut ledger, at(2024, 3, 1)).unwrap().len(),
        2
    );
}

#[test]
fn invalid_templates_are_rejected_at_creation() {
    let mut ledger = household();
    let before = ledger.clone();

    let err = SubscriptionService::create(
        &mut ledger,
        streaming(BillingCycle::Monthly { pay_day: 0 }),
        day(2024, 1, 1),
    )
    .unwrap_err();
    assert!(matches!(err, LedgerError::InvalidSubscriptionSchedule(_)));

    let mut stranger = streaming(BillingCycle::Monthly { pay_day: 3 });
    stranger.payer = MemberId::new("mallory");
    let err = SubscriptionService::create(&mut ledger, stranger, day(2024, 1, 1)).unwrap_err();
    assert!(matches!(err, LedgerError::UnknownMember(_)));

    assert_eq!(ledger, before);
}
