mod common;

use common::{at, manager_in, spend, temp_base, twd};
use rust_decimal_macros::dec;
use shared_ledger::{
    config::Config,
    core::{services::AggregateFilter, LedgerCommand, LedgerManager},
    errors::LedgerError,
    ledger::{BillingCycle, CategoryId, MemberId, Project, ProjectId, SplitPolicy, SubscriptionDraft},
    storage::{JsonFileStore, SnapshotStore},
};

fn join(manager: &mut shared_ledger::core::LedgerManager, id: &str, name: &str) {
    manager
        .execute(
            LedgerCommand::JoinMember {
                id: MemberId::new(id),
                name: name.into(),
            },
            at(2024, 1, 31),
        )
        .unwrap();
}

#[test]
fn opening_an_empty_store_starts_a_fresh_ledger() {
    let base = temp_base();
    let mut manager = manager_in(&base);
    let ledger = manager.open(at(2024, 1, 1)).unwrap();
    assert_eq!(ledger.currency, twd());
    assert!(ledger.users.is_empty());
    assert!(JsonFileStore::in_dir(&base).load().unwrap().is_none());
}

#[test]
fn commands_are_persisted_wholesale() {
    let base = temp_base();
    let mut manager = manager_in(&base);
    manager.open(at(2024, 7, 1)).unwrap();
    join(&mut manager, "u1", "Ann");
    join(&mut manager, "u2", "Ben");
    manager
        .execute(
            LedgerCommand::AddTransaction(spend(dec!(480), "TWD", "groceries", "u2", at(2024, 7, 1))),
            at(2024, 7, 1),
        )
        .unwrap();

    let stored = JsonFileStore::in_dir(&base).load().unwrap().expect("snapshot");
    assert_eq!(Some(&stored), manager.current());
    let view = manager.aggregate(&AggregateFilter::all()).unwrap();
    assert_eq!(view.per_member_owed[&MemberId::new("u1")], dec!(240));
}

#[test]
fn reopening_drains_missed_subscription_periods_once() {
    let base = temp_base();
    let mut manager = manager_in(&base);
    manager.open(at(2024, 1, 31)).unwrap();
    join(&mut manager, "u1", "Ann");
    manager
        .execute(
            LedgerCommand::AddSubscription(SubscriptionDraft {
                name: "Phone".into(),
                amount: dec!(599),
                currency: twd(),
                category_id: CategoryId::new("utilities"),
                payer: MemberId::new("u1"),
                cycle: BillingCycle::Monthly { pay_day: 31 },
                split: SplitPolicy::Even,
                project_id: ProjectId::default_project(),
            }),
            at(2024, 1, 31),
        )
        .unwrap();

    let mut later = manager_in(&base);
    let ledger = later.open(at(2024, 4, 30)).unwrap();
    assert_eq!(ledger.transaction_count(), 3);
    assert!(ledger.transactions.iter().all(|txn| txn.is_subscription()));
    assert_eq!(ledger.gamification.xp(), 0);
    assert_eq!(
        ledger.subscriptions[0].last_materialized,
        Some(common::day(2024, 4, 30))
    );

    let mut again = manager_in(&base);
    assert_eq!(again.open(at(2024, 4, 30)).unwrap().transaction_count(), 3);
}

#[test]
fn rejected_command_does_not_touch_the_stored_snapshot() {
    let base = temp_base();
    let mut manager = manager_in(&base);
    manager.open(at(2024, 7, 1)).unwrap();
    join(&mut manager, "u1", "Ann");
    manager
        .execute(
            LedgerCommand::AddProject(Project::new("travel", "Travel", "plane")),
            at(2024, 7, 1),
        )
        .unwrap();
    manager
        .execute(
            LedgerCommand::AddTransaction(
                spend(dec!(90), "TWD", "drink", "u1", at(2024, 7, 2)).with_project("travel"),
            ),
            at(2024, 7, 2),
        )
        .unwrap();
    let before = JsonFileStore::in_dir(&base).load().unwrap();

    let err = manager
        .execute(
            LedgerCommand::DeleteProject(ProjectId::new("travel")),
            at(2024, 7, 3),
        )
        .unwrap_err();
    assert!(matches!(err, LedgerError::ProjectInUse(_)));
    let err = manager
        .execute(
            LedgerCommand::DeleteProject(ProjectId::default_project()),
            at(2024, 7, 3),
        )
        .unwrap_err();
    assert!(matches!(err, LedgerError::ProtectedProject(_)));

    assert_eq!(JsonFileStore::in_dir(&base).load().unwrap(), before);
    assert_eq!(manager.current(), before.as_ref());
}

#[test]
fn export_uses_configured_date_format() {
    let base = temp_base();
    let mut manager = manager_in(&base);
    manager.open(at(2024, 7, 1)).unwrap();
    join(&mut manager, "u1", "Ann");
    manager
        .execute(
            LedgerCommand::AddTransaction(spend(dec!(60), "TWD", "food", "u1", at(2024, 7, 4))),
            at(2024, 7, 4),
        )
        .unwrap();
    let csv = manager.export_csv(AggregateFilter::all(), None).unwrap();
    assert!(csv.lines().nth(1).unwrap().starts_with("2024-07-04,Daily,Food"));
}

#[test]
fn imports_without_a_project_land_in_the_configured_default() {
    let base = temp_base();
    let config = Config {
        default_project: ProjectId::new("travel"),
        ..Config::default()
    };
    let mut manager = LedgerManager::new(Box::new(JsonFileStore::in_dir(&base)), config);
    manager.open(at(2024, 7, 1)).unwrap();
    join(&mut manager, "u1", "Ann");
    manager
        .execute(
            LedgerCommand::AddProject(Project::new("travel", "Travel", "plane")),
            at(2024, 7, 1),
        )
        .unwrap();

    let content = "Date,Project,Category,Note,Amount,Payer,SplitType\n\
                   2024-07-02,,Food,ramen,900,,even\n";
    let outcome = manager
        .import_csv(content, MemberId::new("u1"), None, at(2024, 7, 3))
        .unwrap();
    assert_eq!(outcome.appended.len(), 1);

    let explicit = manager
        .import_csv(
            content,
            MemberId::new("u1"),
            Some(ProjectId::default_project()),
            at(2024, 7, 3),
        )
        .unwrap();
    assert_eq!(explicit.appended.len(), 1);

    let stored = JsonFileStore::in_dir(&base).load().unwrap().expect("snapshot");
    let projects: Vec<&ProjectId> = stored.transactions.iter().map(|txn| &txn.project_id).collect();
    assert_eq!(projects, [&ProjectId::new("travel"), &ProjectId::default_project()]);
}
