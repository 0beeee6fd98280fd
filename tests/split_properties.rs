mod common;

use common::{at, household, spend};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use shared_ledger::{
    core::services::SplitService,
    currency::CurrencyCode,
    errors::LedgerError,
    ledger::{Member, MemberId, MemberRole, Members, ShareMap, SplitPolicy, TransactionDraft},
};

fn members(count: usize) -> Members {
    (0..count)
        .map(|index| {
            let role = if index == 0 {
                MemberRole::Host
            } else {
                MemberRole::Guest
            };
            (
                MemberId::new(format!("m{index}")),
                Member::new(format!("Member {index}"), role),
            )
        })
        .collect()
}

#[test]
fn shares_always_sum_to_the_amount() {
    let amounts = [
        (dec!(0.01), "TWD"),
        (dec!(1), "TWD"),
        (dec!(7), "TWD"),
        (dec!(99.99), "TWD"),
        (dec!(100), "TWD"),
        (dec!(1234.57), "USD"),
        (dec!(1001), "JPY"),
        (dec!(10.005), "KWD"),
    ];
    for count in 1..=5 {
        let group = members(count);
        let mut policies = vec![SplitPolicy::Even, SplitPolicy::HostAll];
        if count > 1 {
            policies.push(SplitPolicy::GuestAll);
        }
        for (amount, currency) in amounts {
            for policy in &policies {
                let draft = TransactionDraft::new(
                    amount,
                    CurrencyCode::new(currency),
                    "food",
                    "m0",
                    at(2024, 7, 1),
                )
                .with_split(policy.clone());
                let shares = SplitService::compute_shares(&draft, &group).unwrap();
                let total: Decimal = shares.values().copied().sum();
                assert_eq!(total, amount, "{policy} over {count} members of {amount} {currency}");
                assert!(shares.values().all(|share| !share.is_sign_negative()));
            }
        }
    }
}

#[test]
fn even_split_between_host_and_guest() {
    let ledger = household();
    let draft = spend(dec!(1000), "TWD", "food", "host", at(2024, 7, 1));
    let shares = SplitService::compute_shares(&draft, &ledger.users).unwrap();
    assert_eq!(shares[&MemberId::new("host")], dec!(500));
    assert_eq!(shares[&MemberId::new("guest")], dec!(500));
}

#[test]
fn custom_split_is_accepted_only_when_it_adds_up() {
    let ledger = household();
    let mut exact = ShareMap::new();
    exact.insert(MemberId::new("host"), dec!(700));
    exact.insert(MemberId::new("guest"), dec!(300));
    let accepted = spend(dec!(1000), "TWD", "food", "host", at(2024, 7, 1))
        .with_split(SplitPolicy::Custom(exact));
    assert!(SplitService::validate(&accepted, &ledger.users).is_ok());

    let mut short = ShareMap::new();
    short.insert(MemberId::new("host"), dec!(700));
    short.insert(MemberId::new("guest"), dec!(250));
    let rejected = spend(dec!(1000), "TWD", "food", "host", at(2024, 7, 1))
        .with_split(SplitPolicy::Custom(short));
    match SplitService::validate(&rejected, &ledger.users) {
        Err(LedgerError::SplitMismatch { expected, actual }) => {
            assert_eq!((expected, actual), (dec!(1000), dec!(950)));
        }
        other => panic!("expected a split mismatch, got {other:?}"),
    }
}

#[test]
fn empty_membership_cannot_split() {
    let draft = spend(dec!(10), "TWD", "food", "host", at(2024, 7, 1));
    let err = SplitService::compute_shares(&draft, &Members::new()).unwrap_err();
    assert!(matches!(err, LedgerError::NoMembers));
}
