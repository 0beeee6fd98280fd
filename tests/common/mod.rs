#![allow(dead_code)]

use std::sync::Mutex;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use once_cell::sync::Lazy;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use shared_ledger::{
    config::Config,
    core::{services::TransactionService, LedgerManager},
    currency::CurrencyCode,
    ledger::{Ledger, Member, MemberId, MemberRole, Project, Transaction, TransactionDraft},
    storage::JsonFileStore,
};
use tempfile::TempDir;

/// Holds TempDir guards so temporary folders live for the duration of the test run.
static TEST_DIRS: Lazy<Mutex<Vec<TempDir>>> = Lazy::new(|| Mutex::new(Vec::new()));

/// Creates a fresh directory that outlives the calling test.
pub fn temp_base() -> std::path::PathBuf {
    let temp = TempDir::new().expect("create temp dir");
    let base = temp.path().to_path_buf();
    TEST_DIRS.lock().expect("lock temp dir registry").push(temp);
    base
}

/// Manager backed by a JSON snapshot inside `base`.
pub fn manager_in(base: &std::path::Path) -> LedgerManager {
    LedgerManager::new(Box::new(JsonFileStore::in_dir(base)), Config::default())
}

pub fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
}

pub fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn twd() -> CurrencyCode {
    CurrencyCode::new("TWD")
}

/// TWD ledger with `host` (Ann) and `guest` (Ben), a JPY rate and a travel project.
pub fn household() -> Ledger {
    let mut ledger = Ledger::new(twd());
    ledger
        .users
        .insert(MemberId::new("host"), Member::new("Ann", MemberRole::Host));
    ledger
        .users
        .insert(MemberId::new("guest"), Member::new("Ben", MemberRole::Guest));
    ledger.rates.insert(CurrencyCode::new("JPY"), dec!(0.2));
    ledger
        .projects
        .push(Project::new("travel", "Travel", "plane"));
    ledger
}

pub fn spend(
    amount: Decimal,
    currency: &str,
    category: &str,
    payer: &str,
    when: DateTime<Utc>,
) -> TransactionDraft {
    TransactionDraft::new(amount, CurrencyCode::new(currency), category, payer, when)
}

pub fn record(ledger: &mut Ledger, draft: TransactionDraft) -> Transaction {
    TransactionService::record(ledger, draft).expect("draft accepted")
}
