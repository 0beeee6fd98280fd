use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{
    gamification::GamificationState,
    member::{Member, MemberId, Members},
    project::{Project, ProjectId},
    settings::LedgerSettings,
    subscription::Subscription,
    transaction::Transaction,
};
use crate::currency::{self, CurrencyCode, RateTable};
use crate::errors::Result;

pub const CURRENT_SCHEMA_VERSION: u8 = 1;

/// Root aggregate for one shared household, exchanged wholesale with storage.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Ledger {
    #[serde(default)]
    pub users: Members,
    #[serde(default = "Ledger::default_projects")]
    pub projects: Vec<Project>,
    #[serde(default)]
    pub transactions: Vec<Transaction>,
    #[serde(default)]
    pub subscriptions: Vec<Subscription>,
    #[serde(default)]
    pub rates: RateTable,
    #[serde(default)]
    pub gamification: GamificationState,
    #[serde(default)]
    pub currency: CurrencyCode,
    #[serde(default)]
    pub settings: LedgerSettings,
    #[serde(default = "Ledger::schema_version_default")]
    pub schema_version: u8,
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new(CurrencyCode::default())
    }
}

impl Ledger {
    pub fn new(currency: CurrencyCode) -> Self {
        Self {
            users: Members::new(),
            projects: Self::default_projects(),
            transactions: Vec::new(),
            subscriptions: Vec::new(),
            rates: RateTable::new(),
            gamification: GamificationState::default(),
            currency,
            settings: LedgerSettings::default(),
            schema_version: CURRENT_SCHEMA_VERSION,
        }
    }

    pub fn member(&self, id: &MemberId) -> Option<&Member> {
        self.users.get(id)
    }

    pub fn has_member(&self, id: &MemberId) -> bool {
        self.users.contains_key(id)
    }

    pub fn project(&self, id: &ProjectId) -> Option<&Project> {
        self.projects.iter().find(|project| &project.id == id)
    }

    pub fn has_project(&self, id: &ProjectId) -> bool {
        self.project(id).is_some()
    }

    pub fn subscription(&self, id: Uuid) -> Option<&Subscription> {
        self.subscriptions.iter().find(|sub| sub.id == id)
    }

    pub fn subscription_mut(&mut self, id: Uuid) -> Option<&mut Subscription> {
        self.subscriptions.iter_mut().find(|sub| sub.id == id)
    }

    pub fn transaction(&self, id: Uuid) -> Option<&Transaction> {
        self.transactions.iter().find(|txn| txn.id == id)
    }

    pub fn add_transaction(&mut self, transaction: Transaction) -> Uuid {
        let id = transaction.id;
        self.transactions.push(transaction);
        id
    }

    pub fn transaction_count(&self) -> usize {
        self.transactions.len()
    }

    /// Converts an amount into this ledger's base currency.
    pub fn normalize(&self, amount: Decimal, currency: &CurrencyCode) -> Result<Decimal> {
        currency::normalize(amount, currency, &self.rates, &self.currency)
    }

    /// True when `currency` is the base currency or has a registered rate.
    pub fn supports_currency(&self, currency: &CurrencyCode) -> bool {
        currency == &self.currency || self.rates.contains_key(currency)
    }

    pub fn default_projects() -> Vec<Project> {
        vec![Project::default_project()]
    }

    pub fn schema_version_default() -> u8 {
        CURRENT_SCHEMA_VERSION
    }
}
