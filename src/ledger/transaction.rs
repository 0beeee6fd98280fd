use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{category::CategoryId, member::MemberId, project::ProjectId};
use crate::currency::CurrencyCode;

/// Per-member custom shares, in the transaction's own currency.
pub type ShareMap = BTreeMap<MemberId, Decimal>;

/// Closed set of rules for dividing a transaction among members.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(tag = "type", content = "shares", rename_all = "snake_case")]
pub enum SplitPolicy {
    #[default]
    Even,
    HostAll,
    GuestAll,
    Custom(ShareMap),
}

impl SplitPolicy {
    pub fn label(&self) -> &'static str {
        match self {
            SplitPolicy::Even => "even",
            SplitPolicy::HostAll => "host_all",
            SplitPolicy::GuestAll => "guest_all",
            SplitPolicy::Custom(_) => "custom",
        }
    }
}

impl fmt::Display for SplitPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Where a ledger entry came from. Only manual entries earn experience.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TransactionSource {
    #[default]
    Manual,
    Subscription { subscription_id: Uuid },
}

impl TransactionSource {
    pub fn is_subscription(&self) -> bool {
        matches!(self, TransactionSource::Subscription { .. })
    }
}

/// Unvalidated input from manual entry, CSV import, or the assistant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionDraft {
    pub amount: Decimal,
    pub currency: CurrencyCode,
    pub category_id: CategoryId,
    pub payer: MemberId,
    pub split: SplitPolicy,
    pub note: String,
    pub project_id: ProjectId,
    pub occurred_at: DateTime<Utc>,
}

impl TransactionDraft {
    pub fn new(
        amount: Decimal,
        currency: CurrencyCode,
        category_id: impl Into<CategoryId>,
        payer: impl Into<MemberId>,
        occurred_at: DateTime<Utc>,
    ) -> Self {
        Self {
            amount,
            currency,
            category_id: category_id.into(),
            payer: payer.into(),
            split: SplitPolicy::Even,
            note: String::new(),
            project_id: ProjectId::default_project(),
            occurred_at,
        }
    }

    pub fn with_split(mut self, split: SplitPolicy) -> Self {
        self.split = split;
        self
    }

    pub fn with_project(mut self, project_id: impl Into<ProjectId>) -> Self {
        self.project_id = project_id.into();
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = note.into();
        self
    }
}

/// An appended ledger entry. Immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: Uuid,
    pub amount: Decimal,
    pub currency: CurrencyCode,
    pub category_id: CategoryId,
    pub payer: MemberId,
    #[serde(default)]
    pub split: SplitPolicy,
    #[serde(default)]
    pub note: String,
    pub project_id: ProjectId,
    pub occurred_at: DateTime<Utc>,
    #[serde(default)]
    pub source: TransactionSource,
}

impl Transaction {
    pub fn from_draft(id: Uuid, draft: TransactionDraft, source: TransactionSource) -> Self {
        Self {
            id,
            amount: draft.amount,
            currency: draft.currency,
            category_id: draft.category_id,
            payer: draft.payer,
            split: draft.split,
            note: draft.note,
            project_id: draft.project_id,
            occurred_at: draft.occurred_at,
            source,
        }
    }

    /// Rebuilds the draft view so entries can be re-run through the split rules.
    pub fn as_draft(&self) -> TransactionDraft {
        TransactionDraft {
            amount: self.amount,
            currency: self.currency.clone(),
            category_id: self.category_id.clone(),
            payer: self.payer.clone(),
            split: self.split.clone(),
            note: self.note.clone(),
            project_id: self.project_id.clone(),
            occurred_at: self.occurred_at,
        }
    }

    pub fn date(&self) -> NaiveDate {
        self.occurred_at.date_naive()
    }

    pub fn is_subscription(&self) -> bool {
        self.source.is_subscription()
    }
}
