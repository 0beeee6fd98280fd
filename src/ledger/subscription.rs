use chrono::{DateTime, NaiveDate, Utc, Weekday};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{
    category::CategoryId,
    member::MemberId,
    project::ProjectId,
    transaction::{SplitPolicy, TransactionDraft},
};
use crate::currency::CurrencyCode;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "cycle", rename_all = "snake_case")]
pub enum BillingCycle {
    /// Charged on `pay_day` (1–31, clamped to short months).
    Monthly { pay_day: u32 },
    /// Charged every week on `weekday`.
    Weekly { weekday: Weekday },
}

impl BillingCycle {
    pub fn label(&self) -> &'static str {
        match self {
            BillingCycle::Monthly { .. } => "monthly",
            BillingCycle::Weekly { .. } => "weekly",
        }
    }
}

/// Input for creating a recurring charge ("fixed expense" at entry time).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriptionDraft {
    pub name: String,
    pub amount: Decimal,
    pub currency: CurrencyCode,
    pub category_id: CategoryId,
    pub payer: MemberId,
    pub cycle: BillingCycle,
    pub split: SplitPolicy,
    pub project_id: ProjectId,
}

/// Template for recurring ledger entries plus its materialization marker.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    pub id: Uuid,
    pub name: String,
    pub amount: Decimal,
    pub currency: CurrencyCode,
    pub category_id: CategoryId,
    pub payer: MemberId,
    #[serde(flatten)]
    pub cycle: BillingCycle,
    #[serde(default)]
    pub split: SplitPolicy,
    pub project_id: ProjectId,
    pub created_on: NaiveDate,
    #[serde(default)]
    pub last_materialized: Option<NaiveDate>,
    #[serde(default = "Subscription::default_active")]
    pub active: bool,
}

impl Subscription {
    pub fn from_draft(id: Uuid, draft: SubscriptionDraft, created_on: NaiveDate) -> Self {
        Self {
            id,
            name: draft.name,
            amount: draft.amount,
            currency: draft.currency,
            category_id: draft.category_id,
            payer: draft.payer,
            cycle: draft.cycle,
            split: draft.split,
            project_id: draft.project_id,
            created_on,
            last_materialized: None,
            active: true,
        }
    }

    /// Date the schedule counts from: the last materialization, else creation.
    pub fn marker(&self) -> NaiveDate {
        self.last_materialized.unwrap_or(self.created_on)
    }

    /// Builds the ledger entry this template produces when charged at `at`.
    pub fn charge_draft(&self, at: DateTime<Utc>) -> TransactionDraft {
        TransactionDraft {
            amount: self.amount,
            currency: self.currency.clone(),
            category_id: self.category_id.clone(),
            payer: self.payer.clone(),
            split: self.split.clone(),
            note: self.name.clone(),
            project_id: self.project_id.clone(),
            occurred_at: at,
        }
    }

    pub fn default_active() -> bool {
        true
    }
}
