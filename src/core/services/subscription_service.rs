//! Recurring charges: schedule arithmetic and materialization.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use tracing::debug;
use uuid::Uuid;

use crate::core::services::SplitService;
use crate::errors::{LedgerError, Result};
use crate::ledger::{
    calendar::{next_weekday_after, YearMonth},
    category, BillingCycle, Ledger, Subscription, SubscriptionDraft, Transaction,
    TransactionSource,
};

/// Upper bound on catch-up ticks per subscription in one pass.
pub const MAX_BACKLOG_TICKS: usize = 1024;

/// Where a subscription stands relative to a reference time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleState {
    /// Nothing due yet; the next charge lands on the contained date.
    Idle { next_due: NaiveDate },
    /// A charge for the contained date should be materialized.
    Due { due: NaiveDate },
    /// Paused subscriptions never charge.
    Paused,
    /// The calendar has no further due date.
    Ended,
}

/// Result of one scheduler step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickOutcome {
    pub subscription: Subscription,
    pub new_transaction: Option<Transaction>,
}

impl TickOutcome {
    pub fn materialized(&self) -> bool {
        self.new_transaction.is_some()
    }
}

/// Creates subscriptions and decides when they charge.
pub struct SubscriptionService;

impl SubscriptionService {
    /// Rejects pay-days outside 1–31.
    pub fn validate_cycle(cycle: &BillingCycle) -> Result<()> {
        match cycle {
            BillingCycle::Monthly { pay_day } if !(1..=31).contains(pay_day) => {
                Err(LedgerError::InvalidSubscriptionSchedule(format!(
                    "monthly pay-day must be between 1 and 31, got {pay_day}"
                )))
            }
            _ => Ok(()),
        }
    }

    /// Validates and registers a subscription; the first charge is one cycle after `created_on`.
    pub fn create(
        ledger: &mut Ledger,
        draft: SubscriptionDraft,
        created_on: NaiveDate,
    ) -> Result<Uuid> {
        Self::validate_cycle(&draft.cycle)?;
        if draft.name.trim().is_empty() {
            return Err(LedgerError::InvalidInput(
                "subscription name cannot be empty".into(),
            ));
        }
        if draft.amount <= Decimal::ZERO {
            return Err(LedgerError::InvalidAmount(format!(
                "subscription amount must be positive, got {}",
                draft.amount
            )));
        }
        if !ledger.supports_currency(&draft.currency) {
            return Err(LedgerError::UnknownCurrency(draft.currency.to_string()));
        }
        if !category::is_known(&draft.category_id) {
            return Err(LedgerError::UnknownCategory(draft.category_id.to_string()));
        }
        if !ledger.has_project(&draft.project_id) {
            return Err(LedgerError::UnknownProject(draft.project_id.to_string()));
        }
        let id = Uuid::new_v4();
        let subscription = Subscription::from_draft(id, draft, created_on);
        let opened_at = created_on.and_time(NaiveTime::default()).and_utc();
        let template = subscription.charge_draft(opened_at);
        SplitService::validate(&template, &ledger.users)?;
        SplitService::compute_shares(&template, &ledger.users)?;
        ledger.subscriptions.push(subscription);
        Ok(id)
    }

    /// Next scheduled charge after the subscription's marker.
    ///
    /// Monthly: the pay-day in the month after the marker, clamped to that month's length.
    /// Weekly: the first pay weekday strictly after the marker.
    /// `None` only when the marker sits at the end of chrono's calendar.
    pub fn next_due_date(subscription: &Subscription) -> Option<NaiveDate> {
        let marker = subscription.marker();
        match subscription.cycle {
            BillingCycle::Monthly { pay_day } => YearMonth::of(marker).next().clamped_day(pay_day),
            BillingCycle::Weekly { weekday } => next_weekday_after(marker, weekday),
        }
    }

    pub fn state(subscription: &Subscription, now: DateTime<Utc>) -> ScheduleState {
        if !subscription.active {
            return ScheduleState::Paused;
        }
        let Some(next_due) = Self::next_due_date(subscription) else {
            return ScheduleState::Ended;
        };
        if now.date_naive() >= next_due {
            ScheduleState::Due { due: next_due }
        } else {
            ScheduleState::Idle { next_due }
        }
    }

    /// One scheduler step. Pure: the same inputs always yield the same outcome.
    ///
    /// When due, the charge is stamped `now` and the marker advances to the due date
    /// (not to `now`), so a late caller drains missed periods one tick at a time.
    pub fn tick(subscription: &Subscription, now: DateTime<Utc>) -> TickOutcome {
        let due = match Self::state(subscription, now) {
            ScheduleState::Due { due } => due,
            ScheduleState::Idle { .. } | ScheduleState::Paused | ScheduleState::Ended => {
                return TickOutcome {
                    subscription: subscription.clone(),
                    new_transaction: None,
                }
            }
        };
        let transaction = Transaction::from_draft(
            Self::charge_id(subscription.id, due),
            subscription.charge_draft(now),
            TransactionSource::Subscription {
                subscription_id: subscription.id,
            },
        );
        let mut advanced = subscription.clone();
        advanced.last_materialized = Some(due);
        debug!(
            "subscription `{}` due on {} materialized as {}",
            subscription.name, due, transaction.id
        );
        TickOutcome {
            subscription: advanced,
            new_transaction: Some(transaction),
        }
    }

    /// Ticks each subscription exactly once.
    pub fn tick_all(subscriptions: &[Subscription], now: DateTime<Utc>) -> Vec<TickOutcome> {
        subscriptions
            .iter()
            .map(|subscription| Self::tick(subscription, now))
            .collect()
    }

    /// Ticks every subscription repeatedly until idle, returning each materialized step.
    pub fn drain(subscriptions: &[Subscription], now: DateTime<Utc>) -> Vec<TickOutcome> {
        let mut outcomes = Vec::new();
        for subscription in subscriptions {
            let mut current = subscription.clone();
            for _ in 0..MAX_BACKLOG_TICKS {
                let outcome = Self::tick(&current, now);
                if !outcome.materialized() {
                    break;
                }
                current = outcome.subscription.clone();
                outcomes.push(outcome);
            }
        }
        outcomes
    }

    /// Pauses or resumes a subscription.
    pub fn set_active(ledger: &mut Ledger, id: Uuid, active: bool) -> Result<()> {
        let subscription = ledger
            .subscription_mut(id)
            .ok_or_else(|| LedgerError::InvalidInput(format!("subscription {id} not found")))?;
        subscription.active = active;
        Ok(())
    }

    /// Deterministic id per subscription and due date, so retries collide instead of duplicating.
    pub fn charge_id(subscription_id: Uuid, due: NaiveDate) -> Uuid {
        Uuid::new_v5(&subscription_id, due.to_string().as_bytes())
    }
}
