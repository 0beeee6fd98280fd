//! The all-or-nothing append path for ledger transactions.

use tracing::{debug, info};
use uuid::Uuid;

use crate::core::services::{GamificationService, SplitService, SubscriptionService, TickOutcome};
use crate::errors::{LedgerError, Result};
use crate::ledger::{category, Ledger, Transaction, TransactionDraft, TransactionSource};

/// Provides validated append helpers for ledger transactions.
pub struct TransactionService;

impl TransactionService {
    /// Checks every reference a draft makes before anything is mutated.
    pub fn validate(ledger: &Ledger, draft: &TransactionDraft) -> Result<()> {
        SplitService::validate(draft, &ledger.users)?;
        if !ledger.supports_currency(&draft.currency) {
            return Err(LedgerError::UnknownCurrency(draft.currency.to_string()));
        }
        if !category::is_known(&draft.category_id) {
            return Err(LedgerError::UnknownCategory(draft.category_id.to_string()));
        }
        if !ledger.has_project(&draft.project_id) {
            return Err(LedgerError::UnknownProject(draft.project_id.to_string()));
        }
        Ok(())
    }

    /// Validates, appends, and updates experience. Returns the stored transaction.
    pub fn record(ledger: &mut Ledger, draft: TransactionDraft) -> Result<Transaction> {
        Self::record_with_id(ledger, Uuid::new_v4(), draft, TransactionSource::Manual)
    }

    pub fn record_with_id(
        ledger: &mut Ledger,
        id: Uuid,
        draft: TransactionDraft,
        source: TransactionSource,
    ) -> Result<Transaction> {
        Self::validate(ledger, &draft)?;
        SplitService::compute_shares(&draft, &ledger.users)?;
        let transaction = Transaction::from_draft(id, draft, source);
        let gamification = GamificationService::apply_transaction(
            ledger.gamification,
            &transaction,
            &ledger.rates,
            &ledger.currency,
        )?;
        ledger.add_transaction(transaction.clone());
        ledger.gamification = gamification;
        debug!(
            "recorded {} {} paid by {} in `{}`",
            transaction.amount, transaction.currency, transaction.payer, transaction.project_id
        );
        Ok(transaction)
    }

    /// Stores a scheduler step: the advanced subscription and its charge land together.
    ///
    /// Returns `false` when the charge is already in the ledger (a retried tick). The stored
    /// marker still moves up to the outcome's, so a lagging marker cannot stall the schedule.
    pub fn apply_tick(ledger: &mut Ledger, outcome: TickOutcome) -> Result<bool> {
        let TickOutcome {
            subscription,
            new_transaction,
        } = outcome;
        let Some(transaction) = new_transaction else {
            return Ok(false);
        };
        let duplicate = ledger.transaction(transaction.id).is_some();
        let slot = ledger
            .subscription_mut(subscription.id)
            .ok_or_else(|| {
                LedgerError::InvalidInput(format!("subscription {} not found", subscription.id))
            })?;
        if duplicate {
            if subscription.last_materialized > slot.last_materialized {
                debug!(
                    "charge {} already stored; marker for `{}` moved to {:?}",
                    transaction.id, slot.name, subscription.last_materialized
                );
                slot.last_materialized = subscription.last_materialized;
            }
            return Ok(false);
        }
        *slot = subscription;
        info!(
            "materialized subscription charge {} for {}",
            transaction.id,
            transaction.date()
        );
        ledger.add_transaction(transaction);
        Ok(true)
    }

    /// Drains every due subscription into the ledger, returning the new transaction ids.
    pub fn materialize_due(
        ledger: &mut Ledger,
        now: chrono::DateTime<chrono::Utc>,
    ) -> Result<Vec<Uuid>> {
        let mut created = Vec::new();
        for outcome in SubscriptionService::drain(&ledger.subscriptions, now) {
            let id = outcome.new_transaction.as_ref().map(|txn| txn.id);
            if Self::apply_tick(ledger, outcome)? {
                created.extend(id);
            }
        }
        Ok(created)
    }

    /// Returns a snapshot of the ledger's transactions.
    pub fn list(ledger: &Ledger) -> Vec<&Transaction> {
        ledger.transactions.iter().collect()
    }
}
