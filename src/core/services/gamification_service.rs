//! Experience awarded for spontaneous spending.

use rust_decimal::{prelude::ToPrimitive, Decimal};

use crate::currency::{normalize, CurrencyCode, RateTable};
use crate::errors::Result;
use crate::ledger::{GamificationState, Transaction};

/// Base-currency amount worth one experience point.
pub const XP_UNIT: Decimal = Decimal::TEN;

pub struct GamificationService;

impl GamificationService {
    /// `floor(amount / 10)`, never negative.
    pub fn xp_for(base_amount: Decimal) -> u64 {
        if base_amount <= Decimal::ZERO {
            return 0;
        }
        (base_amount / XP_UNIT).floor().to_u64().unwrap_or(u64::MAX)
    }

    /// Folds one transaction into the state. Subscription charges award nothing.
    pub fn apply_transaction(
        state: GamificationState,
        transaction: &Transaction,
        rates: &RateTable,
        base: &CurrencyCode,
    ) -> Result<GamificationState> {
        if transaction.is_subscription() {
            return Ok(state);
        }
        let base_amount = normalize(transaction.amount, &transaction.currency, rates, base)?;
        Ok(state.award(Self::xp_for(base_amount)))
    }

    /// Recomputes the state from scratch; order of `transactions` does not matter.
    pub fn replay(
        transactions: &[Transaction],
        rates: &RateTable,
        base: &CurrencyCode,
    ) -> Result<GamificationState> {
        transactions
            .iter()
            .try_fold(GamificationState::default(), |state, transaction| {
                Self::apply_transaction(state, transaction, rates, base)
            })
    }
}
