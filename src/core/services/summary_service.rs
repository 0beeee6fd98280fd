//! Read-side aggregation: totals, balances, category breakdowns and trends.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::Serialize;

use crate::core::services::SplitService;
use crate::currency::{normalize, round_to_minor, CurrencyCode, RateTable};
use crate::errors::Result;
use crate::ledger::{CategoryId, Ledger, MemberId, Members, ProjectId, ShareMap, Transaction, YearMonth};

/// Restricts aggregation to one project and/or one calendar month.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AggregateFilter {
    pub project_id: Option<ProjectId>,
    pub year_month: Option<YearMonth>,
}

impl AggregateFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn for_project(mut self, project_id: impl Into<ProjectId>) -> Self {
        self.project_id = Some(project_id.into());
        self
    }

    pub fn in_month(mut self, year_month: YearMonth) -> Self {
        self.year_month = Some(year_month);
        self
    }

    pub fn matches(&self, transaction: &Transaction) -> bool {
        let project_ok = self
            .project_id
            .as_ref()
            .map_or(true, |id| &transaction.project_id == id);
        let month_ok = self
            .year_month
            .map_or(true, |month| month.contains(transaction.date()));
        project_ok && month_ok
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryTotal {
    pub category_id: CategoryId,
    pub total: Decimal,
    /// Share of the filtered total spend, rounded to two decimals.
    pub percentage: Decimal,
}

/// Suggested transfer that settles part of the outstanding balances.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Settlement {
    pub from: MemberId,
    pub to: MemberId,
    pub amount: Decimal,
}

/// Aggregated figures in the ledger's base currency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AggregateView {
    pub currency: CurrencyCode,
    pub transaction_count: usize,
    pub total_spend: Decimal,
    pub per_member_paid: BTreeMap<MemberId, Decimal>,
    pub per_member_owed: BTreeMap<MemberId, Decimal>,
    pub per_category_totals: Vec<CategoryTotal>,
}

impl AggregateView {
    /// Paid minus owed; positive means the member is owed money.
    pub fn net_balance(&self) -> BTreeMap<MemberId, Decimal> {
        let mut balances: BTreeMap<MemberId, Decimal> = BTreeMap::new();
        for (id, paid) in &self.per_member_paid {
            *balances.entry(id.clone()).or_insert(Decimal::ZERO) += *paid;
        }
        for (id, owed) in &self.per_member_owed {
            *balances.entry(id.clone()).or_insert(Decimal::ZERO) -= *owed;
        }
        balances
    }

    /// Greedy pairing of the largest debtor with the largest creditor until settled.
    pub fn settlements(&self) -> Vec<Settlement> {
        let balances = self.net_balance();
        let mut creditors: Vec<(MemberId, Decimal)> = balances
            .iter()
            .filter(|(_, amount)| amount.is_sign_positive() && !amount.is_zero())
            .map(|(id, amount)| (id.clone(), *amount))
            .collect();
        let mut debtors: Vec<(MemberId, Decimal)> = balances
            .iter()
            .filter(|(_, amount)| amount.is_sign_negative() && !amount.is_zero())
            .map(|(id, amount)| (id.clone(), -*amount))
            .collect();
        creditors.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        debtors.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

        let mut transfers = Vec::new();
        let (mut ci, mut di) = (0, 0);
        while ci < creditors.len() && di < debtors.len() {
            let amount = creditors[ci].1.min(debtors[di].1);
            transfers.push(Settlement {
                from: debtors[di].0.clone(),
                to: creditors[ci].0.clone(),
                amount,
            });
            creditors[ci].1 -= amount;
            debtors[di].1 -= amount;
            if creditors[ci].1.is_zero() {
                ci += 1;
            }
            if debtors[di].1.is_zero() {
                di += 1;
            }
        }
        transfers
    }
}

/// Aggregates ledger transactions into read-only views.
pub struct SummaryService;

impl SummaryService {
    /// Builds the view for the transactions matching `filter`.
    ///
    /// Even and role splits are recomputed from the ledger's current membership, so a
    /// member who joins later also owes a share of earlier transactions. Custom splits
    /// keep their stored shares.
    pub fn aggregate(ledger: &Ledger, filter: &AggregateFilter) -> Result<AggregateView> {
        Self::aggregate_transactions(
            &ledger.transactions,
            &ledger.users,
            &ledger.rates,
            &ledger.currency,
            filter,
        )
    }

    /// Folds the filtered transactions; the result does not depend on input order.
    pub fn aggregate_transactions(
        transactions: &[Transaction],
        members: &Members,
        rates: &RateTable,
        base: &CurrencyCode,
        filter: &AggregateFilter,
    ) -> Result<AggregateView> {
        let mut per_member_paid: BTreeMap<MemberId, Decimal> =
            members.keys().map(|id| (id.clone(), Decimal::ZERO)).collect();
        let mut per_member_owed = per_member_paid.clone();
        let mut per_category: BTreeMap<CategoryId, Decimal> = BTreeMap::new();
        let mut total_spend = Decimal::ZERO;
        let mut transaction_count = 0;

        for transaction in transactions.iter().filter(|txn| filter.matches(txn)) {
            let (amount, shares) = Self::base_shares(transaction, members, rates, base)?;
            total_spend += amount;
            transaction_count += 1;
            *per_member_paid
                .entry(transaction.payer.clone())
                .or_insert(Decimal::ZERO) += amount;
            for (id, share) in shares {
                *per_member_owed.entry(id).or_insert(Decimal::ZERO) += share;
            }
            *per_category
                .entry(transaction.category_id.clone())
                .or_insert(Decimal::ZERO) += amount;
        }

        let mut per_category_totals: Vec<CategoryTotal> = per_category
            .into_iter()
            .map(|(category_id, total)| CategoryTotal {
                category_id,
                total,
                percentage: percentage_of(total, total_spend),
            })
            .collect();
        per_category_totals.sort_by(|a, b| {
            b.total
                .cmp(&a.total)
                .then_with(|| a.category_id.cmp(&b.category_id))
        });

        Ok(AggregateView {
            currency: base.clone(),
            transaction_count,
            total_spend,
            per_member_paid,
            per_member_owed,
            per_category_totals,
        })
    }

    /// Base-currency spend per calendar month, optionally for a single project.
    pub fn monthly_totals(
        ledger: &Ledger,
        project_id: Option<&ProjectId>,
    ) -> Result<BTreeMap<YearMonth, Decimal>> {
        let mut totals = BTreeMap::new();
        for transaction in &ledger.transactions {
            if project_id.is_some_and(|id| &transaction.project_id != id) {
                continue;
            }
            let amount = round_to_minor(
                normalize(transaction.amount, &transaction.currency, &ledger.rates, &ledger.currency)?,
                &ledger.currency,
            );
            *totals
                .entry(YearMonth::of(transaction.date()))
                .or_insert(Decimal::ZERO) += amount;
        }
        Ok(totals)
    }

    /// Converts one transaction and its shares to base currency.
    ///
    /// Shares are converted one by one and any rounding drift is handed to the payer so
    /// converted shares still sum to the converted amount.
    pub fn base_shares(
        transaction: &Transaction,
        members: &Members,
        rates: &RateTable,
        base: &CurrencyCode,
    ) -> Result<(Decimal, ShareMap)> {
        let amount = round_to_minor(
            normalize(transaction.amount, &transaction.currency, rates, base)?,
            base,
        );
        let shares = SplitService::compute_shares(&transaction.as_draft(), members)?;
        let mut converted = ShareMap::new();
        for (id, share) in shares {
            let value = round_to_minor(normalize(share, &transaction.currency, rates, base)?, base);
            converted.insert(id, value);
        }
        let drift = amount - converted.values().copied().sum::<Decimal>();
        if !drift.is_zero() {
            let recipient = if converted.contains_key(&transaction.payer) {
                Some(transaction.payer.clone())
            } else {
                converted.keys().next().cloned()
            };
            if let Some(recipient) = recipient {
                *converted.entry(recipient).or_insert(Decimal::ZERO) += drift;
            }
        }
        Ok((amount, converted))
    }
}

fn percentage_of(part: Decimal, whole: Decimal) -> Decimal {
    if whole.is_zero() {
        return Decimal::ZERO;
    }
    (part * Decimal::ONE_HUNDRED / whole).round_dp(2)
}
