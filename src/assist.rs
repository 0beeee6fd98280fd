//! Intake for drafts produced by an external text/image understanding service.
//!
//! Responses are best effort. Anything that does not parse cleanly is discarded as a
//! whole; a partially understood draft is never applied.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::currency::CurrencyCode;
use crate::errors::{LedgerError, Result};
use crate::ledger::{category, CategoryId, Ledger, MemberId, ProjectId, TransactionDraft};

/// A validated assistant suggestion, ready to be treated like manual entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssistDraft {
    pub amount: Decimal,
    pub category_id: CategoryId,
    pub note: String,
    pub currency: CurrencyCode,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawAssistDraft {
    amount: Decimal,
    category_id: CategoryId,
    #[serde(default)]
    note: Option<String>,
    #[serde(default)]
    currency_code: Option<String>,
}

impl AssistDraft {
    /// Parses `{amount, categoryId, note, currencyCode}`, optionally wrapped in a
    /// markdown code fence. A missing currency means the ledger's base currency.
    pub fn parse(raw: &str, ledger: &Ledger) -> Result<Self> {
        let body = strip_code_fence(raw);
        let parsed: RawAssistDraft = serde_json::from_str(body)
            .map_err(|err| LedgerError::MalformedAssistResponse(err.to_string()))?;

        if parsed.amount <= Decimal::ZERO {
            return Err(LedgerError::MalformedAssistResponse(format!(
                "amount must be positive, got {}",
                parsed.amount
            )));
        }
        if !category::is_known(&parsed.category_id) {
            return Err(LedgerError::MalformedAssistResponse(format!(
                "category `{}` is not in the catalog",
                parsed.category_id
            )));
        }
        let currency = match parsed.currency_code.as_deref().map(str::trim) {
            Some(code) if !code.is_empty() => CurrencyCode::new(code),
            _ => ledger.currency.clone(),
        };
        if !ledger.supports_currency(&currency) {
            return Err(LedgerError::MalformedAssistResponse(format!(
                "currency {currency} has no registered rate"
            )));
        }

        Ok(Self {
            amount: parsed.amount,
            category_id: parsed.category_id,
            note: parsed.note.unwrap_or_default().trim().to_string(),
            currency,
        })
    }

    pub fn into_draft(
        self,
        payer: impl Into<MemberId>,
        project_id: impl Into<ProjectId>,
        occurred_at: DateTime<Utc>,
    ) -> TransactionDraft {
        TransactionDraft::new(self.amount, self.currency, self.category_id, payer, occurred_at)
            .with_project(project_id)
            .with_note(self.note)
    }
}

fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}
