//! CSV export and bulk import.
//!
//! Export writes one row per transaction in chronological order. Import is the one
//! place where bad input degrades instead of failing: unusable rows are reported and
//! skipped while the rest of the file still lands.

use std::str::FromStr;

use ::csv::{ReaderBuilder, StringRecord, WriterBuilder};
use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::warn;

use crate::core::services::{AggregateFilter, SplitService};
use crate::currency::{format_amount, format_date, DateFormatStyle};
use crate::errors::{LedgerError, Result};
use crate::ledger::{
    category, CategoryId, Ledger, MemberId, ProjectId, SplitPolicy, Transaction, TransactionDraft,
};

pub const CSV_HEADER: [&str; 7] = [
    "Date", "Project", "Category", "Note", "Amount", "Payer", "SplitType",
];

const IMPORT_DATE_FORMATS: [&str; 5] = [
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%d %b %Y",
    "%a %b %d, %Y",
];

/// What the `Amount` column carries.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ExportAmount {
    #[default]
    Full,
    /// The given member's computed share.
    ShareOf(MemberId),
}

#[derive(Debug, Clone, Default)]
pub struct ExportOptions {
    pub date_format: DateFormatStyle,
    pub amount: ExportAmount,
    pub filter: AggregateFilter,
}

/// A row the importer could not use.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedRow {
    pub line: usize,
    pub reason: String,
}

impl SkippedRow {
    pub fn new(line: usize, reason: impl Into<String>) -> Self {
        Self {
            line,
            reason: reason.into(),
        }
    }

    pub fn to_error(&self) -> LedgerError {
        LedgerError::MalformedImportRow {
            line: self.line,
            reason: self.reason.clone(),
        }
    }
}

/// A row that parsed into a draft, with the line it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportedRow {
    pub line: usize,
    pub draft: TransactionDraft,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportReport {
    pub imported: Vec<ImportedRow>,
    pub skipped: Vec<SkippedRow>,
}

/// Renders matching transactions as CSV text, header included.
///
/// A share export for a member the ledger does not know fails before any row is written.
pub fn export(ledger: &Ledger, options: &ExportOptions) -> Result<String> {
    if let ExportAmount::ShareOf(member) = &options.amount {
        if !ledger.has_member(member) {
            return Err(LedgerError::UnknownMember(member.to_string()));
        }
    }
    let mut rows: Vec<&Transaction> = ledger
        .transactions
        .iter()
        .filter(|txn| options.filter.matches(txn))
        .collect();
    rows.sort_by(|a, b| a.occurred_at.cmp(&b.occurred_at).then_with(|| a.id.cmp(&b.id)));

    let mut writer = WriterBuilder::new().from_writer(Vec::new());
    writer.write_record(CSV_HEADER)?;
    for txn in rows {
        let amount = match &options.amount {
            ExportAmount::Full => txn.amount,
            ExportAmount::ShareOf(member) => {
                let shares = SplitService::compute_shares(&txn.as_draft(), &ledger.users)?;
                shares.get(member).copied().unwrap_or(Decimal::ZERO)
            }
        };
        let project = ledger
            .project(&txn.project_id)
            .map_or_else(|| txn.project_id.to_string(), |project| project.name.clone());
        let category_label = category::find(&txn.category_id)
            .map_or_else(|| txn.category_id.to_string(), |entry| entry.name.to_string());
        let payer = ledger
            .member(&txn.payer)
            .map_or_else(|| txn.payer.to_string(), |member| member.name.clone());
        writer.write_record([
            format_date(options.date_format, txn.date()),
            project,
            category_label,
            txn.note.clone(),
            format_amount(amount, &txn.currency),
            payer,
            txn.split.label().to_string(),
        ])?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|err| LedgerError::Io(err.into_error()))?;
    String::from_utf8(bytes).map_err(|err| LedgerError::InvalidInput(err.to_string()))
}

/// Parses CSV content into drafts for `project_id`, paid by `importer` unless a row
/// names another member.
///
/// Every draft uses the base currency and an even split. The header row is skipped.
pub fn parse_import(
    ledger: &Ledger,
    content: &str,
    importer: &MemberId,
    project_id: &ProjectId,
) -> Result<ImportReport> {
    if !ledger.has_member(importer) {
        return Err(LedgerError::UnknownMember(importer.to_string()));
    }
    if !ledger.has_project(project_id) {
        return Err(LedgerError::UnknownProject(project_id.to_string()));
    }

    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(::csv::Trim::All)
        .from_reader(content.as_bytes());

    let mut report = ImportReport::default();
    for (index, record) in reader.records().enumerate() {
        let fallback_line = index + 2;
        let record = match record {
            Ok(record) => record,
            Err(err) => {
                let line = err
                    .position()
                    .map_or(fallback_line, |pos| pos.line() as usize);
                report.skipped.push(SkippedRow::new(line, err.to_string()));
                continue;
            }
        };
        let line = record
            .position()
            .map_or(fallback_line, |pos| pos.line() as usize);
        if record.iter().all(str::is_empty) {
            continue;
        }
        match draft_from_record(ledger, &record, importer, project_id) {
            Ok(draft) => report.imported.push(ImportedRow { line, draft }),
            Err(reason) => report.skipped.push(SkippedRow::new(line, reason)),
        }
    }

    if !report.skipped.is_empty() {
        warn!(
            "csv import skipped {} of {} rows",
            report.skipped.len(),
            report.skipped.len() + report.imported.len()
        );
    }
    Ok(report)
}

fn draft_from_record(
    ledger: &Ledger,
    record: &StringRecord,
    importer: &MemberId,
    project_id: &ProjectId,
) -> std::result::Result<TransactionDraft, String> {
    let field = |index: usize| record.get(index).unwrap_or("");

    let date = parse_date(field(0)).ok_or_else(|| format!("unreadable date `{}`", field(0)))?;
    let amount = parse_amount(field(4))?;
    let category_id = category::lookup_label(field(2))
        .map_or_else(CategoryId::other, |entry| entry.id.clone());
    let payer = resolve_payer(ledger, field(5)).unwrap_or_else(|| importer.clone());
    let occurred_at = date.and_time(NaiveTime::default()).and_utc();

    Ok(
        TransactionDraft::new(amount, ledger.currency.clone(), category_id, payer, occurred_at)
            .with_split(SplitPolicy::Even)
            .with_project(project_id.clone())
            .with_note(field(3)),
    )
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    IMPORT_DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(raw, format).ok())
}

fn parse_amount(raw: &str) -> std::result::Result<Decimal, String> {
    let cleaned = raw.replace(',', "");
    let amount =
        Decimal::from_str(cleaned.trim()).map_err(|_| format!("amount `{raw}` is not a number"))?;
    if amount <= Decimal::ZERO {
        return Err(format!("amount `{raw}` must be positive"));
    }
    Ok(amount)
}

fn resolve_payer(ledger: &Ledger, raw: &str) -> Option<MemberId> {
    if raw.is_empty() {
        return None;
    }
    ledger
        .users
        .iter()
        .find(|(id, member)| id.as_str() == raw || member.name.eq_ignore_ascii_case(raw))
        .map(|(id, _)| id.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::currency::CurrencyCode;
    use crate::ledger::{Member, MemberRole};
    use rust_decimal_macros::dec;

    fn ledger() -> Ledger {
        let mut ledger = Ledger::new(CurrencyCode::new("TWD"));
        ledger
            .users
            .insert(MemberId::new("u1"), Member::new("Ann", MemberRole::Host));
        ledger
            .users
            .insert(MemberId::new("u2"), Member::new("Ben", MemberRole::Guest));
        ledger
    }

    #[test]
    fn accepts_several_date_layouts() {
        let expected = NaiveDate::from_ymd_opt(2024, 7, 3);
        assert_eq!(parse_date("2024-07-03"), expected);
        assert_eq!(parse_date("2024/07/03"), expected);
        assert_eq!(parse_date("07/03/2024"), expected);
        assert_eq!(parse_date("03 Jul 2024"), expected);
        assert_eq!(parse_date("Wed Jul 3, 2024"), expected);
        assert_eq!(parse_date("yesterday"), None);
    }

    #[test]
    fn payer_column_matches_names_and_ids() {
        let content = "Date,Project,Category,Note,Amount,Payer,SplitType\n\
                       2024-07-03,Daily,Food,noodles,120,ben,even\n\
                       2024-07-04,Daily,Food,rice,80,u1,even\n\
                       2024-07-05,Daily,Food,tea,40,Zoe,even\n";
        let report = parse_import(
            &ledger(),
            content,
            &MemberId::new("u1"),
            &ProjectId::default_project(),
        )
        .unwrap();
        let payers: Vec<&str> = report
            .imported
            .iter()
            .map(|row| row.draft.payer.as_str())
            .collect();
        assert_eq!(payers, ["u2", "u1", "u1"]);
        assert_eq!(report.imported[0].draft.amount, dec!(120));
        assert!(report.skipped.is_empty());
    }

    #[test]
    fn short_rows_and_bad_amounts_are_reported_by_line() {
        let content = "Date,Project,Category,Note,Amount,Payer,SplitType\n\
                       2024-07-03,Daily,Food\n\
                       2024-07-04,Daily,Food,zero,0,,even\n\
                       2024-07-05,Daily,Food,ok,\"1,200\",,even\n";
        let report = parse_import(
            &ledger(),
            content,
            &MemberId::new("u1"),
            &ProjectId::default_project(),
        )
        .unwrap();
        assert_eq!(report.imported.len(), 1);
        assert_eq!(report.imported[0].draft.amount, dec!(1200));
        let lines: Vec<usize> = report.skipped.iter().map(|row| row.line).collect();
        assert_eq!(lines, [2, 3]);
        assert!(matches!(
            report.skipped[0].to_error(),
            LedgerError::MalformedImportRow { line: 2, .. }
        ));
    }

    #[test]
    fn share_export_for_unknown_member_is_rejected() {
        let mut ledger = ledger();
        ledger.add_transaction(Transaction::from_draft(
            uuid::Uuid::from_u128(1),
            TransactionDraft::new(
                dec!(100),
                CurrencyCode::new("TWD"),
                CategoryId::new("food"),
                MemberId::new("u1"),
                NaiveDate::from_ymd_opt(2024, 7, 3)
                    .unwrap()
                    .and_time(NaiveTime::default())
                    .and_utc(),
            ),
            crate::ledger::TransactionSource::Manual,
        ));
        let options = ExportOptions {
            amount: ExportAmount::ShareOf(MemberId::new("ghost")),
            ..ExportOptions::default()
        };
        let err = export(&ledger, &options).unwrap_err();
        assert!(matches!(err, LedgerError::UnknownMember(ref id) if id == "ghost"));

        let own = ExportOptions {
            amount: ExportAmount::ShareOf(MemberId::new("u2")),
            ..ExportOptions::default()
        };
        let csv = export(&ledger, &own).unwrap();
        assert_eq!(csv.lines().count(), 2);
    }

    #[test]
    fn unknown_importer_is_rejected() {
        let err = parse_import(
            &ledger(),
            "Date\n",
            &MemberId::new("ghost"),
            &ProjectId::default_project(),
        )
        .unwrap_err();
        assert!(matches!(err, LedgerError::UnknownMember(_)));
    }
}
