//! Command side of the ledger: each command maps one snapshot to the next.
//!
//! Commands run against a private copy, so a failing command leaves the caller's
//! snapshot exactly as it was.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tracing::debug;
use uuid::Uuid;

use crate::core::services::{
    ProjectService, SettingsService, SubscriptionService, TransactionService,
};
use crate::currency::CurrencyCode;
use crate::errors::Result;
use crate::io::csv::{parse_import, SkippedRow};
use crate::ledger::{
    CategoryId, Ledger, MemberId, Project, ProjectId, SubscriptionDraft, TransactionDraft,
};

#[derive(Debug, Clone, PartialEq)]
pub enum LedgerCommand {
    JoinMember { id: MemberId, name: String },
    AddTransaction(TransactionDraft),
    AddSubscription(SubscriptionDraft),
    SetSubscriptionActive { id: Uuid, active: bool },
    TickSubscriptions,
    AddProject(Project),
    UpdateProject(Project),
    DeleteProject(ProjectId),
    SetRate { currency: CurrencyCode, rate: Decimal },
    SetBaseCurrency(CurrencyCode),
    SetFavorites(Vec<CategoryId>),
    SetCharacter(Option<String>),
    ImportCsv {
        content: String,
        importer: MemberId,
        project_id: ProjectId,
    },
}

impl LedgerCommand {
    pub fn name(&self) -> &'static str {
        match self {
            LedgerCommand::JoinMember { .. } => "join_member",
            LedgerCommand::AddTransaction(_) => "add_transaction",
            LedgerCommand::AddSubscription(_) => "add_subscription",
            LedgerCommand::SetSubscriptionActive { .. } => "set_subscription_active",
            LedgerCommand::TickSubscriptions => "tick_subscriptions",
            LedgerCommand::AddProject(_) => "add_project",
            LedgerCommand::UpdateProject(_) => "update_project",
            LedgerCommand::DeleteProject(_) => "delete_project",
            LedgerCommand::SetRate { .. } => "set_rate",
            LedgerCommand::SetBaseCurrency(_) => "set_base_currency",
            LedgerCommand::SetFavorites(_) => "set_favorites",
            LedgerCommand::SetCharacter(_) => "set_character",
            LedgerCommand::ImportCsv { .. } => "import_csv",
        }
    }
}

/// The snapshot produced by a command and what it added.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandOutcome {
    pub ledger: Ledger,
    /// Ids of transactions appended, in order.
    pub appended: Vec<Uuid>,
    /// Set by `AddSubscription`.
    pub subscription_id: Option<Uuid>,
    /// Rows an import could not use.
    pub skipped: Vec<SkippedRow>,
}

impl CommandOutcome {
    fn unchanged_from(ledger: Ledger) -> Self {
        Self {
            ledger,
            appended: Vec::new(),
            subscription_id: None,
            skipped: Vec::new(),
        }
    }

    /// True when the snapshot differs from the one the command started from.
    pub fn changed(&self, before: &Ledger) -> bool {
        &self.ledger != before
    }
}

pub fn execute(ledger: &Ledger, command: LedgerCommand, now: DateTime<Utc>) -> Result<CommandOutcome> {
    debug!("executing {}", command.name());
    let mut outcome = CommandOutcome::unchanged_from(ledger.clone());
    let next = &mut outcome.ledger;
    match command {
        LedgerCommand::JoinMember { id, name } => {
            SettingsService::join(next, id, name)?;
        }
        LedgerCommand::AddTransaction(draft) => {
            let transaction = TransactionService::record(next, draft)?;
            outcome.appended.push(transaction.id);
        }
        LedgerCommand::AddSubscription(draft) => {
            let id = SubscriptionService::create(next, draft, now.date_naive())?;
            outcome.subscription_id = Some(id);
        }
        LedgerCommand::SetSubscriptionActive { id, active } => {
            SubscriptionService::set_active(next, id, active)?;
        }
        LedgerCommand::TickSubscriptions => {
            outcome.appended = TransactionService::materialize_due(next, now)?;
        }
        LedgerCommand::AddProject(project) => {
            ProjectService::add(next, project)?;
        }
        LedgerCommand::UpdateProject(project) => {
            ProjectService::update(next, project)?;
        }
        LedgerCommand::DeleteProject(id) => {
            ProjectService::remove(next, &id)?;
        }
        LedgerCommand::SetRate { currency, rate } => {
            SettingsService::set_rate(next, currency, rate)?;
        }
        LedgerCommand::SetBaseCurrency(currency) => {
            SettingsService::set_base_currency(next, currency)?;
        }
        LedgerCommand::SetFavorites(ids) => {
            SettingsService::set_favorites(next, ids)?;
        }
        LedgerCommand::SetCharacter(character_id) => {
            SettingsService::set_character(next, character_id);
        }
        LedgerCommand::ImportCsv {
            content,
            importer,
            project_id,
        } => {
            let report = parse_import(next, &content, &importer, &project_id)?;
            outcome.skipped = report.skipped;
            for row in report.imported {
                match TransactionService::record(next, row.draft) {
                    Ok(transaction) => outcome.appended.push(transaction.id),
                    Err(err) => outcome.skipped.push(SkippedRow::new(row.line, err.to_string())),
                }
            }
            outcome.skipped.sort_by_key(|row| row.line);
        }
    }
    Ok(outcome)
}
