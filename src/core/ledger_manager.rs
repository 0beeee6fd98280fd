use chrono::{DateTime, Utc};
use tracing::info;

use crate::config::Config;
use crate::core::commands::{self, CommandOutcome, LedgerCommand};
use crate::core::services::{AggregateFilter, AggregateView, SummaryService};
use crate::errors::{LedgerError, Result};
use crate::io::csv::{self as csv_io, ExportAmount, ExportOptions};
use crate::ledger::{Ledger, MemberId, ProjectId};
use crate::storage::SnapshotStore;

/// Facade that reads the snapshot, runs commands and writes the result back wholesale.
pub struct LedgerManager {
    current: Option<Ledger>,
    store: Box<dyn SnapshotStore>,
    config: Config,
}

impl LedgerManager {
    pub fn new(store: Box<dyn SnapshotStore>, config: Config) -> Self {
        Self {
            current: None,
            store,
            config,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn current(&self) -> Option<&Ledger> {
        self.current.as_ref()
    }

    /// Loads the stored snapshot, or starts a new ledger in the configured currency.
    /// Due subscriptions are materialized and persisted before the ledger is returned.
    pub fn open(&mut self, now: DateTime<Utc>) -> Result<&Ledger> {
        let ledger = match self.store.load()? {
            Some(ledger) => ledger,
            None => {
                info!(
                    "starting a new ledger in {}",
                    self.config.default_currency
                );
                Ledger::new(self.config.default_currency.clone())
            }
        };
        let outcome = commands::execute(&ledger, LedgerCommand::TickSubscriptions, now)?;
        if !outcome.appended.is_empty() {
            info!(
                "materialized {} subscription charges on open",
                outcome.appended.len()
            );
            self.store.save(&outcome.ledger)?;
        }
        Ok(self.current.insert(outcome.ledger))
    }

    /// Applies a command and persists the new snapshot when it changed anything.
    pub fn execute(&mut self, command: LedgerCommand, now: DateTime<Utc>) -> Result<CommandOutcome> {
        let before = self.ledger()?;
        let outcome = commands::execute(before, command, now)?;
        if outcome.changed(before) {
            self.store.save(&outcome.ledger)?;
        }
        self.current = Some(outcome.ledger.clone());
        Ok(outcome)
    }

    pub fn aggregate(&self, filter: &AggregateFilter) -> Result<AggregateView> {
        SummaryService::aggregate(self.ledger()?, filter)
    }

    /// CSV for the filter, dated per the configured format; `member` selects share amounts.
    pub fn export_csv(&self, filter: AggregateFilter, member: Option<MemberId>) -> Result<String> {
        let options = ExportOptions {
            date_format: self.config.date_format,
            amount: member.map_or(ExportAmount::Full, ExportAmount::ShareOf),
            filter,
        };
        csv_io::export(self.ledger()?, &options)
    }

    /// Imports CSV rows paid by `importer`, into `project` or else the configured default.
    pub fn import_csv(
        &mut self,
        content: impl Into<String>,
        importer: MemberId,
        project: Option<ProjectId>,
        now: DateTime<Utc>,
    ) -> Result<CommandOutcome> {
        let project_id = project.unwrap_or_else(|| self.config.default_project.clone());
        self.execute(
            LedgerCommand::ImportCsv {
                content: content.into(),
                importer,
                project_id,
            },
            now,
        )
    }

    fn ledger(&self) -> Result<&Ledger> {
        self.current
            .as_ref()
            .ok_or_else(|| LedgerError::InvalidInput("no ledger opened".into()))
    }
}
