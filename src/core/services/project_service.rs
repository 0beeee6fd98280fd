//! Project lifecycle. Projects referenced by history are never removed.

use tracing::info;

use crate::errors::{LedgerError, Result};
use crate::ledger::{Ledger, Project, ProjectId};

pub struct ProjectService;

impl ProjectService {
    pub fn add(ledger: &mut Ledger, project: Project) -> Result<ProjectId> {
        if project.id.as_str().trim().is_empty() || project.name.trim().is_empty() {
            return Err(LedgerError::InvalidInput(
                "project id and name cannot be empty".into(),
            ));
        }
        if ledger.has_project(&project.id) {
            return Err(LedgerError::DuplicateProject(project.id.to_string()));
        }
        let id = project.id.clone();
        ledger.projects.push(project);
        Ok(id)
    }

    /// Replaces the display name and icon of an existing project.
    pub fn update(ledger: &mut Ledger, project: Project) -> Result<()> {
        if project.name.trim().is_empty() {
            return Err(LedgerError::InvalidInput("project name cannot be empty".into()));
        }
        let slot = ledger
            .projects
            .iter_mut()
            .find(|existing| existing.id == project.id)
            .ok_or_else(|| LedgerError::UnknownProject(project.id.to_string()))?;
        *slot = project;
        Ok(())
    }

    /// Deletes an unused, non-default project.
    ///
    /// A project with transactions or subscriptions is kept so entries never point at
    /// a missing project.
    pub fn remove(ledger: &mut Ledger, id: &ProjectId) -> Result<Project> {
        if id.is_default() {
            return Err(LedgerError::ProtectedProject(id.to_string()));
        }
        let index = ledger
            .projects
            .iter()
            .position(|project| &project.id == id)
            .ok_or_else(|| LedgerError::UnknownProject(id.to_string()))?;
        let in_use = ledger.transactions.iter().any(|txn| &txn.project_id == id)
            || ledger.subscriptions.iter().any(|sub| &sub.project_id == id);
        if in_use {
            return Err(LedgerError::ProjectInUse(id.to_string()));
        }
        info!("removing project `{}`", id);
        Ok(ledger.projects.remove(index))
    }
}
