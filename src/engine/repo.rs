//! SQLite-backed collaborators: status, workflow and work-item repositories.

mod items;
mod statuses;
mod workflows;

pub use items::ItemRepo;
pub use statuses::{StatusDraft, StatusRepo};
pub use workflows::WorkflowRepo;

use super::error::{EngineError, Result};
use super::ports::StatusLookup;
use super::types::{Scope, Status, StatusRelation, Workflow};
use rusqlite::Connection;

/// Lookup key for names that are unique per scope ignoring case.
///
/// Folded in Rust: `SQLite`'s `LOWER` and `NOCASE` only fold ASCII.
pub(crate) fn name_key(name: &str) -> String {
    name.trim().to_lowercase()
}

/// [`StatusLookup`] over the SQLite store.
pub struct SqliteLookup<'a> {
    conn: &'a Connection,
}

impl<'a> SqliteLookup<'a> {
    #[must_use]
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }
}

impl StatusLookup for SqliteLookup<'_> {
    fn list_relations(&self, workflow: &Workflow) -> Result<Vec<StatusRelation>> {
        let repo = WorkflowRepo::new(self.conn);
        if repo.find_by_id(workflow.id)?.is_none() {
            return Err(EngineError::not_found("Workflow", &workflow.name));
        }
        repo.relations(workflow.id)
    }

    fn list_all_statuses(&self, scope: &Scope) -> Result<Vec<Status>> {
        StatusRepo::new(self.conn).list(scope)
    }

    fn count_statuses(&self, scope: &Scope) -> Result<usize> {
        StatusRepo::new(self.conn).count(scope)
    }
}
