//! Status Repository: status records per scope.

use super::name_key;
use crate::engine::error::{EngineError, Result};
use crate::engine::types::{Scope, Status, StatusId};
use rusqlite::{params, Connection, OptionalExtension};

pub const STATUS_SELECT: &str =
    "SELECT id, name, color, sort_order, is_final, is_active, scope FROM statuses";

/// Fields for a new status.
#[derive(Debug, Clone)]
pub struct StatusDraft {
    pub scope: Scope,
    pub name: String,
    pub color: String,
    pub sort_order: i32,
    pub is_final: bool,
}

impl StatusDraft {
    #[must_use]
    pub fn new(scope: &Scope, name: &str) -> Self {
        Self {
            scope: scope.clone(),
            name: name.to_string(),
            color: "#808080".to_string(),
            sort_order: 0,
            is_final: false,
        }
    }

    #[must_use]
    pub fn color(mut self, color: &str) -> Self {
        self.color = color.to_string();
        self
    }

    #[must_use]
    pub fn sort_order(mut self, sort_order: i32) -> Self {
        self.sort_order = sort_order;
        self
    }

    #[must_use]
    pub fn final_status(mut self, is_final: bool) -> Self {
        self.is_final = is_final;
        self
    }
}

pub struct StatusRepo<'a> {
    conn: &'a Connection,
}

impl<'a> StatusRepo<'a> {
    #[must_use]
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Adds a status; names are unique per scope, ignoring case.
    ///
    /// # Errors
    /// `ContractViolation` for an empty name, `InvalidConfiguration` for a
    /// duplicate name, `Storage` if the insert fails.
    pub fn add(&self, draft: &StatusDraft) -> Result<Status> {
        let name = draft.name.trim();
        if name.is_empty() {
            return Err(EngineError::ContractViolation(
                "Status name cannot be empty".to_string(),
            ));
        }
        if self.find_by_name(&draft.scope, name)?.is_some() {
            return Err(EngineError::InvalidConfiguration(format!(
                "Status '{name}' already exists in scope '{}'",
                draft.scope
            )));
        }

        self.conn.execute(
            "INSERT INTO statuses (name, name_key, color, sort_order, is_final, scope)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                name,
                name_key(name),
                draft.color,
                draft.sort_order,
                draft.is_final,
                draft.scope.as_str()
            ],
        )?;

        Ok(Status {
            id: StatusId(self.conn.last_insert_rowid()),
            name: name.to_string(),
            color: draft.color.clone(),
            sort_order: draft.sort_order,
            is_final: draft.is_final,
            is_active: true,
            scope: draft.scope.clone(),
        })
    }

    /// Finds a status by its internal ID.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub fn find_by_id(&self, id: StatusId) -> Result<Option<Status>> {
        let sql = format!("{STATUS_SELECT} WHERE id = ?1");
        Ok(self
            .conn
            .query_row(&sql, params![id.0], |r| row_to_status(r, 0))
            .optional()?)
    }

    /// Finds a status by name within a scope (case-insensitive).
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub fn find_by_name(&self, scope: &Scope, name: &str) -> Result<Option<Status>> {
        let sql = format!("{STATUS_SELECT} WHERE scope = ?1 AND name_key = ?2");
        Ok(self
            .conn
            .query_row(&sql, params![scope.as_str(), name_key(name)], |r| {
                row_to_status(r, 0)
            })
            .optional()?)
    }

    /// Lists the statuses of a scope by sort order, then id.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub fn list(&self, scope: &Scope) -> Result<Vec<Status>> {
        let sql = format!("{STATUS_SELECT} WHERE scope = ?1 ORDER BY sort_order, id");
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params![scope.as_str()], |r| row_to_status(r, 0))?;
        let mut statuses = Vec::new();
        for status in rows {
            statuses.push(status?);
        }
        Ok(statuses)
    }

    /// Counts the statuses of a scope.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub fn count(&self, scope: &Scope) -> Result<usize> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM statuses WHERE scope = ?1",
            params![scope.as_str()],
            |r| r.get(0),
        )?;
        Ok(usize::try_from(count).unwrap_or_default())
    }

    /// Flags a status active or inactive.
    ///
    /// # Errors
    /// `NotFound` if no such status exists.
    pub fn set_active(&self, id: StatusId, active: bool) -> Result<()> {
        let changed = self.conn.execute(
            "UPDATE statuses SET is_active = ?1 WHERE id = ?2",
            params![active, id.0],
        )?;
        if changed == 0 {
            return Err(EngineError::not_found("Status", id));
        }
        Ok(())
    }
}

/// Reads a status from seven consecutive columns starting at `offset`.
pub(crate) fn row_to_status(row: &rusqlite::Row, offset: usize) -> rusqlite::Result<Status> {
    Ok(Status {
        id: StatusId(row.get(offset)?),
        name: row.get(offset + 1)?,
        color: row.get(offset + 2)?,
        sort_order: row.get(offset + 3)?,
        is_final: row.get(offset + 4)?,
        is_active: row.get(offset + 5)?,
        scope: Scope(row.get(offset + 6)?),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::db::Db;

    #[test]
    fn test_add_and_find() {
        let conn = Db::open_in_memory().unwrap();
        let repo = StatusRepo::new(&conn);
        let scope = Scope::new("acme");

        let done = repo
            .add(&StatusDraft::new(&scope, "Done").final_status(true).sort_order(9))
            .unwrap();
        assert!(done.is_final);
        assert!(done.is_active);

        let found = repo.find_by_name(&scope, "done").unwrap().unwrap();
        assert_eq!(found, done);
        assert_eq!(found.sort_order, 9);
        assert!(repo.find_by_name(&Scope::new("other"), "Done").unwrap().is_none());
        assert_eq!(repo.find_by_id(done.id).unwrap().unwrap().name, "Done");
    }

    #[test]
    fn test_duplicate_name_ignores_case() {
        let conn = Db::open_in_memory().unwrap();
        let repo = StatusRepo::new(&conn);
        let scope = Scope::new("acme");

        repo.add(&StatusDraft::new(&scope, "In Progress")).unwrap();
        let err = repo
            .add(&StatusDraft::new(&scope, "in progress"))
            .unwrap_err();
        assert_eq!(err.code(), "INVALID_CONFIGURATION");

        // Same name in another scope is fine.
        repo.add(&StatusDraft::new(&Scope::new("other"), "In Progress"))
            .unwrap();
    }

    #[test]
    fn test_duplicate_name_ignores_non_ascii_case() {
        let conn = Db::open_in_memory().unwrap();
        let repo = StatusRepo::new(&conn);
        let scope = Scope::new("acme");

        let review = repo.add(&StatusDraft::new(&scope, "Überprüfung")).unwrap();
        let err = repo
            .add(&StatusDraft::new(&scope, "überprüfung"))
            .unwrap_err();
        assert_eq!(err.code(), "INVALID_CONFIGURATION");
        assert_eq!(repo.find_by_name(&scope, "ÜBERPRÜFUNG").unwrap(), Some(review));
        assert_eq!(repo.count(&scope).unwrap(), 1);
    }

    #[test]
    fn test_empty_name_rejected() {
        let conn = Db::open_in_memory().unwrap();
        let err = StatusRepo::new(&conn)
            .add(&StatusDraft::new(&Scope::new("acme"), "   "))
            .unwrap_err();
        assert_eq!(err.code(), "CONTRACT_VIOLATION");
    }

    #[test]
    fn test_list_orders_by_sort_order() {
        let conn = Db::open_in_memory().unwrap();
        let repo = StatusRepo::new(&conn);
        let scope = Scope::new("acme");
        repo.add(&StatusDraft::new(&scope, "Done").sort_order(3)).unwrap();
        repo.add(&StatusDraft::new(&scope, "To Do").sort_order(1)).unwrap();
        repo.add(&StatusDraft::new(&scope, "Doing").sort_order(2)).unwrap();

        let names: Vec<_> = repo.list(&scope).unwrap().into_iter().map(|s| s.name).collect();
        assert_eq!(names, ["To Do", "Doing", "Done"]);
        assert_eq!(repo.count(&scope).unwrap(), 3);
    }

    #[test]
    fn test_set_active() {
        let conn = Db::open_in_memory().unwrap();
        let repo = StatusRepo::new(&conn);
        let status = repo.add(&StatusDraft::new(&Scope::new("acme"), "Old")).unwrap();

        repo.set_active(status.id, false).unwrap();
        assert!(!repo.find_by_id(status.id).unwrap().unwrap().is_active);
        assert_eq!(repo.set_active(StatusId(999), true).unwrap_err().code(), "NOT_FOUND");
    }
}
