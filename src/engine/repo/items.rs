//! Item Repository: work items and their version-checked saves.

use super::name_key;
use super::statuses::StatusRepo;
use super::workflows::WorkflowRepo;
use crate::engine::error::{EngineError, Result};
use crate::engine::ports::ItemStore;
use crate::engine::types::{ItemId, Scope, StatusId, WorkItem, WorkflowId};
use rusqlite::{params, Connection, OptionalExtension};

const ITEM_SELECT: &str = "SELECT id, name, entity_type, scope, status_id, workflow_id, version,
     updated_at FROM work_items";

/// Raw row before status and workflow are attached.
struct ItemRow {
    id: i64,
    name: String,
    entity_type: String,
    scope: String,
    status_id: Option<i64>,
    workflow_id: Option<i64>,
    version: i64,
    updated_at: String,
}

pub struct ItemRepo<'a> {
    conn: &'a Connection,
}

impl<'a> ItemRepo<'a> {
    #[must_use]
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Finds an item by its internal ID.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub fn find_by_id(&self, id: ItemId) -> Result<Option<WorkItem>> {
        let sql = format!("{ITEM_SELECT} WHERE id = ?1");
        let row = self
            .conn
            .query_row(&sql, params![id.0], row_to_item)
            .optional()?;
        row.map(|r| self.hydrate(r)).transpose()
    }

    /// Finds an item by name within a scope, ignoring case; the lowest id
    /// wins.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub fn find_by_name(&self, scope: &Scope, name: &str) -> Result<Option<WorkItem>> {
        let key = name_key(name);
        Ok(self
            .list(Some(scope))?
            .into_iter()
            .find(|item| name_key(&item.name) == key))
    }

    /// Retrieves all items, optionally restricted to one scope.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub fn list(&self, scope: Option<&Scope>) -> Result<Vec<WorkItem>> {
        let mut rows = Vec::new();
        if let Some(scope) = scope {
            let sql = format!("{ITEM_SELECT} WHERE scope = ?1 ORDER BY id");
            let mut stmt = self.conn.prepare(&sql)?;
            for r in stmt.query_map(params![scope.as_str()], row_to_item)? {
                rows.push(r?);
            }
        } else {
            let sql = format!("{ITEM_SELECT} ORDER BY id");
            let mut stmt = self.conn.prepare(&sql)?;
            for r in stmt.query_map([], row_to_item)? {
                rows.push(r?);
            }
        }
        rows.into_iter().map(|r| self.hydrate(r)).collect()
    }

    fn hydrate(&self, row: ItemRow) -> Result<WorkItem> {
        let status = match row.status_id {
            Some(id) => Some(
                StatusRepo::new(self.conn)
                    .find_by_id(StatusId(id))?
                    .ok_or_else(|| EngineError::not_found("Status", id))?,
            ),
            None => None,
        };
        let workflow = match row.workflow_id {
            Some(id) => Some(
                WorkflowRepo::new(self.conn)
                    .find_by_id(WorkflowId(id))?
                    .ok_or_else(|| EngineError::not_found("Workflow", id))?,
            ),
            None => None,
        };
        Ok(WorkItem {
            id: Some(ItemId(row.id)),
            name: row.name,
            entity_type: row.entity_type,
            scope: Scope(row.scope),
            status,
            workflow,
            version: row.version,
            updated_at: row.updated_at,
        })
    }

    fn insert(&self, item: &WorkItem) -> Result<WorkItem> {
        self.conn.execute(
            "INSERT INTO work_items
             (name, entity_type, scope, status_id, workflow_id, version, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, 1, ?6)",
            params![
                item.name,
                item.entity_type,
                item.scope.as_str(),
                item.status.as_ref().map(|s| s.id.0),
                item.workflow.as_ref().map(|w| w.id.0),
                item.updated_at,
            ],
        )?;
        let mut stored = item.clone();
        stored.id = Some(ItemId(self.conn.last_insert_rowid()));
        stored.version = 1;
        Ok(stored)
    }

    fn update(&self, id: ItemId, item: &WorkItem) -> Result<WorkItem> {
        let changed = self.conn.execute(
            "UPDATE work_items
             SET name = ?1, entity_type = ?2, scope = ?3, status_id = ?4, workflow_id = ?5,
                 updated_at = ?6, version = version + 1
             WHERE id = ?7 AND version = ?8",
            params![
                item.name,
                item.entity_type,
                item.scope.as_str(),
                item.status.as_ref().map(|s| s.id.0),
                item.workflow.as_ref().map(|w| w.id.0),
                item.updated_at,
                id.0,
                item.version,
            ],
        )?;

        if changed == 0 {
            let found: Option<i64> = self
                .conn
                .query_row(
                    "SELECT version FROM work_items WHERE id = ?1",
                    params![id.0],
                    |r| r.get(0),
                )
                .optional()?;
            return Err(match found {
                Some(found) => EngineError::Conflict {
                    item: id,
                    expected: item.version,
                    found,
                },
                None => EngineError::not_found("Item", id),
            });
        }

        let mut stored = item.clone();
        stored.version = item.version + 1;
        Ok(stored)
    }
}

impl ItemStore for ItemRepo<'_> {
    fn save(&self, item: &WorkItem) -> Result<WorkItem> {
        match item.id {
            None => self.insert(item),
            Some(id) => self.update(id, item),
        }
    }
}

fn row_to_item(row: &rusqlite::Row) -> rusqlite::Result<ItemRow> {
    Ok(ItemRow {
        id: row.get(0)?,
        name: row.get(1)?,
        entity_type: row.get(2)?,
        scope: row.get(3)?,
        status_id: row.get(4)?,
        workflow_id: row.get(5)?,
        version: row.get(6)?,
        updated_at: row.get(7)?,
    })
}
