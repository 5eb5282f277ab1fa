//! Workflow Repository: workflows and their status relations.

use super::name_key;
use super::statuses::row_to_status;
use crate::engine::error::{EngineError, Result};
use crate::engine::types::{
    RelationId, Scope, Status, StatusId, StatusRelation, Workflow, WorkflowId,
};
use rusqlite::{params, Connection, OptionalExtension};

const WORKFLOW_SELECT: &str = "SELECT id, name, entity_type, scope FROM workflows";

const RELATION_SELECT: &str = "SELECT r.id, r.workflow_id, r.initial_status, r.sequence,
        f.id, f.name, f.color, f.sort_order, f.is_final, f.is_active, f.scope,
        t.id, t.name, t.color, t.sort_order, t.is_final, t.is_active, t.scope
     FROM status_relations r
     LEFT JOIN statuses f ON f.id = r.from_status_id
     JOIN statuses t ON t.id = r.to_status_id";

pub struct WorkflowRepo<'a> {
    conn: &'a Connection,
}

impl<'a> WorkflowRepo<'a> {
    #[must_use]
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Adds a new workflow.
    ///
    /// # Errors
    /// `InvalidConfiguration` if the name is taken in the scope.
    pub fn add(&self, scope: &Scope, name: &str, entity_type: &str) -> Result<Workflow> {
        if self.find_by_name(scope, name)?.is_some() {
            return Err(EngineError::InvalidConfiguration(format!(
                "Workflow '{name}' already exists in scope '{scope}'"
            )));
        }
        self.conn.execute(
            "INSERT INTO workflows (name, name_key, entity_type, scope) VALUES (?1, ?2, ?3, ?4)",
            params![name, name_key(name), entity_type, scope.as_str()],
        )?;
        Ok(Workflow {
            id: WorkflowId(self.conn.last_insert_rowid()),
            name: name.to_string(),
            entity_type: entity_type.to_string(),
            scope: scope.clone(),
        })
    }

    /// Finds a workflow by its internal ID.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub fn find_by_id(&self, id: WorkflowId) -> Result<Option<Workflow>> {
        let sql = format!("{WORKFLOW_SELECT} WHERE id = ?1");
        Ok(self
            .conn
            .query_row(&sql, params![id.0], row_to_workflow)
            .optional()?)
    }

    /// Finds a workflow by name within a scope (case-insensitive).
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub fn find_by_name(&self, scope: &Scope, name: &str) -> Result<Option<Workflow>> {
        let sql = format!("{WORKFLOW_SELECT} WHERE scope = ?1 AND name_key = ?2");
        Ok(self
            .conn
            .query_row(&sql, params![scope.as_str(), name_key(name)], row_to_workflow)
            .optional()?)
    }

    /// Lists workflows, optionally restricted to one scope.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub fn list(&self, scope: Option<&Scope>) -> Result<Vec<Workflow>> {
        let mut workflows = Vec::new();
        if let Some(scope) = scope {
            let sql = format!("{WORKFLOW_SELECT} WHERE scope = ?1 ORDER BY id");
            let mut stmt = self.conn.prepare(&sql)?;
            for wf in stmt.query_map(params![scope.as_str()], row_to_workflow)? {
                workflows.push(wf?);
            }
        } else {
            let sql = format!("{WORKFLOW_SELECT} ORDER BY scope, id");
            let mut stmt = self.conn.prepare(&sql)?;
            for wf in stmt.query_map([], row_to_workflow)? {
                workflows.push(wf?);
            }
        }
        Ok(workflows)
    }

    /// All relations of a workflow. Row order is whatever `SQLite` returns.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub fn relations(&self, workflow_id: WorkflowId) -> Result<Vec<StatusRelation>> {
        self.query_relations("WHERE r.workflow_id = ?1", workflow_id.0)
    }

    /// Relations leaving a status, across workflows.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub fn relations_from(&self, status_id: StatusId) -> Result<Vec<StatusRelation>> {
        self.query_relations("WHERE r.from_status_id = ?1", status_id.0)
    }

    /// Relations entering a status, across workflows.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub fn relations_to(&self, status_id: StatusId) -> Result<Vec<StatusRelation>> {
        self.query_relations("WHERE r.to_status_id = ?1", status_id.0)
    }

    fn query_relations(&self, filter: &str, key: i64) -> Result<Vec<StatusRelation>> {
        let sql = format!("{RELATION_SELECT} {filter}");
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params![key], row_to_relation)?;
        let mut relations = Vec::new();
        for r in rows {
            relations.push(r?);
        }
        Ok(relations)
    }

    /// Adds a transition edge to a workflow.
    ///
    /// `from = None` adds an entry edge. Without an explicit `sequence` the
    /// edge is appended after the workflow's last one.
    ///
    /// # Errors
    /// `ContractViolation` if a status belongs to another scope,
    /// `InvalidConfiguration` for a self-loop or an edge that already exists.
    pub fn add_transition(
        &self,
        workflow: &Workflow,
        from: Option<&Status>,
        to: &Status,
        initial: bool,
        sequence: Option<i64>,
    ) -> Result<StatusRelation> {
        for status in from.into_iter().chain(std::iter::once(to)) {
            if status.scope != workflow.scope {
                return Err(EngineError::ContractViolation(format!(
                    "Status '{}' belongs to scope '{}', workflow '{}' to '{}'",
                    status.name, status.scope, workflow.name, workflow.scope
                )));
            }
        }
        if from.is_some_and(|f| f.same_as(to)) {
            return Err(EngineError::InvalidConfiguration(format!(
                "From status and to status cannot be the same: {} -> {}",
                to.name, to.name
            )));
        }
        if self.find_transition(workflow.id, from, to)?.is_some() {
            return Err(EngineError::InvalidConfiguration(format!(
                "Transition {} -> {} is already defined for workflow '{}'",
                from.map_or("(entry)", |f| f.name.as_str()),
                to.name,
                workflow.name
            )));
        }

        let sequence = match sequence {
            Some(seq) => seq,
            None => {
                let last: Option<i64> = self.conn.query_row(
                    "SELECT MAX(sequence) FROM status_relations WHERE workflow_id = ?1",
                    params![workflow.id.0],
                    |r| r.get(0),
                )?;
                last.map_or(0, |s| s + 1)
            }
        };

        self.conn.execute(
            "INSERT INTO status_relations
             (workflow_id, from_status_id, to_status_id, initial_status, sequence)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![workflow.id.0, from.map(|f| f.id.0), to.id.0, initial, sequence],
        )?;

        Ok(StatusRelation {
            id: RelationId(self.conn.last_insert_rowid()),
            workflow_id: workflow.id,
            from_status: from.cloned(),
            to_status: to.clone(),
            initial_status: initial,
            sequence,
        })
    }

    /// Finds the edge `from -> to` in a workflow.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub fn find_transition(
        &self,
        workflow_id: WorkflowId,
        from: Option<&Status>,
        to: &Status,
    ) -> Result<Option<RelationId>> {
        Ok(self
            .conn
            .query_row(
                "SELECT id FROM status_relations
                 WHERE workflow_id = ?1 AND from_status_id IS ?2 AND to_status_id = ?3
                 ORDER BY id LIMIT 1",
                params![workflow_id.0, from.map(|f| f.id.0), to.id.0],
                |r| r.get(0),
            )
            .optional()?
            .map(RelationId))
    }

    /// Removes every `from -> to` edge of a workflow; returns how many went.
    ///
    /// # Errors
    /// Returns an error if the delete fails.
    pub fn remove_transition(
        &self,
        workflow_id: WorkflowId,
        from: Option<&Status>,
        to: &Status,
    ) -> Result<usize> {
        let removed = self.conn.execute(
            "DELETE FROM status_relations
             WHERE workflow_id = ?1 AND from_status_id IS ?2 AND to_status_id = ?3",
            params![workflow_id.0, from.map(|f| f.id.0), to.id.0],
        )?;
        Ok(removed)
    }
}

fn row_to_workflow(row: &rusqlite::Row) -> rusqlite::Result<Workflow> {
    Ok(Workflow {
        id: WorkflowId(row.get(0)?),
        name: row.get(1)?,
        entity_type: row.get(2)?,
        scope: Scope(row.get(3)?),
    })
}

fn row_to_relation(row: &rusqlite::Row) -> rusqlite::Result<StatusRelation> {
    let from_id: Option<i64> = row.get(4)?;
    let from_status = match from_id {
        Some(_) => Some(row_to_status(row, 4)?),
        None => None,
    };
    Ok(StatusRelation {
        id: RelationId(row.get(0)?),
        workflow_id: WorkflowId(row.get(1)?),
        initial_status: row.get(2)?,
        sequence: row.get(3)?,
        from_status,
        to_status: row_to_status(row, 11)?,
    })
}
