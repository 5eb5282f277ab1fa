//! Core types for workflow status tracking.
//!
//! `Status`, `Workflow` and `StatusRelation` are configuration records owned
//! by the store; the engine only reads them. `WorkItem` is the one record a
//! status change mutates.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! id_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_type!(
    /// Stable identity of a [`Status`].
    StatusId
);
id_type!(
    /// Stable identity of a [`Workflow`].
    WorkflowId
);
id_type!(
    /// Stable identity of a [`StatusRelation`].
    RelationId
);
id_type!(
    /// Stable identity of a [`WorkItem`].
    ItemId
);

/// Owning scope of statuses, workflows and items (a company or project key).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Scope(pub String);

impl Scope {
    #[must_use]
    pub fn new(key: &str) -> Self {
        Self(key.to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One named state a work item can occupy.
///
/// Equality is by identity: two `Status` values with the same id are the
/// same status regardless of display metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Status {
    pub id: StatusId,
    pub name: String,
    pub color: String,
    pub sort_order: i32,
    pub is_final: bool,
    pub is_active: bool,
    pub scope: Scope,
}

impl Status {
    #[must_use]
    pub fn same_as(&self, other: &Status) -> bool {
        self.id == other.id
    }
}

impl PartialEq for Status {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Status {}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// A named directed graph of allowed status-to-status transitions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workflow {
    pub id: WorkflowId,
    pub name: String,
    /// Entity type the workflow governs, e.g. `activity` or `meeting`.
    pub entity_type: String,
    pub scope: Scope,
}

/// One directed edge of a workflow graph.
///
/// A `None` `from_status` marks an entry edge.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusRelation {
    pub id: RelationId,
    pub workflow_id: WorkflowId,
    pub from_status: Option<Status>,
    pub to_status: Status,
    pub initial_status: bool,
    /// Explicit position used to break "first match" ties.
    pub sequence: i64,
}

impl StatusRelation {
    /// Returns true if this edge leaves `status`.
    #[must_use]
    pub fn starts_at(&self, status: &Status) -> bool {
        self.from_status.as_ref().is_some_and(|from| from.same_as(status))
    }

    #[must_use]
    pub fn is_entry(&self) -> bool {
        self.from_status.is_none()
    }
}

impl fmt::Display for StatusRelation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let from = self.from_status.as_ref().map_or("(entry)", |s| s.name.as_str());
        write!(f, "{from} -> {}", self.to_status.name)?;
        if self.initial_status {
            write!(f, " [initial]")?;
        }
        Ok(())
    }
}

/// A business entity carrying a current status and a workflow reference.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkItem {
    /// `None` until the item has been stored once.
    pub id: Option<ItemId>,
    pub name: String,
    pub entity_type: String,
    pub scope: Scope,
    /// `None` means the item has never transitioned.
    pub status: Option<Status>,
    /// `None` means no workflow is assigned.
    pub workflow: Option<Workflow>,
    /// Revision token checked by the store on save.
    pub version: i64,
    pub updated_at: String,
}

impl WorkItem {
    #[must_use]
    pub fn new(name: &str, entity_type: &str, scope: Scope) -> Self {
        Self {
            id: None,
            name: name.to_string(),
            entity_type: entity_type.to_string(),
            scope,
            status: None,
            workflow: None,
            version: 0,
            updated_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    #[must_use]
    pub fn with_workflow(mut self, workflow: Workflow) -> Self {
        self.workflow = Some(workflow);
        self
    }

    #[must_use]
    pub fn with_status(mut self, status: Status) -> Self {
        self.status = Some(status);
        self
    }

    /// Sets the status and stamps `updated_at`.
    pub fn set_status(&mut self, status: Status) {
        self.status = Some(status);
        self.updated_at = chrono::Utc::now().to_rfc3339();
    }

    /// Name of the current status, or `none`.
    #[must_use]
    pub fn status_name(&self) -> &str {
        self.status.as_ref().map_or("none", |s| s.name.as_str())
    }

    /// Display label: `#id name` once stored, otherwise just the name.
    #[must_use]
    pub fn label(&self) -> String {
        match self.id {
            Some(id) => format!("#{id} {}", self.name),
            None => self.name.clone(),
        }
    }
}
