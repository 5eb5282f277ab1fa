//! Transition Engine: computes the legal next statuses of a work item.
//!
//! Pure reads against a [`StatusLookup`]. Incomplete workflow configuration
//! never fails a call; it widens the result to every status in the item's
//! scope and reports why through [`NextStatuses::fallback`].

use super::error::{EngineError, Result};
use super::order::RelationOrder;
use super::ports::StatusLookup;
use super::types::{Status, StatusRelation, WorkItem, Workflow};
use serde::Serialize;
use std::fmt;

/// Why a result was widened to the full status pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackReason {
    /// The item has no workflow.
    NoWorkflow,
    /// The workflow has no relations.
    NoRelations,
    /// A new item's workflow yields no initial status.
    NoInitialStatus,
    /// No edge leaves the item's current status.
    DeadEnd,
}

impl fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoWorkflow => write!(f, "no workflow assigned"),
            Self::NoRelations => write!(f, "workflow has no status relations"),
            Self::NoInitialStatus => write!(f, "workflow has no initial status"),
            Self::DeadEnd => write!(f, "no transition leaves the current status"),
        }
    }
}

/// The legal next statuses of an item.
#[derive(Debug, Clone, Serialize)]
pub struct NextStatuses {
    /// Current status first (when set), then reachable statuses in edge
    /// order; unique by id.
    pub statuses: Vec<Status>,
    /// Set when the result is the unrestricted fallback pool.
    pub fallback: Option<FallbackReason>,
}

impl NextStatuses {
    /// Identity membership check.
    #[must_use]
    pub fn contains(&self, status: &Status) -> bool {
        self.statuses.iter().any(|s| s.same_as(status))
    }

    /// True if the workflow graph, not the fallback, decided the result.
    #[must_use]
    pub fn is_restricted(&self) -> bool {
        self.fallback.is_none()
    }
}

pub struct TransitionEngine<L> {
    lookup: L,
    order: RelationOrder,
}

impl<L: StatusLookup> TransitionEngine<L> {
    #[must_use]
    pub fn new(lookup: L) -> Self {
        Self {
            lookup,
            order: RelationOrder::default(),
        }
    }

    #[must_use]
    pub fn with_order(mut self, order: RelationOrder) -> Self {
        self.order = order;
        self
    }

    #[must_use]
    pub fn lookup(&self) -> &L {
        &self.lookup
    }

    /// The status a new item under `workflow` starts in.
    ///
    /// Preference, first match in relation order: the target of an edge
    /// flagged initial, then the source of the first non-entry edge, then
    /// the target of the first edge.
    ///
    /// # Errors
    /// Propagates lookup failures.
    pub fn initial_status(&self, workflow: Option<&Workflow>) -> Result<Option<Status>> {
        let Some(workflow) = workflow else {
            return Ok(None);
        };
        let relations = self.ordered_relations(workflow)?;
        Ok(pick_initial(&relations))
    }

    /// Evaluates the legal next statuses of `item`.
    ///
    /// # Errors
    /// `ContractViolation` if the item's workflow or status belongs to a
    /// different scope than the item; lookup failures are propagated.
    pub fn evaluate(&self, item: &WorkItem) -> Result<NextStatuses> {
        check_scopes(item)?;

        let mut statuses = Vec::new();
        if let Some(current) = &item.status {
            statuses.push(current.clone());
        }

        let Some(workflow) = &item.workflow else {
            return self.fall_back(item, statuses, FallbackReason::NoWorkflow);
        };

        let Some(current) = &item.status else {
            return match self.initial_status(Some(workflow))? {
                Some(initial) => {
                    tracing::debug!(
                        item = %item.label(),
                        initial = %initial,
                        "new item starts at initial status"
                    );
                    push_unique(&mut statuses, initial);
                    Ok(NextStatuses {
                        statuses,
                        fallback: None,
                    })
                }
                None => self.fall_back(item, statuses, FallbackReason::NoInitialStatus),
            };
        };

        let relations = self.ordered_relations(workflow)?;
        if relations.is_empty() {
            return self.fall_back(item, statuses, FallbackReason::NoRelations);
        }

        for relation in relations.iter().filter(|r| r.starts_at(current)) {
            if !relation.to_status.same_as(current) {
                push_unique(&mut statuses, relation.to_status.clone());
            }
        }

        if statuses.len() == 1 {
            return self.fall_back(item, statuses, FallbackReason::DeadEnd);
        }

        tracing::debug!(
            item = %item.label(),
            current = %current,
            choices = statuses.len(),
            "computed next statuses from workflow"
        );
        Ok(NextStatuses {
            statuses,
            fallback: None,
        })
    }

    /// The legal next statuses of `item`; see [`TransitionEngine::evaluate`].
    ///
    /// # Errors
    /// Same as [`TransitionEngine::evaluate`].
    pub fn valid_next_statuses(&self, item: &WorkItem) -> Result<Vec<Status>> {
        Ok(self.evaluate(item)?.statuses)
    }

    /// Whether `item` may move to `target`.
    ///
    /// # Errors
    /// Same as [`TransitionEngine::evaluate`].
    pub fn is_valid_transition(&self, item: &WorkItem, target: &Status) -> Result<bool> {
        Ok(self.evaluate(item)?.contains(target))
    }

    fn ordered_relations(&self, workflow: &Workflow) -> Result<Vec<StatusRelation>> {
        let mut relations = self.lookup.list_relations(workflow)?;
        self.order.apply(&mut relations);
        Ok(relations)
    }

    fn fall_back(
        &self,
        item: &WorkItem,
        mut statuses: Vec<Status>,
        reason: FallbackReason,
    ) -> Result<NextStatuses> {
        tracing::warn!(
            item = %item.label(),
            workflow = item.workflow.as_ref().map_or("none", |w| w.name.as_str()),
            reason = %reason,
            "workflow configuration gap, allowing every status in scope"
        );
        for status in self.lookup.list_all_statuses(&item.scope)? {
            push_unique(&mut statuses, status);
        }
        Ok(NextStatuses {
            statuses,
            fallback: Some(reason),
        })
    }
}

pub(crate) fn pick_initial(relations: &[StatusRelation]) -> Option<Status> {
    if let Some(flagged) = relations.iter().find(|r| r.initial_status) {
        return Some(flagged.to_status.clone());
    }
    if let Some(from) = relations.iter().find_map(|r| r.from_status.as_ref()) {
        return Some(from.clone());
    }
    relations.first().map(|r| r.to_status.clone())
}

fn check_scopes(item: &WorkItem) -> Result<()> {
    if let Some(workflow) = &item.workflow {
        if workflow.scope != item.scope {
            return Err(EngineError::ContractViolation(format!(
                "Workflow '{}' belongs to scope '{}', item {} to '{}'",
                workflow.name,
                workflow.scope,
                item.label(),
                item.scope
            )));
        }
    }
    if let Some(status) = &item.status {
        if status.scope != item.scope {
            return Err(EngineError::ContractViolation(format!(
                "Status '{}' belongs to scope '{}', item {} to '{}'",
                status.name,
                status.scope,
                item.label(),
                item.scope
            )));
        }
    }
    Ok(())
}

pub(crate) fn push_unique(statuses: &mut Vec<Status>, status: Status) {
    if !statuses.iter().any(|s| s.same_as(&status)) {
        statuses.push(status);
    }
}
