//! Board columns: map a drop onto a column to a status change.
//!
//! A column groups several statuses. Dropping an item on it narrows the
//! column's statuses to the item's legal next statuses.

use super::action::{StatusChangeHandler, TransitionOutcome};
use super::error::Result;
use super::ports::{ItemStore, NoticeLevel, Notifier, StatusLookup};
use super::transition::TransitionEngine;
use super::types::{Status, WorkItem};

#[derive(Debug, Clone)]
pub struct BoardColumn {
    pub name: String,
    pub statuses: Vec<Status>,
}

impl BoardColumn {
    #[must_use]
    pub fn new(name: &str, statuses: Vec<Status>) -> Self {
        Self {
            name: name.to_string(),
            statuses,
        }
    }

    #[must_use]
    pub fn includes(&self, status: &Status) -> bool {
        self.statuses.iter().any(|s| s.same_as(status))
    }
}

/// Statuses an item may take when dropped on a column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnResolution {
    /// No legal status in the column; the item keeps its status.
    NoTransition,
    /// Exactly one candidate; apply it without asking.
    Single(Status),
    /// Several candidates, in valid-next order; the caller picks one.
    Choice(Vec<Status>),
}

/// Intersects the column's statuses with the legal next statuses of `item`.
///
/// # Errors
/// Propagates engine errors.
pub fn resolve_column<L: StatusLookup>(
    engine: &TransitionEngine<L>,
    item: &WorkItem,
    column: &BoardColumn,
) -> Result<ColumnResolution> {
    let mut candidates: Vec<Status> = engine
        .valid_next_statuses(item)?
        .into_iter()
        .filter(|s| column.includes(s))
        .collect();

    tracing::debug!(
        item = %item.label(),
        column = %column.name,
        candidates = candidates.len(),
        "resolved column drop"
    );
    Ok(match candidates.len() {
        0 => ColumnResolution::NoTransition,
        1 => ColumnResolution::Single(candidates.remove(0)),
        _ => ColumnResolution::Choice(candidates),
    })
}

/// What happened after a drop.
#[derive(Debug, Clone)]
pub enum DropOutcome {
    Unchanged,
    Changed(TransitionOutcome),
    Choose(Vec<Status>),
}

/// Handles a drop of `item` onto `column`.
///
/// A single candidate goes through the handler like any other status
/// change. Several candidates are returned for the caller to choose from.
///
/// # Errors
/// Propagates engine and store errors.
pub fn drop_on_column<L, S, N>(
    handler: &StatusChangeHandler<L, S, N>,
    item: &mut WorkItem,
    column: &BoardColumn,
) -> Result<DropOutcome>
where
    L: StatusLookup,
    S: ItemStore,
    N: Notifier,
{
    match resolve_column(handler.engine(), item, column)? {
        ColumnResolution::NoTransition => {
            tracing::warn!(
                item = %item.label(),
                column = %column.name,
                "no workflow transition into column"
            );
            handler.notifier().notify(
                NoticeLevel::Warning,
                &format!(
                    "Item moved to '{}' column, but status remains '{}' \
                     (no valid workflow transition available).",
                    column.name,
                    item.status_name()
                ),
            );
            Ok(DropOutcome::Unchanged)
        }
        ColumnResolution::Single(status) => {
            let outcome = handler.change_status(Some(item), Some(&status))?;
            Ok(DropOutcome::Changed(outcome))
        }
        ColumnResolution::Choice(statuses) => Ok(DropOutcome::Choose(statuses)),
    }
}
