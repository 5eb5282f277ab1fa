//! Collaborator interfaces consumed by the transition engine and the
//! status-change handler.
//!
//! The SQLite repositories implement the lookup and store traits; callers
//! provide their own notifier and observers.

use super::error::Result;
use super::types::{Scope, Status, StatusRelation, WorkItem, Workflow};

/// Read-only queries over statuses and status relations.
pub trait StatusLookup {
    /// All edges of `workflow`, in no guaranteed order.
    ///
    /// # Errors
    /// `NotFound` if the workflow no longer exists, `Unavailable`/`Storage`
    /// if the store cannot be queried.
    fn list_relations(&self, workflow: &Workflow) -> Result<Vec<StatusRelation>>;

    /// Every status known in `scope`; the fail-open fallback pool.
    ///
    /// # Errors
    /// `Unavailable`/`Storage` if the store cannot be queried.
    fn list_all_statuses(&self, scope: &Scope) -> Result<Vec<Status>>;

    /// Number of statuses in `scope`.
    ///
    /// # Errors
    /// Same as [`StatusLookup::list_all_statuses`].
    fn count_statuses(&self, scope: &Scope) -> Result<usize> {
        Ok(self.list_all_statuses(scope)?.len())
    }
}

impl<T: StatusLookup + ?Sized> StatusLookup for &T {
    fn list_relations(&self, workflow: &Workflow) -> Result<Vec<StatusRelation>> {
        (**self).list_relations(workflow)
    }

    fn list_all_statuses(&self, scope: &Scope) -> Result<Vec<Status>> {
        (**self).list_all_statuses(scope)
    }

    fn count_statuses(&self, scope: &Scope) -> Result<usize> {
        (**self).count_statuses(scope)
    }
}

/// Persistence for work items.
pub trait ItemStore {
    /// Upserts `item` by identity and returns the stored record.
    ///
    /// # Errors
    /// `Conflict` when `item.version` is stale, `Storage` on write failure.
    fn save(&self, item: &WorkItem) -> Result<WorkItem>;
}

impl<T: ItemStore + ?Sized> ItemStore for &T {
    fn save(&self, item: &WorkItem) -> Result<WorkItem> {
        (**self).save(item)
    }
}

/// Severity of a user-facing notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Warning,
    Error,
}

/// Fire-and-forget advisory channel to the initiating user.
pub trait Notifier {
    fn notify(&self, level: NoticeLevel, message: &str);
}

impl<T: Notifier + ?Sized> Notifier for &T {
    fn notify(&self, level: NoticeLevel, message: &str) {
        (**self).notify(level, message);
    }
}

/// Presentation-layer hook invoked after a persisted transition.
pub trait ItemObserver {
    fn item_changed(&self, item: &WorkItem);
}

impl<F: Fn(&WorkItem)> ItemObserver for F {
    fn item_changed(&self, item: &WorkItem) {
        self(item);
    }
}

/// Notifier that drops every message.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentNotifier;

impl Notifier for SilentNotifier {
    fn notify(&self, _level: NoticeLevel, _message: &str) {}
}
