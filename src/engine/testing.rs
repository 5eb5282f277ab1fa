//! In-memory collaborators for unit tests.

use super::error::{EngineError, Result};
use super::ports::{ItemStore, NoticeLevel, Notifier, StatusLookup};
use super::types::{Scope, Status, StatusRelation, WorkItem, Workflow};
use std::cell::{Cell, RefCell};

/// Lookup serving fixed relations and a fixed fallback pool.
#[derive(Default)]
pub struct MemoryLookup {
    pub relations: Vec<StatusRelation>,
    pub statuses: Vec<Status>,
    pub unavailable: bool,
}

impl MemoryLookup {
    pub fn new(relations: Vec<StatusRelation>, statuses: Vec<Status>) -> Self {
        Self {
            relations,
            statuses,
            unavailable: false,
        }
    }

    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Self::default()
        }
    }
}

impl StatusLookup for MemoryLookup {
    fn list_relations(&self, workflow: &Workflow) -> Result<Vec<StatusRelation>> {
        if self.unavailable {
            return Err(EngineError::Unavailable("lookup offline".to_string()));
        }
        Ok(self
            .relations
            .iter()
            .filter(|r| r.workflow_id == workflow.id)
            .cloned()
            .collect())
    }

    fn list_all_statuses(&self, _scope: &Scope) -> Result<Vec<Status>> {
        if self.unavailable {
            return Err(EngineError::Unavailable("lookup offline".to_string()));
        }
        Ok(self.statuses.clone())
    }
}

/// Store that counts saves and can be told to fail.
#[derive(Default)]
pub struct RecordingStore {
    pub saves: Cell<usize>,
    pub fail: bool,
    pub saved: RefCell<Vec<WorkItem>>,
}

impl RecordingStore {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }
}

impl ItemStore for RecordingStore {
    fn save(&self, item: &WorkItem) -> Result<WorkItem> {
        self.saves.set(self.saves.get() + 1);
        if self.fail {
            return Err(EngineError::Unavailable("store offline".to_string()));
        }
        let mut stored = item.clone();
        stored.version += 1;
        self.saved.borrow_mut().push(stored.clone());
        Ok(stored)
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    pub notices: RefCell<Vec<(NoticeLevel, String)>>,
}

impl RecordingNotifier {
    pub fn last(&self) -> Option<(NoticeLevel, String)> {
        self.notices.borrow().last().cloned()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, level: NoticeLevel, message: &str) {
        self.notices.borrow_mut().push((level, message.to_string()));
    }
}
