//! Status-change handling: validate a requested status against the engine,
//! then apply and (optionally) persist it.
//!
//! Each request runs `Idle -> Validating -> Applied | Rejected`. The verdict
//! is computed from reads only, so a rejection never writes anything.

use super::error::Result;
use super::ports::{ItemObserver, ItemStore, NoticeLevel, Notifier, StatusLookup};
use super::transition::TransitionEngine;
use super::types::{Status, WorkItem};

/// Why a status change was refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    /// No item was selected.
    NoItem,
    /// No target status was given.
    NoTarget,
    /// The workflow does not allow the move.
    NotAllowed { current: String, requested: String },
}

/// Result of one status-change request.
#[derive(Debug, Clone)]
pub enum TransitionOutcome {
    Applied {
        from: Option<Status>,
        to: Status,
        /// False when persistence was deferred to an explicit save.
        persisted: bool,
    },
    Rejected {
        reason: RejectReason,
        message: String,
    },
}

impl TransitionOutcome {
    #[must_use]
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied { .. })
    }

    #[must_use]
    pub fn is_rejected(&self) -> bool {
        matches!(self, Self::Rejected { .. })
    }

    /// The user-facing rejection message, if rejected.
    #[must_use]
    pub fn rejection(&self) -> Option<&str> {
        match self {
            Self::Rejected { message, .. } => Some(message),
            Self::Applied { .. } => None,
        }
    }
}

pub struct StatusChangeHandler<L, S, N> {
    engine: TransitionEngine<L>,
    store: S,
    notifier: N,
    observers: Vec<Box<dyn ItemObserver>>,
    auto_persist: bool,
}

impl<L, S, N> StatusChangeHandler<L, S, N>
where
    L: StatusLookup,
    S: ItemStore,
    N: Notifier,
{
    /// Creates a handler that persists immediately on every applied change.
    #[must_use]
    pub fn new(engine: TransitionEngine<L>, store: S, notifier: N) -> Self {
        Self {
            engine,
            store,
            notifier,
            observers: Vec::new(),
            auto_persist: true,
        }
    }

    /// With `false`, applied changes stay in memory until [`Self::save`].
    #[must_use]
    pub fn auto_persist(mut self, enabled: bool) -> Self {
        self.auto_persist = enabled;
        self
    }

    /// Registers an observer refreshed after every persisted change.
    #[must_use]
    pub fn observe(mut self, observer: impl ItemObserver + 'static) -> Self {
        self.observers.push(Box::new(observer));
        self
    }

    #[must_use]
    pub fn engine(&self) -> &TransitionEngine<L> {
        &self.engine
    }

    pub(crate) fn notifier(&self) -> &N {
        &self.notifier
    }

    /// Moves `item` to `target` if its workflow allows it.
    ///
    /// A missing item or target, or a move the workflow forbids, comes back
    /// as [`TransitionOutcome::Rejected`] with the item untouched.
    ///
    /// # Errors
    /// Lookup failures and contract violations abort before any mutation.
    /// A failed save leaves the item mutated but not stored.
    pub fn change_status(
        &self,
        item: Option<&mut WorkItem>,
        target: Option<&Status>,
    ) -> Result<TransitionOutcome> {
        let Some(item) = item else {
            tracing::warn!("no current item for status change");
            return Ok(self.reject(RejectReason::NoItem, "Please select an item to change status."));
        };
        let Some(target) = target else {
            tracing::warn!(item = %item.label(), "no status given for status change");
            return Ok(self.reject(RejectReason::NoTarget, "Invalid status selected."));
        };

        tracing::debug!(item = %item.label(), target = %target, "validating status change");
        let verdict = match self.engine.evaluate(item) {
            Ok(verdict) => verdict,
            Err(e) => {
                tracing::error!(item = %item.label(), error = %e, "status validation failed");
                let message = if e.is_collaborator_failure() {
                    "Status validation unavailable.".to_string()
                } else {
                    format!("Status validation failed: {e}")
                };
                self.notifier.notify(NoticeLevel::Error, &message);
                return Err(e);
            }
        };

        if !verdict.contains(target) {
            let current = item.status_name().to_string();
            tracing::warn!(
                item = %item.label(),
                from = %current,
                to = %target,
                "status transition not allowed by workflow"
            );
            let message = format!(
                "Cannot change status from '{current}' to '{}' - \
                 transition not allowed by workflow",
                target.name
            );
            return Ok(self.reject(
                RejectReason::NotAllowed {
                    current,
                    requested: target.name.clone(),
                },
                &message,
            ));
        }

        let from = item.status.clone();
        item.set_status(target.clone());
        tracing::info!(
            item = %item.label(),
            from = from.as_ref().map_or("none", |s| s.name.as_str()),
            to = %target,
            "status changed"
        );

        if !self.auto_persist {
            self.notifier.notify(
                NoticeLevel::Success,
                &format!("Status set to '{}'. Save to keep the change.", target.name),
            );
            return Ok(TransitionOutcome::Applied {
                from,
                to: target.clone(),
                persisted: false,
            });
        }

        self.persist(item)?;
        self.notifier.notify(
            NoticeLevel::Success,
            &format!(
                "Status changed from '{}' to '{}'",
                from.as_ref().map_or("none", |s| s.name.as_str()),
                target.name
            ),
        );
        Ok(TransitionOutcome::Applied {
            from,
            to: target.clone(),
            persisted: true,
        })
    }

    /// Explicit save: stores `item` and refreshes observers.
    ///
    /// # Errors
    /// Propagates store failures, including version conflicts.
    pub fn save(&self, item: &mut WorkItem) -> Result<()> {
        self.persist(item)?;
        self.notifier
            .notify(NoticeLevel::Success, &format!("Saved {}", item.label()));
        Ok(())
    }

    fn persist(&self, item: &mut WorkItem) -> Result<()> {
        match self.store.save(item) {
            Ok(stored) => {
                *item = stored;
                for observer in &self.observers {
                    observer.item_changed(item);
                }
                Ok(())
            }
            Err(e) => {
                tracing::error!(item = %item.label(), error = %e, "failed to save item");
                self.notifier.notify(
                    NoticeLevel::Error,
                    &format!("Failed to save {}: {e}", item.label()),
                );
                Err(e)
            }
        }
    }

    fn reject(&self, reason: RejectReason, message: &str) -> TransitionOutcome {
        self.notifier.notify(NoticeLevel::Warning, message);
        TransitionOutcome::Rejected {
            reason,
            message: message.to_string(),
        }
    }
}
