//! Error types for the status engine.
//!
//! Configuration gaps and rejected transitions are not errors; they come
//! back as values (`NextStatuses::fallback`, `TransitionOutcome::Rejected`).

use super::types::ItemId;
use thiserror::Error;

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;

#[derive(Debug, Error)]
pub enum EngineError {
    /// Invalid arguments to a public operation.
    #[error("Contract violation: {0}")]
    ContractViolation(String),

    /// A referenced workflow, status, scope or item does not exist.
    #[error("{kind} not found: {reference}")]
    NotFound { kind: &'static str, reference: String },

    /// A collaborator could not be reached or queried.
    #[error("Collaborator unavailable: {0}")]
    Unavailable(String),

    /// The stored item moved on since it was read.
    #[error("Item {item} was modified concurrently (expected version {expected}, found {found})")]
    Conflict { item: ItemId, expected: i64, found: i64 },

    /// Workflow configuration rejected at edit time.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),
}

impl EngineError {
    #[must_use]
    pub fn not_found(kind: &'static str, reference: impl ToString) -> Self {
        Self::NotFound {
            kind,
            reference: reference.to_string(),
        }
    }

    /// Stable code for programmatic handling.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::ContractViolation(_) => "CONTRACT_VIOLATION",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::Unavailable(_) => "UNAVAILABLE",
            Self::Conflict { .. } => "CONFLICT",
            Self::InvalidConfiguration(_) => "INVALID_CONFIGURATION",
            Self::Storage(_) => "STORAGE",
        }
    }

    /// True for failures of the lookup or persistence collaborator.
    ///
    /// A version conflict counts: the caller retries it like an outage.
    #[must_use]
    pub fn is_collaborator_failure(&self) -> bool {
        matches!(
            self,
            Self::Unavailable(_) | Self::Conflict { .. } | Self::Storage(_)
        )
    }
}
