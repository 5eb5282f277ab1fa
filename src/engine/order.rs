//! Explicit ordering of status relations.
//!
//! "First match" rules in the engine scan relations in this order, never in
//! storage order.

use super::types::StatusRelation;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationOrder {
    /// Relation `sequence`, then relation id.
    #[default]
    Sequence,
    /// Target status sort order, then relation id.
    TargetSortOrder,
}

impl RelationOrder {
    /// Sorts `relations` in place. The sort is stable.
    pub fn apply(self, relations: &mut [StatusRelation]) {
        match self {
            Self::Sequence => relations.sort_by_key(|r| (r.sequence, r.id)),
            Self::TargetSortOrder => relations.sort_by_key(|r| (r.to_status.sort_order, r.id)),
        }
    }
}
