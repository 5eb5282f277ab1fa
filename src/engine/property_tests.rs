//! Property-based tests for the transition engine and action handler.

use super::action::StatusChangeHandler;
use super::testing::{MemoryLookup, RecordingNotifier, RecordingStore};
use super::transition::TransitionEngine;
use super::types::fixtures::{edge, scope, status, workflow};
use super::types::{Status, StatusRelation, WorkItem};
use proptest::prelude::*;
use std::collections::HashSet;

const POOL_SIZE: usize = 6;

fn pool() -> Vec<Status> {
    (1..=POOL_SIZE as i64).map(|id| status(id, &format!("S{id}"))).collect()
}

/// Edges as (from index or entry, to index, initial flag).
fn any_edges() -> impl Strategy<Value = Vec<(Option<usize>, usize, bool)>> {
    prop::collection::vec(
        (
            prop::option::of(0..POOL_SIZE),
            0..POOL_SIZE,
            prop::bool::weighted(0.2),
        ),
        0..12,
    )
}

fn relations(edges: &[(Option<usize>, usize, bool)]) -> Vec<StatusRelation> {
    let pool = pool();
    edges
        .iter()
        .enumerate()
        .map(|(i, (from, to, initial))| {
            let id = i64::try_from(i).unwrap_or(i64::MAX) + 1;
            edge(id, from.map(|f| &pool[f]), &pool[*to], *initial)
        })
        .collect()
}

fn item(current: Option<usize>, with_workflow: bool) -> WorkItem {
    let mut item = WorkItem::new("task", "activity", scope());
    if with_workflow {
        item.workflow = Some(workflow(1));
    }
    item.status = current.map(|c| pool()[c].clone());
    item
}

proptest! {
    /// Property: the current status is always a legal next status
    #[test]
    fn test_current_status_always_included(
        edges in any_edges(),
        current in 0..POOL_SIZE,
        with_workflow in any::<bool>(),
    ) {
        let engine = TransitionEngine::new(MemoryLookup::new(relations(&edges), pool()));
        let it = item(Some(current), with_workflow);
        let next = engine.evaluate(&it).unwrap();
        prop_assert!(next.contains(&pool()[current]));
        prop_assert!(next.statuses[0].same_as(&pool()[current]));
    }

    /// Property: results never repeat a status
    #[test]
    fn test_results_are_deduplicated(
        edges in any_edges(),
        current in prop::option::of(0..POOL_SIZE),
        with_workflow in any::<bool>(),
    ) {
        let engine = TransitionEngine::new(MemoryLookup::new(relations(&edges), pool()));
        let next = engine.valid_next_statuses(&item(current, with_workflow)).unwrap();
        let ids: HashSet<_> = next.iter().map(|s| s.id).collect();
        prop_assert_eq!(ids.len(), next.len());
        prop_assert!(!next.is_empty());
    }

    /// Property: without a workflow the result is the whole pool
    #[test]
    fn test_missing_workflow_fails_open(edges in any_edges(), current in 0..POOL_SIZE) {
        let engine = TransitionEngine::new(MemoryLookup::new(relations(&edges), pool()));
        let next = engine.valid_next_statuses(&item(Some(current), false)).unwrap();
        let ids: HashSet<_> = next.iter().map(|s| s.id).collect();
        let expected: HashSet<_> = pool().iter().map(|s| s.id).collect();
        prop_assert_eq!(ids, expected);
    }

    /// Property: a new item is offered exactly the first flagged initial target
    #[test]
    fn test_new_item_resolves_to_initial(edges in any_edges()) {
        let rels = relations(&edges);
        let engine = TransitionEngine::new(MemoryLookup::new(rels.clone(), pool()));
        let next = engine.valid_next_statuses(&item(None, true)).unwrap();
        if let Some(flagged) = rels.iter().find(|r| r.initial_status) {
            prop_assert_eq!(next, vec![flagged.to_status.clone()]);
        }
    }

    /// Property: a rejected change writes nothing and leaves the status alone;
    /// an accepted change writes exactly once
    #[test]
    fn test_handler_writes_only_on_accept(
        edges in any_edges(),
        current in 0..POOL_SIZE,
        target in 0..POOL_SIZE,
    ) {
        let lookup = MemoryLookup::new(relations(&edges), pool());
        let store = RecordingStore::default();
        let handler = StatusChangeHandler::new(
            TransitionEngine::new(&lookup),
            &store,
            RecordingNotifier::default(),
        );
        let mut it = item(Some(current), true);
        let allowed = handler.engine().is_valid_transition(&it, &pool()[target]).unwrap();

        let outcome = handler.change_status(Some(&mut it), Some(&pool()[target])).unwrap();
        if allowed {
            prop_assert!(outcome.is_applied());
            prop_assert_eq!(store.saves.get(), 1);
            prop_assert!(it.status.as_ref().is_some_and(|s| s.same_as(&pool()[target])));
        } else {
            prop_assert!(outcome.is_rejected());
            prop_assert_eq!(store.saves.get(), 0);
            prop_assert!(it.status.as_ref().is_some_and(|s| s.same_as(&pool()[current])));
        }
    }
}
