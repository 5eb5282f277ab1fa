//! End-to-end workflow scenarios against an in-memory SQLite store.

use statusflow::engine::action::{RejectReason, StatusChangeHandler, TransitionOutcome};
use statusflow::engine::db::Db;
use statusflow::engine::graph::WorkflowGraph;
use statusflow::engine::order::RelationOrder;
use statusflow::engine::ports::{ItemStore, NoticeLevel, Notifier, SilentNotifier};
use statusflow::engine::repo::{ItemRepo, SqliteLookup, StatusDraft, StatusRepo, WorkflowRepo};
use statusflow::engine::transition::{FallbackReason, TransitionEngine};
use statusflow::engine::types::{Scope, Status, WorkItem, Workflow};
use std::cell::RefCell;

struct Board {
    conn: rusqlite::Connection,
    scope: Scope,
    workflow: Workflow,
    todo: Status,
    doing: Status,
    done: Status,
}

fn board() -> Board {
    let conn = Db::open_in_memory().unwrap();
    let scope = Scope::new("acme");
    let statuses = StatusRepo::new(&conn);
    let todo = statuses.add(&StatusDraft::new(&scope, "ToDo").sort_order(1)).unwrap();
    let doing = statuses
        .add(&StatusDraft::new(&scope, "InProgress").sort_order(2))
        .unwrap();
    let done = statuses
        .add(&StatusDraft::new(&scope, "Done").sort_order(3).final_status(true))
        .unwrap();

    let workflows = WorkflowRepo::new(&conn);
    let workflow = workflows.add(&scope, "W", "activity").unwrap();
    workflows
        .add_transition(&workflow, None, &todo, true, None)
        .unwrap();
    workflows
        .add_transition(&workflow, Some(&todo), &doing, false, None)
        .unwrap();
    workflows
        .add_transition(&workflow, Some(&doing), &done, false, None)
        .unwrap();

    Board {
        conn,
        scope,
        workflow,
        todo,
        doing,
        done,
    }
}

fn names(statuses: &[Status]) -> Vec<&str> {
    statuses.iter().map(|s| s.name.as_str()).collect()
}

#[derive(Default)]
struct Notices(RefCell<Vec<(NoticeLevel, String)>>);

impl Notifier for Notices {
    fn notify(&self, level: NoticeLevel, message: &str) {
        self.0.borrow_mut().push((level, message.to_string()));
    }
}

#[test]
fn test_todo_in_progress_done() {
    let b = board();
    let engine = TransitionEngine::new(SqliteLookup::new(&b.conn));
    let store = ItemRepo::new(&b.conn);
    let notices = Notices::default();
    let handler = StatusChangeHandler::new(engine, &store, &notices);

    let mut item = store
        .save(&WorkItem::new("I", "activity", b.scope.clone()).with_workflow(b.workflow.clone()))
        .unwrap();
    assert_eq!(
        names(&handler.engine().valid_next_statuses(&item).unwrap()),
        ["ToDo"]
    );

    let outcome = handler
        .change_status(Some(&mut item), Some(&b.todo))
        .unwrap();
    assert!(outcome.is_applied());
    assert_eq!(
        names(&handler.engine().valid_next_statuses(&item).unwrap()),
        ["ToDo", "InProgress"]
    );

    let outcome = handler
        .change_status(Some(&mut item), Some(&b.done))
        .unwrap();
    assert!(matches!(
        outcome,
        TransitionOutcome::Rejected {
            reason: RejectReason::NotAllowed { .. },
            ..
        }
    ));
    assert_eq!(item.status_name(), "ToDo");

    handler
        .change_status(Some(&mut item), Some(&b.doing))
        .unwrap();
    handler
        .change_status(Some(&mut item), Some(&b.done))
        .unwrap();

    let stored = store.find_by_id(item.id.unwrap()).unwrap().unwrap();
    assert_eq!(stored.status_name(), "Done");
    assert_eq!(stored.version, item.version);
    assert_eq!(notices.0.borrow().last().unwrap().0, NoticeLevel::Success);
}

#[test]
fn test_rejection_leaves_store_untouched() {
    let b = board();
    let store = ItemRepo::new(&b.conn);
    let handler = StatusChangeHandler::new(
        TransitionEngine::new(SqliteLookup::new(&b.conn)),
        &store,
        SilentNotifier,
    );

    let mut item = store
        .save(
            &WorkItem::new("I", "activity", b.scope.clone())
                .with_workflow(b.workflow.clone())
                .with_status(b.todo.clone()),
        )
        .unwrap();
    let before = item.version;

    let outcome = handler
        .change_status(Some(&mut item), Some(&b.done))
        .unwrap();
    assert!(outcome.is_rejected());
    let stored = store.find_by_id(item.id.unwrap()).unwrap().unwrap();
    assert_eq!(stored.version, before);
    assert_eq!(stored.status_name(), "ToDo");
}

#[test]
fn test_noop_transition_bumps_version_once() {
    let b = board();
    let store = ItemRepo::new(&b.conn);
    let handler = StatusChangeHandler::new(
        TransitionEngine::new(SqliteLookup::new(&b.conn)),
        &store,
        SilentNotifier,
    );

    let mut item = store
        .save(
            &WorkItem::new("I", "activity", b.scope.clone())
                .with_workflow(b.workflow.clone())
                .with_status(b.doing.clone()),
        )
        .unwrap();

    let outcome = handler
        .change_status(Some(&mut item), Some(&b.doing))
        .unwrap();
    assert!(outcome.is_applied());
    assert_eq!(item.version, 2);
    assert_eq!(item.status_name(), "InProgress");
}

#[test]
fn test_stale_copy_conflicts() {
    let b = board();
    let store = ItemRepo::new(&b.conn);
    let handler = StatusChangeHandler::new(
        TransitionEngine::new(SqliteLookup::new(&b.conn)),
        &store,
        SilentNotifier,
    );

    let mut item = store
        .save(
            &WorkItem::new("I", "activity", b.scope.clone())
                .with_workflow(b.workflow.clone())
                .with_status(b.todo.clone()),
        )
        .unwrap();
    let mut stale = item.clone();

    handler
        .change_status(Some(&mut item), Some(&b.doing))
        .unwrap();
    let err = handler
        .change_status(Some(&mut stale), Some(&b.doing))
        .unwrap_err();
    assert_eq!(err.code(), "CONFLICT");
}

#[test]
fn test_removing_all_edges_fails_open() {
    let b = board();
    let workflows = WorkflowRepo::new(&b.conn);
    workflows
        .remove_transition(b.workflow.id, None, &b.todo)
        .unwrap();
    workflows
        .remove_transition(b.workflow.id, Some(&b.todo), &b.doing)
        .unwrap();
    workflows
        .remove_transition(b.workflow.id, Some(&b.doing), &b.done)
        .unwrap();

    let engine = TransitionEngine::new(SqliteLookup::new(&b.conn));
    let item = WorkItem::new("I", "activity", b.scope.clone())
        .with_workflow(b.workflow.clone())
        .with_status(b.done.clone());
    let next = engine.evaluate(&item).unwrap();
    assert_eq!(next.fallback, Some(FallbackReason::NoRelations));
    assert_eq!(names(&next.statuses), ["Done", "ToDo", "InProgress"]);
}

#[test]
fn test_audit_of_stored_workflow() {
    let b = board();
    let lookup = SqliteLookup::new(&b.conn);
    let graph = WorkflowGraph::build(&lookup, &b.workflow, RelationOrder::Sequence).unwrap();
    assert!(graph.audit().is_empty());
    assert_eq!(graph.initial_status(), Some(&b.todo));
}

#[test]
fn test_deactivated_status_stays_in_workflow() {
    let b = board();
    StatusRepo::new(&b.conn).set_active(b.doing.id, false).unwrap();

    let lookup = SqliteLookup::new(&b.conn);
    let graph = WorkflowGraph::build(&lookup, &b.workflow, RelationOrder::Sequence).unwrap();
    let ahead = graph.successors(&b.todo);
    assert_eq!(ahead.len(), 1);
    assert_eq!(ahead[0].name, "InProgress");
    assert!(!ahead[0].is_active);
    assert_eq!(graph.reachable().len(), graph.statuses().len());

    let engine = TransitionEngine::new(SqliteLookup::new(&b.conn));
    let item = WorkItem::new("Ship", "activity", b.scope.clone())
        .with_workflow(b.workflow.clone())
        .with_status(b.todo.clone());
    assert!(engine.is_valid_transition(&item, &b.doing).unwrap());
}
