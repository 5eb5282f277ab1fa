//! Handlers for the `link` and `unlink` commands.

use super::Workspace;
use anyhow::{bail, Result};
use colored::Colorize;
use statusflow::engine::db::Db;
use statusflow::engine::graph::WorkflowGraph;
use statusflow::engine::repo::WorkflowRepo;
use statusflow::engine::resolver::Resolver;

/// Adds a transition `from -> to` (an entry edge without `from`).
///
/// # Errors
/// Returns error if a reference does not resolve, or the edge is a
/// self-loop or a duplicate.
pub fn link(
    ws: &Workspace,
    workflow: &str,
    from: Option<&str>,
    to: &str,
    initial: bool,
    sequence: Option<i64>,
) -> Result<()> {
    let mut conn = Db::connect(&ws.root)?;
    let tx = conn.transaction()?;

    let resolver = Resolver::strict(&tx, &ws.scope);
    let workflow = resolver.workflow(workflow)?.value;
    let from = from.map(|f| resolver.status(f)).transpose()?.map(|r| r.value);
    let to = resolver.status(to)?.value;

    let repo = WorkflowRepo::new(&tx);
    let relation = repo.add_transition(&workflow, from.as_ref(), &to, initial, sequence)?;
    let relations = repo.relations(workflow.id)?;
    let graph = WorkflowGraph::from_relations(relations, ws.config.relation_order);
    tx.commit()?;

    println!("{} {}: {}", "✓".green(), workflow.name.yellow(), relation);
    let issues = graph.audit();
    if !issues.is_empty() {
        println!(
            "   {} {} open issue(s); run `statusflow check {}`",
            "ℹ".cyan(),
            issues.len(),
            workflow.name
        );
    }
    Ok(())
}

/// Removes the transition `from -> to`.
///
/// # Errors
/// Returns error if a reference does not resolve or no such edge exists.
pub fn unlink(ws: &Workspace, workflow: &str, from: Option<&str>, to: &str) -> Result<()> {
    let conn = Db::connect(&ws.root)?;
    let resolver = Resolver::strict(&conn, &ws.scope);
    let workflow = resolver.workflow(workflow)?.value;
    let from = from.map(|f| resolver.status(f)).transpose()?.map(|r| r.value);
    let to = resolver.status(to)?.value;

    let removed = WorkflowRepo::new(&conn).remove_transition(workflow.id, from.as_ref(), &to)?;
    if removed == 0 {
        bail!(
            "No transition {} -> {} in workflow '{}'",
            from.as_ref().map_or("(entry)", |f| f.name.as_str()),
            to.name,
            workflow.name
        );
    }
    println!(
        "{} Removed {} -> {} from {}",
        "✓".green(),
        from.as_ref().map_or("(entry)", |f| f.name.as_str()),
        to.name,
        workflow.name.yellow()
    );
    Ok(())
}
