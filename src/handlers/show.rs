//! Handler for the `show` command.

use super::Workspace;
use anyhow::Result;
use colored::Colorize;
use serde::Serialize;
use statusflow::engine::db::Db;
use statusflow::engine::graph::WorkflowGraph;
use statusflow::engine::repo::{SqliteLookup, WorkflowRepo};
use statusflow::engine::resolver::Resolver;
use statusflow::engine::transition::NextStatuses;
use statusflow::engine::types::WorkItem;

#[derive(Serialize)]
struct ItemReport<'a> {
    item: &'a WorkItem,
    next: &'a NextStatuses,
}

/// Shows an item with its workflow position and next statuses.
///
/// # Errors
/// Returns error if the item does not resolve or evaluation fails.
pub fn handle(ws: &Workspace, item: &str, json: bool) -> Result<()> {
    let conn = Db::connect(&ws.root)?;
    let item = Resolver::new(&conn, &ws.scope).item(item)?.value;
    let next = ws.engine(&conn).evaluate(&item)?;

    if json {
        let report = ItemReport {
            item: &item,
            next: &next,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("{} {}", "📄".cyan(), item.label().yellow());
    println!("   Type:     {}", item.entity_type);
    println!("   Scope:    {}", item.scope);
    println!("   Status:   {}", item.status_name().blue());
    println!("   Version:  {} ({})", item.version, item.updated_at.dimmed());

    match (&item.workflow, &item.status) {
        (Some(workflow), Some(current)) => {
            println!("   Workflow: {}", workflow.name);
            let repo = WorkflowRepo::new(&conn);
            for relation in repo.relations_to(current.id)? {
                if relation.workflow_id == workflow.id {
                    println!("      in:  {}", relation.to_string().dimmed());
                }
            }
            for relation in repo.relations_from(current.id)? {
                if relation.workflow_id == workflow.id {
                    println!("      out: {}", relation.to_string().dimmed());
                }
            }
            let lookup = SqliteLookup::new(&conn);
            let graph = WorkflowGraph::build(&lookup, workflow, ws.config.relation_order)?;
            let ahead: Vec<&str> = graph
                .successors(current)
                .into_iter()
                .map(|s| s.name.as_str())
                .collect();
            if !ahead.is_empty() {
                println!("   Leads to: {}", ahead.join(", "));
            }
        }
        (Some(workflow), None) => println!("   Workflow: {}", workflow.name),
        (None, _) => println!("   Workflow: {}", "none".dimmed()),
    }

    println!();
    super::next::print_human(&item, &next);
    Ok(())
}
