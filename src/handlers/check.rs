//! Handler for the `check` command.

use super::Workspace;
use anyhow::{bail, Result};
use colored::Colorize;
use statusflow::engine::db::Db;
use statusflow::engine::graph::WorkflowGraph;
use statusflow::engine::repo::{SqliteLookup, WorkflowRepo};
use statusflow::engine::resolver::Resolver;

/// Audits one workflow, or every workflow in the scope.
///
/// # Errors
/// Returns error if any audited workflow has issues.
pub fn handle(ws: &Workspace, workflow: Option<&str>) -> Result<()> {
    let conn = Db::connect(&ws.root)?;
    let workflows = match workflow {
        Some(query) => vec![Resolver::strict(&conn, &ws.scope).workflow(query)?.value],
        None => WorkflowRepo::new(&conn).list(Some(&ws.scope))?,
    };

    let lookup = SqliteLookup::new(&conn);
    let mut total = 0;
    for workflow in &workflows {
        let graph = WorkflowGraph::build(&lookup, workflow, ws.config.relation_order)?;
        let issues = graph.audit();
        let coverage = format!(
            "({}/{} statuses reachable)",
            graph.reachable().len(),
            graph.statuses().len()
        );
        if issues.is_empty() {
            println!("{} {} {}", "✓".green(), workflow.name, coverage.dimmed());
            continue;
        }
        println!("{} {} {}", "✗".red(), workflow.name.yellow(), coverage.dimmed());
        for issue in &issues {
            println!("   - {issue}");
        }
        total += issues.len();
    }

    if total > 0 {
        bail!("{total} workflow issue(s) found");
    }
    Ok(())
}
