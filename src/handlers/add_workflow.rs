//! Handler for the `add-workflow` command.

use super::Workspace;
use anyhow::Result;
use colored::Colorize;
use statusflow::engine::db::Db;
use statusflow::engine::repo::WorkflowRepo;

/// Adds an empty workflow; edges are added with `link`.
///
/// # Errors
/// Returns error if a workflow with that name exists in the scope.
pub fn handle(ws: &Workspace, name: &str, entity_type: &str) -> Result<()> {
    let conn = Db::connect(&ws.root)?;
    let workflow = WorkflowRepo::new(&conn).add(&ws.scope, name, entity_type)?;
    println!(
        "{} Added workflow [{}] {} for {}",
        "✓".green(),
        workflow.id,
        workflow.name.yellow(),
        workflow.entity_type.dimmed()
    );
    Ok(())
}
