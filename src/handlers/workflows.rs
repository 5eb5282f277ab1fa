//! Handler for the `workflows` command.

use super::Workspace;
use anyhow::Result;
use colored::Colorize;
use statusflow::engine::db::Db;
use statusflow::engine::repo::WorkflowRepo;

/// Lists workflows of the workspace scope with their transitions.
///
/// # Errors
/// Returns error if database query fails.
pub fn handle(ws: &Workspace) -> Result<()> {
    let conn = Db::connect(&ws.root)?;
    let repo = WorkflowRepo::new(&conn);
    let workflows = repo.list(Some(&ws.scope))?;

    println!("{} Workflows in '{}':", "🔀".cyan(), ws.scope);
    if workflows.is_empty() {
        println!("   (none defined)");
    }
    for workflow in workflows {
        println!(
            "   [{}] {} ({})",
            workflow.id.to_string().blue(),
            workflow.name,
            workflow.entity_type.dimmed()
        );
        let mut relations = repo.relations(workflow.id)?;
        ws.config.relation_order.apply(&mut relations);
        for relation in relations {
            println!("      {relation}");
        }
    }
    Ok(())
}
