//! Handler for the `add-item` command.

use super::Workspace;
use anyhow::Result;
use colored::Colorize;
use statusflow::engine::db::Db;
use statusflow::engine::ports::ItemStore;
use statusflow::engine::repo::ItemRepo;
use statusflow::engine::resolver::Resolver;
use statusflow::engine::types::WorkItem;

/// Creates an item, starting it in its workflow's initial status.
///
/// # Errors
/// Returns error if the workflow does not resolve or the save fails.
pub fn handle(ws: &Workspace, name: &str, workflow: Option<&str>, entity_type: &str) -> Result<()> {
    let conn = Db::connect(&ws.root)?;
    let mut item = WorkItem::new(name, entity_type, ws.scope.clone());

    if let Some(query) = workflow {
        let workflow = Resolver::strict(&conn, &ws.scope).workflow(query)?.value;
        if let Some(initial) = ws.engine(&conn).initial_status(Some(&workflow))? {
            item.set_status(initial);
        }
        item.workflow = Some(workflow);
    }

    let item = ItemRepo::new(&conn).save(&item)?;
    println!(
        "{} Added item {} ({})",
        "✓".green(),
        item.label().yellow(),
        item.status_name().dimmed()
    );
    Ok(())
}
