//! Handler for the `items` command.

use super::Workspace;
use anyhow::Result;
use colored::Colorize;
use statusflow::engine::db::Db;
use statusflow::engine::repo::ItemRepo;

/// Lists all items in the workspace scope.
///
/// # Errors
/// Returns error if database query fails.
pub fn handle(ws: &Workspace) -> Result<()> {
    let conn = Db::connect(&ws.root)?;
    let items = ItemRepo::new(&conn).list(Some(&ws.scope))?;

    println!("{} Items in '{}':", "📋".cyan(), ws.scope);
    for item in items {
        println!(
            "   {} [{}] {}",
            item.label(),
            item.status_name().blue(),
            item.workflow
                .as_ref()
                .map_or("no workflow", |w| w.name.as_str())
                .dimmed()
        );
    }
    Ok(())
}
