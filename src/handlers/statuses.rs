//! Handler for the `statuses` command.

use super::Workspace;
use anyhow::Result;
use colored::Colorize;
use statusflow::engine::db::Db;
use statusflow::engine::repo::StatusRepo;

/// Lists the statuses of the workspace scope in sort order.
///
/// # Errors
/// Returns error if database query fails.
pub fn handle(ws: &Workspace, json: bool) -> Result<()> {
    let conn = Db::connect(&ws.root)?;
    let statuses = StatusRepo::new(&conn).list(&ws.scope)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&statuses)?);
        return Ok(());
    }

    println!("{} Statuses in '{}':", "📋".cyan(), ws.scope);
    if statuses.is_empty() {
        println!("   (none defined)");
    }
    for status in statuses {
        let mut flags = Vec::new();
        if status.is_final {
            flags.push("final");
        }
        if !status.is_active {
            flags.push("inactive");
        }
        println!(
            "   [{}] {} {}{}",
            status.id.to_string().blue(),
            status.name,
            status.color.dimmed(),
            if flags.is_empty() {
                String::new()
            } else {
                format!(" ({})", flags.join(", ")).dimmed().to_string()
            }
        );
    }
    Ok(())
}
