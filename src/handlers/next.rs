//! Handler for the `next` command.

use super::Workspace;
use anyhow::Result;
use colored::Colorize;
use statusflow::engine::db::Db;
use statusflow::engine::resolver::Resolver;
use statusflow::engine::transition::NextStatuses;
use statusflow::engine::types::WorkItem;

/// Shows the statuses an item may move to.
///
/// # Errors
/// Returns error if the item does not resolve or evaluation fails.
pub fn handle(ws: &Workspace, item: &str, json: bool) -> Result<()> {
    let conn = Db::connect(&ws.root)?;
    let item = Resolver::new(&conn, &ws.scope).item(item)?.value;
    let next = ws.engine(&conn).evaluate(&item)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&next)?);
        return Ok(());
    }

    print_human(&item, &next);
    Ok(())
}

pub(crate) fn print_human(item: &WorkItem, next: &NextStatuses) {
    println!("{} Next statuses for {}:", "🚀".cyan(), item.label().yellow());
    for status in &next.statuses {
        let current = item.status.as_ref().is_some_and(|c| c.same_as(status));
        println!(
            "   {} [{}] {}",
            if current { "●".green() } else { "○".dimmed() },
            status.id.to_string().blue(),
            status.name
        );
    }
    if let Some(reason) = next.fallback {
        println!(
            "   {} unrestricted: {}",
            "⚡".yellow(),
            reason.to_string().dimmed()
        );
    }
}
