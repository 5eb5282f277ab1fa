//! Handler for the `add-status` command.

use super::Workspace;
use anyhow::Result;
use colored::Colorize;
use statusflow::engine::db::Db;
use statusflow::engine::repo::{StatusDraft, StatusRepo};

/// Adds a status to the workspace scope. Without `--order` it sorts last.
///
/// # Errors
/// Returns error if the name is empty or already taken.
pub fn handle(
    ws: &Workspace,
    name: &str,
    color: Option<&str>,
    order: Option<i32>,
    is_final: bool,
) -> Result<()> {
    let conn = Db::connect(&ws.root)?;
    let repo = StatusRepo::new(&conn);

    let sort_order = match order {
        Some(order) => order,
        None => repo
            .list(&ws.scope)?
            .iter()
            .map(|s| s.sort_order)
            .max()
            .map_or(0, |max| max.saturating_add(1)),
    };

    let mut draft = StatusDraft::new(&ws.scope, name)
        .sort_order(sort_order)
        .final_status(is_final);
    if let Some(color) = color {
        draft = draft.color(color);
    }

    let status = repo.add(&draft)?;
    println!(
        "{} Added status [{}] {}{}",
        "✓".green(),
        status.id,
        status.name.yellow(),
        if status.is_final { " (final)".dimmed().to_string() } else { String::new() }
    );
    Ok(())
}
