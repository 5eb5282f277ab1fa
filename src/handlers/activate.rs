//! Handler for the `activate` and `deactivate` commands.

use super::Workspace;
use anyhow::Result;
use colored::Colorize;
use statusflow::engine::db::Db;
use statusflow::engine::repo::StatusRepo;
use statusflow::engine::resolver::Resolver;

/// Flags a status active or inactive. Inactive statuses stay in workflows
/// and fallback lists; only listings mark them.
///
/// # Errors
/// Returns error if the status does not resolve exactly.
pub fn handle(ws: &Workspace, status: &str, active: bool) -> Result<()> {
    let conn = Db::connect(&ws.root)?;
    let status = Resolver::strict(&conn, &ws.scope).status(status)?.value;
    StatusRepo::new(&conn).set_active(status.id, active)?;

    let state = if active { "active" } else { "inactive" };
    println!("{} {} is now {}", "✓".green(), status.name.yellow(), state);
    Ok(())
}
