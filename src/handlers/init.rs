//! Handler for the `init` command.

use super::Workspace;
use anyhow::Result;
use colored::Colorize;
use statusflow::config::Config;
use statusflow::engine::db::Db;

/// Initializes the statusflow store and writes a default config.
///
/// # Errors
/// Returns error if database initialization or the config write fails.
pub fn handle(ws: &Workspace) -> Result<()> {
    let db_path = Db::init(&ws.root)?;
    if !Config::path(&ws.root).exists() {
        Config::default().save(&ws.root)?;
    }
    println!("{} Initialized {}", "✓".green(), db_path.display());
    Ok(())
}
