//! Handler for the `move` command.

use super::{unsaved_notice, ConsoleNotifier, Workspace};
use anyhow::Result;
use colored::Colorize;
use statusflow::engine::action::StatusChangeHandler;
use statusflow::engine::db::Db;
use statusflow::engine::error::EngineError;
use statusflow::engine::repo::ItemRepo;
use statusflow::engine::resolver::{Resolved, Resolver};
use statusflow::engine::types::WorkItem;

/// Requests a status change for an item.
///
/// Unresolvable references reach the action handler as "nothing selected",
/// which rejects them with a notice.
///
/// # Errors
/// Returns error on lookup or store failure, including version conflicts.
pub fn handle(ws: &Workspace, item: &str, status: &str, defer: bool, strict: bool) -> Result<()> {
    let conn = Db::connect(&ws.root)?;
    let resolver = if strict {
        Resolver::strict(&conn, &ws.scope)
    } else {
        Resolver::new(&conn, &ws.scope)
    };

    let mut item = found(resolver.item(item))?;
    let target = found(resolver.status(status))?;

    let handler = StatusChangeHandler::new(ws.engine(&conn), ItemRepo::new(&conn), ConsoleNotifier)
        .auto_persist(ws.config.auto_persist_on_transition && !defer)
        .observe(|item: &WorkItem| {
            println!(
                "   {} {} v{}",
                "↻".cyan(),
                item.label(),
                item.version.to_string().dimmed()
            );
        });

    let outcome = handler.change_status(item.as_mut(), target.as_ref())?;
    if let Some(notice) = unsaved_notice(&outcome) {
        println!("   {} {notice}", "ℹ".yellow());
    }
    Ok(())
}

fn found<T>(resolved: statusflow::engine::error::Result<Resolved<T>>) -> Result<Option<T>> {
    match resolved {
        Ok(resolved) => Ok(Some(resolved.value)),
        Err(EngineError::NotFound { .. }) => Ok(None),
        Err(e) => Err(e.into()),
    }
}
