//! Handler for the `drop` command: a board-column drop.

use super::{unsaved_notice, ConsoleNotifier, Workspace};
use anyhow::Result;
use colored::Colorize;
use statusflow::engine::action::StatusChangeHandler;
use statusflow::engine::board::{drop_on_column, BoardColumn, DropOutcome};
use statusflow::engine::db::Db;
use statusflow::engine::repo::ItemRepo;
use statusflow::engine::resolver::Resolver;
use statusflow::engine::types::{Status, WorkItem};

/// Drops an item on a column made of `statuses`.
///
/// # Errors
/// Returns error if a reference does not resolve or the change fails.
pub fn handle(ws: &Workspace, item: &str, column: &str, statuses: &[String]) -> Result<()> {
    let conn = Db::connect(&ws.root)?;
    let resolver = Resolver::strict(&conn, &ws.scope);
    let mut item = resolver.item(item)?.value;
    let included = statuses
        .iter()
        .map(|s| resolver.status(s).map(|r| r.value))
        .collect::<Result<Vec<_>, _>>()?;
    let column = BoardColumn::new(column, included);

    let handler = StatusChangeHandler::new(ws.engine(&conn), ItemRepo::new(&conn), ConsoleNotifier)
        .auto_persist(ws.config.auto_persist_on_transition);

    match drop_on_column(&handler, &mut item, &column)? {
        DropOutcome::Changed(outcome) => {
            if let Some(notice) = unsaved_notice(&outcome) {
                println!("   {} {notice}", "ℹ".yellow());
            }
        }
        DropOutcome::Unchanged => {}
        DropOutcome::Choose(choices) => print_choices(&item, &column, &choices),
    }
    Ok(())
}

fn print_choices(item: &WorkItem, column: &BoardColumn, choices: &[Status]) {
    println!(
        "{} Several statuses fit column '{}':",
        "?".yellow(),
        column.name
    );
    for status in choices {
        println!("   - {}", status.name);
    }
    println!(
        "   Pick one with `statusflow move {} <status>`",
        item.id.map_or_else(|| item.name.clone(), |id| id.to_string())
    );
}
