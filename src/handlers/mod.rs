//! CLI command handlers, one module per command.

pub mod activate;
pub mod add_item;
pub mod add_status;
pub mod add_workflow;
pub mod check;
pub mod drop;
pub mod init;
pub mod items;
pub mod link;
pub mod move_item;
pub mod next;
pub mod show;
pub mod statuses;
pub mod workflows;

use colored::Colorize;
use rusqlite::Connection;
use statusflow::config::Config;
use statusflow::engine::action::TransitionOutcome;
use statusflow::engine::ports::{NoticeLevel, Notifier};
use statusflow::engine::repo::SqliteLookup;
use statusflow::engine::transition::TransitionEngine;
use statusflow::engine::types::Scope;
use std::path::PathBuf;

/// Where a command runs: project root, tenant scope and loaded config.
pub struct Workspace {
    pub root: PathBuf,
    pub scope: Scope,
    pub config: Config,
}

impl Workspace {
    pub fn engine<'c>(&self, conn: &'c Connection) -> TransitionEngine<SqliteLookup<'c>> {
        TransitionEngine::new(SqliteLookup::new(conn)).with_order(self.config.relation_order)
    }
}

/// Prints handler notices to the terminal.
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, level: NoticeLevel, message: &str) {
        match level {
            NoticeLevel::Success => println!("{} {message}", "✓".green()),
            NoticeLevel::Warning => println!("{} {message}", "!".yellow()),
            NoticeLevel::Error => eprintln!("{} {message}", "✗".red()),
        }
    }
}

/// Warning for a change applied with persistence off. A CLI process ends
/// right after the request, so such a change is always lost.
pub fn unsaved_notice(outcome: &TransitionOutcome) -> Option<String> {
    match outcome {
        TransitionOutcome::Applied {
            to,
            persisted: false,
            ..
        } => Some(format!(
            "Change to '{}' was not saved and is discarded (persistence is off)",
            to.name
        )),
        _ => None,
    }
}
