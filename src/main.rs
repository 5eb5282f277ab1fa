mod handlers;

use anyhow::Result;
use clap::{Parser, Subcommand};
use handlers::Workspace;
use statusflow::config::Config;
use statusflow::engine::types::Scope;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "statusflow", version, about = "Workflow-driven status transitions")]
struct Cli {
    /// Project root holding the .statusflow directory
    #[arg(long, global = true, default_value = ".")]
    root: PathBuf,
    /// Tenant scope for statuses, workflows and items
    #[arg(long, global = true, default_value = "default")]
    scope: String,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Clone)]
enum Commands {
    /// Initialize the statusflow store
    Init,
    /// Add a status
    AddStatus {
        name: String,
        #[arg(long, short = 'c')]
        color: Option<String>,
        /// Display position; defaults to after the last status
        #[arg(long, short = 'o')]
        order: Option<i32>,
        /// Mark as a final (closing) status
        #[arg(long = "final")]
        is_final: bool,
    },
    /// Mark a status active
    Activate { status: String },
    /// Mark a status inactive
    Deactivate { status: String },
    /// List statuses
    Statuses {
        #[arg(long)]
        json: bool,
    },
    /// Add a workflow
    AddWorkflow {
        name: String,
        #[arg(long, short = 't', default_value = "activity")]
        entity_type: String,
    },
    /// List workflows and their transitions
    Workflows,
    /// Allow a transition in a workflow
    Link {
        workflow: String,
        to: String,
        /// Source status; omit for an entry transition
        #[arg(long, short = 'f')]
        from: Option<String>,
        /// New items start in the target status
        #[arg(long)]
        initial: bool,
        /// Position among the workflow's transitions
        #[arg(long)]
        sequence: Option<i64>,
    },
    /// Remove a transition from a workflow
    Unlink {
        workflow: String,
        to: String,
        #[arg(long, short = 'f')]
        from: Option<String>,
    },
    /// Audit workflow configuration
    Check { workflow: Option<String> },
    /// Add a work item
    AddItem {
        name: String,
        #[arg(long, short = 'w')]
        workflow: Option<String>,
        #[arg(long, short = 't', default_value = "activity")]
        entity_type: String,
    },
    /// List work items
    Items,
    /// Show the statuses an item may move to
    Next {
        item: String,
        #[arg(long)]
        json: bool,
    },
    /// Change an item's status
    Move {
        item: String,
        status: String,
        /// Apply without saving
        #[arg(long)]
        defer: bool,
        /// Strict mode: require exact ID or name (no fuzzy matching)
        #[arg(long)]
        strict: bool,
    },
    /// Drop an item on a board column
    Drop {
        item: String,
        column: String,
        /// Status included in the column (repeatable)
        #[arg(long = "status", short = 's', required = true)]
        statuses: Vec<String>,
    },
    /// Show an item
    Show {
        item: String,
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load(&cli.root)?;
    statusflow::logging::init(&config.log_level);

    let ws = Workspace {
        root: cli.root,
        scope: Scope::new(&cli.scope),
        config,
    };

    match cli.command {
        Commands::Init
        | Commands::AddStatus { .. }
        | Commands::Activate { .. }
        | Commands::Deactivate { .. }
        | Commands::AddWorkflow { .. }
        | Commands::Link { .. }
        | Commands::Unlink { .. }
        | Commands::AddItem { .. }
        | Commands::Move { .. }
        | Commands::Drop { .. } => dispatch_write_ops(&ws, cli.command),
        Commands::Statuses { .. }
        | Commands::Workflows
        | Commands::Check { .. }
        | Commands::Items
        | Commands::Next { .. }
        | Commands::Show { .. } => dispatch_read_ops(&ws, cli.command),
    }
}

fn dispatch_write_ops(ws: &Workspace, cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Init => handlers::init::handle(ws),
        Commands::AddStatus {
            name,
            color,
            order,
            is_final,
        } => handlers::add_status::handle(ws, &name, color.as_deref(), order, is_final),
        Commands::Activate { status } => handlers::activate::handle(ws, &status, true),
        Commands::Deactivate { status } => handlers::activate::handle(ws, &status, false),
        Commands::AddWorkflow { name, entity_type } => {
            handlers::add_workflow::handle(ws, &name, &entity_type)
        }
        Commands::Link {
            workflow,
            to,
            from,
            initial,
            sequence,
        } => handlers::link::link(ws, &workflow, from.as_deref(), &to, initial, sequence),
        Commands::Unlink { workflow, to, from } => {
            handlers::link::unlink(ws, &workflow, from.as_deref(), &to)
        }
        Commands::AddItem {
            name,
            workflow,
            entity_type,
        } => handlers::add_item::handle(ws, &name, workflow.as_deref(), &entity_type),
        Commands::Move {
            item,
            status,
            defer,
            strict,
        } => handlers::move_item::handle(ws, &item, &status, defer, strict),
        Commands::Drop {
            item,
            column,
            statuses,
        } => handlers::drop::handle(ws, &item, &column, &statuses),
        _ => unreachable!("Invalid write command dispatch"),
    }
}

fn dispatch_read_ops(ws: &Workspace, cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Statuses { json } => handlers::statuses::handle(ws, json),
        Commands::Workflows => handlers::workflows::handle(ws),
        Commands::Check { workflow } => handlers::check::handle(ws, workflow.as_deref()),
        Commands::Items => handlers::items::handle(ws),
        Commands::Next { item, json } => handlers::next::handle(ws, &item, json),
        Commands::Show { item, json } => handlers::show::handle(ws, &item, json),
        _ => unreachable!("Invalid read command dispatch"),
    }
}
