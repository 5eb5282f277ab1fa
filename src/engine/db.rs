use anyhow::{Context, Result};
use rusqlite::Connection;
use std::fs;
use std::path::{Path, PathBuf};

pub const DB_DIR: &str = ".statusflow";
const DB_FILE: &str = "state.db";

pub struct Db;

impl Db {
    /// Initializes the .statusflow directory and `SQLite` schema under `root`.
    ///
    /// # Errors
    /// Returns error if directory creation, DB opening, or migration fails.
    pub fn init(root: &Path) -> Result<PathBuf> {
        let dir = root.join(DB_DIR);
        if !dir.exists() {
            fs::create_dir_all(&dir).context("Failed to create .statusflow directory")?;
        }

        let db_path = dir.join(DB_FILE);
        let conn = Connection::open(&db_path).context("Failed to open database")?;
        Self::migrate(&conn)?;

        Ok(db_path)
    }

    /// Connects to an existing database under `root`.
    ///
    /// # Errors
    /// Returns error if the database file does not exist or cannot be opened.
    pub fn connect(root: &Path) -> Result<Connection> {
        let db_path = root.join(DB_DIR).join(DB_FILE);
        if !db_path.exists() {
            anyhow::bail!("Statusflow not initialized. Run `statusflow init` first.");
        }
        let conn = Connection::open(db_path).context("Failed to open database")?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        Ok(conn)
    }

    /// Opens a fresh in-memory database with the schema applied.
    ///
    /// # Errors
    /// Returns error if migration fails.
    pub fn open_in_memory() -> Result<Connection> {
        let conn = Connection::open_in_memory().context("Failed to open in-memory database")?;
        Self::migrate(&conn)?;
        Ok(conn)
    }

    /// Applies the schema migrations.
    fn migrate(conn: &Connection) -> Result<()> {
        conn.pragma_update(None, "foreign_keys", "ON")?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS statuses (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                name_key TEXT NOT NULL,
                color TEXT NOT NULL DEFAULT '#808080',
                sort_order INTEGER NOT NULL DEFAULT 0,
                is_final INTEGER NOT NULL DEFAULT 0,
                is_active INTEGER NOT NULL DEFAULT 1,
                scope TEXT NOT NULL,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP
            )",
            [],
        )
        .context("Failed to create statuses table")?;

        conn.execute(
            "CREATE UNIQUE INDEX IF NOT EXISTS idx_statuses_scope_name
                ON statuses (scope, name_key)",
            [],
        )
        .context("Failed to create status name index")?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS workflows (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                name_key TEXT NOT NULL,
                entity_type TEXT NOT NULL,
                scope TEXT NOT NULL,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
                UNIQUE (scope, name_key)
            )",
            [],
        )
        .context("Failed to create workflows table")?;

        // No uniqueness on (workflow, from, to) or on the initial flag here:
        // the repository validates new edges, the engine tie-breaks old ones.
        conn.execute(
            "CREATE TABLE IF NOT EXISTS status_relations (
                id INTEGER PRIMARY KEY,
                workflow_id INTEGER NOT NULL,
                from_status_id INTEGER,
                to_status_id INTEGER NOT NULL,
                initial_status INTEGER NOT NULL DEFAULT 0,
                sequence INTEGER NOT NULL DEFAULT 0,
                FOREIGN KEY(workflow_id) REFERENCES workflows(id) ON DELETE CASCADE,
                FOREIGN KEY(from_status_id) REFERENCES statuses(id),
                FOREIGN KEY(to_status_id) REFERENCES statuses(id)
            )",
            [],
        )
        .context("Failed to create status_relations table")?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS work_items (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                entity_type TEXT NOT NULL,
                scope TEXT NOT NULL,
                status_id INTEGER,
                workflow_id INTEGER,
                version INTEGER NOT NULL DEFAULT 0,
                updated_at TEXT NOT NULL,
                FOREIGN KEY(status_id) REFERENCES statuses(id),
                FOREIGN KEY(workflow_id) REFERENCES workflows(id)
            )",
            [],
        )
        .context("Failed to create work_items table")?;

        Ok(())
    }
}
