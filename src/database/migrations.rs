//! Schema migrations for the record store.
//!
//! Uses a `schema_version` table to track which migrations have been applied.
//! Each migration runs exactly once and is recorded with a timestamp.

use rusqlite::Connection;

use crate::types::record::unix_seconds;

/// Current schema version: the number of known migrations.
pub const CURRENT_SCHEMA_VERSION: i32 = MIGRATIONS.len() as i32;

/// Returns the current schema version from the database (0 if table doesn't exist).
pub fn get_schema_version(conn: &Connection) -> i32 {
    conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |row| row.get(0),
    )
    .unwrap_or(0)
}

type Migration = fn(&Connection) -> Result<(), rusqlite::Error>;

/// Applied in order; the version of an entry is its position plus one.
const MIGRATIONS: &[(&str, Migration)] = &[("Initial schema: bookmark_nodes", migration_v1)];

/// Runs all pending schema migrations against the provided connection.
///
/// Safe to call on every startup.
///
/// # Errors
/// Returns `rusqlite::Error` if any SQL statement fails.
pub fn run_all(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(
        "PRAGMA journal_mode = WAL;
         CREATE TABLE IF NOT EXISTS schema_version (
             version INTEGER PRIMARY KEY,
             applied_at INTEGER NOT NULL,
             description TEXT NOT NULL
         );",
    )?;

    let current = get_schema_version(conn);
    for (version, (description, migrate)) in (1..).zip(MIGRATIONS) {
        if version > current {
            migrate(conn)?;
            conn.execute(
                "INSERT OR IGNORE INTO schema_version (version, applied_at, description) \
                 VALUES (?1, ?2, ?3)",
                rusqlite::params![version, unix_seconds(), description],
            )?;
        }
    }

    Ok(())
}

/// V1: flat record table.
///
/// `parent_id` has no foreign key; dangling parents are reported when the
/// records are joined into a tree.
fn migration_v1(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS bookmark_nodes (
            id TEXT PRIMARY KEY,
            kind TEXT NOT NULL,
            title TEXT NOT NULL DEFAULT '',
            url TEXT,
            icon TEXT,
            add_date INTEGER NOT NULL,
            last_modified INTEGER NOT NULL,
            parent_id TEXT,
            position INTEGER NOT NULL DEFAULT 0,
            toolbar INTEGER NOT NULL DEFAULT 0
        );

        CREATE INDEX IF NOT EXISTS idx_bookmark_nodes_parent ON bookmark_nodes(parent_id, position);
        CREATE INDEX IF NOT EXISTS idx_bookmark_nodes_kind ON bookmark_nodes(kind);
        ",
    )
}
