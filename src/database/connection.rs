//! SQLite connection management for the record store.
//!
//! [`Database`] owns a `rusqlite::Connection` and brings the schema up to
//! date every time it is opened.

use rusqlite::Connection;
use std::path::Path;

use super::migrations;

/// Owned SQLite connection with the bookmark schema applied.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Opens (or creates) a SQLite database at the given file path and runs migrations.
    ///
    /// # Errors
    /// Returns `rusqlite::Error` if the connection cannot be established or migrations fail.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, rusqlite::Error> {
        let conn = Connection::open(path)?;
        migrations::run_all(&conn)?;
        Ok(Self { conn })
    }

    /// Opens an in-memory SQLite database and runs migrations.
    ///
    /// The data is discarded when the `Database` is dropped.
    pub fn open_in_memory() -> Result<Self, rusqlite::Error> {
        let conn = Connection::open_in_memory()?;
        migrations::run_all(&conn)?;
        Ok(Self { conn })
    }

    /// Returns a reference to the underlying `rusqlite::Connection`.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}
