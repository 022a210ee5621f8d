//! Unit tests for the record store database layer (connection + migrations).

use bookmark_transcoder::database::migrations::{get_schema_version, run_all, CURRENT_SCHEMA_VERSION};
use bookmark_transcoder::database::Database;
use tempfile::TempDir;

#[test]
fn test_open_in_memory_succeeds() {
    let db = Database::open_in_memory();
    assert!(db.is_ok(), "open_in_memory should succeed");
}

#[test]
fn test_migrations_create_tables() {
    let db = Database::open_in_memory().expect("open_in_memory failed");
    let conn = db.connection();

    for table in ["bookmark_nodes", "schema_version"] {
        let exists: bool = conn
            .query_row(
                "SELECT COUNT(*) > 0 FROM sqlite_master WHERE type='table' AND name=?1",
                [table],
                |row| row.get(0),
            )
            .unwrap_or(false);
        assert!(exists, "Table '{}' should exist after migrations", table);
    }
}

#[test]
fn test_migrations_create_indexes() {
    let db = Database::open_in_memory().expect("open_in_memory failed");
    let conn = db.connection();

    for index in ["idx_bookmark_nodes_parent", "idx_bookmark_nodes_kind"] {
        let exists: bool = conn
            .query_row(
                "SELECT COUNT(*) > 0 FROM sqlite_master WHERE type='index' AND name=?1",
                [index],
                |row| row.get(0),
            )
            .unwrap_or(false);
        assert!(exists, "Index '{}' should exist after migrations", index);
    }
}

#[test]
fn test_schema_version_recorded() {
    let db = Database::open_in_memory().expect("open_in_memory failed");
    assert_eq!(get_schema_version(db.connection()), CURRENT_SCHEMA_VERSION);
}

#[test]
fn test_migrations_are_idempotent() {
    let db = Database::open_in_memory().expect("open_in_memory failed");
    run_all(db.connection()).expect("second run should succeed");
    run_all(db.connection()).expect("third run should succeed");

    let versions: i64 = db
        .connection()
        .query_row("SELECT COUNT(*) FROM schema_version", [], |row| row.get(0))
        .unwrap();
    assert_eq!(versions, 1);
}

#[test]
fn test_open_on_disk_persists_rows() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("bookmarks.db");

    {
        let db = Database::open(&path).unwrap();
        db.connection()
            .execute(
                "INSERT INTO bookmark_nodes (id, kind, title, add_date, last_modified, position) \
                 VALUES ('a', 'folder', 'Kept', 1, 1, 0)",
                [],
            )
            .unwrap();
    }

    let db = Database::open(&path).unwrap();
    let title: String = db
        .connection()
        .query_row("SELECT title FROM bookmark_nodes WHERE id = 'a'", [], |row| row.get(0))
        .unwrap();
    assert_eq!(title, "Kept");
}
