use rusqlite::Connection;
use symtrack_core::db::migrations::latest_version;
use symtrack_core::db::{open_db, open_db_in_memory, DbError};

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    assert_table_exists(&conn, "profile");
    assert_table_exists(&conn, "profile_selections");
    assert_table_exists(&conn, "symptom_severity");
    assert_table_exists(&conn, "timeline_entries");
    assert_table_exists(&conn, "activity_records");
}

#[test]
fn opening_same_database_twice_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("symtrack.sqlite3");

    let conn_first = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_first), latest_version());
    drop(conn_first);

    let conn_second = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_second), latest_version());
    assert_table_exists(&conn_second, "timeline_entries");
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.sqlite3");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    let err = open_db(&path).unwrap_err();
    match err {
        DbError::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        } => {
            assert_eq!(db_version, 999);
            assert_eq!(latest_supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn timeline_rows_reject_update_and_delete() {
    let conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO timeline_entries (uuid, category, title, subtitle, icon, timestamp_ms)
         VALUES ('11111111-2222-4333-8444-555555555555', 'food', 'Lunch: Salad', '320 calories', '🥗', 1000);",
        [],
    )
    .unwrap();

    let update = conn.execute("UPDATE timeline_entries SET title = 'changed';", []);
    assert!(update.unwrap_err().to_string().contains("append-only"));

    let delete = conn.execute("DELETE FROM timeline_entries;", []);
    assert!(delete.unwrap_err().to_string().contains("append-only"));
}

#[test]
fn activity_rows_reject_update_and_delete() {
    let conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO activity_records (entry_uuid, activity, payload, recorded_at_ms)
         VALUES (NULL, 'medication', '{\"activity\":\"medication\"}', 1000);",
        [],
    )
    .unwrap();

    let update = conn.execute("UPDATE activity_records SET payload = '{}';", []);
    assert!(update.unwrap_err().to_string().contains("append-only"));

    let delete = conn.execute("DELETE FROM activity_records;", []);
    assert!(delete.unwrap_err().to_string().contains("append-only"));
}

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}

fn assert_table_exists(conn: &Connection, table_name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [table_name],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1, "table {table_name} does not exist");
}
