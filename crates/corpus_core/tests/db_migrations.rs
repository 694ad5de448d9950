use corpus_core::db::migrations::latest_version;
use corpus_core::db::{open_db, open_db_in_memory, open_existing_db, DbError};
use rusqlite::Connection;

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    assert_object_exists(&conn, "table", "articles");
    assert_object_exists(&conn, "table", "articles_fts");
    assert_object_exists(&conn, "table", "writing_patterns");
    assert_object_exists(&conn, "table", "elo_comparisons");
    assert_object_exists(&conn, "view", "v_statistics");
    assert_object_exists(&conn, "view", "v_category_stats");
    assert_object_exists(&conn, "view", "v_year_stats");
}

#[test]
fn opening_same_database_twice_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("data/corpus/writing-corpus.db");

    let conn_first = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_first), latest_version());
    drop(conn_first);

    let conn_second = open_existing_db(&path).unwrap();
    assert_eq!(schema_version(&conn_second), latest_version());
    assert_object_exists(&conn_second, "table", "articles");
}

#[test]
fn opening_missing_store_is_fatal_and_creates_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing.db");

    let err = open_existing_db(&path).unwrap_err();
    assert!(matches!(err, DbError::MissingDatabase(ref missing) if missing == &path));
    assert!(!path.exists());
}

#[test]
fn store_written_by_newer_build_is_refused() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");
    Connection::open(&path)
        .unwrap()
        .pragma_update(None, "user_version", 999)
        .unwrap();

    let latest = latest_version();
    assert!(matches!(
        open_existing_db(&path),
        Err(DbError::UnsupportedSchemaVersion {
            db_version: 999,
            latest_supported,
        }) if latest_supported == latest
    ));
}

#[test]
fn schema_rejects_unknown_rewrite_labels() {
    let conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO articles (id, title, rewrite_type) VALUES ('ok', 't', 'cultural_extraction');",
        [],
    )
    .unwrap();

    for (column, value) in [("rewrite_type", "time_capsule"), ("rewrite_bucket", "keep")] {
        let sql = format!("INSERT INTO articles (id, title, {column}) VALUES ('bad', 't', ?1);");
        assert!(conn.execute(&sql, [value]).is_err(), "{column}={value}");
    }
}

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}

fn assert_object_exists(conn: &Connection, kind: &str, name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = ?1 AND name = ?2
            );",
            [kind, name],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1, "{kind} {name} does not exist");
}
