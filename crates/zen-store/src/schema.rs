use rusqlite::Connection;

use crate::error::Result;

pub const SCHEMA_VERSION: i64 = 2;

pub fn initialize(conn: &Connection) -> Result<()> {
    conn.execute_batch("PRAGMA journal_mode = WAL;")?;
    conn.pragma_update(None, "busy_timeout", 5000)?;

    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS metadata (
            key   TEXT PRIMARY KEY,
            value TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS records (
            namespace  TEXT PRIMARY KEY,
            value      TEXT NOT NULL
        );
        ",
    )?;

    // v2 added updated_at. CREATE TABLE IF NOT EXISTS is a no-op on v1
    // files, so probe for the column and ALTER when it is missing.
    if conn
        .prepare("SELECT updated_at FROM records LIMIT 0")
        .is_err()
    {
        conn.execute_batch("ALTER TABLE records ADD COLUMN updated_at TEXT NOT NULL DEFAULT '';")?;
        tracing::info!("migrated records table to v{SCHEMA_VERSION}");
    }

    conn.execute(
        "INSERT OR REPLACE INTO metadata (key, value) VALUES ('schema_version', ?1)",
        [SCHEMA_VERSION.to_string()],
    )?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initialize_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        initialize(&conn).unwrap();

        let version: String = conn
            .query_row(
                "SELECT value FROM metadata WHERE key = 'schema_version'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(version, SCHEMA_VERSION.to_string());
    }

    #[test]
    fn test_migrates_v1_records_table() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE records (namespace TEXT PRIMARY KEY, value TEXT NOT NULL);
             INSERT INTO records (namespace, value) VALUES ('realm', '{}');",
        )
        .unwrap();

        initialize(&conn).unwrap();

        // The v1 row survives and the new column exists.
        let (value, updated_at): (String, String) = conn
            .query_row(
                "SELECT value, updated_at FROM records WHERE namespace = 'realm'",
                [],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .unwrap();
        assert_eq!(value, "{}");
        assert_eq!(updated_at, "");
    }
}
