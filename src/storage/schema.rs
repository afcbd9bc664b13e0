//! Database schema definitions
//!
//! This module contains the SQL schema for the SQLite record sink.

/// SQL schema for the record database
pub const SCHEMA_SQL: &str = r#"
-- One row per successfully fetched identifier
CREATE TABLE IF NOT EXISTS records (
    id INTEGER PRIMARY KEY,
    content_type TEXT NOT NULL,
    payload BLOB NOT NULL,
    fetched_at TEXT NOT NULL
);
"#;

/// Initializes the database schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA_SQL)
}
