//! v001 -- Initial schema creation.
//!
//! Creates the `snapshots` table holding persisted client state.

use rusqlite::Connection;

/// SQL executed when upgrading from version 0 to version 1.
const UP_SQL: &str = r#"
-- ----------------------------------------------------------------
-- Snapshots (opaque JSON state, one row per key)
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS snapshots (
    key      TEXT PRIMARY KEY NOT NULL,
    json     TEXT NOT NULL,
    saved_at TEXT NOT NULL                    -- ISO-8601 / RFC-3339
);
"#;

/// Apply the initial migration.
pub fn up(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(UP_SQL)
}
