//! Save / load helpers for opaque JSON snapshots.
//!
//! The store never interprets a payload: any `Serialize` value can be saved
//! under a key and read back as the matching `DeserializeOwned` type.

use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::database::Database;
use crate::error::Result;
use crate::models::StoredSnapshot;

impl Database {
    /// Insert or replace the snapshot stored under `key`.
    pub fn save_snapshot<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let json = serde_json::to_string(value)?;
        let saved_at = Utc::now();

        self.conn().execute(
            "INSERT INTO snapshots (key, json, saved_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET json = excluded.json, saved_at = excluded.saved_at",
            params![key, json, saved_at.to_rfc3339()],
        )?;

        tracing::debug!(key, bytes = json.len(), "snapshot saved");
        Ok(())
    }

    /// Load the snapshot stored under `key`, if any.
    pub fn load_snapshot<T: DeserializeOwned>(&self, key: &str) -> Result<Option<StoredSnapshot<T>>> {
        let row: Option<(String, String)> = self
            .conn()
            .query_row(
                "SELECT json, saved_at FROM snapshots WHERE key = ?1",
                params![key],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        let Some((json, saved_at)) = row else {
            return Ok(None);
        };

        let value: T = serde_json::from_str(&json)?;
        let saved_at: DateTime<Utc> =
            DateTime::parse_from_rfc3339(&saved_at)?.with_timezone(&Utc);

        Ok(Some(StoredSnapshot {
            key: key.to_string(),
            value,
            saved_at,
        }))
    }

    /// Delete the snapshot stored under `key`.  Returns `true` if a row was deleted.
    pub fn delete_snapshot(&self, key: &str) -> Result<bool> {
        let affected = self
            .conn()
            .execute("DELETE FROM snapshots WHERE key = ?1", params![key])?;
        Ok(affected > 0)
    }

    /// List all snapshot keys, alphabetically.
    pub fn list_snapshot_keys(&self) -> Result<Vec<String>> {
        let mut stmt = self
            .conn()
            .prepare("SELECT key FROM snapshots ORDER BY key ASC")?;

        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;

        let mut keys = Vec::new();
        for row in rows {
            keys.push(row?);
        }
        Ok(keys)
    }
}
