//! SQLite-backed key-value storage.
//!
//! # Responsibility
//! - Persist entries in the `kv_entries` table created by db migrations.
//! - Isolate stores sharing one database through a namespace column.
//!
//! # Invariants
//! - Connections must come from `db::open_db*` so the schema exists.
//! - Writes are single-statement upserts.

use super::{KeyValueBackend, StorageResult};
use rusqlite::{params, Connection, OptionalExtension};

/// Namespace used for the full-list (cookie) store.
pub const COOKIE_NAMESPACE: &str = "cookie";
/// Namespace used for the per-id fast-lookup store.
pub const LOCAL_NAMESPACE: &str = "local";

pub struct SqliteBackend<'conn> {
    conn: &'conn Connection,
    namespace: String,
}

impl<'conn> SqliteBackend<'conn> {
    pub fn new(conn: &'conn Connection, namespace: impl Into<String>) -> Self {
        Self {
            conn,
            namespace: namespace.into(),
        }
    }

    pub fn namespace(&self) -> &str {
        self.namespace.as_str()
    }
}

impl KeyValueBackend for SqliteBackend<'_> {
    fn get_item(&self, key: &str) -> StorageResult<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM kv_entries WHERE namespace = ?1 AND key = ?2;",
                params![self.namespace, key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set_item(&mut self, key: &str, value: &str) -> StorageResult<()> {
        self.conn.execute(
            "INSERT INTO kv_entries (namespace, key, value)
             VALUES (?1, ?2, ?3)
             ON CONFLICT(namespace, key) DO UPDATE SET
                value = excluded.value,
                updated_at = (CAST(strftime('%s', 'now') AS INTEGER) * 1000);",
            params![self.namespace, key, value],
        )?;
        Ok(())
    }

    fn remove_item(&mut self, key: &str) -> StorageResult<bool> {
        let changed = self.conn.execute(
            "DELETE FROM kv_entries WHERE namespace = ?1 AND key = ?2;",
            params![self.namespace, key],
        )?;
        Ok(changed > 0)
    }

    fn keys(&self) -> StorageResult<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT key FROM kv_entries WHERE namespace = ?1 ORDER BY key ASC;")?;
        let keys = stmt
            .query_map([self.namespace.as_str()], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(keys)
    }
}
