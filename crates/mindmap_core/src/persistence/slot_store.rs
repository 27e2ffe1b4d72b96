//! Key-value slot contracts and SQLite implementation.
//!
//! # Responsibility
//! - Read/write one opaque string value per slot key.
//! - Keep SQL details inside the persistence boundary.
//!
//! # Invariants
//! - Writing a slot overwrites any prior value for that key.
//! - Slot keys are non-blank after trim.

use crate::db::migrations::latest_version;
use crate::db::DbError;
use crate::persistence::{PersistenceError, PersistenceResult};
use rusqlite::{params, Connection, OptionalExtension};

/// Storage contract for whole-document slots.
pub trait SlotStore {
    fn read_slot(&self, key: &str) -> PersistenceResult<Option<String>>;
    fn write_slot(&self, key: &str, value: &str) -> PersistenceResult<()>;
    /// Returns whether a value was removed.
    fn clear_slot(&self, key: &str) -> PersistenceResult<bool>;
}

/// SQLite-backed slot store over a migrated connection.
pub struct SqliteSlotStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteSlotStore<'conn> {
    /// Creates a store after checking the connection carries the slot schema.
    ///
    /// # Errors
    /// - `UninitializedConnection` when migrations have not been applied.
    pub fn try_new(conn: &'conn Connection) -> PersistenceResult<Self> {
        let actual_version: u32 = conn
            .query_row("PRAGMA user_version;", [], |row| row.get(0))
            .map_err(DbError::from)?;
        let expected_version = latest_version();
        if actual_version != expected_version {
            return Err(PersistenceError::UninitializedConnection {
                expected_version,
                actual_version,
            });
        }
        Ok(Self { conn })
    }
}

impl SlotStore for SqliteSlotStore<'_> {
    fn read_slot(&self, key: &str) -> PersistenceResult<Option<String>> {
        let key = normalize_slot_key(key)?;
        let value = self
            .conn
            .query_row(
                "SELECT slot_value FROM kv_slots WHERE slot_key = ?1;",
                [key],
                |row| row.get::<_, String>(0),
            )
            .optional()
            .map_err(DbError::from)?;
        Ok(value)
    }

    fn write_slot(&self, key: &str, value: &str) -> PersistenceResult<()> {
        let key = normalize_slot_key(key)?;
        self.conn
            .execute(
                "INSERT INTO kv_slots (slot_key, slot_value)
                 VALUES (?1, ?2)
                 ON CONFLICT(slot_key) DO UPDATE SET
                    slot_value = excluded.slot_value,
                    updated_at = (strftime('%s', 'now') * 1000);",
                params![key, value],
            )
            .map_err(DbError::from)?;
        Ok(())
    }

    fn clear_slot(&self, key: &str) -> PersistenceResult<bool> {
        let key = normalize_slot_key(key)?;
        let removed = self
            .conn
            .execute("DELETE FROM kv_slots WHERE slot_key = ?1;", [key])
            .map_err(DbError::from)?;
        Ok(removed > 0)
    }
}

fn normalize_slot_key(key: &str) -> PersistenceResult<&str> {
    let trimmed = key.trim();
    if trimmed.is_empty() {
        return Err(PersistenceError::InvalidSlotKey(key.to_string()));
    }
    Ok(trimmed)
}
