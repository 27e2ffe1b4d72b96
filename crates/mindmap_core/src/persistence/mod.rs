//! Diagram persistence to a single key-value slot.
//!
//! # Responsibility
//! - Define the slot storage seam and its SQLite implementation.
//! - Encode/decode the versionless `{nodes, connections}` document.
//!
//! # Invariants
//! - Loading never fails loudly: unreadable or invalid documents read as
//!   "nothing to load".
//! - Saving reports failure to the caller so the shell can retry.
//!
//! # See also
//! - docs/architecture/persistence.md

use crate::db::DbError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod graph_slot;
pub mod slot_store;

pub type PersistenceResult<T> = Result<T, PersistenceError>;

/// Failure while reading or writing a slot.
#[derive(Debug)]
pub enum PersistenceError {
    Db(DbError),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    InvalidSlotKey(String),
    Serialize(serde_json::Error),
    /// Slot content is not a structurally valid graph document.
    InvalidDocument(String),
}

impl Display for PersistenceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "slot store requires schema version {expected_version}, got {actual_version}"
            ),
            Self::InvalidSlotKey(key) => write!(f, "invalid slot key `{key}`"),
            Self::Serialize(err) => write!(f, "failed to encode diagram document: {err}"),
            Self::InvalidDocument(message) => write!(f, "invalid diagram document: {message}"),
        }
    }
}

impl Error for PersistenceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Serialize(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for PersistenceError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<serde_json::Error> for PersistenceError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialize(value)
    }
}
