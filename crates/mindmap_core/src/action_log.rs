//! Human-readable audit trail of diagram edits.
//!
//! # Responsibility
//! - Append one entry per successful engine mutation.
//! - Serve entries newest first for display.
//!
//! # Invariants
//! - Entries are never removed or rewritten; the log is not replayed.
//! - Undo/redo append their own entries instead of popping earlier ones.

use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

/// Kind of recorded action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    AddNode,
    MoveNode,
    EditNode,
    DeleteNode,
    AddConnection,
    EditConnection,
    DeleteConnection,
    Undo,
    Redo,
    Save,
    Load,
}

impl ActionKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::AddNode => "Added node",
            Self::MoveNode => "Moved node",
            Self::EditNode => "Edited node",
            Self::DeleteNode => "Deleted node",
            Self::AddConnection => "Added connection",
            Self::EditConnection => "Edited connection",
            Self::DeleteConnection => "Deleted connection",
            Self::Undo => "Undo",
            Self::Redo => "Redo",
            Self::Save => "Saved diagram",
            Self::Load => "Loaded diagram",
        }
    }
}

/// One audit entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionEntry {
    pub id: Uuid,
    /// Unix epoch milliseconds.
    pub timestamp_ms: i64,
    pub action: ActionKind,
    pub details: String,
}

/// Append-only sequence of `ActionEntry`.
#[derive(Debug, Clone, Default)]
pub struct ActionLog {
    entries: Vec<ActionEntry>,
}

impl ActionLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an entry stamped with the current wall-clock time.
    pub fn append(&mut self, action: ActionKind, details: impl Into<String>) -> &ActionEntry {
        let index = self.entries.len();
        self.entries.push(ActionEntry {
            id: Uuid::new_v4(),
            timestamp_ms: now_epoch_ms(),
            action,
            details: details.into(),
        });
        &self.entries[index]
    }

    /// Entries, newest first.
    pub fn entries(&self) -> impl Iterator<Item = &ActionEntry> + '_ {
        self.entries.iter().rev()
    }

    pub fn latest(&self) -> Option<&ActionEntry> {
        self.entries.last()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| {
            i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX)
        })
}

#[cfg(test)]
mod tests {
    use super::{ActionKind, ActionLog};

    #[test]
    fn entries_are_reverse_chronological() {
        let mut log = ActionLog::new();
        log.append(ActionKind::AddNode, "first");
        log.append(ActionKind::DeleteNode, "second");

        let details: Vec<_> = log.entries().map(|entry| entry.details.as_str()).collect();
        assert_eq!(details, vec!["second", "first"]);
        assert_eq!(log.latest().unwrap().action, ActionKind::DeleteNode);
    }

    #[test]
    fn entries_get_distinct_ids_and_timestamps() {
        let mut log = ActionLog::new();
        let first = log.append(ActionKind::Save, "a").clone();
        let second = log.append(ActionKind::Save, "b").clone();
        assert_ne!(first.id, second.id);
        assert!(first.timestamp_ms > 0);
        assert!(second.timestamp_ms >= first.timestamp_ms);
    }
}
