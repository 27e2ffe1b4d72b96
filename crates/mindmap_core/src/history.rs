//! Linear undo/redo over whole-state snapshots.
//!
//! # Responsibility
//! - Store deep copies of `GraphState` after each committed edit.
//! - Move a cursor backwards/forwards for undo/redo.
//!
//! # Invariants
//! - `cursor` is `None` only while no snapshot exists, otherwise it indexes
//!   an existing snapshot.
//! - Recording after an undo discards the redo branch.
//! - Out-of-range undo/redo is a no-op returning `None`.

use crate::model::graph::GraphState;

/// Snapshot list plus cursor.
#[derive(Debug, Clone, Default)]
pub struct HistoryStack {
    snapshots: Vec<GraphState>,
    cursor: Option<usize>,
    limit: Option<usize>,
}

impl HistoryStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a stack retaining at most `limit` snapshots (minimum 1).
    pub fn with_limit(limit: Option<usize>) -> Self {
        Self {
            limit: limit.map(|value| value.max(1)),
            ..Self::default()
        }
    }

    /// Drops the redo branch, appends `state`, and moves the cursor to it.
    pub fn record(&mut self, state: GraphState) {
        let keep = self.cursor.map_or(0, |cursor| cursor + 1);
        self.snapshots.truncate(keep);
        self.snapshots.push(state);

        if let Some(limit) = self.limit {
            if self.snapshots.len() > limit {
                let overflow = self.snapshots.len() - limit;
                self.snapshots.drain(..overflow);
            }
        }
        self.cursor = Some(self.snapshots.len() - 1);
    }

    /// Overwrites the snapshot under the cursor, recording when empty.
    ///
    /// The redo branch is dropped as with `record`.
    pub fn replace_current(&mut self, state: GraphState) {
        match self.cursor {
            Some(cursor) => {
                self.snapshots.truncate(cursor + 1);
                self.snapshots[cursor] = state;
            }
            None => self.record(state),
        }
    }

    /// Clears all history and seeds it with one baseline snapshot.
    pub fn reset(&mut self, baseline: GraphState) {
        self.snapshots.clear();
        self.cursor = None;
        self.record(baseline);
    }

    pub fn undo(&mut self) -> Option<&GraphState> {
        let cursor = self.cursor.filter(|cursor| *cursor > 0)? - 1;
        self.cursor = Some(cursor);
        self.snapshots.get(cursor)
    }

    pub fn redo(&mut self) -> Option<&GraphState> {
        let cursor = self.cursor.map_or(0, |cursor| cursor + 1);
        if cursor >= self.snapshots.len() {
            return None;
        }
        self.cursor = Some(cursor);
        self.snapshots.get(cursor)
    }

    pub fn can_undo(&self) -> bool {
        self.cursor.is_some_and(|cursor| cursor > 0)
    }

    pub fn can_redo(&self) -> bool {
        self.position() < self.snapshots.len() as i64 - 1
    }

    /// Cursor in `[-1, len - 1]`; `-1` means no history yet.
    pub fn position(&self) -> i64 {
        self.cursor.map_or(-1, |cursor| cursor as i64)
    }

    pub fn current(&self) -> Option<&GraphState> {
        self.cursor.and_then(|cursor| self.snapshots.get(cursor))
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::HistoryStack;
    use crate::model::graph::GraphState;
    use crate::model::node::Node;

    fn state_with(count: usize) -> GraphState {
        GraphState {
            nodes: (0..count)
                .map(|index| Node::new(format!("n{index}"), index as f64, 0.0))
                .collect(),
            connections: Vec::new(),
        }
    }

    fn assert_cursor_in_range(history: &HistoryStack) {
        let position = history.position();
        assert!(position >= -1 && position <= history.len() as i64 - 1);
    }

    #[test]
    fn starts_empty_with_negative_cursor() {
        let mut history = HistoryStack::new();
        assert_eq!(history.position(), -1);
        assert!(!history.can_undo());
        assert!(!history.can_redo());
        assert!(history.undo().is_none());
        assert!(history.redo().is_none());
        assert_eq!(history.position(), -1);
    }

    #[test]
    fn first_record_establishes_index_zero() {
        let mut history = HistoryStack::new();
        history.record(state_with(1));
        assert_eq!(history.position(), 0);
        assert!(!history.can_undo());
        assert!(history.undo().is_none());
    }

    #[test]
    fn undo_and_redo_walk_snapshots() {
        let (s0, s1, s2) = (state_with(0), state_with(1), state_with(2));
        let mut history = HistoryStack::new();
        history.record(s0.clone());
        history.record(s1.clone());
        history.record(s2.clone());

        assert_eq!(history.undo(), Some(&s1));
        assert_eq!(history.undo(), Some(&s0));
        assert!(history.undo().is_none());
        assert_eq!(history.redo(), Some(&s1));
        assert_eq!(history.redo(), Some(&s2));
        assert!(history.redo().is_none());
        assert_cursor_in_range(&history);
    }

    #[test]
    fn record_after_undo_discards_redo_branch() {
        let mut history = HistoryStack::new();
        history.record(state_with(0));
        history.record(state_with(1));
        history.record(state_with(2));
        history.undo();
        history.undo();

        let branch = state_with(5);
        history.record(branch.clone());
        assert_eq!(history.len(), 2);
        assert!(!history.can_redo());
        assert_eq!(history.current(), Some(&branch));
    }

    #[test]
    fn limit_drops_oldest_snapshots() {
        let (s1, s2) = (state_with(1), state_with(2));
        let mut history = HistoryStack::with_limit(Some(2));
        history.record(state_with(0));
        history.record(s1.clone());
        history.record(s2);

        assert_eq!(history.len(), 2);
        assert_eq!(history.position(), 1);
        assert_eq!(history.undo(), Some(&s1));
        assert!(history.undo().is_none());
        assert_cursor_in_range(&history);
    }

    #[test]
    fn replace_current_overwrites_without_growing() {
        let mut history = HistoryStack::new();
        history.record(state_with(0));
        history.record(state_with(1));
        let replaced = state_with(3);
        history.replace_current(replaced.clone());

        assert_eq!(history.len(), 2);
        assert_eq!(history.current(), Some(&replaced));
    }
}
