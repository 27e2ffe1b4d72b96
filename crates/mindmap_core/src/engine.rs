//! Diagram editing engine.
//!
//! # Responsibility
//! - Own the graph store, undo history, action log and zoom of one editor.
//! - Commit every successful mutation to history and the action log.
//! - Notify subscribed renderers after each change.
//!
//! # Invariants
//! - History is seeded with a baseline snapshot, so the first edit is undoable.
//! - Failed mutations leave state, history, log and revision untouched.
//! - Inside an edit session, repeated updates to the session node collapse
//!   into one history snapshot and one log entry.
//! - Loading replaces the graph and restarts history from the loaded state.

use crate::action_log::{ActionKind, ActionLog};
use crate::config::EngineConfig;
use crate::history::HistoryStack;
use crate::interaction::viewport::clamp_zoom;
use crate::model::connection::{Connection, ConnectionId, ConnectionPatch, ConnectionStyle};
use crate::model::graph::GraphState;
use crate::model::node::{Node, NodeId, NodePatch};
use crate::persistence::graph_slot::GraphPersistence;
use crate::persistence::slot_store::SlotStore;
use crate::persistence::PersistenceResult;
use crate::store::graph_store::{GraphResult, GraphStore};
use log::{debug, info, warn};

/// What changed, passed to listeners together with the new state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EngineChange {
    Graph(ActionKind),
    Zoom(f64),
}

/// Renderer callback.
pub type ChangeListener = Box<dyn FnMut(EngineChange, &GraphState) + Send>;

/// Handle returned by [`GraphEngine::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Kind of coalesced edit session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditKind {
    /// One pointer drag gesture.
    Drag,
    /// One text edit, from focus to commit.
    Text,
}

#[derive(Debug, Clone)]
struct EditSession {
    kind: EditKind,
    node_id: NodeId,
    /// Node as it was before the first update in this session.
    before: Option<Node>,
}

/// One editor instance. Holds no global state.
pub struct GraphEngine {
    config: EngineConfig,
    store: GraphStore,
    history: HistoryStack,
    log: ActionLog,
    zoom: f64,
    revision: u64,
    session: Option<EditSession>,
    listeners: Vec<(ListenerId, ChangeListener)>,
    next_listener_id: u64,
}

impl Default for GraphEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl GraphEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self::with_state(config, GraphState::new())
    }

    /// Creates an engine over an existing state, used as history baseline.
    pub fn with_state(config: EngineConfig, state: GraphState) -> Self {
        let mut store = GraphStore::new(config.node_defaults.clone(), config.dedupe_connections);
        store.replace(state);
        let mut history = HistoryStack::with_limit(config.history_limit);
        history.reset(store.state().clone());

        Self {
            config,
            store,
            history,
            log: ActionLog::new(),
            zoom: crate::interaction::viewport::DEFAULT_ZOOM,
            revision: 0,
            session: None,
            listeners: Vec::new(),
            next_listener_id: 0,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn state(&self) -> &GraphState {
        self.store.state()
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.store.node(id)
    }

    pub fn connection(&self, id: ConnectionId) -> Option<&Connection> {
        self.store.connection(id)
    }

    pub fn action_log(&self) -> &ActionLog {
        &self.log
    }

    pub fn history(&self) -> &HistoryStack {
        &self.history
    }

    /// Monotonic counter bumped on every observable change.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn connected_nodes(&self, node_id: NodeId) -> Vec<Node> {
        self.store.connected_nodes(node_id)
    }

    pub fn subscribe(&mut self, listener: ChangeListener) -> ListenerId {
        let id = ListenerId(self.next_listener_id);
        self.next_listener_id += 1;
        self.listeners.push((id, listener));
        id
    }

    /// Returns whether the listener was registered.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener_id, _)| *listener_id != id);
        self.listeners.len() != before
    }

    /// Appends a default node at canvas `(x, y)`.
    pub fn add_node(&mut self, x: f64, y: f64) -> GraphResult<Node> {
        self.end_edit_session();
        let node = self.store.add_node(x, y)?;
        debug!("event=node_add module=engine status=ok node_id={}", node.id);
        self.commit(
            ActionKind::AddNode,
            format!("Added node \"{}\" at ({:.0}, {:.0})", node.text, x, y),
        );
        Ok(node)
    }

    /// Merges `patch` into a node (move, text edit, resize, recolor).
    ///
    /// An empty or no-change patch succeeds without touching history.
    pub fn update_node(&mut self, id: NodeId, patch: &NodePatch) -> GraphResult<()> {
        if self.session.as_ref().is_some_and(|session| session.node_id != id) {
            self.end_edit_session();
        }

        let prior = self.store.update_node(id, patch)?;
        if self.store.node(id) == Some(&prior) {
            return Ok(());
        }

        if let Some(session) = self.session.as_mut() {
            let first_update = session.before.is_none();
            if first_update {
                session.before = Some(prior);
                self.history.record(self.store.state().clone());
            } else {
                self.history.replace_current(self.store.state().clone());
            }
            self.revision += 1;
            let action = session_action(session.kind);
            self.notify(EngineChange::Graph(action));
            return Ok(());
        }

        let (action, details) = describe_node_update(&prior, patch);
        self.commit(action, details);
        Ok(())
    }

    /// Deletes a node and every connection touching it as one edit.
    ///
    /// Returns `false` (no-op) when the node does not exist.
    pub fn delete_node(&mut self, id: NodeId) -> bool {
        self.end_edit_session();
        let Some((node, removed)) = self.store.delete_node(id) else {
            debug!("event=node_delete module=engine status=noop node_id={id}");
            return false;
        };
        debug!(
            "event=node_delete module=engine status=ok node_id={} cascaded_connections={}",
            id,
            removed.len()
        );
        self.commit(
            ActionKind::DeleteNode,
            format!(
                "Deleted node \"{}\" and {} connection(s)",
                node.text,
                removed.len()
            ),
        );
        true
    }

    pub fn add_connection(
        &mut self,
        from: NodeId,
        to: NodeId,
        style: Option<ConnectionStyle>,
        weight: Option<f64>,
    ) -> GraphResult<Connection> {
        self.end_edit_session();
        let connection = self.store.add_connection(from, to, style, weight)?;
        debug!(
            "event=connection_add module=engine status=ok connection_id={}",
            connection.id
        );
        let details = format!(
            "Connected \"{}\" -> \"{}\"",
            self.node_text(from),
            self.node_text(to)
        );
        self.commit(ActionKind::AddConnection, details);
        Ok(connection)
    }

    /// Edits a connection's label, style or weight.
    pub fn update_connection(
        &mut self,
        id: ConnectionId,
        patch: &ConnectionPatch,
    ) -> GraphResult<()> {
        self.end_edit_session();
        let prior = self.store.update_connection(id, patch)?;
        if self.store.connection(id) == Some(&prior) {
            return Ok(());
        }
        let details = format!(
            "Edited connection \"{}\"",
            prior.label.as_deref().unwrap_or("")
        );
        self.commit(ActionKind::EditConnection, details);
        Ok(())
    }

    /// Returns `false` (no-op) when the connection does not exist.
    pub fn delete_connection(&mut self, id: ConnectionId) -> bool {
        self.end_edit_session();
        let Some(connection) = self.store.delete_connection(id) else {
            return false;
        };
        let details = format!(
            "Deleted connection \"{}\" ({} -> {})",
            connection.label.as_deref().unwrap_or(""),
            self.node_text(connection.from),
            self.node_text(connection.to)
        );
        self.commit(ActionKind::DeleteConnection, details);
        true
    }

    /// Restores the previous snapshot. Returns `false` when nothing to undo.
    pub fn undo(&mut self) -> bool {
        self.end_edit_session();
        let Some(snapshot) = self.history.undo() else {
            return false;
        };
        self.store.replace(snapshot.clone());
        self.after_history_move(ActionKind::Undo);
        true
    }

    /// Re-applies the next snapshot. Returns `false` when nothing to redo.
    pub fn redo(&mut self) -> bool {
        self.end_edit_session();
        let Some(snapshot) = self.history.redo() else {
            return false;
        };
        self.store.replace(snapshot.clone());
        self.after_history_move(ActionKind::Redo);
        true
    }

    /// Sets zoom, clamped to the supported range. Non-finite input is ignored.
    pub fn set_zoom(&mut self, zoom: f64) -> f64 {
        if !zoom.is_finite() {
            return self.zoom;
        }
        let clamped = clamp_zoom(zoom);
        if clamped != self.zoom {
            self.zoom = clamped;
            self.revision += 1;
            self.notify(EngineChange::Zoom(clamped));
        }
        self.zoom
    }

    pub fn zoom_by(&mut self, delta: f64) -> f64 {
        self.set_zoom(self.zoom + delta)
    }

    /// Opens a coalescing session for `node_id`.
    ///
    /// Ignored when coalescing is disabled or the node does not exist. Any
    /// session already open is closed first.
    pub fn begin_edit_session(&mut self, kind: EditKind, node_id: NodeId) {
        self.end_edit_session();
        if !self.config.coalesce_edits || self.store.node(node_id).is_none() {
            return;
        }
        self.session = Some(EditSession {
            kind,
            node_id,
            before: None,
        });
    }

    /// Closes the open session, writing one log entry if anything changed.
    pub fn end_edit_session(&mut self) {
        let Some(session) = self.session.take() else {
            return;
        };
        let Some(before) = session.before else {
            return;
        };
        let action = session_action(session.kind);
        let details = match session.kind {
            EditKind::Drag => format!("Moved node \"{}\"", before.text),
            EditKind::Text => format!("Edited node \"{}\"", before.text),
        };
        self.log.append(action, details);
        debug!(
            "event=edit_session_end module=engine status=ok kind={:?} node_id={}",
            session.kind, session.node_id
        );
    }

    pub fn in_edit_session(&self) -> bool {
        self.session.is_some()
    }

    /// Persists the current graph.
    ///
    /// # Errors
    /// - Storage or encoding failures, returned so the shell can retry.
    pub fn save_to<S: SlotStore>(
        &mut self,
        persistence: &GraphPersistence<S>,
    ) -> PersistenceResult<()> {
        self.end_edit_session();
        if let Err(err) = persistence.save(self.store.state()) {
            warn!(
                "event=diagram_save module=engine status=error slot={} error={}",
                persistence.slot_key(),
                err
            );
            return Err(err);
        }
        self.log.append(
            ActionKind::Save,
            format!(
                "Saved {} node(s) and {} connection(s)",
                self.store.state().nodes.len(),
                self.store.state().connections.len()
            ),
        );
        Ok(())
    }

    /// Replaces the graph with the saved one and restarts history from it.
    ///
    /// Returns `false` (state untouched) when there is nothing to load.
    pub fn load_from<S: SlotStore>(&mut self, persistence: &GraphPersistence<S>) -> bool {
        self.end_edit_session();
        let Some(state) = persistence.load() else {
            return false;
        };
        let details = format!(
            "Loaded {} node(s) and {} connection(s)",
            state.nodes.len(),
            state.connections.len()
        );
        self.history.reset(state.clone());
        self.store.replace(state);
        self.log.append(ActionKind::Load, details);
        self.revision += 1;
        info!(
            "event=diagram_load module=engine status=ok slot={} revision={}",
            persistence.slot_key(),
            self.revision
        );
        self.notify(EngineChange::Graph(ActionKind::Load));
        true
    }

    fn commit(&mut self, action: ActionKind, details: String) {
        self.history.record(self.store.state().clone());
        self.log.append(action, details);
        self.revision += 1;
        self.notify(EngineChange::Graph(action));
    }

    fn after_history_move(&mut self, action: ActionKind) {
        let position = self.history.position();
        self.log.append(
            action,
            format!("{} to step {} of {}", action.label(), position, self.history.len() - 1),
        );
        self.revision += 1;
        debug!(
            "event=history_move module=engine status=ok action={:?} position={}",
            action, position
        );
        self.notify(EngineChange::Graph(action));
    }

    fn notify(&mut self, change: EngineChange) {
        let state = self.store.state();
        for (_, listener) in self.listeners.iter_mut() {
            listener(change, state);
        }
    }

    fn node_text(&self, id: NodeId) -> String {
        self.store
            .node(id)
            .map(|node| node.text.clone())
            .unwrap_or_default()
    }
}

fn session_action(kind: EditKind) -> ActionKind {
    match kind {
        EditKind::Drag => ActionKind::MoveNode,
        EditKind::Text => ActionKind::EditNode,
    }
}

fn describe_node_update(prior: &Node, patch: &NodePatch) -> (ActionKind, String) {
    if patch.is_move_only() {
        return (
            ActionKind::MoveNode,
            format!("Moved node \"{}\"", prior.text),
        );
    }
    let mut fields = Vec::new();
    if patch.text.is_some() {
        fields.push("text");
    }
    if patch.x.is_some() || patch.y.is_some() {
        fields.push("position");
    }
    if patch.color.is_some() {
        fields.push("color");
    }
    if patch.size.is_some() {
        fields.push("size");
    }
    (
        ActionKind::EditNode,
        format!("Edited node \"{}\" ({})", prior.text, fields.join(", ")),
    )
}

#[cfg(test)]
mod tests {
    use super::{EditKind, EngineChange, GraphEngine};
    use crate::action_log::ActionKind;
    use crate::config::EngineConfig;
    use crate::model::node::{NodeColor, NodePatch};
    use std::sync::{Arc, Mutex};

    #[test]
    fn first_mutation_is_undoable_to_empty_graph() {
        let mut engine = GraphEngine::default();
        engine.add_node(10.0, 10.0).unwrap();
        assert!(engine.can_undo());
        assert!(engine.undo());
        assert!(engine.state().is_empty());
        assert!(!engine.can_undo());
    }

    #[test]
    fn failed_mutation_changes_nothing() {
        let mut engine = GraphEngine::default();
        let node = engine.add_node(0.0, 0.0).unwrap();
        let (revision, log_len, history_len) =
            (engine.revision(), engine.action_log().len(), engine.history().len());

        assert!(engine.add_connection(node.id, node.id, None, None).is_err());
        assert!(engine
            .update_node(uuid::Uuid::new_v4(), &NodePatch::text("x"))
            .is_err());
        assert!(!engine.delete_node(uuid::Uuid::new_v4()));

        assert_eq!(engine.revision(), revision);
        assert_eq!(engine.action_log().len(), log_len);
        assert_eq!(engine.history().len(), history_len);
    }

    #[test]
    fn text_edit_session_collapses_keystrokes() {
        let mut engine = GraphEngine::default();
        let node = engine.add_node(0.0, 0.0).unwrap();
        let history_len = engine.history().len();

        engine.begin_edit_session(EditKind::Text, node.id);
        for text in ["H", "He", "Hel", "Hello"] {
            engine.update_node(node.id, &NodePatch::text(text)).unwrap();
        }
        engine.end_edit_session();

        assert_eq!(engine.history().len(), history_len + 1);
        let latest = engine.action_log().latest().unwrap();
        assert_eq!(latest.action, ActionKind::EditNode);
        assert!(latest.details.contains("New idea"));

        engine.undo();
        assert_eq!(engine.node(node.id).unwrap().text, "New idea");
    }

    #[test]
    fn uncoalesced_config_records_every_keystroke() {
        let mut engine = GraphEngine::new(EngineConfig::uncoalesced());
        let node = engine.add_node(0.0, 0.0).unwrap();
        let history_len = engine.history().len();

        engine.begin_edit_session(EditKind::Text, node.id);
        for text in ["a", "ab", "abc"] {
            engine.update_node(node.id, &NodePatch::text(text)).unwrap();
        }
        engine.end_edit_session();

        assert_eq!(engine.history().len(), history_len + 3);
    }

    #[test]
    fn no_change_patch_is_not_recorded() {
        let mut engine = GraphEngine::default();
        let node = engine.add_node(0.0, 0.0).unwrap();
        let history_len = engine.history().len();
        engine
            .update_node(node.id, &NodePatch::color(NodeColor::default()))
            .unwrap();
        engine.update_node(node.id, &NodePatch::default()).unwrap();
        assert_eq!(engine.history().len(), history_len);
    }

    #[test]
    fn zoom_is_clamped_and_notifies() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let mut engine = GraphEngine::default();
        engine.subscribe(Box::new(move |change, _| {
            sink.lock().unwrap().push(change);
        }));

        assert_eq!(engine.zoom_by(0.7), 1.7);
        assert_eq!(engine.zoom_by(0.7), 2.0);
        assert_eq!(engine.zoom_by(-3.0), 0.5);
        assert_eq!(engine.set_zoom(f64::NAN), 0.5);

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 3);
        assert_eq!(seen[2], EngineChange::Zoom(0.5));
    }

    #[test]
    fn unsubscribe_stops_notifications() {
        let count = Arc::new(Mutex::new(0));
        let sink = Arc::clone(&count);
        let mut engine = GraphEngine::default();
        let id = engine.subscribe(Box::new(move |_, _| *sink.lock().unwrap() += 1));

        engine.add_node(0.0, 0.0).unwrap();
        assert!(engine.unsubscribe(id));
        engine.add_node(1.0, 1.0).unwrap();
        assert!(!engine.unsubscribe(id));
        assert_eq!(*count.lock().unwrap(), 1);
    }

    #[test]
    fn undo_and_redo_append_log_entries() {
        let mut engine = GraphEngine::default();
        engine.add_node(0.0, 0.0).unwrap();
        engine.undo();
        engine.redo();
        let actions: Vec<_> = engine
            .action_log()
            .entries()
            .map(|entry| entry.action)
            .collect();
        assert_eq!(
            actions,
            vec![ActionKind::Redo, ActionKind::Undo, ActionKind::AddNode]
        );
    }
}
