//! Pointer/keyboard state machine driving the engine.
//!
//! # Responsibility
//! - Track selection and the Idle/Dragging/Connecting mode.
//! - Turn each `Command` into at most one engine operation.
//!
//! # Invariants
//! - Guards are pure checks; a rejected command is a no-op reported as
//!   `Transition::Ignored`, never a panic.
//! - Pointer-up always ends a drag, wherever it happens.
//! - Cancelling a connection clears connect mode within the same call.
//! - The controller keeps ids only; node data is always read from the engine.

use crate::engine::{EditKind, GraphEngine};
use crate::interaction::input::Command;
use crate::interaction::viewport::{CanvasPoint, ScreenPoint, Viewport};
use crate::model::connection::ConnectionId;
use crate::model::node::{NodeId, NodePatch};
use log::debug;

/// Controller mode.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InteractionState {
    Idle,
    Dragging {
        node_id: NodeId,
        /// Pointer position relative to the node center, in canvas units.
        grab_offset: CanvasPoint,
    },
    Connecting {
        from: NodeId,
    },
}

/// Observable outcome of one handled command.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Transition {
    NodeAdded(NodeId),
    NodeSelected(NodeId),
    DragStarted(NodeId),
    NodeMoved(NodeId),
    DragEnded(NodeId),
    ConnectStarted(NodeId),
    ConnectionAdded(ConnectionId),
    ConnectCancelled,
    NodeDeleted(NodeId),
    TextEdited(NodeId),
    TextCommitted,
    Zoomed(f64),
    Undone,
    Redone,
    Ignored,
}

/// Input state machine for one canvas.
#[derive(Debug, Clone)]
pub struct InteractionController {
    state: InteractionState,
    selected: Option<NodeId>,
    editing_text: Option<NodeId>,
    viewport: Viewport,
}

impl Default for InteractionController {
    fn default() -> Self {
        Self::new(Viewport::default())
    }
}

impl InteractionController {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            state: InteractionState::Idle,
            selected: None,
            editing_text: None,
            viewport,
        }
    }

    pub fn state(&self) -> InteractionState {
        self.state
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Moves the canvas within the window (layout/resize).
    pub fn set_canvas_origin(&mut self, origin: ScreenPoint) {
        self.viewport.origin = origin;
    }

    /// Selected node, if it still exists in the engine.
    pub fn selected(&self, engine: &GraphEngine) -> Option<NodeId> {
        self.selected.filter(|id| engine.node(*id).is_some())
    }

    pub fn is_editing_text(&self) -> bool {
        self.editing_text.is_some()
    }

    /// Handles one command against `engine`.
    pub fn handle(&mut self, engine: &mut GraphEngine, command: Command) -> Transition {
        let transition = match command {
            Command::PointerDown(point) => self.pointer_down(engine, point),
            Command::PointerMove(point) => self.pointer_move(engine, point),
            Command::PointerUp(point) => self.pointer_up(engine, point),
            Command::ZoomBy(delta) => Transition::Zoomed(engine.zoom_by(delta)),
            Command::ToggleConnect => self.toggle_connect(engine),
            Command::CancelConnect => self.cancel_connect(),
            Command::DeleteSelected => self.delete_selected(engine),
            Command::EditSelectedText(text) => self.edit_selected_text(engine, text),
            Command::CommitTextEdit => self.commit_text_edit(engine),
            Command::Undo => self.step_history(engine, true),
            Command::Redo => self.step_history(engine, false),
        };
        if transition != Transition::Ignored {
            debug!(
                "event=interaction module=interaction status=ok transition={:?} state={:?}",
                transition, self.state
            );
        }
        transition
    }

    fn pointer_down(&mut self, engine: &mut GraphEngine, point: ScreenPoint) -> Transition {
        self.finish_text_edit(engine);
        if let InteractionState::Dragging { node_id, .. } = self.state {
            // Missed pointer-up; close the stale gesture first.
            self.end_drag(engine, node_id);
        }

        let canvas = self.viewport.screen_to_canvas(point, engine.zoom());
        let hit = engine
            .state()
            .node_at(canvas.x, canvas.y)
            .map(|node| (node.id, CanvasPoint::new(node.x, node.y)));

        match (hit, self.state) {
            (Some((node_id, _)), InteractionState::Connecting { .. }) => {
                self.selected = Some(node_id);
                Transition::NodeSelected(node_id)
            }
            (Some((node_id, center)), _) => {
                self.selected = Some(node_id);
                self.state = InteractionState::Dragging {
                    node_id,
                    grab_offset: canvas.offset_from(center),
                };
                engine.begin_edit_session(EditKind::Drag, node_id);
                Transition::DragStarted(node_id)
            }
            (None, InteractionState::Connecting { .. }) => {
                self.state = InteractionState::Idle;
                Transition::ConnectCancelled
            }
            (None, _) => match engine.add_node(canvas.x, canvas.y) {
                Ok(node) => {
                    self.selected = Some(node.id);
                    Transition::NodeAdded(node.id)
                }
                Err(_) => Transition::Ignored,
            },
        }
    }

    fn pointer_move(&mut self, engine: &mut GraphEngine, point: ScreenPoint) -> Transition {
        let InteractionState::Dragging {
            node_id,
            grab_offset,
        } = self.state
        else {
            return Transition::Ignored;
        };

        let canvas = self.viewport.screen_to_canvas(point, engine.zoom());
        let target = canvas.offset_from(grab_offset);
        match engine.update_node(node_id, &NodePatch::position(target.x, target.y)) {
            Ok(()) => Transition::NodeMoved(node_id),
            Err(_) => {
                self.end_drag(engine, node_id);
                Transition::Ignored
            }
        }
    }

    fn pointer_up(&mut self, engine: &mut GraphEngine, point: ScreenPoint) -> Transition {
        match self.state {
            InteractionState::Dragging { node_id, .. } => {
                self.end_drag(engine, node_id);
                Transition::DragEnded(node_id)
            }
            InteractionState::Connecting { from } => {
                let canvas = self.viewport.screen_to_canvas(point, engine.zoom());
                let Some(target) = engine.state().node_at(canvas.x, canvas.y).map(|n| n.id)
                else {
                    return Transition::Ignored;
                };
                if target == from {
                    return Transition::Ignored;
                }
                self.state = InteractionState::Idle;
                match engine.add_connection(from, target, None, None) {
                    Ok(connection) => Transition::ConnectionAdded(connection.id),
                    Err(err) => {
                        debug!(
                            "event=connect module=interaction status=noop reason={}",
                            err
                        );
                        Transition::ConnectCancelled
                    }
                }
            }
            InteractionState::Idle => Transition::Ignored,
        }
    }

    fn toggle_connect(&mut self, engine: &mut GraphEngine) -> Transition {
        if let InteractionState::Connecting { .. } = self.state {
            self.state = InteractionState::Idle;
            return Transition::ConnectCancelled;
        }
        let Some(from) = self.selected(engine) else {
            return Transition::Ignored;
        };
        if let InteractionState::Dragging { node_id, .. } = self.state {
            self.end_drag(engine, node_id);
        }
        self.finish_text_edit(engine);
        self.state = InteractionState::Connecting { from };
        Transition::ConnectStarted(from)
    }

    fn cancel_connect(&mut self) -> Transition {
        match self.state {
            InteractionState::Connecting { .. } => {
                self.state = InteractionState::Idle;
                Transition::ConnectCancelled
            }
            _ => Transition::Ignored,
        }
    }

    fn delete_selected(&mut self, engine: &mut GraphEngine) -> Transition {
        let Some(node_id) = self.selected(engine) else {
            return Transition::Ignored;
        };
        self.editing_text = None;
        if !engine.delete_node(node_id) {
            return Transition::Ignored;
        }
        self.selected = None;
        self.state = InteractionState::Idle;
        Transition::NodeDeleted(node_id)
    }

    fn edit_selected_text(&mut self, engine: &mut GraphEngine, text: String) -> Transition {
        let Some(node_id) = self.selected(engine) else {
            return Transition::Ignored;
        };
        if let InteractionState::Dragging { node_id: dragged, .. } = self.state {
            // Later moves must not fold into the text edit.
            self.end_drag(engine, dragged);
        }
        if self.editing_text != Some(node_id) || !engine.in_edit_session() {
            engine.begin_edit_session(EditKind::Text, node_id);
            self.editing_text = Some(node_id);
        }
        match engine.update_node(node_id, &NodePatch::text(text)) {
            Ok(()) => Transition::TextEdited(node_id),
            Err(_) => Transition::Ignored,
        }
    }

    fn commit_text_edit(&mut self, engine: &mut GraphEngine) -> Transition {
        if self.editing_text.is_none() {
            return Transition::Ignored;
        }
        self.finish_text_edit(engine);
        Transition::TextCommitted
    }

    fn step_history(&mut self, engine: &mut GraphEngine, undo: bool) -> Transition {
        self.editing_text = None;
        self.state = InteractionState::Idle;
        let moved = if undo { engine.undo() } else { engine.redo() };
        if self.selected.is_some_and(|id| engine.node(id).is_none()) {
            self.selected = None;
        }
        match (moved, undo) {
            (false, _) => Transition::Ignored,
            (true, true) => Transition::Undone,
            (true, false) => Transition::Redone,
        }
    }

    fn end_drag(&mut self, engine: &mut GraphEngine, node_id: NodeId) {
        self.state = InteractionState::Idle;
        engine.end_edit_session();
        debug!("event=drag_end module=interaction status=ok node_id={node_id}");
    }

    fn finish_text_edit(&mut self, engine: &mut GraphEngine) {
        if self.editing_text.take().is_some() {
            engine.end_edit_session();
        }
    }
}
