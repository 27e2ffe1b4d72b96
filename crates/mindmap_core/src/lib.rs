//! Core graph editing engine for the mind-map editor.
//! This crate is the single source of truth for diagram invariants.

pub mod action_log;
pub mod config;
pub mod db;
pub mod engine;
pub mod history;
pub mod interaction;
pub mod logging;
pub mod model;
pub mod persistence;
pub mod store;

pub use action_log::{ActionEntry, ActionKind, ActionLog};
pub use config::{EngineConfig, NodeDefaults, DEFAULT_SLOT_KEY};
pub use engine::{ChangeListener, EditKind, EngineChange, GraphEngine, ListenerId};
pub use history::HistoryStack;
pub use interaction::controller::{InteractionController, InteractionState, Transition};
pub use interaction::input::{translate, Command, Modifiers, PointerButton, PointerPhase, RawInput};
pub use interaction::viewport::{
    clamp_zoom, CanvasPoint, ScreenPoint, Viewport, DEFAULT_ZOOM, MAX_ZOOM, MIN_ZOOM,
};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::connection::{Connection, ConnectionId, ConnectionPatch, ConnectionStyle};
pub use model::graph::{GraphState, GraphStateError};
pub use model::node::{InvalidColorError, Node, NodeColor, NodeId, NodePatch, NodeSize};
pub use persistence::graph_slot::GraphPersistence;
pub use persistence::slot_store::{SlotStore, SqliteSlotStore};
pub use persistence::{PersistenceError, PersistenceResult};
pub use store::graph_store::{GraphError, GraphResult, GraphStore};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
