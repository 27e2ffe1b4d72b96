//! FFI use-case API for the Flutter diagram screen.
//!
//! # Responsibility
//! - Expose the diagram engine's operations as sync FRB calls.
//! - Hold the one editor session behind the bridge.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - Ids cross the boundary as UUID strings; enums as snake_case strings.
//! - Rejected edits are reported in envelopes, never thrown.
//!
//! # See also
//! - docs/architecture/logging.md

use log::warn;
use mindmap_core::db::open_db;
use mindmap_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    ActionEntry, Command, Connection, ConnectionStyle, EngineConfig, GraphEngine,
    GraphPersistence, InteractionController, InteractionState, Node, NodeColor, NodeId, NodePatch,
    NodeSize, ScreenPoint, SqliteSlotStore, Transition,
};
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard, OnceLock};
use uuid::Uuid;

const DIAGRAM_DB_FILE_NAME: &str = "mindmap_diagram.sqlite3";
const LOG_DEFAULT_LIMIT: u32 = 50;
const LOG_LIMIT_MAX: u32 = 200;
static DIAGRAM_DB_PATH: OnceLock<PathBuf> = OnceLock::new();
static SESSION: OnceLock<Mutex<DiagramSession>> = OnceLock::new();

struct DiagramSession {
    engine: GraphEngine,
    controller: InteractionController,
}

impl DiagramSession {
    fn new() -> Self {
        Self {
            engine: GraphEngine::new(EngineConfig::default()),
            controller: InteractionController::default(),
        }
    }
}

/// Minimal health-check API for FRB smoke integration.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir` (idempotent).
/// - Never panics; returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// Node as rendered by the diagram screen.
#[derive(Debug, Clone, PartialEq)]
pub struct DiagramNodeItem {
    pub id: String,
    pub text: String,
    pub x: f64,
    pub y: f64,
    pub color: String,
    /// `small|medium|large`.
    pub size: String,
}

/// Connection as rendered by the diagram screen.
#[derive(Debug, Clone, PartialEq)]
pub struct DiagramConnectionItem {
    pub id: String,
    pub from_id: String,
    pub to_id: String,
    pub label: Option<String>,
    /// `solid|dashed|dotted`.
    pub style: String,
    pub weight: f64,
}

/// Full render model for one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct DiagramSnapshot {
    pub nodes: Vec<DiagramNodeItem>,
    pub connections: Vec<DiagramConnectionItem>,
    pub zoom: f64,
    pub can_undo: bool,
    pub can_redo: bool,
    /// Bumped on every change; lets the UI skip redundant rebuilds.
    pub revision: u64,
    /// `idle|dragging|connecting`.
    pub mode: String,
    pub selected_node_id: Option<String>,
}

/// Audit row for the activity panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagramLogItem {
    pub id: String,
    pub timestamp_ms: i64,
    pub action: String,
    pub details: String,
}

/// Generic action response envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagramActionResponse {
    /// Whether the request changed anything.
    pub ok: bool,
    /// Created or affected entity id, when there is one.
    pub entity_id: Option<String>,
    /// Human-readable response message for diagnostics/UI.
    pub message: String,
}

impl DiagramActionResponse {
    fn success(message: impl Into<String>, entity_id: Option<String>) -> Self {
        Self {
            ok: true,
            entity_id,
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            entity_id: None,
            message: message.into(),
        }
    }
}

/// Returns the current render model.
#[flutter_rust_bridge::frb(sync)]
pub fn diagram_snapshot() -> DiagramSnapshot {
    let session = lock_session();
    let engine = &session.engine;
    DiagramSnapshot {
        nodes: engine.state().nodes.iter().map(to_node_item).collect(),
        connections: engine
            .state()
            .connections
            .iter()
            .map(to_connection_item)
            .collect(),
        zoom: engine.zoom(),
        can_undo: engine.can_undo(),
        can_redo: engine.can_redo(),
        revision: engine.revision(),
        mode: mode_label(session.controller.state()).to_string(),
        selected_node_id: session
            .controller
            .selected(engine)
            .map(|id| id.to_string()),
    }
}

/// Clears the session back to an empty diagram.
#[flutter_rust_bridge::frb(sync)]
pub fn diagram_reset() {
    *lock_session() = DiagramSession::new();
}

/// Forwards one pointer event (`phase`: `down|move|up`) in screen pixels.
#[flutter_rust_bridge::frb(sync)]
pub fn diagram_pointer(phase: String, x: f64, y: f64) -> DiagramActionResponse {
    let point = ScreenPoint::new(x, y);
    let command = match phase.trim().to_ascii_lowercase().as_str() {
        "down" => Command::PointerDown(point),
        "move" => Command::PointerMove(point),
        "up" => Command::PointerUp(point),
        other => {
            return DiagramActionResponse::failure(format!("unknown pointer phase `{other}`"))
        }
    };
    dispatch(command)
}

/// Sets where the canvas sits inside the window, in screen pixels.
#[flutter_rust_bridge::frb(sync)]
pub fn diagram_set_canvas_origin(x: f64, y: f64) {
    lock_session()
        .controller
        .set_canvas_origin(ScreenPoint::new(x, y));
}

#[flutter_rust_bridge::frb(sync)]
pub fn diagram_zoom_by(delta: f64) -> f64 {
    lock_session().engine.zoom_by(delta)
}

#[flutter_rust_bridge::frb(sync)]
pub fn diagram_set_zoom(zoom: f64) -> f64 {
    lock_session().engine.set_zoom(zoom)
}

#[flutter_rust_bridge::frb(sync)]
pub fn diagram_toggle_connect() -> DiagramActionResponse {
    dispatch(Command::ToggleConnect)
}

#[flutter_rust_bridge::frb(sync)]
pub fn diagram_cancel_connect() -> DiagramActionResponse {
    dispatch(Command::CancelConnect)
}

#[flutter_rust_bridge::frb(sync)]
pub fn diagram_delete_selected() -> DiagramActionResponse {
    dispatch(Command::DeleteSelected)
}

/// One keystroke of a text edit on the selected node.
#[flutter_rust_bridge::frb(sync)]
pub fn diagram_edit_text(text: String) -> DiagramActionResponse {
    dispatch(Command::EditSelectedText(text))
}

#[flutter_rust_bridge::frb(sync)]
pub fn diagram_commit_text() -> DiagramActionResponse {
    dispatch(Command::CommitTextEdit)
}

#[flutter_rust_bridge::frb(sync)]
pub fn diagram_undo() -> DiagramActionResponse {
    dispatch(Command::Undo)
}

#[flutter_rust_bridge::frb(sync)]
pub fn diagram_redo() -> DiagramActionResponse {
    dispatch(Command::Redo)
}

/// Adds a default node at canvas coordinates.
#[flutter_rust_bridge::frb(sync)]
pub fn diagram_add_node(x: f64, y: f64) -> DiagramActionResponse {
    match lock_session().engine.add_node(x, y) {
        Ok(node) => DiagramActionResponse::success("Node added.", Some(node.id.to_string())),
        Err(err) => DiagramActionResponse::failure(format!("diagram_add_node failed: {err}")),
    }
}

/// Edits node fields; `None` arguments are left unchanged.
#[flutter_rust_bridge::frb(sync)]
pub fn diagram_update_node(
    node_id: String,
    text: Option<String>,
    x: Option<f64>,
    y: Option<f64>,
    color: Option<String>,
    size: Option<String>,
) -> DiagramActionResponse {
    let id = match parse_id(node_id.as_str()) {
        Ok(id) => id,
        Err(message) => return DiagramActionResponse::failure(message),
    };
    let color = match color.as_deref().map(NodeColor::parse).transpose() {
        Ok(color) => color,
        Err(err) => return DiagramActionResponse::failure(err.to_string()),
    };
    let size = match size.as_deref().map(parse_size).transpose() {
        Ok(size) => size,
        Err(message) => return DiagramActionResponse::failure(message),
    };
    let patch = NodePatch {
        text,
        x,
        y,
        color,
        size,
    };

    match lock_session().engine.update_node(id, &patch) {
        Ok(()) => DiagramActionResponse::success("Node updated.", Some(id.to_string())),
        Err(err) => DiagramActionResponse::failure(format!("diagram_update_node failed: {err}")),
    }
}

#[flutter_rust_bridge::frb(sync)]
pub fn diagram_delete_node(node_id: String) -> DiagramActionResponse {
    let id = match parse_id(node_id.as_str()) {
        Ok(id) => id,
        Err(message) => return DiagramActionResponse::failure(message),
    };
    if lock_session().engine.delete_node(id) {
        DiagramActionResponse::success("Node deleted.", Some(id.to_string()))
    } else {
        DiagramActionResponse::failure(format!("node not found: {id}"))
    }
}

#[flutter_rust_bridge::frb(sync)]
pub fn diagram_add_connection(
    from_id: String,
    to_id: String,
    style: Option<String>,
    weight: Option<f64>,
) -> DiagramActionResponse {
    let (from, to) = match (parse_id(from_id.as_str()), parse_id(to_id.as_str())) {
        (Ok(from), Ok(to)) => (from, to),
        (Err(message), _) | (_, Err(message)) => return DiagramActionResponse::failure(message),
    };
    let style = match style.as_deref().map(parse_style).transpose() {
        Ok(style) => style,
        Err(message) => return DiagramActionResponse::failure(message),
    };

    match lock_session().engine.add_connection(from, to, style, weight) {
        Ok(connection) => {
            DiagramActionResponse::success("Connection added.", Some(connection.id.to_string()))
        }
        Err(err) => {
            DiagramActionResponse::failure(format!("diagram_add_connection failed: {err}"))
        }
    }
}

#[flutter_rust_bridge::frb(sync)]
pub fn diagram_delete_connection(connection_id: String) -> DiagramActionResponse {
    let id = match parse_id(connection_id.as_str()) {
        Ok(id) => id,
        Err(message) => return DiagramActionResponse::failure(message),
    };
    if lock_session().engine.delete_connection(id) {
        DiagramActionResponse::success("Connection deleted.", Some(id.to_string()))
    } else {
        DiagramActionResponse::failure(format!("connection not found: {id}"))
    }
}

#[flutter_rust_bridge::frb(sync)]
pub fn diagram_connected_nodes(node_id: String) -> Vec<DiagramNodeItem> {
    let Ok(id) = parse_id(node_id.as_str()) else {
        return Vec::new();
    };
    lock_session()
        .engine
        .connected_nodes(id)
        .iter()
        .map(to_node_item)
        .collect()
}

/// Newest-first audit rows, capped at `limit` (default 50, max 200).
#[flutter_rust_bridge::frb(sync)]
pub fn diagram_action_log(limit: Option<u32>) -> Vec<DiagramLogItem> {
    let limit = normalize_log_limit(limit) as usize;
    lock_session()
        .engine
        .action_log()
        .entries()
        .take(limit)
        .map(to_log_item)
        .collect()
}

/// Saves the diagram into the local slot.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Failure is reported with `ok=false` so the UI can offer retry.
#[flutter_rust_bridge::frb(sync)]
pub fn diagram_save() -> DiagramActionResponse {
    let conn = match open_db(resolve_diagram_db_path()) {
        Ok(conn) => conn,
        Err(err) => return DiagramActionResponse::failure(format!("diagram_save failed: {err}")),
    };
    let store = match SqliteSlotStore::try_new(&conn) {
        Ok(store) => store,
        Err(err) => return DiagramActionResponse::failure(format!("diagram_save failed: {err}")),
    };
    let mut session = lock_session();
    let persistence = GraphPersistence::new(store, session.engine.config().slot_key.clone());
    match session.engine.save_to(&persistence) {
        Ok(()) => DiagramActionResponse::success("Diagram saved.", None),
        Err(err) => DiagramActionResponse::failure(format!("diagram_save failed: {err}")),
    }
}

/// Loads the saved diagram, replacing the current one and its history.
///
/// `ok=false` means there was nothing valid to load; the current diagram is kept.
#[flutter_rust_bridge::frb(sync)]
pub fn diagram_load() -> DiagramActionResponse {
    let conn = match open_db(resolve_diagram_db_path()) {
        Ok(conn) => conn,
        Err(err) => return DiagramActionResponse::failure(format!("diagram_load failed: {err}")),
    };
    let store = match SqliteSlotStore::try_new(&conn) {
        Ok(store) => store,
        Err(err) => return DiagramActionResponse::failure(format!("diagram_load failed: {err}")),
    };
    let mut session = lock_session();
    let persistence = GraphPersistence::new(store, session.engine.config().slot_key.clone());
    let session = &mut *session;
    if session.engine.load_from(&persistence) {
        session.controller = InteractionController::new(session.controller.viewport());
        DiagramActionResponse::success("Diagram loaded.", None)
    } else {
        DiagramActionResponse::failure("Nothing to load.")
    }
}

fn dispatch(command: Command) -> DiagramActionResponse {
    let mut session = lock_session();
    let session = &mut *session;
    let transition = session.controller.handle(&mut session.engine, command);
    transition_response(transition)
}

fn transition_response(transition: Transition) -> DiagramActionResponse {
    let with_id = |message: &str, id: Uuid| {
        DiagramActionResponse::success(message, Some(id.to_string()))
    };
    match transition {
        Transition::NodeAdded(id) => with_id("Node added.", id),
        Transition::NodeSelected(id) => with_id("Node selected.", id),
        Transition::DragStarted(id) => with_id("Drag started.", id),
        Transition::NodeMoved(id) => with_id("Node moved.", id),
        Transition::DragEnded(id) => with_id("Drag ended.", id),
        Transition::ConnectStarted(id) => with_id("Pick a target node.", id),
        Transition::ConnectionAdded(id) => with_id("Connection added.", id),
        Transition::ConnectCancelled => DiagramActionResponse::success("Connect cancelled.", None),
        Transition::NodeDeleted(id) => with_id("Node deleted.", id),
        Transition::TextEdited(id) => with_id("Text updated.", id),
        Transition::TextCommitted => DiagramActionResponse::success("Text saved.", None),
        Transition::Zoomed(zoom) => {
            DiagramActionResponse::success(format!("Zoom {:.0}%", zoom * 100.0), None)
        }
        Transition::Undone => DiagramActionResponse::success("Undone.", None),
        Transition::Redone => DiagramActionResponse::success("Redone.", None),
        Transition::Ignored => DiagramActionResponse::failure("Nothing to do."),
    }
}

fn lock_session() -> MutexGuard<'static, DiagramSession> {
    let session = SESSION.get_or_init(|| Mutex::new(DiagramSession::new()));
    session.lock().unwrap_or_else(|poisoned| {
        warn!("event=session_lock module=ffi status=error error_code=poisoned");
        poisoned.into_inner()
    })
}

fn resolve_diagram_db_path() -> PathBuf {
    DIAGRAM_DB_PATH
        .get_or_init(|| {
            if let Ok(raw) = std::env::var("MINDMAP_DB_PATH") {
                let trimmed = raw.trim();
                if !trimmed.is_empty() {
                    return PathBuf::from(trimmed);
                }
            }
            std::env::temp_dir().join(DIAGRAM_DB_FILE_NAME)
        })
        .clone()
}

fn normalize_log_limit(limit: Option<u32>) -> u32 {
    match limit {
        Some(0) | None => LOG_DEFAULT_LIMIT,
        Some(value) => value.min(LOG_LIMIT_MAX),
    }
}

fn parse_id(raw: &str) -> Result<NodeId, String> {
    Uuid::parse_str(raw.trim()).map_err(|_| format!("invalid id `{raw}`"))
}

fn parse_size(raw: &str) -> Result<NodeSize, String> {
    match raw.trim() {
        "small" => Ok(NodeSize::Small),
        "medium" => Ok(NodeSize::Medium),
        "large" => Ok(NodeSize::Large),
        other => Err(format!("invalid node size `{other}`")),
    }
}

fn parse_style(raw: &str) -> Result<ConnectionStyle, String> {
    match raw.trim() {
        "solid" => Ok(ConnectionStyle::Solid),
        "dashed" => Ok(ConnectionStyle::Dashed),
        "dotted" => Ok(ConnectionStyle::Dotted),
        other => Err(format!("invalid connection style `{other}`")),
    }
}

fn mode_label(state: InteractionState) -> &'static str {
    match state {
        InteractionState::Idle => "idle",
        InteractionState::Dragging { .. } => "dragging",
        InteractionState::Connecting { .. } => "connecting",
    }
}

fn to_node_item(node: &Node) -> DiagramNodeItem {
    DiagramNodeItem {
        id: node.id.to_string(),
        text: node.text.clone(),
        x: node.x,
        y: node.y,
        color: node.color.to_string(),
        size: node.size.as_str().to_string(),
    }
}

fn to_connection_item(connection: &Connection) -> DiagramConnectionItem {
    DiagramConnectionItem {
        id: connection.id.to_string(),
        from_id: connection.from.to_string(),
        to_id: connection.to.to_string(),
        label: connection.label.clone(),
        style: connection.style.as_str().to_string(),
        weight: connection.weight,
    }
}

fn to_log_item(entry: &ActionEntry) -> DiagramLogItem {
    DiagramLogItem {
        id: entry.id.to_string(),
        timestamp_ms: entry.timestamp_ms,
        action: entry.action.label().to_string(),
        details: entry.details.clone(),
    }
}
