//! Engine configuration.
//!
//! # Responsibility
//! - Collect the editing policies the UI shell may tune in one place.
//! - Provide defaults matching the stock editor behavior.

use crate::model::node::{NodeColor, NodeSize};

/// Slot key used when the shell does not choose one.
pub const DEFAULT_SLOT_KEY: &str = "mindmap.diagram";

/// Appearance applied to nodes created from a canvas click.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeDefaults {
    pub text: String,
    pub color: NodeColor,
    pub size: NodeSize,
}

impl Default for NodeDefaults {
    fn default() -> Self {
        Self {
            text: "New idea".to_string(),
            color: NodeColor::default(),
            size: NodeSize::default(),
        }
    }
}

/// Editing policy knobs for one `GraphEngine`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    pub node_defaults: NodeDefaults,
    /// Reject a second connection joining the same ordered node pair.
    pub dedupe_connections: bool,
    /// Collapse one drag gesture or one text edit into a single history entry.
    pub coalesce_edits: bool,
    /// Maximum retained snapshots. `None` keeps everything.
    pub history_limit: Option<usize>,
    /// Key-value slot holding the saved diagram.
    pub slot_key: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            node_defaults: NodeDefaults::default(),
            dedupe_connections: true,
            coalesce_edits: true,
            history_limit: None,
            slot_key: DEFAULT_SLOT_KEY.to_string(),
        }
    }
}

impl EngineConfig {
    /// Literal editor behavior: duplicate connections allowed and one
    /// history entry per mutation.
    pub fn uncoalesced() -> Self {
        Self {
            dedupe_connections: false,
            coalesce_edits: false,
            ..Self::default()
        }
    }
}
