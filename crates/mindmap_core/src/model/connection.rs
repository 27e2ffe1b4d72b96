//! Connection domain model.
//!
//! # Invariants
//! - `from != to` for every stored connection.
//! - `weight` is finite and strictly positive.

use crate::model::node::NodeId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for a diagram connection.
pub type ConnectionId = Uuid;

/// Default stroke weight for new connections.
pub const DEFAULT_WEIGHT: f64 = 1.0;

/// Stroke style of a connection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionStyle {
    #[default]
    Solid,
    Dashed,
    Dotted,
}

impl ConnectionStyle {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Solid => "solid",
            Self::Dashed => "dashed",
            Self::Dotted => "dotted",
        }
    }
}

/// Directed, styled edge between two nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connection {
    pub id: ConnectionId,
    pub from: NodeId,
    pub to: NodeId,
    /// Optional caption drawn along the edge.
    #[serde(default)]
    pub label: Option<String>,
    pub style: ConnectionStyle,
    pub weight: f64,
}

impl Connection {
    /// Creates a connection with a fresh id.
    ///
    /// Endpoint existence is checked by the store, not here.
    pub fn new(from: NodeId, to: NodeId, style: ConnectionStyle, weight: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            from,
            to,
            label: None,
            style,
            weight,
        }
    }

    /// Returns whether either endpoint is `node_id`.
    pub fn touches(&self, node_id: NodeId) -> bool {
        self.from == node_id || self.to == node_id
    }

    /// Returns the endpoint opposite to `node_id`, if this connection touches it.
    pub fn other_end(&self, node_id: NodeId) -> Option<NodeId> {
        if self.from == node_id {
            Some(self.to)
        } else if self.to == node_id {
            Some(self.from)
        } else {
            None
        }
    }

    /// Returns whether both connections join the same ordered endpoint pair.
    pub fn same_endpoints(&self, from: NodeId, to: NodeId) -> bool {
        self.from == from && self.to == to
    }
}

/// Partial connection update. `label: Some(None)` clears the caption.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConnectionPatch {
    pub label: Option<Option<String>>,
    pub style: Option<ConnectionStyle>,
    pub weight: Option<f64>,
}

impl ConnectionPatch {
    pub fn label(label: Option<String>) -> Self {
        Self {
            label: Some(label),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.label.is_none() && self.style.is_none() && self.weight.is_none()
    }
}

/// Returns whether `weight` is usable as a stroke weight.
pub fn is_valid_weight(weight: f64) -> bool {
    weight.is_finite() && weight > 0.0
}
