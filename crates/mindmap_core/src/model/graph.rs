//! `GraphState` value and structural validation.
//!
//! # Responsibility
//! - Hold the ordered node/connection sequences as one owned value.
//! - Validate documents coming from outside the engine (persistence).
//!
//! # Invariants
//! - A `GraphState` is plain data; cloning it yields an independent copy.
//! - Ordering of `nodes` is render order (later entries are drawn on top).

use crate::model::connection::{is_valid_weight, Connection, ConnectionId};
use crate::model::node::{Node, NodeId};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Structural problems found by [`GraphState::validate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphStateError {
    DuplicateNodeId(NodeId),
    DuplicateConnectionId(ConnectionId),
    DanglingEndpoint {
        connection_id: ConnectionId,
        node_id: NodeId,
    },
    SelfConnection(ConnectionId),
    NonFiniteCoordinate(NodeId),
    InvalidWeight(ConnectionId),
}

impl Display for GraphStateError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DuplicateNodeId(id) => write!(f, "duplicate node id: {id}"),
            Self::DuplicateConnectionId(id) => write!(f, "duplicate connection id: {id}"),
            Self::DanglingEndpoint {
                connection_id,
                node_id,
            } => write!(
                f,
                "connection {connection_id} references missing node {node_id}"
            ),
            Self::SelfConnection(id) => write!(f, "connection {id} joins a node to itself"),
            Self::NonFiniteCoordinate(id) => write!(f, "node {id} has a non-finite coordinate"),
            Self::InvalidWeight(id) => write!(f, "connection {id} has an invalid weight"),
        }
    }
}

impl Error for GraphStateError {}

/// The unit of live state, history and persistence.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphState {
    pub nodes: Vec<Node>,
    pub connections: Vec<Connection>,
}

impl GraphState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.connections.is_empty()
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.iter().find(|node| node.id == id)
    }

    pub fn connection(&self, id: ConnectionId) -> Option<&Connection> {
        self.connections
            .iter()
            .find(|connection| connection.id == id)
    }

    pub fn contains_node(&self, id: NodeId) -> bool {
        self.node(id).is_some()
    }

    /// Returns the top-most node whose disc contains the canvas point.
    pub fn node_at(&self, x: f64, y: f64) -> Option<&Node> {
        self.nodes.iter().rev().find(|node| node.contains(x, y))
    }

    /// Checks every structural invariant of a graph document.
    ///
    /// # Errors
    /// - Returns the first violation found, scanning nodes before connections.
    pub fn validate(&self) -> Result<(), GraphStateError> {
        let mut node_ids = HashSet::with_capacity(self.nodes.len());
        for node in &self.nodes {
            if !node_ids.insert(node.id) {
                return Err(GraphStateError::DuplicateNodeId(node.id));
            }
            if !node.x.is_finite() || !node.y.is_finite() {
                return Err(GraphStateError::NonFiniteCoordinate(node.id));
            }
        }

        let mut connection_ids = HashSet::with_capacity(self.connections.len());
        for connection in &self.connections {
            if !connection_ids.insert(connection.id) {
                return Err(GraphStateError::DuplicateConnectionId(connection.id));
            }
            if connection.from == connection.to {
                return Err(GraphStateError::SelfConnection(connection.id));
            }
            for endpoint in [connection.from, connection.to] {
                if !node_ids.contains(&endpoint) {
                    return Err(GraphStateError::DanglingEndpoint {
                        connection_id: connection.id,
                        node_id: endpoint,
                    });
                }
            }
            if !is_valid_weight(connection.weight) {
                return Err(GraphStateError::InvalidWeight(connection.id));
            }
        }

        Ok(())
    }
}
