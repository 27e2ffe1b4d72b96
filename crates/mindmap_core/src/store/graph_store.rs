//! Canonical owner of the live graph.
//!
//! # Responsibility
//! - Hold the current `GraphState` and apply validated mutations to it.
//! - Answer adjacency queries over the current state.
//!
//! # Invariants
//! - A failed mutation leaves the state untouched.
//! - Deleting a node removes every connection touching it in the same call.
//! - Ids are minted fresh for every created entity and never recycled.

use crate::config::NodeDefaults;
use crate::model::connection::{
    is_valid_weight, Connection, ConnectionId, ConnectionPatch, ConnectionStyle, DEFAULT_WEIGHT,
};
use crate::model::graph::GraphState;
use crate::model::node::{Node, NodeId, NodePatch};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type GraphResult<T> = Result<T, GraphError>;

/// Rejected mutation request. Always local; the state is unchanged.
#[derive(Debug, Clone, PartialEq)]
pub enum GraphError {
    NodeNotFound(NodeId),
    ConnectionNotFound(ConnectionId),
    /// Self-connection or an endpoint that does not exist.
    InvalidConnection { from: NodeId, to: NodeId },
    /// An identical `from -> to` connection already exists.
    DuplicateConnection(ConnectionId),
    InvalidCoordinate { x: f64, y: f64 },
    InvalidWeight(f64),
}

impl Display for GraphError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NodeNotFound(id) => write!(f, "node not found: {id}"),
            Self::ConnectionNotFound(id) => write!(f, "connection not found: {id}"),
            Self::InvalidConnection { from, to } if from == to => {
                write!(f, "cannot connect node {from} to itself")
            }
            Self::InvalidConnection { from, to } => {
                write!(f, "cannot connect {from} -> {to}: endpoint missing")
            }
            Self::DuplicateConnection(id) => {
                write!(f, "identical connection already exists: {id}")
            }
            Self::InvalidCoordinate { x, y } => write!(f, "invalid node position ({x}, {y})"),
            Self::InvalidWeight(weight) => write!(f, "invalid connection weight {weight}"),
        }
    }
}

impl Error for GraphError {}

/// Mutable owner of the current graph.
#[derive(Debug, Clone, Default)]
pub struct GraphStore {
    state: GraphState,
    defaults: NodeDefaults,
    dedupe_connections: bool,
}

impl GraphStore {
    pub fn new(defaults: NodeDefaults, dedupe_connections: bool) -> Self {
        Self {
            state: GraphState::new(),
            defaults,
            dedupe_connections,
        }
    }

    pub fn state(&self) -> &GraphState {
        &self.state
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.state.node(id)
    }

    pub fn connection(&self, id: ConnectionId) -> Option<&Connection> {
        self.state.connection(id)
    }

    /// Swaps in a whole state (undo/redo/load). Caller guarantees validity.
    pub fn replace(&mut self, state: GraphState) {
        self.state = state;
    }

    /// Appends a node with default appearance at `(x, y)`.
    pub fn add_node(&mut self, x: f64, y: f64) -> GraphResult<Node> {
        ensure_finite(x, y)?;
        let mut node = Node::new(self.defaults.text.clone(), x, y);
        node.color = self.defaults.color.clone();
        node.size = self.defaults.size;
        self.state.nodes.push(node.clone());
        Ok(node)
    }

    /// Merges `patch` into the node and returns the node as it was before.
    pub fn update_node(&mut self, id: NodeId, patch: &NodePatch) -> GraphResult<Node> {
        let node = self
            .state
            .nodes
            .iter_mut()
            .find(|node| node.id == id)
            .ok_or(GraphError::NodeNotFound(id))?;
        ensure_finite(patch.x.unwrap_or(node.x), patch.y.unwrap_or(node.y))?;

        let prior = node.clone();
        node.apply(patch);
        Ok(prior)
    }

    /// Removes the node and all connections touching it.
    ///
    /// Returns `None` when `id` is absent.
    pub fn delete_node(&mut self, id: NodeId) -> Option<(Node, Vec<Connection>)> {
        let index = self.state.nodes.iter().position(|node| node.id == id)?;
        let node = self.state.nodes.remove(index);

        let (removed, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut self.state.connections)
            .into_iter()
            .partition(|connection| connection.touches(id));
        self.state.connections = kept;

        Some((node, removed))
    }

    /// Connects two distinct existing nodes.
    pub fn add_connection(
        &mut self,
        from: NodeId,
        to: NodeId,
        style: Option<ConnectionStyle>,
        weight: Option<f64>,
    ) -> GraphResult<Connection> {
        if from == to || !self.state.contains_node(from) || !self.state.contains_node(to) {
            return Err(GraphError::InvalidConnection { from, to });
        }
        let weight = weight.unwrap_or(DEFAULT_WEIGHT);
        if !is_valid_weight(weight) {
            return Err(GraphError::InvalidWeight(weight));
        }
        if self.dedupe_connections {
            if let Some(existing) = self
                .state
                .connections
                .iter()
                .find(|connection| connection.same_endpoints(from, to))
            {
                return Err(GraphError::DuplicateConnection(existing.id));
            }
        }

        let connection = Connection::new(from, to, style.unwrap_or_default(), weight);
        self.state.connections.push(connection.clone());
        Ok(connection)
    }

    /// Merges `patch` into the connection and returns it as it was before.
    pub fn update_connection(
        &mut self,
        id: ConnectionId,
        patch: &ConnectionPatch,
    ) -> GraphResult<Connection> {
        if let Some(weight) = patch.weight {
            if !is_valid_weight(weight) {
                return Err(GraphError::InvalidWeight(weight));
            }
        }
        let connection = self
            .state
            .connections
            .iter_mut()
            .find(|connection| connection.id == id)
            .ok_or(GraphError::ConnectionNotFound(id))?;

        let prior = connection.clone();
        if let Some(label) = &patch.label {
            connection.label = label.clone();
        }
        if let Some(style) = patch.style {
            connection.style = style;
        }
        if let Some(weight) = patch.weight {
            connection.weight = weight;
        }
        Ok(prior)
    }

    /// Removes one connection. Returns `None` when `id` is absent.
    pub fn delete_connection(&mut self, id: ConnectionId) -> Option<Connection> {
        let index = self
            .state
            .connections
            .iter()
            .position(|connection| connection.id == id)?;
        Some(self.state.connections.remove(index))
    }

    /// Nodes exactly one connection away from `node_id`, in either direction.
    ///
    /// Each neighbor appears once, in node order.
    pub fn connected_nodes(&self, node_id: NodeId) -> Vec<Node> {
        let neighbors: HashSet<NodeId> = self
            .state
            .connections
            .iter()
            .filter_map(|connection| connection.other_end(node_id))
            .collect();
        self.state
            .nodes
            .iter()
            .filter(|node| neighbors.contains(&node.id))
            .cloned()
            .collect()
    }
}

fn ensure_finite(x: f64, y: f64) -> GraphResult<()> {
    if x.is_finite() && y.is_finite() {
        Ok(())
    } else {
        Err(GraphError::InvalidCoordinate { x, y })
    }
}
