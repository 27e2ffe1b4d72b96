//! Graph domain model for the mind-map editor.
//!
//! # Responsibility
//! - Define canonical node/connection records and the `GraphState` value.
//! - Keep structural validation next to the data it guards.
//!
//! # Invariants
//! - Every node and connection is identified by a stable, never reused id.
//! - Every connection endpoint resolves to a node in the same `GraphState`.
//!
//! # See also
//! - docs/architecture/graph-model.md

pub mod connection;
pub mod graph;
pub mod node;
