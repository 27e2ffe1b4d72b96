//! Graph document adapter over a `SlotStore`.
//!
//! # Responsibility
//! - Serialize the current `GraphState` into one fixed slot.
//! - Read it back, rejecting structurally invalid documents.

use crate::model::graph::GraphState;
use crate::persistence::slot_store::SlotStore;
use crate::persistence::{PersistenceError, PersistenceResult};
use log::{info, warn};

/// Saves and loads one diagram under a fixed slot key.
pub struct GraphPersistence<S: SlotStore> {
    store: S,
    slot_key: String,
}

impl<S: SlotStore> GraphPersistence<S> {
    pub fn new(store: S, slot_key: impl Into<String>) -> Self {
        Self {
            store,
            slot_key: slot_key.into(),
        }
    }

    pub fn slot_key(&self) -> &str {
        self.slot_key.as_str()
    }

    /// Overwrites the slot with `state`.
    ///
    /// # Errors
    /// - Encoding or storage failures; the slot keeps its previous value.
    pub fn save(&self, state: &GraphState) -> PersistenceResult<()> {
        let document = encode_document(state)?;
        self.store.write_slot(self.slot_key.as_str(), document.as_str())?;
        info!(
            "event=diagram_save module=persistence status=ok nodes={} connections={} bytes={}",
            state.nodes.len(),
            state.connections.len(),
            document.len()
        );
        Ok(())
    }

    /// Reads the slot. Absent, unreadable or invalid content yields `None`.
    pub fn load(&self) -> Option<GraphState> {
        let raw = match self.store.read_slot(self.slot_key.as_str()) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                info!("event=diagram_load module=persistence status=noop reason=empty_slot");
                return None;
            }
            Err(err) => {
                warn!(
                    "event=diagram_load module=persistence status=error error_code=slot_read_failed error={}",
                    err
                );
                return None;
            }
        };

        match decode_document(raw.as_str()) {
            Ok(state) => {
                info!(
                    "event=diagram_load module=persistence status=ok nodes={} connections={}",
                    state.nodes.len(),
                    state.connections.len()
                );
                Some(state)
            }
            Err(err) => {
                warn!(
                    "event=diagram_load module=persistence status=error error_code=invalid_document error={}",
                    err
                );
                None
            }
        }
    }

    /// Removes the saved diagram. Returns whether one existed.
    pub fn clear(&self) -> PersistenceResult<bool> {
        self.store.clear_slot(self.slot_key.as_str())
    }
}

/// Encodes `state` as the versionless `{nodes, connections}` JSON document.
pub fn encode_document(state: &GraphState) -> PersistenceResult<String> {
    serde_json::to_string(state).map_err(PersistenceError::from)
}

/// Decodes and structurally validates a document.
///
/// # Errors
/// - `InvalidDocument` for malformed JSON, unknown enum values, or graph
///   invariant violations (dangling endpoints, duplicate ids, ...).
pub fn decode_document(raw: &str) -> PersistenceResult<GraphState> {
    let state: GraphState = serde_json::from_str(raw)
        .map_err(|err| PersistenceError::InvalidDocument(err.to_string()))?;
    state
        .validate()
        .map_err(|err| PersistenceError::InvalidDocument(err.to_string()))?;
    Ok(state)
}
