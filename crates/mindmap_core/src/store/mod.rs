//! Live graph ownership and validated mutation.
//!
//! # Responsibility
//! - Keep one canonical `GraphState` per editor.
//! - Reject invalid requests before touching state.
//!
//! # Invariants
//! - No dangling connection endpoints exist after any store call.

pub mod graph_store;
