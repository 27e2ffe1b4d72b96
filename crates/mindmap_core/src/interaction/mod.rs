//! Input handling for the diagram canvas.
//!
//! # Responsibility
//! - Translate toolkit events into a closed `Command` set.
//! - Map commands to engine operations through a small state machine.
//! - Own the screen/canvas coordinate math and zoom bounds.
//!
//! # Invariants
//! - Dragged nodes stay under the pointer at every zoom level.
//! - Zoom never leaves `[MIN_ZOOM, MAX_ZOOM]`.

pub mod controller;
pub mod input;
pub mod viewport;
