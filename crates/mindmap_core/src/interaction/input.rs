//! Toolkit-neutral input translation.
//!
//! Shells forward raw pointer, wheel and key events here and feed the
//! resulting [`Command`] into the controller.

use crate::interaction::viewport::ScreenPoint;

/// Zoom change per button/key press.
pub const ZOOM_STEP: f64 = 0.1;
/// Zoom change per wheel pixel.
const WHEEL_ZOOM_PER_PIXEL: f64 = 0.001;

/// Closed set of editor commands consumed by the controller.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    PointerDown(ScreenPoint),
    PointerMove(ScreenPoint),
    PointerUp(ScreenPoint),
    ZoomBy(f64),
    /// Enter connect mode from the selection, or leave it.
    ToggleConnect,
    CancelConnect,
    DeleteSelected,
    /// Replaces the selected node's text (one keystroke of an edit).
    EditSelectedText(String),
    CommitTextEdit,
    Undo,
    Redo,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Secondary,
    Middle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerPhase {
    Down,
    Move,
    Up,
}

/// Keyboard modifiers held during a key event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub ctrl: bool,
    pub shift: bool,
}

/// Raw event as delivered by a windowing toolkit.
#[derive(Debug, Clone, PartialEq)]
pub enum RawInput {
    Pointer {
        phase: PointerPhase,
        position: ScreenPoint,
        button: Option<PointerButton>,
    },
    /// Positive `delta_y` scrolls down, which zooms out.
    Wheel { delta_y: f64 },
    Key { key: String, modifiers: Modifiers },
}

/// Maps one raw event to a command. `text_editing` suppresses single-key
/// shortcuts so typing does not trigger them.
pub fn translate(input: &RawInput, text_editing: bool) -> Option<Command> {
    match input {
        RawInput::Pointer {
            phase,
            position,
            button,
        } => {
            if matches!(button, Some(PointerButton::Secondary | PointerButton::Middle)) {
                return None;
            }
            Some(match phase {
                PointerPhase::Down => Command::PointerDown(*position),
                PointerPhase::Move => Command::PointerMove(*position),
                PointerPhase::Up => Command::PointerUp(*position),
            })
        }
        RawInput::Wheel { delta_y } if delta_y.is_finite() && *delta_y != 0.0 => {
            Some(Command::ZoomBy(-*delta_y * WHEEL_ZOOM_PER_PIXEL))
        }
        RawInput::Wheel { .. } => None,
        RawInput::Key { key, modifiers } => translate_key(key.as_str(), *modifiers, text_editing),
    }
}

fn translate_key(key: &str, modifiers: Modifiers, text_editing: bool) -> Option<Command> {
    if modifiers.ctrl {
        return match key.to_ascii_lowercase().as_str() {
            "z" if modifiers.shift => Some(Command::Redo),
            "z" => Some(Command::Undo),
            "y" => Some(Command::Redo),
            _ => None,
        };
    }

    match key {
        "Escape" => Some(Command::CancelConnect),
        "Enter" if text_editing => Some(Command::CommitTextEdit),
        _ if text_editing => None,
        "Delete" | "Backspace" => Some(Command::DeleteSelected),
        "c" | "C" => Some(Command::ToggleConnect),
        "+" | "=" => Some(Command::ZoomBy(ZOOM_STEP)),
        "-" => Some(Command::ZoomBy(-ZOOM_STEP)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::{translate, Command, Modifiers, PointerButton, PointerPhase, RawInput};
    use crate::interaction::viewport::ScreenPoint;

    fn key(key: &str, ctrl: bool, shift: bool) -> RawInput {
        RawInput::Key {
            key: key.to_string(),
            modifiers: Modifiers { ctrl, shift },
        }
    }

    #[test]
    fn primary_pointer_events_map_to_commands() {
        let position = ScreenPoint::new(5.0, 6.0);
        let input = RawInput::Pointer {
            phase: PointerPhase::Down,
            position,
            button: Some(PointerButton::Primary),
        };
        assert_eq!(translate(&input, false), Some(Command::PointerDown(position)));

        let secondary = RawInput::Pointer {
            phase: PointerPhase::Down,
            position,
            button: Some(PointerButton::Secondary),
        };
        assert_eq!(translate(&secondary, false), None);
    }

    #[test]
    fn undo_redo_shortcuts() {
        assert_eq!(translate(&key("z", true, false), false), Some(Command::Undo));
        assert_eq!(translate(&key("Z", true, true), false), Some(Command::Redo));
        assert_eq!(translate(&key("y", true, false), true), Some(Command::Redo));
    }

    #[test]
    fn single_key_shortcuts_are_suppressed_while_typing() {
        assert_eq!(
            translate(&key("Backspace", false, false), false),
            Some(Command::DeleteSelected)
        );
        assert_eq!(translate(&key("Backspace", false, false), true), None);
        assert_eq!(translate(&key("c", false, false), true), None);
        assert_eq!(
            translate(&key("Enter", false, false), true),
            Some(Command::CommitTextEdit)
        );
        assert_eq!(
            translate(&key("Escape", false, false), true),
            Some(Command::CancelConnect)
        );
    }

    #[test]
    fn wheel_down_zooms_out() {
        match translate(&RawInput::Wheel { delta_y: 100.0 }, false) {
            Some(Command::ZoomBy(delta)) => assert!(delta < 0.0),
            other => panic!("unexpected command: {other:?}"),
        }
        assert_eq!(translate(&RawInput::Wheel { delta_y: 0.0 }, false), None);
    }
}
