//! Input model: pointer buttons, wheel deltas, and the gesture state machine.
//!
//! `InputState` is the active gesture tracked between pointer-down and
//! pointer-up. Exactly one gesture runs at a time; the engine owns the
//! in-progress path itself so the state only carries what the next transition
//! needs.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use frames::{Point, Tool};

/// The active canvas tool. `Select` pans the view on drag; any other choice
/// draws paths with the wrapped wire tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActiveTool {
    Select,
    Draw(Tool),
}

impl Default for ActiveTool {
    fn default() -> Self {
        Self::Draw(Tool::Pencil)
    }
}

/// Mouse button identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    /// Left mouse button (or single-finger touch).
    Primary,
    /// Middle mouse button; always pans regardless of tool.
    Middle,
    /// Right mouse button.
    Secondary,
}

/// Keyboard modifier keys held during an event.
#[derive(Debug, Clone, Copy, Default)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    /// Whether the zoom chord (ctrl or cmd) is held.
    #[must_use]
    pub fn zoom_chord(self) -> bool {
        self.ctrl || self.meta
    }
}

/// Wheel / trackpad scroll delta in pixels (positive `dy` = scroll down).
#[derive(Debug, Clone, Copy)]
pub struct WheelDelta {
    pub dx: f64,
    pub dy: f64,
}

/// The active gesture.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum InputState {
    /// No gesture; waiting for the next pointer-down.
    #[default]
    Idle,
    /// Dragging the view. Carries the previous screen-space position so each
    /// move applies an incremental pan delta.
    Panning { last_screen: Point },
    /// Drawing the engine's in-progress path. Carries the world-space anchor
    /// where the gesture started (shape tools rubber-band from it).
    Drawing { start_world: Point },
}
