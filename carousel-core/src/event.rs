//! Input events for editor interaction.

use serde::{Deserialize, Serialize};

use crate::drag::ResizeHandle;
use crate::geometry::Point;

/// Phase of a pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointerPhase {
    /// Button pressed.
    Down,
    /// Pointer moved.
    Move,
    /// Button released.
    Up,
    /// Gesture cancelled (pointer capture lost, touch cancelled).
    Cancel,
    /// Double activation (double click or double tap).
    DoubleClick,
}

/// A pointer event inside one slide's surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerEvent {
    /// Phase of this event.
    pub phase: PointerPhase,
    /// Slide whose surface received the event.
    pub slide: usize,
    /// X position in surface coordinates.
    pub x: f64,
    /// Y position in surface coordinates.
    pub y: f64,
    /// Mouse button (0 = left, 1 = middle, 2 = right).
    #[serde(default)]
    pub button: u8,
    /// Timestamp in milliseconds.
    #[serde(default)]
    pub timestamp_ms: u64,
    /// Resize handle under the pointer, if the shell draws handles.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub handle: Option<ResizeHandle>,
}

impl PointerEvent {
    /// Create a primary-button event with no handle.
    #[must_use]
    pub fn new(phase: PointerPhase, slide: usize, x: f64, y: f64) -> Self {
        Self {
            phase,
            slide,
            x,
            y,
            button: 0,
            timestamp_ms: 0,
            handle: None,
        }
    }

    /// Attach a resize handle.
    #[must_use]
    pub fn with_handle(mut self, handle: ResizeHandle) -> Self {
        self.handle = Some(handle);
        self
    }

    /// Event position.
    #[must_use]
    pub fn point(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// Keyboard modifiers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[allow(clippy::struct_excessive_bools)]
pub struct KeyModifiers {
    /// Shift key pressed.
    pub shift: bool,
    /// Control key pressed.
    pub ctrl: bool,
    /// Alt/Option key pressed.
    pub alt: bool,
    /// Meta/Command key pressed.
    pub meta: bool,
}

impl KeyModifiers {
    /// Whether any modifier is held.
    #[must_use]
    pub fn any(&self) -> bool {
        self.shift || self.ctrl || self.alt || self.meta
    }
}

/// A key press.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyEvent {
    /// Key name (`"Enter"`, `"Escape"`, `"a"`).
    pub key: String,
    /// Active modifier keys.
    #[serde(default)]
    pub modifiers: KeyModifiers,
}

impl KeyEvent {
    /// Create a key press without modifiers.
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            modifiers: KeyModifiers::default(),
        }
    }
}

/// All input events the editor can receive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum InputEvent {
    /// Pointer event inside a slide.
    Pointer(PointerEvent),

    /// Keyboard event.
    Key(KeyEvent),

    /// Focus left the element being edited on a slide.
    Blur {
        /// Slide that lost focus.
        slide: usize,
    },

    /// Animation frame tick.
    Frame,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pointer_event_json() {
        let event = InputEvent::Pointer(
            PointerEvent::new(PointerPhase::Down, 2, 10.0, 20.0).with_handle(ResizeHandle::SE),
        );
        let json = serde_json::to_value(&event).expect("serialize");
        assert_eq!(json["type"], "Pointer");
        assert_eq!(json["data"]["phase"], "down");
        assert_eq!(json["data"]["handle"], "se");

        let parsed: InputEvent = serde_json::from_str(
            r#"{"type":"Pointer","data":{"phase":"move","slide":0,"x":1.5,"y":2.0}}"#,
        )
        .expect("deserialize");
        let InputEvent::Pointer(pointer) = parsed else {
            panic!("expected pointer event");
        };
        assert_eq!(pointer.point(), Point::new(1.5, 2.0));
        assert!(pointer.handle.is_none());
    }

    #[test]
    fn test_key_modifiers() {
        assert!(!KeyModifiers::default().any());
        let shift = KeyModifiers {
            shift: true,
            ..KeyModifiers::default()
        };
        assert!(shift.any());
    }
}
