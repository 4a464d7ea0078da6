//! Message types for an editing session
//!
//! The host forwards pointer, keyboard and toolbar input verbatim as
//! [`InputEvent`]s, with pointer positions already in scene space. Events
//! are serializable so a session can be scripted or replayed from JSON.

use serde::{Deserialize, Serialize};

use crate::config::{ShapeColor, Tool};
use crate::domain::Point;

// ============================================================================
// Keyboard
// ============================================================================

/// Key input relevant to text entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "key", content = "char", rename_all = "lowercase")]
pub enum KeyEvent {
    /// A typed character
    Char(char),
    /// Remove the last character
    Backspace,
    /// Enter / Return: commit the text
    Enter,
    /// Abandon the text being typed
    Escape,
}

impl KeyEvent {
    /// Split typed text into character events
    pub fn typed(text: &str) -> impl Iterator<Item = KeyEvent> + '_ {
        text.chars().map(KeyEvent::Char)
    }
}

// ============================================================================
// Editor input
// ============================================================================

/// All input an editor accepts from its host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InputEvent {
    /// Select the active tool
    Tool { tool: Tool },
    /// Pick the pen color for new items
    Color { color: ShapeColor },
    /// Set the stroke width for new arrows and rectangles
    StrokeWidth { width: f32 },
    /// Set the glyph height for new text
    FontSize { size: f32 },
    /// Pointer pressed
    Down { x: f32, y: f32 },
    /// Pointer moved
    Move { x: f32, y: f32 },
    /// Pointer released
    Up { x: f32, y: f32 },
    /// Key pressed
    Key(KeyEvent),
    /// Type a whole string, one character event per char
    Type { text: String },
    /// Drop the item being drawn
    Cancel,
}

#[cfg(test)]
impl InputEvent {
    pub fn down(x: f32, y: f32) -> Self {
        InputEvent::Down { x, y }
    }

    pub fn move_to(x: f32, y: f32) -> Self {
        InputEvent::Move { x, y }
    }

    pub fn up(x: f32, y: f32) -> Self {
        InputEvent::Up { x, y }
    }

    pub fn tool(tool: Tool) -> Self {
        InputEvent::Tool { tool }
    }
}

impl InputEvent {
    /// Pointer position carried by this event, if any
    pub fn position(&self) -> Option<Point> {
        match *self {
            InputEvent::Down { x, y } | InputEvent::Move { x, y } | InputEvent::Up { x, y } => {
                Some(Point::new(x, y))
            }
            _ => None,
        }
    }
}

/// Parse a JSON array of input events
pub fn parse_script(json: &str) -> serde_json::Result<Vec<InputEvent>> {
    serde_json::from_str(json)
}
