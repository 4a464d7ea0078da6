//! Interactive drawing state machine
//!
//! A [`DrawSession`] turns pointer and key input into annotations. Arrows and
//! rectangles are drawn by dragging; text is placed with a click and typed.
//! Nothing here can fail: degenerate input produces degenerate annotations.

use crate::config::{ShapeColor, SnapmarkConfig, Tool};
use crate::domain::{Annotation, ArrowAnnotation, Point, RectOutlineAnnotation, TextAnnotation};
use crate::render::geometry::sanitize_size;
use crate::session::messages::KeyEvent;
use crate::session::state::Scene;

/// Where the session is in a gesture
#[derive(Clone, Debug, Default, PartialEq)]
pub enum DrawState {
    /// No item in progress
    #[default]
    Idle,
    /// Pointer held down with a drag tool
    Dragging { anchor: Point, pending: Annotation },
    /// Text placed and accepting keys
    Editing {
        anchor: Point,
        buffer: String,
        color: ShapeColor,
        font_size: f32,
    },
}

#[derive(Clone, Debug)]
pub struct DrawSession {
    tool: Tool,
    pen_color: ShapeColor,
    stroke_width: f32,
    font_size: f32,
    state: DrawState,
}

impl Default for DrawSession {
    fn default() -> Self {
        Self::from_config(&SnapmarkConfig::default())
    }
}

impl DrawSession {
    /// Session using the configured tool, color and sizes as defaults
    pub fn from_config(config: &SnapmarkConfig) -> Self {
        Self {
            tool: config.default_tool,
            pen_color: config.pen_color,
            stroke_width: sanitize_size(config.stroke_width),
            font_size: sanitize_size(config.font_size),
            state: DrawState::Idle,
        }
    }

    pub fn tool(&self) -> Tool {
        self.tool
    }

    pub fn pen_color(&self) -> ShapeColor {
        self.pen_color
    }

    pub fn stroke_width(&self) -> f32 {
        self.stroke_width
    }

    pub fn font_size(&self) -> f32 {
        self.font_size
    }

    pub fn state(&self) -> &DrawState {
        &self.state
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.state, DrawState::Idle)
    }

    /// Switch tools for the next gesture
    ///
    /// Only honoured while idle; returns `false` and leaves the session
    /// untouched while a drag or text entry is in progress.
    pub fn set_tool(&mut self, tool: Tool) -> bool {
        if !self.is_idle() {
            log::debug!("Ignoring tool change to {:?} during {:?}", tool, self.state);
            return false;
        }
        self.tool = tool;
        true
    }

    /// Pen color for the next new item; committed items keep theirs
    pub fn set_color(&mut self, color: ShapeColor) {
        self.pen_color = color;
    }

    pub fn set_stroke_width(&mut self, width: f32) {
        self.stroke_width = sanitize_size(width);
    }

    pub fn set_font_size(&mut self, size: f32) {
        self.font_size = sanitize_size(size);
    }

    pub fn pointer_down(&mut self, pos: Point) {
        self.state = if self.tool.is_drag_tool() {
            DrawState::Dragging {
                anchor: pos,
                pending: self.shape(pos, pos),
            }
        } else {
            // Any text still being typed is discarded, never committed
            DrawState::Editing {
                anchor: pos,
                buffer: String::new(),
                color: self.pen_color,
                font_size: self.font_size,
            }
        };
    }

    pub fn pointer_move(&mut self, pos: Point) {
        if let DrawState::Dragging { anchor, pending } = &mut self.state {
            *pending = rebuild(pending, *anchor, pos);
        }
    }

    /// Finish a drag, committing the shape to `scene` even if it is zero-sized
    pub fn pointer_up(&mut self, pos: Point, scene: &mut Scene) {
        if !matches!(self.state, DrawState::Dragging { .. }) {
            return;
        }
        if let DrawState::Dragging { anchor, pending } = std::mem::take(&mut self.state) {
            scene.add_annotation(rebuild(&pending, anchor, pos));
        }
    }

    pub fn key_event(&mut self, key: KeyEvent, scene: &mut Scene) {
        let DrawState::Editing { buffer, .. } = &mut self.state else {
            return;
        };
        match key {
            KeyEvent::Char(c) if !c.is_control() => buffer.push(c),
            KeyEvent::Char(_) => {}
            KeyEvent::Backspace => {
                buffer.pop();
            }
            KeyEvent::Enter => {
                if let Some(text) = self.preview() {
                    scene.add_annotation(text);
                }
                self.state = DrawState::Idle;
            }
            KeyEvent::Escape => self.cancel(),
        }
    }

    /// Drop whatever is in progress and return to idle
    pub fn cancel(&mut self) {
        self.state = DrawState::Idle;
    }

    /// The uncommitted item as it would be committed right now
    pub fn preview(&self) -> Option<Annotation> {
        match &self.state {
            DrawState::Idle => None,
            DrawState::Dragging { pending, .. } => Some(pending.clone()),
            DrawState::Editing {
                anchor,
                buffer,
                color,
                font_size,
            } => Some(Annotation::Text(TextAnnotation {
                anchor: *anchor,
                content: buffer.clone(),
                color: *color,
                font_size: *font_size,
            })),
        }
    }

    /// New drag shape for the active tool using the current defaults
    fn shape(&self, from: Point, to: Point) -> Annotation {
        match self.tool {
            Tool::Rectangle => Annotation::Rectangle(RectOutlineAnnotation {
                corner1: from,
                corner2: to,
                color: self.pen_color,
                stroke_width: self.stroke_width,
            }),
            // Only called for drag tools
            Tool::Arrow | Tool::Text => Annotation::Arrow(ArrowAnnotation {
                from,
                to,
                color: self.pen_color,
                stroke_width: self.stroke_width,
            }),
        }
    }
}

/// Replace a pending shape with one spanning `anchor` to `pos`
///
/// Color and width come from the pending item so mid-drag setting changes
/// only affect the next gesture.
fn rebuild(pending: &Annotation, anchor: Point, pos: Point) -> Annotation {
    match pending {
        Annotation::Arrow(a) => Annotation::Arrow(ArrowAnnotation {
            from: anchor,
            to: pos,
            color: a.color,
            stroke_width: a.stroke_width,
        }),
        Annotation::Rectangle(r) => Annotation::Rectangle(RectOutlineAnnotation {
            corner1: anchor,
            corner2: pos,
            color: r.color,
            stroke_width: r.stroke_width,
        }),
        Annotation::Text(t) => Annotation::Text(t.clone()),
    }
}
