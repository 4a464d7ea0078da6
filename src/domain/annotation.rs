//! Annotation types for drawing on screenshots
//!
//! All annotation types store coordinates in scene space.

use crate::config::{ShapeColor, Tool};

use super::geometry::{Bounds, Point};

/// Arrow annotation: a shaft from `from` to `to` with a head at `to`
#[derive(Clone, Debug, PartialEq)]
pub struct ArrowAnnotation {
    pub from: Point,
    pub to: Point,
    pub color: ShapeColor,
    pub stroke_width: f32,
}

/// Outline rectangle annotation (no fill)
///
/// The corners are stored as drawn; use [`RectOutlineAnnotation::bounds`]
/// for the normalized box.
#[derive(Clone, Debug, PartialEq)]
pub struct RectOutlineAnnotation {
    pub corner1: Point,
    pub corner2: Point,
    pub color: ShapeColor,
    pub stroke_width: f32,
}

impl RectOutlineAnnotation {
    pub fn bounds(&self) -> Bounds {
        Bounds::from_corners(self.corner1, self.corner2)
    }
}

/// Free text annotation, anchored at its top-left corner
#[derive(Clone, Debug, PartialEq)]
pub struct TextAnnotation {
    pub anchor: Point,
    pub content: String,
    pub color: ShapeColor,
    pub font_size: f32,
}

/// Unified annotation type, in paint order inside a scene
#[derive(Clone, Debug, PartialEq)]
pub enum Annotation {
    Arrow(ArrowAnnotation),
    Rectangle(RectOutlineAnnotation),
    Text(TextAnnotation),
}

impl Annotation {
    /// The tool that produces this kind of annotation
    pub fn tool(&self) -> Tool {
        match self {
            Annotation::Arrow(_) => Tool::Arrow,
            Annotation::Rectangle(_) => Tool::Rectangle,
            Annotation::Text(_) => Tool::Text,
        }
    }

    pub fn color(&self) -> ShapeColor {
        match self {
            Annotation::Arrow(a) => a.color,
            Annotation::Rectangle(r) => r.color,
            Annotation::Text(t) => t.color,
        }
    }
}
