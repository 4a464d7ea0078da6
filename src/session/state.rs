//! Scene composition and the editor driving it
//!
//! The [`Scene`] owns the base image and the committed annotations. The
//! [`Editor`] pairs it with a drawing session fed by host input events.

use std::path::Path;

use anyhow::Result;
use image::RgbaImage;

use crate::annotations::draw_session::DrawSession;
use crate::annotations::handlers::handle_input_event;
use crate::config::{ImageFormat, SnapmarkConfig};
use crate::domain::Annotation;
use crate::render::image::draw_annotations_in_order;
use crate::screenshot;
use crate::session::messages::InputEvent;

/// The captured image and the annotations committed on top of it
///
/// Annotations can only be appended; their order is paint order.
#[derive(Clone, Debug)]
pub struct Scene {
    base_image: RgbaImage,
    annotations: Vec<Annotation>,
}

impl Scene {
    pub fn new(base_image: RgbaImage) -> Self {
        Self {
            base_image,
            annotations: Vec::new(),
        }
    }

    pub fn base_image(&self) -> &RgbaImage {
        &self.base_image
    }

    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    pub fn add_annotation(&mut self, annotation: Annotation) {
        log::debug!(
            "Committing {:?} annotation #{} in {}",
            annotation.tool(),
            self.annotations.len(),
            annotation.color()
        );
        if let Annotation::Rectangle(rect) = &annotation {
            let bounds = rect.bounds();
            log::debug!("Rectangle spans {}x{}", bounds.width(), bounds.height());
        }
        self.annotations.push(annotation);
    }

    /// Render the base image with every committed annotation
    pub fn flatten(&self) -> RgbaImage {
        self.flatten_with_preview(None)
    }

    /// Render like [`Scene::flatten`], with `pending` as a temporary top layer
    pub fn flatten_with_preview(&self, pending: Option<&Annotation>) -> RgbaImage {
        let mut img = self.base_image.clone();
        draw_annotations_in_order(&mut img, self.annotations.iter().chain(pending));
        img
    }
}

/// One editing session: a scene plus the drawing state machine feeding it
#[derive(Clone, Debug)]
pub struct Editor {
    pub scene: Scene,
    pub session: DrawSession,
}

impl Editor {
    pub fn new(base_image: RgbaImage, config: &SnapmarkConfig) -> Self {
        Self {
            scene: Scene::new(base_image),
            session: DrawSession::from_config(config),
        }
    }

    /// Route one host input event to the drawing session
    pub fn dispatch(&mut self, event: InputEvent) {
        handle_input_event(&mut self.session, &mut self.scene, event);
    }

    /// Route a sequence of events in order
    pub fn replay(&mut self, events: impl IntoIterator<Item = InputEvent>) {
        for event in events {
            self.dispatch(event);
        }
    }

    /// What the host should display right now, including the item in progress
    pub fn preview_image(&self) -> RgbaImage {
        self.scene.flatten_with_preview(self.session.preview().as_ref())
    }

    /// Flatten the committed annotations and write them to `path`
    ///
    /// An item still being drawn is not part of the saved image. A failed
    /// save leaves the scene untouched.
    pub fn save(&self, path: &Path, format: ImageFormat) -> Result<()> {
        screenshot::save_rgba(&self.scene.flatten(), path, format)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ShapeColor, Tool};
    use crate::domain::{Point, RectOutlineAnnotation};
    use crate::session::messages::KeyEvent;
    use image::Rgba;

    const GREY: Rgba<u8> = Rgba([40, 40, 40, 255]);

    fn base() -> RgbaImage {
        RgbaImage::from_pixel(200, 120, GREY)
    }

    fn rect(color: ShapeColor) -> Annotation {
        Annotation::Rectangle(RectOutlineAnnotation {
            corner1: Point::new(10.0, 10.0),
            corner2: Point::new(110.0, 60.0),
            color,
            stroke_width: 6.0,
        })
    }

    #[test]
    fn test_flatten_is_idempotent() {
        let mut scene = Scene::new(base());
        scene.add_annotation(rect(ShapeColor::rgb(0, 255, 0)));
        assert_eq!(scene.flatten(), scene.flatten());
    }

    #[test]
    fn test_flatten_does_not_touch_base() {
        let mut scene = Scene::new(base());
        scene.add_annotation(rect(ShapeColor::rgb(0, 255, 0)));
        let _ = scene.flatten();
        assert_eq!(scene.base_image(), &base());
        assert_eq!(scene.annotations().len(), 1);
    }

    #[test]
    fn test_later_annotations_paint_on_top() {
        let mut scene = Scene::new(base());
        scene.add_annotation(rect(ShapeColor::rgb(255, 0, 0)));
        scene.add_annotation(rect(ShapeColor::rgb(0, 0, 255)));

        let img = scene.flatten();
        assert_eq!(*img.get_pixel(10, 30), Rgba([0, 0, 255, 255]));
        assert_eq!(*img.get_pixel(60, 10), Rgba([0, 0, 255, 255]));
    }

    #[test]
    fn test_preview_layer_is_temporary_and_on_top() {
        let mut scene = Scene::new(base());
        scene.add_annotation(rect(ShapeColor::rgb(255, 0, 0)));
        let pending = rect(ShapeColor::rgb(0, 255, 0));

        let preview = scene.flatten_with_preview(Some(&pending));
        assert_eq!(*preview.get_pixel(10, 30), Rgba([0, 255, 0, 255]));
        assert_eq!(scene.annotations().len(), 1);
        assert_eq!(*scene.flatten().get_pixel(10, 30), Rgba([255, 0, 0, 255]));
    }

    #[test]
    fn test_rectangle_scenario() {
        let mut editor = Editor::new(base(), &SnapmarkConfig::default());
        editor.replay([
            InputEvent::tool(Tool::Rectangle),
            InputEvent::StrokeWidth { width: 4.0 },
            InputEvent::down(10.0, 10.0),
            InputEvent::move_to(60.0, 40.0),
            InputEvent::up(110.0, 60.0),
        ]);

        let [Annotation::Rectangle(r)] = editor.scene.annotations() else {
            panic!("expected one rectangle");
        };
        assert_eq!((r.corner1, r.corner2), (Point::new(10.0, 10.0), Point::new(110.0, 60.0)));
        let bounds = r.bounds();
        assert_eq!((bounds.width(), bounds.height()), (100.0, 50.0));

        let img = editor.scene.flatten();
        let red = Rgba([255, 0, 0, 255]);
        assert_eq!(*img.get_pixel(60, 10), red);
        assert_eq!(*img.get_pixel(110, 35), red);
        assert_eq!(*img.get_pixel(60, 35), GREY);
        assert_eq!(*img.get_pixel(150, 100), GREY);
    }

    #[test]
    fn test_text_scenario() {
        let mut editor = Editor::new(base(), &SnapmarkConfig::default());
        editor.replay([
            InputEvent::tool(Tool::Text),
            InputEvent::down(50.0, 50.0),
            InputEvent::Type {
                text: "Hi".to_string(),
            },
        ]);
        // typed but not committed yet: visible in the preview only
        assert_ne!(editor.preview_image(), editor.scene.flatten());

        editor.dispatch(InputEvent::Key(KeyEvent::Enter));
        let [Annotation::Text(t)] = editor.scene.annotations() else {
            panic!("expected one text annotation");
        };
        assert_eq!(t.content, "Hi");
        assert_eq!(t.anchor, Point::new(50.0, 50.0));
        assert_eq!(editor.preview_image(), editor.scene.flatten());
    }

    #[test]
    fn test_save_excludes_pending_item() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.png");

        let mut editor = Editor::new(base(), &SnapmarkConfig::default());
        editor.replay([InputEvent::down(10.0, 10.0), InputEvent::move_to(100.0, 100.0)]);
        editor.save(&path, ImageFormat::Png).unwrap();

        let saved = image::open(&path).unwrap().to_rgba8();
        assert_eq!(saved, base());
    }
}
