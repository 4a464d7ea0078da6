//! Input event handlers
//!
//! Routes host [`InputEvent`]s onto a [`DrawSession`] and its [`Scene`].

use crate::session::messages::{InputEvent, KeyEvent};
use crate::session::state::Scene;

use super::draw_session::DrawSession;

/// Apply one input event
pub fn handle_input_event(session: &mut DrawSession, scene: &mut Scene, event: InputEvent) {
    log::trace!("Input event: {:?}", event);
    match event {
        InputEvent::Tool { tool } => {
            if !session.set_tool(tool) {
                log::info!("Finish or cancel the current item before switching to {:?}", tool);
            }
        }
        InputEvent::Color { color } => session.set_color(color),
        InputEvent::StrokeWidth { width } => session.set_stroke_width(width),
        InputEvent::FontSize { size } => session.set_font_size(size),
        InputEvent::Down { .. } | InputEvent::Move { .. } | InputEvent::Up { .. } => {
            handle_pointer(session, scene, event)
        }
        InputEvent::Key(key) => session.key_event(key, scene),
        InputEvent::Type { text } => {
            for key in KeyEvent::typed(&text) {
                session.key_event(key, scene);
            }
        }
        InputEvent::Cancel => session.cancel(),
    }
}

fn handle_pointer(session: &mut DrawSession, scene: &mut Scene, event: InputEvent) {
    let Some(pos) = event.position() else {
        return;
    };
    match event {
        InputEvent::Down { .. } => session.pointer_down(pos),
        InputEvent::Move { .. } => session.pointer_move(pos),
        InputEvent::Up { .. } => session.pointer_up(pos, scene),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ShapeColor, Tool};
    use crate::domain::Annotation;
    use image::RgbaImage;

    #[test]
    fn test_refused_tool_change_keeps_gesture() {
        let mut session = DrawSession::default();
        let mut scene = Scene::new(RgbaImage::new(10, 10));

        for event in [
            InputEvent::tool(Tool::Rectangle),
            InputEvent::down(1.0, 1.0),
            InputEvent::tool(Tool::Text),
            InputEvent::up(5.0, 5.0),
        ] {
            handle_input_event(&mut session, &mut scene, event);
        }

        assert_eq!(session.tool(), Tool::Rectangle);
        assert!(matches!(scene.annotations(), [Annotation::Rectangle(_)]));
    }

    #[test]
    fn test_settings_events() {
        let mut session = DrawSession::default();
        let mut scene = Scene::new(RgbaImage::new(10, 10));
        let green = ShapeColor::rgb(0, 255, 0);

        handle_input_event(&mut session, &mut scene, InputEvent::Color { color: green });
        handle_input_event(&mut session, &mut scene, InputEvent::StrokeWidth { width: 7.0 });
        handle_input_event(&mut session, &mut scene, InputEvent::FontSize { size: 20.0 });

        assert_eq!(session.pen_color(), green);
        assert_eq!(session.stroke_width(), 7.0);
        assert_eq!(session.font_size(), 20.0);
    }

    #[test]
    fn test_cancel_event_drops_drag() {
        let mut session = DrawSession::default();
        let mut scene = Scene::new(RgbaImage::new(10, 10));

        for event in [
            InputEvent::down(1.0, 1.0),
            InputEvent::Cancel,
            InputEvent::up(5.0, 5.0),
        ] {
            handle_input_event(&mut session, &mut scene, event);
        }

        assert!(session.is_idle());
        assert!(scene.annotations().is_empty());
    }
}
