//! Image rendering for annotations using tiny-skia
//!
//! These functions paint annotations onto an RgbaImage, both for the live
//! preview and for the flattened file output.

use image::RgbaImage;
use tiny_skia::{
    ColorU8, FillRule, LineCap, LineJoin, Paint, PathBuilder, Pixmap, Stroke, Transform,
};

use super::geometry::{arrow, sanitize_size};
use super::text::build_text_path;
use crate::config::ShapeColor;
use crate::domain::{Annotation, ArrowAnnotation, Bounds, RectOutlineAnnotation, TextAnnotation};

/// Convert RgbaImage to Pixmap, apply drawing function, and copy back
///
/// The image holds straight alpha while tiny-skia works premultiplied, so
/// pixels are converted in both directions.
fn with_pixmap(img: &mut RgbaImage, f: impl FnOnce(&mut Pixmap)) {
    let Some(mut pixmap) = Pixmap::new(img.width(), img.height()) else {
        return;
    };

    for (dst, src) in pixmap.pixels_mut().iter_mut().zip(img.as_raw().chunks_exact(4)) {
        *dst = ColorU8::from_rgba(src[0], src[1], src[2], src[3]).premultiply();
    }

    f(&mut pixmap);

    // Copy back
    for (dst, src) in img.chunks_exact_mut(4).zip(pixmap.pixels()) {
        let c = src.demultiply();
        dst.copy_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
    }
}

fn paint_for(color: ShapeColor) -> Paint<'static> {
    let [r, g, b, a] = color.to_rgba_u8();
    let mut paint = Paint::default();
    paint.set_color_rgba8(r, g, b, a);
    paint.anti_alias = true;
    paint
}

fn stroke_for(width: f32) -> Stroke {
    Stroke {
        width: sanitize_size(width),
        line_cap: LineCap::Round,
        line_join: LineJoin::Round,
        ..Default::default()
    }
}

/// Build an arrow path as stroked lines (shaft + two angled head lines)
fn build_arrow_path(arrow_ann: &ArrowAnnotation) -> Option<tiny_skia::Path> {
    let (from, to) = (arrow_ann.from, arrow_ann.to);
    let (wing1, wing2) = arrow::default_head_points(from, to);

    let mut pb = PathBuilder::new();

    // Shaft line from start to end
    pb.move_to(from.x, from.y);
    pb.line_to(to.x, to.y);

    // Head drawn as one polyline through the tip
    pb.move_to(wing1.x, wing1.y);
    pb.line_to(to.x, to.y);
    pb.line_to(wing2.x, wing2.y);

    pb.finish()
}

/// Build a closed rectangle outline from normalized bounds
fn build_rect_path(bounds: Bounds) -> Option<tiny_skia::Path> {
    let mut pb = PathBuilder::new();
    pb.move_to(bounds.min_x, bounds.min_y);
    pb.line_to(bounds.max_x, bounds.min_y);
    pb.line_to(bounds.max_x, bounds.max_y);
    pb.line_to(bounds.min_x, bounds.max_y);
    pb.close();
    pb.finish()
}

fn draw_arrow(pixmap: &mut Pixmap, arrow_ann: &ArrowAnnotation) {
    let Some(path) = build_arrow_path(arrow_ann) else {
        return;
    };
    pixmap.stroke_path(
        &path,
        &paint_for(arrow_ann.color),
        &stroke_for(arrow_ann.stroke_width),
        Transform::identity(),
        None,
    );
}

fn draw_rect_outline(pixmap: &mut Pixmap, rect: &RectOutlineAnnotation) {
    let Some(path) = build_rect_path(rect.bounds()) else {
        return;
    };
    pixmap.stroke_path(
        &path,
        &paint_for(rect.color),
        &stroke_for(rect.stroke_width),
        Transform::identity(),
        None,
    );
}

fn draw_text(pixmap: &mut Pixmap, text: &TextAnnotation) {
    let font_size = sanitize_size(text.font_size);
    let Some(path) = build_text_path(text.anchor, &text.content, font_size) else {
        return;
    };
    pixmap.fill_path(
        &path,
        &paint_for(text.color),
        FillRule::Winding,
        Transform::identity(),
        None,
    );
}

/// Draw a single annotation onto a pixmap
pub fn draw_annotation(pixmap: &mut Pixmap, annotation: &Annotation) {
    match annotation {
        Annotation::Arrow(arrow_ann) => draw_arrow(pixmap, arrow_ann),
        Annotation::Rectangle(rect) => draw_rect_outline(pixmap, rect),
        Annotation::Text(text) => draw_text(pixmap, text),
    }
}

/// Draw annotations in order, later entries on top
pub fn draw_annotations_in_order<'a>(
    img: &mut RgbaImage,
    annotations: impl IntoIterator<Item = &'a Annotation>,
) {
    with_pixmap(img, |pixmap| {
        for annotation in annotations {
            draw_annotation(pixmap, annotation);
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Point;
    use image::Rgba;

    const GREY: Rgba<u8> = Rgba([40, 40, 40, 255]);

    fn base() -> RgbaImage {
        RgbaImage::from_pixel(200, 120, GREY)
    }

    #[test]
    fn test_rect_outline_painted_on_edges_only() {
        let mut img = base();
        let rect = Annotation::Rectangle(RectOutlineAnnotation {
            corner1: Point::new(110.0, 60.0),
            corner2: Point::new(10.0, 10.0),
            color: ShapeColor::rgb(0, 0, 255),
            stroke_width: 4.0,
        });
        draw_annotations_in_order(&mut img, [&rect]);

        // Edges
        assert_eq!(*img.get_pixel(60, 10), Rgba([0, 0, 255, 255]));
        assert_eq!(*img.get_pixel(10, 35), Rgba([0, 0, 255, 255]));
        // Inside and outside untouched
        assert_eq!(*img.get_pixel(60, 35), GREY);
        assert_eq!(*img.get_pixel(150, 100), GREY);
    }

    #[test]
    fn test_arrow_shaft_painted() {
        let mut img = base();
        let arrow_ann = Annotation::Arrow(ArrowAnnotation {
            from: Point::new(20.0, 50.5),
            to: Point::new(180.0, 50.5),
            color: ShapeColor::rgb(255, 0, 0),
            stroke_width: 4.0,
        });
        draw_annotations_in_order(&mut img, [&arrow_ann]);

        assert_eq!(*img.get_pixel(100, 50), Rgba([255, 0, 0, 255]));
        assert_eq!(*img.get_pixel(100, 90), GREY);
        // Head wings reach back and away from the shaft near the tip
        assert_ne!(*img.get_pixel(166, 43), GREY);
        assert_ne!(*img.get_pixel(166, 58), GREY);
    }

    #[test]
    fn test_text_painted_near_anchor() {
        let mut img = base();
        let text = Annotation::Text(TextAnnotation {
            anchor: Point::new(50.0, 50.0),
            content: "Hi".to_string(),
            color: ShapeColor::rgb(255, 255, 0),
            font_size: 16.0,
        });
        draw_annotations_in_order(&mut img, [&text]);

        let changed: Vec<(u32, u32)> = img
            .enumerate_pixels()
            .filter(|(_, _, p)| **p != GREY)
            .map(|(x, y, _)| (x, y))
            .collect();
        assert!(!changed.is_empty());
        assert!(changed.iter().all(|&(x, y)| (50..82).contains(&x) && (50..66).contains(&y)));
    }

    #[test]
    fn test_degenerate_shapes_do_not_panic() {
        let mut img = base();
        let p = Point::new(30.0, 30.0);
        let shapes = [
            Annotation::Arrow(ArrowAnnotation {
                from: p,
                to: p,
                color: ShapeColor::default(),
                stroke_width: 2.0,
            }),
            Annotation::Rectangle(RectOutlineAnnotation {
                corner1: p,
                corner2: p,
                color: ShapeColor::default(),
                stroke_width: 0.0,
            }),
            Annotation::Text(TextAnnotation {
                anchor: Point::new(-500.0, -500.0),
                content: String::new(),
                color: ShapeColor::default(),
                font_size: f32::NAN,
            }),
        ];
        draw_annotations_in_order(&mut img, &shapes);
        assert_eq!(*img.get_pixel(150, 100), GREY);
    }

    #[test]
    fn test_translucent_base_round_trips() {
        let mut img = RgbaImage::from_pixel(4, 4, Rgba([200, 100, 50, 128]));
        draw_annotations_in_order(&mut img, std::iter::empty());
        let p = img.get_pixel(1, 1);
        assert_eq!(p[3], 128);
        assert!((p[0] as i32 - 200).abs() <= 1);
        assert!((p[1] as i32 - 100).abs() <= 1);
        assert!((p[2] as i32 - 50).abs() <= 1);
    }
}
