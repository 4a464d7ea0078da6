//! Bitmap text layout for text annotations
//!
//! Glyphs come from the 8x8 `font8x8` basic set. Each lit bit becomes one
//! square of `font_size / 8` pixels, so a glyph is `font_size` tall and wide.

use font8x8::{BASIC_FONTS, UnicodeFonts};
use tiny_skia::PathBuilder;

use super::geometry::text;
use crate::domain::Point;

/// Glyph bitmap for a character, `?` when the basic set has none
fn glyph(ch: char) -> Option<[u8; 8]> {
    BASIC_FONTS.get(ch).or_else(|| BASIC_FONTS.get('?'))
}

/// Build a fill path covering every lit bit of `content`
///
/// Returns `None` when nothing would be drawn (empty or all-blank text).
pub fn build_text_path(anchor: Point, content: &str, font_size: f32) -> Option<tiny_skia::Path> {
    let cell = text::cell_size(font_size);
    let mut pb = PathBuilder::new();

    for (index, ch) in content.chars().enumerate() {
        let Some(rows) = glyph(ch) else {
            continue;
        };
        let origin_x = anchor.x + index as f32 * font_size;

        for (row_idx, &row_bits) in rows.iter().enumerate() {
            for col_idx in 0..8u32 {
                if (row_bits >> col_idx) & 1 == 0 {
                    continue;
                }
                let x = origin_x + col_idx as f32 * cell;
                let y = anchor.y + row_idx as f32 * cell;
                if let Some(rect) = tiny_skia::Rect::from_xywh(x, y, cell, cell) {
                    pb.push_rect(rect);
                }
            }
        }
    }

    pb.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_text_has_no_path() {
        assert!(build_text_path(Point::new(0.0, 0.0), "", 12.0).is_none());
        assert!(build_text_path(Point::new(0.0, 0.0), "   ", 12.0).is_none());
    }

    #[test]
    fn test_text_path_stays_in_line_box() {
        let anchor = Point::new(50.0, 50.0);
        let path = build_text_path(anchor, "Hi", 16.0).unwrap();
        let bounds = path.bounds();
        assert!(bounds.left() >= anchor.x);
        assert!(bounds.top() >= anchor.y);
        assert!(bounds.right() <= anchor.x + 2.0 * 16.0);
        assert!(bounds.bottom() <= anchor.y + 16.0);
    }

    #[test]
    fn test_unknown_character_falls_back() {
        assert!(build_text_path(Point::new(0.0, 0.0), "\u{2603}", 8.0).is_some());
    }
}
