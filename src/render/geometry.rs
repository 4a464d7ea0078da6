//! Shared geometry calculations for annotations
//!
//! This module contains constants and math shared between
//! the live preview and the flattened output.

/// Arrow geometry constants
pub mod arrow {
    use crate::domain::Point;

    /// Default arrowhead wing length in scene pixels
    pub const WING_LENGTH: f32 = 20.0;
    /// Arrowhead wing angle from the reversed shaft in radians (30 degrees)
    pub const WING_ANGLE: f32 = std::f32::consts::FRAC_PI_6;

    /// Calculate the two arrowhead wing tips for a shaft from `from` to `to`
    ///
    /// Each wing is the reversed shaft direction rotated by ±`wing_angle`,
    /// projected `wing_length` back from `to`. A zero-length shaft has no
    /// direction, so both wings collapse onto `to`.
    pub fn head_points(from: Point, to: Point, wing_length: f32, wing_angle: f32) -> (Point, Point) {
        if from.distance(to) == 0.0 {
            return (to, to);
        }

        let angle = (to.y - from.y).atan2(to.x - from.x);
        let wing = |theta: f32| {
            Point::new(
                to.x - theta.cos() * wing_length,
                to.y - theta.sin() * wing_length,
            )
        };

        (wing(angle + wing_angle), wing(angle - wing_angle))
    }

    /// [`head_points`] with the default wing length and angle
    pub fn default_head_points(from: Point, to: Point) -> (Point, Point) {
        head_points(from, to, WING_LENGTH, WING_ANGLE)
    }
}

/// Text layout constants
pub mod text {
    /// Glyph cells in the bitmap font are 8x8 bits
    pub const GLYPH_CELLS: f32 = 8.0;

    /// Size of one font bit for a given glyph height
    #[inline]
    pub fn cell_size(font_size: f32) -> f32 {
        font_size / GLYPH_CELLS
    }
}

/// Minimum stroke width or font size accepted from callers
pub const MIN_SIZE: f32 = 1.0;

/// Clamp a user supplied size so rendering always has something to draw with
#[inline]
pub fn sanitize_size(size: f32) -> f32 {
    if size.is_finite() { size.max(MIN_SIZE) } else { MIN_SIZE }
}
