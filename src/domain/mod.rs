//! Pure domain types with minimal dependencies
//!
//! This module contains the annotation model and scene-space geometry.
//! Types here must not depend on rendering or capture code.

pub mod annotation;
pub mod geometry;

pub use annotation::*;
pub use geometry::*;
