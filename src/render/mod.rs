//! Annotation rendering module
//!
//! This module contains:
//! - Geometry calculations shared between preview and saved output
//! - Bitmap text layout
//! - Image rendering using tiny-skia

pub mod geometry;
pub mod image;
pub mod text;
