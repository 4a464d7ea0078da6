//! Annotation drawing and input handling
//!
//! This module provides:
//! - The drawing state machine (arrow, rectangle, text)
//! - Handlers routing host input events into it

pub mod draw_session;
pub mod handlers;
