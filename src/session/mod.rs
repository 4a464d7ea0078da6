//! Editing session module
//!
//! This module contains:
//! - Input event types forwarded by the host
//! - The scene and the editor that owns it

pub mod messages;
pub mod state;
