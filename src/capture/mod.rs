//! Screen capture module
//!
//! This module consolidates:
//! - Primary monitor capture (image.rs)
//! - The delay countdown before a capture (countdown.rs)

pub mod countdown;
pub mod image;
