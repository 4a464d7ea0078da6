//! Core application module
//!
//! This module contains the command-line entry point and its subcommands.

pub mod app;
