//! Subprocess transport for headless CLI sessions
//!
//! This module spawns the external CLI as a child process, frames its output
//! and supervises it until exactly one terminal event has been produced.

pub mod command;
pub mod config;
mod lifecycle;
mod reader;
pub(crate) mod supervisor;

// Re-export public types
pub use command::{CliCommand, CommandBuilder, CommandSpec};
