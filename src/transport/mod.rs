//! Transport layer for driving external CLIs
//!
//! This module provides the subprocess implementation used for every session:
//! argv construction per tool dialect, process spawn and termination, line
//! reading, and supervision.

pub mod subprocess;

pub use subprocess::{CliCommand, CommandBuilder, CommandSpec};
