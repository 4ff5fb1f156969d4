//! Type definitions for the headless session engine
//!
//! This module contains the type definitions shared across the engine,
//! organized into logical submodules:
//!
//! - [`identifiers`] - Type-safe session identity wrapper (`SessionId`)
//! - [`tool`] - The closed set of supported CLIs and their per-tool profiles
//! - [`request`] - Raw session parameters and the validated `SessionRequest`
//! - [`events`] - Stream events, stream kinds and session status
//! - [`options`] - Engine configuration with a builder

pub mod events;
pub mod identifiers;
pub mod options;
pub mod request;
pub mod tool;

// Re-export commonly used types
pub use events::{SessionStatus, StreamEvent, StreamKind};
pub use identifiers::SessionId;
pub use options::{CliProgram, EngineOptions, EngineOptionsBuilder};
pub use request::{SessionMode, SessionParams, SessionRequest};
pub use tool::{ToolKind, ToolProfile};
