//! Session management
//!
//! # Module Structure
//!
//! - `engine` - [`HeadlessEngine`], the entry point for starting sessions
//! - `session` - Session state machine and the final snapshot

mod engine;
pub mod session;

pub use engine::HeadlessEngine;
pub use session::{COMPLETED_MESSAGE, SessionSnapshot, SessionState};
