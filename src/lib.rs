//! # Headless CLI Session Engine
//!
//! Runs the `claude` and `codex` command-line assistants non-interactively as
//! supervised child processes. Each session is validated, checked for CLI
//! availability, launched with the tool's argv dialect, framed into lines, and
//! delivered either all at once or as an ordered event stream.
//!
//! ## Quick Start
//!
//! ```no_run
//! use kodegen_headless_cli::{HeadlessEngine, SessionParams, ToolKind};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let engine = HeadlessEngine::default();
//!     let snapshot = engine
//!         .create_session(SessionParams::new(ToolKind::Claude, "What is 2 + 2?"))
//!         .await?;
//!
//!     println!("session: {:?}", snapshot.session_id);
//!     for line in &snapshot.output {
//!         println!("{line}");
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Streaming
//!
//! ```no_run
//! # use kodegen_headless_cli::{HeadlessEngine, SessionMode, SessionParams, StreamEvent, ToolKind};
//! # async fn example() -> kodegen_headless_cli::Result<()> {
//! let engine = HeadlessEngine::default();
//! let mut subscription = engine
//!     .subscribe(
//!         SessionMode::Resume,
//!         SessionParams::new(ToolKind::Codex, "continue")
//!             .session_id("0199a213-81c0-7800-8aa1-bbab2a035a53"),
//!     )
//!     .await?;
//!
//! while let Some(event) = subscription.next_event().await {
//!     match event {
//!         StreamEvent::Output(line) => println!("{line}"),
//!         StreamEvent::Failed(error) => log::error!("{error}"),
//!         _ => {}
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - [`validation`]: Input checks that run before anything is spawned
//! - [`availability`]: One-time preflight per tool
//! - [`transport`]: Argv construction, process spawn, line reading, supervision
//! - [`message`]: Line framing and session identity extraction
//! - [`manager`]: [`HeadlessEngine`] and the session state machine
//! - [`delivery`]: Blocking and streaming adapters plus the wire mapping
//! - [`types`]: Shared type definitions and [`EngineOptions`]
//! - [`error`]: Error types and the caller-facing taxonomy
//!
//! ## Error Handling
//!
//! Requests rejected before spawn return [`Err(HeadlessError)`](HeadlessError).
//! Once a process has been started, every failure (spawn error, nonzero exit,
//! timeout) is reported as the session's terminal `Failed` event and any output
//! already produced is kept.
//!
//! ```no_run
//! # use kodegen_headless_cli::{HeadlessEngine, HeadlessError, SessionParams, ToolKind};
//! # async fn example(engine: HeadlessEngine) {
//! match engine.create_session(SessionParams::new(ToolKind::Codex, "hi")).await {
//!     Ok(snapshot) => log::info!("{:?}", snapshot.status),
//!     Err(HeadlessError::CliNotFound(msg)) => log::error!("{msg}"),
//!     Err(e) => log::error!("{e}"),
//! }
//! # }
//! ```
//!
//! ## Requirements
//!
//! - Claude Code: `npm install -g @anthropic-ai/claude-code`
//! - Codex: `npm install -g @openai/codex`

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod availability;
pub mod delivery;
pub mod error;
pub mod manager;
pub mod message;
pub mod transport;
pub mod types;
pub mod validation;

// Re-export commonly used types for external API
pub use availability::AvailabilityCache;
pub use delivery::{SessionHandle, SessionPayload, SessionResponse, Subscription, SubscriptionKey, WireMessage};
pub use error::{ErrorKind, ErrorPayload, HeadlessError, Result};
pub use manager::{HeadlessEngine, SessionSnapshot};
pub use transport::{CliCommand, CommandBuilder, CommandSpec};
pub use types::{
    CliProgram, EngineOptions, EngineOptionsBuilder, SessionId, SessionMode, SessionParams,
    SessionRequest, SessionStatus, StreamEvent, StreamKind, ToolKind,
};

/// Version of the engine
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
