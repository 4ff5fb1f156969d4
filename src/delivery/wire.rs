//! Front-end message shapes
//!
//! Payloads arrive as JSON objects `{sessionId?, prompt, workingDir?, cli?, model?}`.
//! Streamed events leave as [`WireMessage`]s named `<tool>:session:<kind>`,
//! where `<tool>` is the channel the request arrived on even when the payload's
//! `cli` selects the other tool. Blocking calls answer with a [`SessionResponse`].

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::error::{HeadlessError, Result};
use crate::manager::session::SessionSnapshot;
use crate::types::events::{SessionStatus, StreamEvent};
use crate::types::identifiers::SessionId;
use crate::types::request::{SessionMode, SessionParams};
use crate::types::tool::ToolKind;
use crate::validation;

// ============================================================================
// Subscription key
// ============================================================================

/// Identifies a streaming channel: one tool, one operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubscriptionKey {
    /// Tool the channel belongs to
    pub tool: ToolKind,
    /// Create or resume
    pub operation: SessionMode,
}

impl SubscriptionKey {
    /// Key for `tool` and `operation`
    #[must_use]
    pub const fn new(tool: ToolKind, operation: SessionMode) -> Self {
        Self { tool, operation }
    }

    /// Event-name prefix shared by every message on this channel
    #[must_use]
    pub fn prefix(&self) -> String {
        format!("{}:session", self.tool)
    }

    /// Name a front end uses to request this operation
    #[must_use]
    pub fn request_event(&self) -> String {
        format!("{}:{}", self.prefix(), self.operation)
    }

    /// Announcement sent once the request has been accepted
    #[must_use]
    pub fn started_message(&self) -> String {
        match self.operation {
            SessionMode::Create => format!("{} session starting...", self.tool),
            SessionMode::Resume => format!("Resuming {} session...", self.tool),
        }
    }

    fn event(&self, kind: &str) -> String {
        format!("{}:{kind}", self.prefix())
    }
}

// ============================================================================
// Wire messages
// ============================================================================

/// One named message sent to a streaming subscriber
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireMessage {
    /// Event name, e.g. `claude:session:output`
    pub event: String,
    /// JSON body
    pub payload: Value,
}

impl WireMessage {
    /// `<prefix>:started {message}` on `channel`, announcing the tool that runs
    #[must_use]
    pub fn started(channel: SubscriptionKey, tool: ToolKind) -> Self {
        let running = SubscriptionKey::new(tool, channel.operation);
        Self {
            event: channel.event("started"),
            payload: json!({ "message": running.started_message() }),
        }
    }

    /// Map one session event
    #[must_use]
    pub fn from_event(key: SubscriptionKey, event: &StreamEvent) -> Self {
        let (kind, payload) = match event {
            StreamEvent::SessionIdentified(id) => ("id", json!({ "sessionId": id })),
            StreamEvent::Output(data) => ("output", json!({ "data": data })),
            StreamEvent::ErrorOutput(data) => ("error:output", json!({ "data": data })),
            StreamEvent::Completed(message) => ("complete", json!({ "message": message })),
            StreamEvent::Failed(error) => ("error", json!({ "error": error })),
        };
        Self {
            event: key.event(kind),
            payload,
        }
    }

    /// `<prefix>:error {error}` for a request rejected before spawn
    #[must_use]
    pub fn rejected(key: SubscriptionKey, error: &HeadlessError) -> Self {
        Self {
            event: key.event("error"),
            payload: json!({ "error": error.to_string() }),
        }
    }

    /// Whether this message ends the channel
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.event.ends_with(":complete") || self.event.ends_with(":session:error")
    }
}

// ============================================================================
// Inbound payload
// ============================================================================

/// Decoded front-end payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionPayload {
    /// Target CLI (`cli`)
    pub tool: ToolKind,
    /// `prompt`
    pub prompt: String,
    /// `workingDir`
    pub working_dir: Option<PathBuf>,
    /// `sessionId`
    pub session_id: Option<String>,
    /// `model`; an empty string decodes as `None`
    pub model: Option<String>,
}

impl SessionPayload {
    /// Decode a JSON payload, checking each field's type
    ///
    /// # Errors
    /// Returns the `InvalidInput` error for the first mistyped field, or
    /// `UnsupportedCli` for an unknown `cli`
    pub fn from_value(value: &Value, default_tool: ToolKind) -> Result<Self> {
        let tool = match value.get("cli") {
            None | Some(Value::Null) => default_tool,
            Some(Value::String(name)) => name.parse()?,
            Some(other) => return Err(HeadlessError::UnsupportedCli(other.to_string())),
        };

        let prompt = match value.get("prompt") {
            Some(Value::String(prompt)) => prompt.clone(),
            _ => {
                return Err(HeadlessError::invalid_prompt(
                    "Prompt is required and must be a non-empty string",
                ));
            }
        };

        let working_dir = match value.get("workingDir") {
            None | Some(Value::Null) => None,
            Some(Value::String(dir)) => Some(PathBuf::from(dir)),
            Some(_) => {
                return Err(HeadlessError::invalid_working_dir(
                    "Working directory must be a non-empty string",
                ));
            }
        };

        let session_id = match value.get("sessionId") {
            None | Some(Value::Null) => None,
            Some(Value::String(id)) => Some(id.clone()),
            Some(_) => {
                return Err(HeadlessError::invalid_session_id(
                    "Session ID is required and must be a string",
                ));
            }
        };

        let model = validation::validate_model(value.get("model"))?;

        Ok(Self {
            tool,
            prompt,
            working_dir,
            session_id,
            model,
        })
    }

    /// Convert into engine parameters
    #[must_use]
    pub fn into_params(self) -> SessionParams {
        SessionParams {
            tool: self.tool,
            prompt: self.prompt,
            working_dir: self.working_dir,
            session_id: self.session_id,
            model: self.model,
        }
    }
}

// ============================================================================
// Blocking response
// ============================================================================

/// Response body of a blocking create or resume
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    /// `true` only for `Completed`
    pub success: bool,
    /// Tool that ran the session
    pub cli: ToolKind,
    /// Latched identity, if any
    pub session_id: Option<SessionId>,
    /// Final status
    pub status: SessionStatus,
    /// Stdout lines
    pub output: Vec<String>,
    /// Stderr lines
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub error: Vec<String>,
    /// Terminal message
    pub message: String,
}

impl From<SessionSnapshot> for SessionResponse {
    fn from(snapshot: SessionSnapshot) -> Self {
        Self::from_snapshot(snapshot)
    }
}

impl SessionResponse {
    /// Build the response from a finished snapshot
    #[must_use]
    pub fn from_snapshot(snapshot: SessionSnapshot) -> Self {
        Self {
            success: snapshot.is_success(),
            cli: snapshot.tool,
            session_id: snapshot.session_id,
            status: snapshot.status,
            output: snapshot.output,
            error: snapshot.errors,
            message: snapshot.message.unwrap_or_default(),
        }
    }
}
