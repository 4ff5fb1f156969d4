//! Session state structures
//!
//! [`SessionState`] is the supervisor-side state machine: it appends framed
//! lines, latches the session identity once, and performs the single terminal
//! transition. [`SessionSnapshot`] is the consumer-side view rebuilt from the
//! event sequence by the blocking adapter.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::message::identity::IdentityStrategy;
use crate::types::events::{SessionStatus, StreamEvent, StreamKind};
use crate::types::identifiers::SessionId;
use crate::types::tool::ToolKind;

/// Message carried by the `Completed` event
pub const COMPLETED_MESSAGE: &str = "Session completed successfully";

/// Live state of one supervised session
#[derive(Debug, Clone)]
pub struct SessionState {
    session_id: Option<SessionId>,
    status: SessionStatus,
    output: Vec<String>,
    errors: Vec<String>,
    strategy: IdentityStrategy,
}

impl SessionState {
    /// New `Running` state; a resume id is latched immediately
    #[must_use]
    pub fn new(strategy: IdentityStrategy, resume_id: Option<SessionId>) -> Self {
        Self {
            session_id: resume_id,
            status: SessionStatus::Running,
            output: Vec::new(),
            errors: Vec::new(),
            strategy,
        }
    }

    /// Events to emit before any output: the identity, when already known
    #[must_use]
    pub fn initial_events(&self) -> Vec<StreamEvent> {
        self.session_id
            .iter()
            .cloned()
            .map(StreamEvent::SessionIdentified)
            .collect()
    }

    /// Process one framed line
    ///
    /// Whitespace-only lines are dropped. Otherwise the line is appended to its
    /// log, the identity is latched if this is the first line that reveals one,
    /// and the line is forwarded. Lines arriving after the terminal transition
    /// are ignored.
    pub fn ingest(&mut self, stream: StreamKind, line: String) -> Vec<StreamEvent> {
        if self.status.is_terminal() || line.trim().is_empty() {
            return Vec::new();
        }

        let mut events = Vec::with_capacity(2);

        match stream {
            StreamKind::Stdout => self.output.push(line.clone()),
            StreamKind::Stderr => self.errors.push(line.clone()),
        }

        if self.session_id.is_none()
            && let Some(id) = self.strategy.extract(&line)
        {
            self.session_id = Some(id.clone());
            events.push(StreamEvent::SessionIdentified(id));
        }

        events.push(StreamEvent::line(stream, line));
        events
    }

    /// Transition to `Completed`; `None` if already terminal
    pub fn complete(&mut self) -> Option<StreamEvent> {
        self.finalize(
            SessionStatus::Completed,
            StreamEvent::Completed(COMPLETED_MESSAGE.to_string()),
        )
    }

    /// Transition to `Error`; `None` if already terminal
    pub fn fail(&mut self, message: impl Into<String>) -> Option<StreamEvent> {
        self.finalize(SessionStatus::Error, StreamEvent::Failed(message.into()))
    }

    fn finalize(&mut self, status: SessionStatus, event: StreamEvent) -> Option<StreamEvent> {
        if self.status.is_terminal() {
            return None;
        }
        self.status = status;
        Some(event)
    }

    /// Latched session identity
    #[must_use]
    pub fn session_id(&self) -> Option<&SessionId> {
        self.session_id.as_ref()
    }

    /// Current status
    #[must_use]
    pub fn status(&self) -> SessionStatus {
        self.status
    }

    /// Stdout lines in emission order
    #[must_use]
    pub fn output(&self) -> &[String] {
        &self.output
    }

    /// Stderr lines in emission order
    #[must_use]
    pub fn errors(&self) -> &[String] {
        &self.errors
    }
}

/// Final view of a session, accumulated from its events
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    /// Tool that ran the session
    pub tool: ToolKind,
    /// Session identity, if one was reported
    pub session_id: Option<SessionId>,
    /// Final status
    pub status: SessionStatus,
    /// Stdout lines
    pub output: Vec<String>,
    /// Stderr lines
    pub errors: Vec<String>,
    /// Message of the terminal event
    pub message: Option<String>,
    /// When the terminal event was observed
    pub finished_at: Option<DateTime<Utc>>,
}

impl SessionSnapshot {
    /// Empty `Running` snapshot
    #[must_use]
    pub fn new(tool: ToolKind) -> Self {
        Self {
            tool,
            session_id: None,
            status: SessionStatus::Running,
            output: Vec::new(),
            errors: Vec::new(),
            message: None,
            finished_at: None,
        }
    }

    /// Fold one event into the snapshot; returns `true` once terminal
    ///
    /// Mirrors the producer's rules: the identity latches once and only the first
    /// terminal event counts.
    pub fn apply(&mut self, event: &StreamEvent) -> bool {
        if self.status.is_terminal() {
            return true;
        }

        match event {
            StreamEvent::Output(line) => self.output.push(line.clone()),
            StreamEvent::ErrorOutput(line) => self.errors.push(line.clone()),
            StreamEvent::SessionIdentified(id) => {
                if self.session_id.is_none() {
                    self.session_id = Some(id.clone());
                }
            }
            StreamEvent::Completed(message) => self.finish(SessionStatus::Completed, message),
            StreamEvent::Failed(message) => self.finish(SessionStatus::Error, message),
        }

        self.status.is_terminal()
    }

    fn finish(&mut self, status: SessionStatus, message: &str) {
        self.status = status;
        self.message = Some(message.to_string());
        self.finished_at = Some(Utc::now());
    }

    /// Whether the session completed successfully
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status == SessionStatus::Completed
    }
}
