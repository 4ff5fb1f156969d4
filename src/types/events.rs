//! Stream events emitted by a running session

use serde::{Deserialize, Serialize};

use super::identifiers::SessionId;

/// Which child stream a line came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamKind {
    /// Child stdout
    Stdout,
    /// Child stderr
    Stderr,
}

impl std::fmt::Display for StreamKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Stdout => f.write_str("stdout"),
            Self::Stderr => f.write_str("stderr"),
        }
    }
}

/// Session lifecycle status
///
/// `Running` is entered once, at creation. `Completed` and `Error` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    /// Child process is still being supervised
    Running,
    /// Child exited with code 0
    Completed,
    /// Spawn failure, nonzero exit, or timeout
    Error,
}

impl SessionStatus {
    /// Whether no further transitions are possible
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        !matches!(self, Self::Running)
    }
}

/// One event in a session's ordered event sequence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "content", rename_all = "camelCase")]
pub enum StreamEvent {
    /// A line written to stdout
    Output(String),
    /// A line written to stderr
    ErrorOutput(String),
    /// The session identity became known (emitted at most once)
    SessionIdentified(SessionId),
    /// Terminal: the child exited successfully
    Completed(String),
    /// Terminal: the session ended in error
    Failed(String),
}

impl StreamEvent {
    /// Whether this is the last event of the session
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed(_) | Self::Failed(_))
    }

    /// Build the output event for a line from `stream`
    #[must_use]
    pub fn line(stream: StreamKind, line: String) -> Self {
        match stream {
            StreamKind::Stdout => Self::Output(line),
            StreamKind::Stderr => Self::ErrorOutput(line),
        }
    }
}
