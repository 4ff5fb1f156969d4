//! Error types for the headless session engine

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::tool::ToolKind;

/// Main error type for the headless session engine
#[derive(Error, Debug)]
pub enum HeadlessError {
    /// Prompt missing, empty, or not text
    #[error("{0}")]
    InvalidPrompt(String),

    /// Working directory missing, not a directory, or outside the allowed roots
    #[error("{0}")]
    InvalidWorkingDir(String),

    /// Session id missing or not in canonical UUID form
    #[error("{0}")]
    InvalidSessionId(String),

    /// Model present but not text
    #[error("{0}")]
    InvalidModel(String),

    /// Requested CLI is not one of the supported tools
    #[error("Unsupported cli '{0}'. Supported values are: claude, codex")]
    UnsupportedCli(String),

    /// CLI executable could not be located
    #[error("{0}")]
    CliNotFound(String),

    /// CLI was found but its preflight invocation failed or timed out
    #[error("{message}")]
    CliPreflightFailed {
        /// Error message
        message: String,
        /// Captured stdout and stderr of the preflight run
        output: Option<String>,
    },

    /// OS-level failure to start the session process
    #[error("{context}: {source}")]
    Spawn {
        /// What was being attempted, e.g. "Failed to start claude"
        context: String,
        /// Underlying OS error
        #[source]
        source: std::io::Error,
    },

    /// Session process exited with a nonzero code
    #[error("{tool} exited with code {exit_code}")]
    Process {
        /// Tool that was running
        tool: ToolKind,
        /// Process exit code
        exit_code: i32,
    },

    /// Session process was terminated by a signal
    #[error("{tool} was terminated by a signal")]
    Terminated {
        /// Tool that was running
        tool: ToolKind,
    },

    /// Session exceeded its time limit
    #[error("Session timed out after {}", describe_duration(*.0))]
    Timeout(Duration),

    /// I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encode/decode error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, HeadlessError>;

/// Coarse failure taxonomy used by callers to pick a response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ErrorKind {
    /// Bad prompt, working directory, session id or model; rejected before spawn
    InvalidInput,
    /// Executable missing or preflight failed; rejected before spawn
    CliUnavailable,
    /// OS refused to start the session process
    SpawnFailure,
    /// Session process exited unsuccessfully
    RuntimeFailure,
    /// Session process exceeded the time limit and was killed
    Timeout,
}

impl HeadlessError {
    /// Create an invalid prompt error
    pub fn invalid_prompt(msg: impl Into<String>) -> Self {
        Self::InvalidPrompt(msg.into())
    }

    /// Create an invalid working directory error
    pub fn invalid_working_dir(msg: impl Into<String>) -> Self {
        Self::InvalidWorkingDir(msg.into())
    }

    /// Create an invalid session id error
    pub fn invalid_session_id(msg: impl Into<String>) -> Self {
        Self::InvalidSessionId(msg.into())
    }

    /// Create an invalid model error
    pub fn invalid_model(msg: impl Into<String>) -> Self {
        Self::InvalidModel(msg.into())
    }

    /// Create a CLI not found error for `tool`
    #[must_use]
    pub fn cli_not_found(tool: ToolKind) -> Self {
        Self::CliNotFound(format!(
            "'{tool}' CLI is not available on this system (command not found).\n\
             Install with: {}",
            tool.profile().install_hint
        ))
    }

    /// Create a preflight failure error
    pub fn preflight_failed(msg: impl Into<String>, output: Option<String>) -> Self {
        Self::CliPreflightFailed {
            message: msg.into(),
            output,
        }
    }

    /// Create a spawn error
    pub fn spawn(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Spawn {
            context: context.into(),
            source,
        }
    }

    /// Map this error onto the caller-facing taxonomy
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidPrompt(_)
            | Self::InvalidWorkingDir(_)
            | Self::InvalidSessionId(_)
            | Self::InvalidModel(_)
            | Self::UnsupportedCli(_)
            | Self::Json(_) => ErrorKind::InvalidInput,
            Self::CliNotFound(_) | Self::CliPreflightFailed { .. } => ErrorKind::CliUnavailable,
            Self::Spawn { .. } | Self::Io(_) => ErrorKind::SpawnFailure,
            Self::Process { .. } | Self::Terminated { .. } => ErrorKind::RuntimeFailure,
            Self::Timeout(_) => ErrorKind::Timeout,
        }
    }

    /// Whether the request was rejected without any session process being started
    #[must_use]
    pub fn is_pre_spawn(&self) -> bool {
        matches!(self.kind(), ErrorKind::InvalidInput | ErrorKind::CliUnavailable)
    }
}

/// Error payload shape shared by every transport: `{ "error": "<message>" }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorPayload {
    /// Human-readable message
    pub error: String,
}

impl ErrorPayload {
    /// Create a payload from a message
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

impl From<&HeadlessError> for ErrorPayload {
    fn from(err: &HeadlessError) -> Self {
        Self::new(err.to_string())
    }
}

impl From<HeadlessError> for ErrorPayload {
    fn from(err: HeadlessError) -> Self {
        Self::from(&err)
    }
}

/// Render a duration the way timeout messages read: whole minutes, whole seconds, or millis
pub(crate) fn describe_duration(duration: Duration) -> String {
    let millis = duration.as_millis();
    if millis >= 60_000 && millis % 60_000 == 0 {
        let minutes = millis / 60_000;
        if minutes == 1 {
            "1 minute".to_string()
        } else {
            format!("{minutes} minutes")
        }
    } else if millis >= 1_000 && millis % 1_000 == 0 {
        format!("{}s", millis / 1_000)
    } else {
        format!("{millis}ms")
    }
}
