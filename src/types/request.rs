//! Session request types
//!
//! [`SessionParams`] is what a caller hands in; [`SessionRequest`] is what the
//! validator hands back. Only the validator can construct a `SessionRequest`, so
//! holding one proves every input check already passed.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::identifiers::SessionId;
use super::tool::ToolKind;

/// Whether a session starts fresh or continues an existing one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionMode {
    /// Start a new session
    Create,
    /// Continue a session by id
    Resume,
}

impl std::fmt::Display for SessionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Create => f.write_str("create"),
            Self::Resume => f.write_str("resume"),
        }
    }
}

/// Unvalidated session parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionParams {
    /// Target CLI
    pub tool: ToolKind,
    /// Prompt text
    pub prompt: String,
    /// Working directory; `None` means the engine's default
    pub working_dir: Option<PathBuf>,
    /// Session to resume
    pub session_id: Option<String>,
    /// Model override
    pub model: Option<String>,
}

impl SessionParams {
    /// Parameters for a new session
    pub fn new(tool: ToolKind, prompt: impl Into<String>) -> Self {
        Self {
            tool,
            prompt: prompt.into(),
            working_dir: None,
            session_id: None,
            model: None,
        }
    }

    /// Set the working directory
    #[must_use]
    pub fn working_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(path.into());
        self
    }

    /// Set the session to resume
    #[must_use]
    pub fn session_id(mut self, id: impl Into<String>) -> Self {
        self.session_id = Some(id.into());
        self
    }

    /// Set the model
    #[must_use]
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }
}

/// A validated, immutable session request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRequest {
    tool: ToolKind,
    prompt: String,
    working_dir: PathBuf,
    session_id: Option<SessionId>,
    model: Option<String>,
}

impl SessionRequest {
    pub(crate) fn new(
        tool: ToolKind,
        prompt: String,
        working_dir: PathBuf,
        session_id: Option<SessionId>,
        model: Option<String>,
    ) -> Self {
        Self {
            tool,
            prompt,
            working_dir,
            session_id,
            model,
        }
    }

    /// Target CLI
    #[must_use]
    pub fn tool(&self) -> ToolKind {
        self.tool
    }

    /// Prompt text
    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// Canonical working directory
    #[must_use]
    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    /// Session being resumed
    #[must_use]
    pub fn session_id(&self) -> Option<&SessionId> {
        self.session_id.as_ref()
    }

    /// Model override
    #[must_use]
    pub fn model(&self) -> Option<&str> {
        self.model.as_deref()
    }

    /// `Resume` when a session id is present
    #[must_use]
    pub fn mode(&self) -> SessionMode {
        if self.session_id.is_some() {
            SessionMode::Resume
        } else {
            SessionMode::Create
        }
    }
}
