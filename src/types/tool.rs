//! Supported external CLIs
//!
//! Each [`ToolKind`] resolves to a static [`ToolProfile`] that carries everything
//! tool-specific: executable name, preflight arguments, argv dialect and the
//! strategy used to find the session identity in the tool's output.

use serde::{Deserialize, Serialize};

use crate::error::{HeadlessError, Result};
use crate::message::identity::IdentityStrategy;
use crate::transport::subprocess::command::{self, CommandSpec};

/// The closed set of CLIs the engine can drive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolKind {
    /// Anthropic's `claude` CLI (plain-text identity scan)
    Claude,
    /// OpenAI's `codex` CLI (JSON-lines identity scan)
    Codex,
}

/// Static per-tool strategy table
pub struct ToolProfile {
    /// Lowercase tool name used on the wire and in messages
    pub name: &'static str,
    /// Default executable looked up on `PATH`
    pub executable: &'static str,
    /// Arguments for the cheap availability probe
    pub preflight_args: &'static [&'static str],
    /// How the session identity is recovered from output lines
    pub identity: IdentityStrategy,
    /// Shown when the executable cannot be found
    pub install_hint: &'static str,
    /// Builds the argv for a create or resume invocation
    pub build_args: fn(&CommandSpec<'_>) -> Vec<String>,
}

impl std::fmt::Debug for ToolProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolProfile")
            .field("name", &self.name)
            .field("executable", &self.executable)
            .field("preflight_args", &self.preflight_args)
            .field("identity", &self.identity)
            .finish_non_exhaustive()
    }
}

static CLAUDE_PROFILE: ToolProfile = ToolProfile {
    name: "claude",
    executable: "claude",
    preflight_args: &["--version"],
    identity: IdentityStrategy::PlainText,
    install_hint: "npm install -g @anthropic-ai/claude-code",
    build_args: command::claude_args,
};

static CODEX_PROFILE: ToolProfile = ToolProfile {
    name: "codex",
    executable: "codex",
    preflight_args: &["--version"],
    identity: IdentityStrategy::JsonAware,
    install_hint: "npm install -g @openai/codex",
    build_args: command::codex_args,
};

impl ToolKind {
    /// Every supported tool
    pub const ALL: [Self; 2] = [Self::Claude, Self::Codex];

    /// Resolve the strategy table for this tool
    #[must_use]
    pub fn profile(self) -> &'static ToolProfile {
        match self {
            Self::Claude => &CLAUDE_PROFILE,
            Self::Codex => &CODEX_PROFILE,
        }
    }

    /// Lowercase tool name
    #[must_use]
    pub fn as_str(self) -> &'static str {
        self.profile().name
    }
}

impl std::fmt::Display for ToolKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ToolKind {
    type Err = HeadlessError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|tool| tool.as_str() == s)
            .ok_or_else(|| HeadlessError::UnsupportedCli(s.to_string()))
    }
}
