//! CLI command building logic for subprocess transport
//!
//! Every value is passed as a discrete argv element. Nothing is ever joined into
//! a shell string, so prompt content cannot inject arguments or commands.

use std::path::PathBuf;

use tokio::process::Command;

use crate::types::identifiers::SessionId;
use crate::types::options::CliProgram;
use crate::types::request::{SessionMode, SessionRequest};
use crate::types::tool::ToolKind;

use super::config::{CLAUDE_PERMISSION_MODE, CODEX_SANDBOX_MODE};

/// Inputs to a tool dialect
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandSpec<'a> {
    /// Prompt text, always the final argument
    pub prompt: &'a str,
    /// Session to resume; `None` creates a new session
    pub resume: Option<&'a SessionId>,
    /// Optional model override
    pub model: Option<&'a str>,
}

impl<'a> CommandSpec<'a> {
    /// Spec for a new session
    #[must_use]
    pub fn create(prompt: &'a str) -> Self {
        Self {
            prompt,
            resume: None,
            model: None,
        }
    }

    /// Spec for resuming `session_id`
    #[must_use]
    pub fn resume(session_id: &'a SessionId, prompt: &'a str) -> Self {
        Self {
            prompt,
            resume: Some(session_id),
            model: None,
        }
    }

    /// Set the model override
    #[must_use]
    pub fn with_model(mut self, model: Option<&'a str>) -> Self {
        self.model = model;
        self
    }

    /// Create or resume
    #[must_use]
    pub fn mode(&self) -> SessionMode {
        if self.resume.is_some() {
            SessionMode::Resume
        } else {
            SessionMode::Create
        }
    }
}

impl<'a> From<&'a SessionRequest> for CommandSpec<'a> {
    fn from(request: &'a SessionRequest) -> Self {
        Self {
            prompt: request.prompt(),
            resume: request.session_id(),
            model: request.model(),
        }
    }
}

/// A fully built invocation: program plus argv
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliCommand {
    /// Program to execute
    pub program: PathBuf,
    /// Arguments, excluding the program itself
    pub args: Vec<String>,
}

impl CliCommand {
    /// Swap in a launcher override, keeping the dialect argv after its leading args
    #[must_use]
    pub fn with_program(mut self, launcher: &CliProgram) -> Self {
        self.program.clone_from(&launcher.program);
        if !launcher.leading_args.is_empty() {
            let mut args = launcher.leading_args.clone();
            args.append(&mut self.args);
            self.args = args;
        }
        self
    }

    /// Convert into a `tokio` command (no stdio or cwd configured)
    #[must_use]
    pub fn to_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        cmd
    }
}

/// Command builder for the supported CLIs
pub struct CommandBuilder<'a> {
    tool: ToolKind,
    spec: CommandSpec<'a>,
}

impl<'a> CommandBuilder<'a> {
    /// Create a new command builder
    #[must_use]
    pub fn new(tool: ToolKind, spec: CommandSpec<'a>) -> Self {
        Self { tool, spec }
    }

    /// Builder for a validated request
    #[must_use]
    pub fn for_request(request: &'a SessionRequest) -> Self {
        Self::new(request.tool(), CommandSpec::from(request))
    }

    /// Build the tool's default executable and dialect argv
    #[must_use]
    pub fn build(&self) -> CliCommand {
        let profile = self.tool.profile();
        CliCommand {
            program: PathBuf::from(profile.executable),
            args: (profile.build_args)(&self.spec),
        }
    }
}

/// `claude` dialect
///
/// `-p --verbose [--resume ID] [--model M] --permission-mode acceptEdits
/// --output-format stream-json -- PROMPT`
pub(crate) fn claude_args(spec: &CommandSpec<'_>) -> Vec<String> {
    let mut args = vec!["-p".to_string(), "--verbose".to_string()];

    if let Some(session_id) = spec.resume {
        args.push("--resume".to_string());
        args.push(session_id.as_str().to_string());
    }

    if let Some(model) = spec.model {
        args.push("--model".to_string());
        args.push(model.to_string());
    }

    args.extend(
        [
            "--permission-mode",
            CLAUDE_PERMISSION_MODE,
            "--output-format",
            "stream-json",
            "--",
        ]
        .map(String::from),
    );
    args.push(spec.prompt.to_string());
    args
}

/// `codex` dialect
///
/// Create: `exec --json --skip-git-repo-check --sandbox workspace-write [--model M] PROMPT`
///
/// Resume: `exec resume --json --skip-git-repo-check [--model M] ID PROMPT`
pub(crate) fn codex_args(spec: &CommandSpec<'_>) -> Vec<String> {
    let mut args = vec!["exec".to_string()];

    if spec.resume.is_some() {
        args.push("resume".to_string());
    }

    args.push("--json".to_string());
    args.push("--skip-git-repo-check".to_string());

    if spec.resume.is_none() {
        args.push("--sandbox".to_string());
        args.push(CODEX_SANDBOX_MODE.to_string());
    }

    if let Some(model) = spec.model {
        args.push("--model".to_string());
        args.push(model.to_string());
    }

    if let Some(session_id) = spec.resume {
        args.push(session_id.as_str().to_string());
    }

    args.push(spec.prompt.to_string());
    args
}
