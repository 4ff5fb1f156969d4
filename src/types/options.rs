//! Engine options and configuration
//!
//! This module contains the configuration for [`HeadlessEngine`](crate::HeadlessEngine),
//! including a builder pattern for easy configuration.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use super::tool::ToolKind;
use crate::transport::subprocess::config::{
    DEFAULT_KILL_GRACE, DEFAULT_MAX_LINE_BYTES, DEFAULT_PREFLIGHT_TIMEOUT, DEFAULT_SESSION_TIMEOUT,
};

// ============================================================================
// CLI Program
// ============================================================================

/// How to launch a tool: program plus any arguments placed before the dialect argv
///
/// The default for each tool is its bare executable name resolved on `PATH`.
/// Overrides allow launchers such as `npx claude` or wrapper scripts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliProgram {
    /// Program to execute
    pub program: PathBuf,
    /// Arguments inserted before the dialect argv
    pub leading_args: Vec<String>,
}

impl CliProgram {
    /// Launch `program` with no leading arguments
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            leading_args: Vec::new(),
        }
    }

    /// Append a leading argument
    #[must_use]
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.leading_args.push(arg.into());
        self
    }

    /// Default launcher for `tool`
    #[must_use]
    pub fn for_tool(tool: ToolKind) -> Self {
        Self::new(tool.profile().executable)
    }
}

// ============================================================================
// Engine Options
// ============================================================================

/// Main options for the headless session engine
#[derive(Debug, Clone)]
pub struct EngineOptions {
    /// Hard limit on a session's runtime
    pub session_timeout: Duration,
    /// Hard limit on the availability probe
    pub preflight_timeout: Duration,
    /// Time between SIGTERM and SIGKILL when a session times out
    pub kill_grace: Duration,
    /// Unterminated output longer than this is emitted as its own line
    pub max_line_bytes: usize,
    /// Directories a working directory must live under (`None`: service cwd and home)
    pub allowed_roots: Option<Vec<PathBuf>>,
    /// Working directory used when a payload omits one (`None`: service cwd)
    pub default_working_dir: Option<PathBuf>,
    /// Tool used when a payload omits `cli`
    pub default_tool: ToolKind,
    /// Per-tool launcher overrides
    pub programs: HashMap<ToolKind, CliProgram>,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            session_timeout: DEFAULT_SESSION_TIMEOUT,
            preflight_timeout: DEFAULT_PREFLIGHT_TIMEOUT,
            kill_grace: DEFAULT_KILL_GRACE,
            max_line_bytes: DEFAULT_MAX_LINE_BYTES,
            allowed_roots: None,
            default_working_dir: None,
            default_tool: ToolKind::Claude,
            programs: HashMap::new(),
        }
    }
}

impl EngineOptions {
    /// Create a new builder for `EngineOptions`
    #[must_use]
    pub fn builder() -> EngineOptionsBuilder {
        EngineOptionsBuilder::default()
    }

    /// Launcher for `tool`, honouring overrides
    #[must_use]
    pub fn program_for(&self, tool: ToolKind) -> CliProgram {
        self.programs
            .get(&tool)
            .cloned()
            .unwrap_or_else(|| CliProgram::for_tool(tool))
    }

    /// Roots a working directory must be contained in
    #[must_use]
    pub fn resolved_allowed_roots(&self) -> Vec<PathBuf> {
        if let Some(ref roots) = self.allowed_roots {
            return roots.clone();
        }

        let mut roots = Vec::with_capacity(2);
        if let Ok(cwd) = std::env::current_dir() {
            roots.push(cwd);
        }
        let home = std::env::var_os("HOME").map_or_else(|| PathBuf::from("/"), PathBuf::from);
        roots.push(home);
        roots
    }

    /// Working directory used when a request does not name one
    #[must_use]
    pub fn resolved_default_working_dir(&self) -> PathBuf {
        self.default_working_dir
            .clone()
            .or_else(|| std::env::current_dir().ok())
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

// ============================================================================
// Builder for EngineOptions
// ============================================================================

/// Builder for `EngineOptions`
#[derive(Debug, Default)]
pub struct EngineOptionsBuilder {
    options: EngineOptions,
}

impl EngineOptionsBuilder {
    /// Set the session timeout
    #[must_use]
    pub const fn session_timeout(mut self, timeout: Duration) -> Self {
        self.options.session_timeout = timeout;
        self
    }

    /// Set the preflight timeout
    #[must_use]
    pub const fn preflight_timeout(mut self, timeout: Duration) -> Self {
        self.options.preflight_timeout = timeout;
        self
    }

    /// Set the grace period between SIGTERM and SIGKILL
    #[must_use]
    pub const fn kill_grace(mut self, grace: Duration) -> Self {
        self.options.kill_grace = grace;
        self
    }

    /// Set the maximum unterminated line length; zero is raised to one byte
    #[must_use]
    pub fn max_line_bytes(mut self, bytes: usize) -> Self {
        self.options.max_line_bytes = bytes.max(1);
        self
    }

    /// Add a directory working directories may live under
    ///
    /// The first call replaces the default roots (service cwd and home).
    #[must_use]
    pub fn allow_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.options
            .allowed_roots
            .get_or_insert_with(Vec::new)
            .push(root.into());
        self
    }

    /// Set the default working directory
    #[must_use]
    pub fn default_working_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.options.default_working_dir = Some(path.into());
        self
    }

    /// Set the default tool
    #[must_use]
    pub const fn default_tool(mut self, tool: ToolKind) -> Self {
        self.options.default_tool = tool;
        self
    }

    /// Override the launcher for `tool`
    #[must_use]
    pub fn program(mut self, tool: ToolKind, program: CliProgram) -> Self {
        self.options.programs.insert(tool, program);
        self
    }

    /// Build the options
    #[must_use]
    pub fn build(self) -> EngineOptions {
        self.options
    }
}
