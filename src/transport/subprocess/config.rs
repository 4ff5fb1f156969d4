//! Configuration constants for subprocess supervision

use std::time::Duration;

/// Hard limit on a session's runtime (10 minutes)
pub const DEFAULT_SESSION_TIMEOUT: Duration = Duration::from_secs(10 * 60);

/// Hard limit on the `--version` availability probe (5 seconds)
pub const DEFAULT_PREFLIGHT_TIMEOUT: Duration = Duration::from_secs(5);

/// Time a timed-out child gets between SIGTERM and SIGKILL
pub const DEFAULT_KILL_GRACE: Duration = Duration::from_secs(2);

/// Default maximum unterminated line length (8MB)
///
/// `stream-json` events carrying whole file contents can be large.
pub const DEFAULT_MAX_LINE_BYTES: usize = 8 * 1024 * 1024;

/// Permission mode passed to `claude` so edits proceed without prompting
pub const CLAUDE_PERMISSION_MODE: &str = "acceptEdits";

/// Sandbox mode passed to `codex` for new sessions
pub const CODEX_SANDBOX_MODE: &str = "workspace-write";
