//! Per-tool availability cache
//!
//! Before the first session for a tool, a short `--version` preflight proves the
//! executable runs here. Success is remembered for the life of the process, so
//! steady-state sessions pay no extra spawn. The set only grows; concurrent
//! duplicate preflights just insert the same tool twice.

use std::collections::HashSet;
use std::path::Path;
use std::process::Stdio;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::{Mutex, RwLock};
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tokio::task::JoinHandle;

use crate::error::{HeadlessError, Result};
use crate::types::options::EngineOptions;
use crate::types::tool::ToolKind;

/// Set of tools whose preflight has succeeded
#[derive(Debug, Default)]
pub struct AvailabilityCache {
    available: RwLock<HashSet<ToolKind>>,
    preflight_runs: AtomicUsize,
}

impl AvailabilityCache {
    /// Create an empty cache
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `tool` already passed preflight
    #[must_use]
    pub fn is_available(&self, tool: ToolKind) -> bool {
        self.available.read().contains(&tool)
    }

    /// Record `tool` as available without probing it
    pub fn mark_available(&self, tool: ToolKind) {
        self.available.write().insert(tool);
    }

    /// Number of preflight processes spawned so far
    #[must_use]
    pub fn preflight_runs(&self) -> usize {
        self.preflight_runs.load(Ordering::SeqCst)
    }

    /// Make sure `tool` can run, probing it once per process lifetime
    ///
    /// # Errors
    /// - `HeadlessError::CliNotFound` if the executable cannot be located
    /// - `HeadlessError::CliPreflightFailed` on timeout, spawn error or nonzero exit
    pub async fn ensure_available(
        &self,
        tool: ToolKind,
        working_dir: &Path,
        options: &EngineOptions,
    ) -> Result<()> {
        if self.is_available(tool) {
            return Ok(());
        }

        self.preflight(tool, working_dir, options).await?;
        self.mark_available(tool);
        log::info!("'{tool}' CLI passed preflight");
        Ok(())
    }

    async fn preflight(&self, tool: ToolKind, working_dir: &Path, options: &EngineOptions) -> Result<()> {
        let launcher = options.program_for(tool);
        let program = which::which(&launcher.program).map_err(|e| {
            log::debug!("'{tool}' lookup for {} failed: {e}", launcher.program.display());
            HeadlessError::cli_not_found(tool)
        })?;

        let mut cmd = Command::new(&program);
        cmd.args(&launcher.leading_args)
            .args(tool.profile().preflight_args)
            .current_dir(working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = cmd.spawn().map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                HeadlessError::cli_not_found(tool)
            } else {
                HeadlessError::preflight_failed(
                    format!("Failed to run '{tool}' preflight check: {e}"),
                    None,
                )
            }
        })?;
        self.preflight_runs.fetch_add(1, Ordering::SeqCst);

        let mut stdout = Capture::start(child.stdout.take());
        let mut stderr = Capture::start(child.stderr.take());
        let finished = async {
            let status = child.wait().await;
            stdout.closed().await;
            stderr.closed().await;
            status
        };

        let timeout = options.preflight_timeout;
        let waited = tokio::time::timeout(timeout, finished).await;
        let status = match waited {
            Ok(status) => status.map_err(|e| {
                HeadlessError::preflight_failed(
                    format!("Failed to run '{tool}' preflight check: {e}"),
                    None,
                )
            })?,
            Err(_) => {
                let _ = child.start_kill();
                let details = Capture::details(&stdout, &stderr);
                return Err(HeadlessError::preflight_failed(
                    format!(
                        "'{tool}' is installed but failed preflight (timeout after {}ms).",
                        timeout.as_millis()
                    ),
                    (!details.is_empty()).then_some(details),
                ));
            }
        };

        if status.success() {
            return Ok(());
        }

        let details = Capture::details(&stdout, &stderr);
        let code = status
            .code()
            .map_or_else(|| "signal".to_string(), |code| code.to_string());

        let message = if details.is_empty() {
            format!("'{tool}' CLI is available but failed preflight with exit code {code}")
        } else {
            format!("'{tool}' CLI is available but failed preflight with exit code {code}: {details}")
        };
        Err(HeadlessError::preflight_failed(
            message,
            (!details.is_empty()).then_some(details),
        ))
    }
}

/// Bytes read so far from one preflight pipe
///
/// The buffer stays readable after a timeout, while the child may still hold
/// the pipe open.
struct Capture {
    buffer: Arc<Mutex<Vec<u8>>>,
    reader: Option<JoinHandle<()>>,
}

impl Capture {
    fn start<R>(pipe: Option<R>) -> Self
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        let buffer = Arc::new(Mutex::new(Vec::new()));
        let reader = pipe.map(|mut pipe| {
            let buffer = Arc::clone(&buffer);
            tokio::spawn(async move {
                let mut chunk = [0u8; 4096];
                loop {
                    match pipe.read(&mut chunk).await {
                        Ok(0) | Err(_) => break,
                        Ok(n) => buffer.lock().extend_from_slice(&chunk[..n]),
                    }
                }
            })
        });
        Self { buffer, reader }
    }

    /// Wait until the pipe reaches end of file
    async fn closed(&mut self) {
        if let Some(reader) = self.reader.as_mut() {
            let _ = reader.await;
        }
        self.reader = None;
    }

    /// Stop reading and return what was captured
    fn text(&self) -> String {
        if let Some(reader) = &self.reader {
            reader.abort();
        }
        String::from_utf8_lossy(&self.buffer.lock()).into_owned()
    }

    /// Trimmed `stdout\nstderr`, empty when neither produced anything
    fn details(stdout: &Self, stderr: &Self) -> String {
        format!("{}\n{}", stdout.text(), stderr.text()).trim().to_string()
    }
}
