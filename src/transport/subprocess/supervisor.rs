//! Process supervision for a single session
//!
//! One supervisor task owns one child process for its whole life. It reads both
//! output streams concurrently, drives the [`SessionState`] machine, and pushes
//! every resulting event into the session's event channel in order.
//!
//! ```text
//!   stdout ─► reader task ─┐
//!                          ├─► line channel ─► SessionState ─► event channel ─► adapter
//!   stderr ─► reader task ─┘          ▲
//!                                     └── deadline (single timer, started at spawn)
//! ```
//!
//! Exactly one terminal event is produced: the supervision loop stops at the
//! first of exit, timeout or spawn error, and [`SessionState`] ignores any
//! later terminal transition.

use std::process::ExitStatus;
use std::time::Duration;

use tokio::process::Child;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::error::HeadlessError;
use crate::manager::session::SessionState;
use crate::types::events::{StreamEvent, StreamKind};
use crate::types::request::{SessionMode, SessionRequest};

use super::command::CliCommand;
use super::lifecycle;
use super::reader::{TaggedLine, spawn_line_reader};

/// Timing and framing limits for one supervised session
#[derive(Debug, Clone, Copy)]
pub(crate) struct SupervisorSettings {
    pub timeout: Duration,
    pub kill_grace: Duration,
    pub max_line_bytes: usize,
}

/// How supervision of a running child ended
enum Termination {
    Exited(std::io::Result<ExitStatus>),
    TimedOut,
}

/// Supervisor for one session process
pub(crate) struct SessionSupervisor {
    run_id: Uuid,
    request: SessionRequest,
    command: CliCommand,
    settings: SupervisorSettings,
    events: mpsc::UnboundedSender<StreamEvent>,
    subscriber_gone: bool,
}

impl SessionSupervisor {
    pub(crate) fn new(
        run_id: Uuid,
        request: SessionRequest,
        command: CliCommand,
        settings: SupervisorSettings,
        events: mpsc::UnboundedSender<StreamEvent>,
    ) -> Self {
        Self {
            run_id,
            request,
            command,
            settings,
            events,
            subscriber_gone: false,
        }
    }

    /// Run supervision on its own task
    ///
    /// The task is detached from the subscriber: dropping the event receiver
    /// does not stop the child.
    pub(crate) fn spawn(self) -> JoinHandle<SessionState> {
        tokio::spawn(self.run())
    }

    async fn run(mut self) -> SessionState {
        let tool = self.request.tool();
        let mut state = SessionState::new(
            tool.profile().identity,
            self.request.session_id().cloned(),
        );

        for event in state.initial_events() {
            self.emit(event);
        }

        // The single session timer; dropped with this future on every exit path
        let deadline = tokio::time::sleep(self.settings.timeout);
        tokio::pin!(deadline);

        let mut child = match lifecycle::spawn_child(&self.command, self.request.working_dir()) {
            Ok(child) => child,
            Err(e) => {
                let error = HeadlessError::spawn(self.spawn_context(), e);
                log::error!("[{}] {error}", self.run_id);
                if let Some(event) = state.fail(error.to_string()) {
                    self.emit(event);
                }
                return state;
            }
        };

        log::info!(
            "[{}] {tool} started (pid {})",
            self.run_id,
            child.id().map_or_else(|| "?".to_string(), |pid| pid.to_string())
        );

        let (line_tx, mut line_rx) = mpsc::unbounded_channel::<TaggedLine>();
        let mut readers = Vec::with_capacity(2);
        if let Some(stdout) = child.stdout.take() {
            readers.push(spawn_line_reader(
                stdout,
                StreamKind::Stdout,
                self.settings.max_line_bytes,
                line_tx.clone(),
                self.run_id,
            ));
        }
        if let Some(stderr) = child.stderr.take() {
            readers.push(spawn_line_reader(
                stderr,
                StreamKind::Stderr,
                self.settings.max_line_bytes,
                line_tx.clone(),
                self.run_id,
            ));
        }
        drop(line_tx);

        // Drain both streams to end of file (trailing fragments included) before
        // looking at the exit status, so no output is lost behind the terminal event.
        let mut streams_open = true;
        while streams_open {
            tokio::select! {
                line = line_rx.recv() => match line {
                    Some((stream, line)) => {
                        for event in state.ingest(stream, line) {
                            self.emit(event);
                        }
                    }
                    None => streams_open = false,
                },
                () = &mut deadline => break,
            }
        }

        let termination = if streams_open {
            Termination::TimedOut
        } else {
            tokio::select! {
                status = child.wait() => Termination::Exited(status),
                () = &mut deadline => Termination::TimedOut,
            }
        };

        match termination {
            Termination::Exited(status) => {
                let event = match status {
                    Ok(status) if status.success() => state.complete(),
                    Ok(status) => {
                        let error = match status.code() {
                            Some(exit_code) => HeadlessError::Process { tool, exit_code },
                            None => HeadlessError::Terminated { tool },
                        };
                        log::warn!("[{}] {error}", self.run_id);
                        state.fail(error.to_string())
                    }
                    Err(e) => {
                        log::error!("[{}] failed to wait for {tool}: {e}", self.run_id);
                        state.fail(HeadlessError::Io(e).to_string())
                    }
                };
                if let Some(event) = event {
                    self.emit(event);
                }
            }
            Termination::TimedOut => {
                // Lines already framed before the deadline are part of the session
                for reader in readers {
                    reader.abort();
                    let _ = reader.await;
                }
                while let Some((stream, line)) = line_rx.recv().await {
                    for event in state.ingest(stream, line) {
                        self.emit(event);
                    }
                }

                let error = HeadlessError::Timeout(self.settings.timeout);
                log::warn!("[{}] {error}; terminating {tool}", self.run_id);
                if let Some(event) = state.fail(error.to_string()) {
                    self.emit(event);
                }
                self.terminate(&mut child).await;
            }
        }

        log::info!(
            "[{}] {tool} session finished: {:?} ({} stdout / {} stderr lines)",
            self.run_id,
            state.status(),
            state.output().len(),
            state.errors().len()
        );

        state
    }

    async fn terminate(&self, child: &mut Child) {
        lifecycle::terminate(child, self.settings.kill_grace).await;
    }

    fn spawn_context(&self) -> String {
        let tool = self.request.tool();
        match self.request.mode() {
            SessionMode::Create => format!("Failed to start {tool}"),
            SessionMode::Resume => format!("Failed to resume {tool} session"),
        }
    }

    fn emit(&mut self, event: StreamEvent) {
        if self.events.send(event).is_err() && !self.subscriber_gone {
            // Losing the subscriber never stops the child
            self.subscriber_gone = true;
            log::debug!(
                "[{}] subscriber disconnected; session continues unobserved",
                self.run_id
            );
        }
    }
}
