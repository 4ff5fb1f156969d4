//! Lifecycle management for session processes (spawn, terminate)

use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use tokio::process::Child;

use super::command::CliCommand;

/// Spawn a session process
///
/// The child inherits the service environment, runs in `cwd`, has stdin closed
/// and stdout/stderr piped separately. On Unix it leads its own process group
/// so a timeout can take down any helpers it started.
///
/// # Errors
/// Returns the OS error if the process cannot be started
pub(crate) fn spawn_child(command: &CliCommand, cwd: &Path) -> std::io::Result<Child> {
    let mut cmd = command.to_command();

    cmd.current_dir(cwd)
        .env("PWD", cwd)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        // Piped rather than inherited so the child cannot touch the parent terminal
        .stderr(Stdio::piped());

    #[cfg(unix)]
    cmd.process_group(0);

    cmd.spawn()
}

/// Terminate a child that outlived its deadline
///
/// Sends SIGTERM to the child's process group, waits up to `grace` for it to
/// exit, then sends SIGKILL and reaps it.
#[cfg(unix)]
pub(crate) async fn terminate(child: &mut Child, grace: Duration) {
    use nix::sys::signal::{Signal, killpg};
    use nix::unistd::Pid;

    let Some(pid) = child.id().and_then(|pid| i32::try_from(pid).ok()) else {
        // Already reaped
        return;
    };
    let pgid = Pid::from_raw(pid);

    if let Err(e) = killpg(pgid, Signal::SIGTERM) {
        log::debug!("SIGTERM to process group {pid} failed: {e}");
    }

    tokio::select! {
        result = child.wait() => {
            if let Err(e) = result {
                log::warn!("Failed to reap process {pid}: {e}");
            }
        }
        () = tokio::time::sleep(grace) => {
            log::warn!("Process {pid} ignored SIGTERM for {grace:?}; sending SIGKILL");
            let _ = killpg(pgid, Signal::SIGKILL);
            if let Err(e) = child.kill().await {
                log::warn!("Failed to kill process {pid}: {e}");
            }
        }
    }
}

/// Terminate a child that outlived its deadline
#[cfg(not(unix))]
pub(crate) async fn terminate(child: &mut Child, _grace: Duration) {
    if let Err(e) = child.kill().await {
        log::warn!("Failed to kill session process: {e}");
    }
}
