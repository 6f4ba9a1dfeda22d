//! Managed child process wrapper

use tokio::process::{Child, ChildStderr};
use tracing::debug;

use crate::error::{ProcessError, Result};

/// Wrapper around a spawned launch process.
///
/// Ownership follows the launch lifecycle: the spawning coordinator holds the
/// child until readiness is detected, then hands it to the
/// [`crate::ProcessTracker`]; a stop request takes it back out for termination.
#[derive(Debug)]
pub struct ManagedChild {
    /// Underlying tokio child process
    child: Child,
    /// Process ID captured at spawn time
    pid: u32,
}

impl ManagedChild {
    pub(crate) fn new(child: Child, pid: u32) -> Self {
        Self { child, pid }
    }

    /// Get process ID
    pub fn pid(&self) -> u32 {
        self.pid
    }

    /// Check if process is still running
    pub fn is_running(&mut self) -> bool {
        match self.child.try_wait() {
            Ok(Some(_)) => false,
            Ok(None) => true,
            Err(_) => false,
        }
    }

    /// Wait for process to exit
    pub async fn wait(&mut self) -> Result<std::process::ExitStatus> {
        self.child.wait().await.map_err(Into::into)
    }

    /// Send the graceful stop signal (SIGTERM) without waiting.
    ///
    /// A process that already exited is not an error.
    #[cfg(unix)]
    pub fn signal_term(&self) -> Result<()> {
        use nix::errno::Errno;
        use nix::sys::signal::{kill, Signal};
        use nix::unistd::Pid;

        debug!(pid = %self.pid, "Sending SIGTERM");
        match kill(Pid::from_raw(self.pid as i32), Signal::SIGTERM) {
            Ok(()) | Err(Errno::ESRCH) => Ok(()),
            Err(e) => Err(ProcessError::SignalFailed {
                pid: self.pid,
                reason: e.to_string(),
            }),
        }
    }

    /// Send the graceful stop signal.
    ///
    /// There is no SIGTERM equivalent here, so this degrades to a kill.
    #[cfg(not(unix))]
    pub fn signal_term(&self) -> Result<()> {
        debug!(pid = %self.pid, "No graceful signal on this platform, killing");
        force_kill_pid(self.pid);
        Ok(())
    }

    /// Forcefully kill the process and reap it
    pub async fn kill(&mut self) -> Result<()> {
        if !self.is_running() {
            return Ok(());
        }
        debug!(pid = %self.pid, "Killing process");
        self.child
            .start_kill()
            .map_err(|e| ProcessError::SignalFailed {
                pid: self.pid,
                reason: e.to_string(),
            })?;
        let _ = self.child.wait().await;
        Ok(())
    }

    /// Forcefully kill by pid without reaping.
    ///
    /// Safe to call from a non-async context such as the interrupt hook.
    pub fn force_kill(&self) {
        force_kill_pid(self.pid);
    }

    /// Take stderr handle
    pub fn take_stderr(&mut self) -> Option<ChildStderr> {
        self.child.stderr.take()
    }
}

/// Deliver SIGKILL (or the platform equivalent) to a bare pid.
#[cfg(unix)]
pub(crate) fn force_kill_pid(pid: u32) {
    use nix::sys::signal::{kill, Signal};
    use nix::unistd::Pid;

    let _ = kill(Pid::from_raw(pid as i32), Signal::SIGKILL);
}

#[cfg(not(unix))]
pub(crate) fn force_kill_pid(pid: u32) {
    use std::process::{Command, Stdio};

    let _ = Command::new("taskkill")
        .args(["/pid", &pid.to_string(), "/f", "/t"])
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status();
}
