//! Bounded graceful/forceful termination
//!
//! Stopping a launch is a two-phase protocol: a graceful stop signal followed
//! by a bounded grace period, escalating to a forceful kill on expiry. On
//! platforms where the launch is started through an intermediate launcher
//! script, killing only the tracked handle would orphan the real worker, so
//! the tree-aware variant tears down all transitive descendants first.

use std::time::{Duration, Instant};

use sysinfo::{Pid, ProcessStatus, Signal, System};
use tokio::time::sleep;
use tracing::{debug, error, warn};

use crate::child::ManagedChild;
use crate::error::Result;

/// Grace period given to a process to exit after the graceful stop signal
pub const DEFAULT_GRACE_PERIOD: Duration = Duration::from_secs(30);

/// Poll interval while waiting on a descendant's exit
const DESCENDANT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Platform-selected termination algorithm.
///
/// Selected once at startup via [`TerminationStrategy::for_host`]; callers
/// never branch on the platform themselves.
#[derive(Debug, Clone, Copy)]
pub enum TerminationStrategy {
    /// Stop the tracked process directly, not caring about descendants
    Direct {
        /// Bounded wait before escalating to a forceful kill
        grace_period: Duration,
    },
    /// Stop all transitive descendants first, then the tracked process.
    ///
    /// Used when the tracked handle is an indirect launcher (e.g. a generated
    /// startup script) that forks the real worker as a descendant.
    TreeAware {
        /// Bounded wait per process before escalating to a forceful kill
        grace_period: Duration,
    },
}

impl TerminationStrategy {
    /// Select the strategy for the host platform.
    ///
    /// Windows launches run through a `.bat` wrapper, so killing the tracked
    /// process alone would leave the spawned worker running.
    pub fn for_host() -> Self {
        if cfg!(windows) {
            Self::TreeAware {
                grace_period: DEFAULT_GRACE_PERIOD,
            }
        } else {
            Self::Direct {
                grace_period: DEFAULT_GRACE_PERIOD,
            }
        }
    }

    /// Override the grace period (mainly for tests)
    pub fn with_grace_period(self, grace_period: Duration) -> Self {
        match self {
            Self::Direct { .. } => Self::Direct { grace_period },
            Self::TreeAware { .. } => Self::TreeAware { grace_period },
        }
    }

    fn grace_period(&self) -> Duration {
        match self {
            Self::Direct { grace_period } | Self::TreeAware { grace_period } => *grace_period,
        }
    }

    /// Stop the given process.
    ///
    /// With `forcibly` set the grace period is skipped at every level and
    /// processes are killed outright.
    pub async fn terminate(&self, child: &mut ManagedChild, forcibly: bool) -> Result<()> {
        match self {
            Self::Direct { .. } => self.stop_directly(child, forcibly).await,
            Self::TreeAware { .. } => {
                debug!(pid = %child.pid(), "Stopping process with descendants");
                self.stop_descendants(child.pid(), forcibly).await;
                self.stop_directly(child, forcibly).await
            }
        }
    }

    async fn stop_directly(&self, child: &mut ManagedChild, forcibly: bool) -> Result<()> {
        if forcibly {
            debug!(pid = %child.pid(), "Forcibly killing process");
            return child.kill().await;
        }

        debug!(pid = %child.pid(), "Stopping process");
        if let Err(e) = child.signal_term() {
            warn!(pid = %child.pid(), error = %e, "Failed to send graceful signal, killing");
            return child.kill().await;
        }

        match tokio::time::timeout(self.grace_period(), child.wait()).await {
            Ok(_) => {
                debug!(pid = %child.pid(), "Process stopped");
            }
            Err(_) => {
                warn!(
                    pid = %child.pid(),
                    grace_secs = self.grace_period().as_secs(),
                    "Process did not exit within grace period, killing"
                );
                child.kill().await?;
            }
        }
        Ok(())
    }

    /// Stop every live descendant of `root_pid`, one bounded grace period each.
    ///
    /// A descendant that cannot be enumerated or refuses to exit is logged and
    /// escalated; it never aborts the teardown of its siblings.
    async fn stop_descendants(&self, root_pid: u32, forcibly: bool) {
        let mut sys = System::new();
        sys.refresh_processes();

        let descendants = collect_descendants(&sys, Pid::from_u32(root_pid));
        debug!(
            pid = %root_pid,
            count = descendants.len(),
            "Stopping descendant processes"
        );

        for pid in descendants {
            self.stop_descendant(&mut sys, pid, forcibly).await;
        }
    }

    async fn stop_descendant(&self, sys: &mut System, pid: Pid, forcibly: bool) {
        let Some(process) = sys.process(pid) else {
            error!(pid = %pid, "Unable to stop descendant, no process handle");
            return;
        };

        if forcibly {
            debug!(pid = %pid, "Forcibly killing descendant");
            process.kill();
            return;
        }

        debug!(pid = %pid, "Stopping descendant");
        if process.kill_with(Signal::Term).is_none() {
            // No graceful signal on this platform
            process.kill();
            return;
        }

        let deadline = Instant::now() + self.grace_period();
        loop {
            sleep(DESCENDANT_POLL_INTERVAL).await;
            sys.refresh_processes();
            match sys.process(pid) {
                None => {
                    debug!(pid = %pid, "Descendant stopped");
                    return;
                }
                Some(process) if process.status() == ProcessStatus::Zombie => {
                    debug!(pid = %pid, "Descendant stopped, awaiting reaping by its parent");
                    return;
                }
                Some(process) if Instant::now() >= deadline => {
                    warn!(pid = %pid, "Descendant did not exit within grace period, killing");
                    process.kill();
                    return;
                }
                Some(_) => {}
            }
        }
    }
}

/// Collect all transitive descendants of `root`, parents before children.
///
/// Recomputed at termination time: descendants may not have existed when the
/// launch was registered.
fn collect_descendants(sys: &System, root: Pid) -> Vec<Pid> {
    let mut result = Vec::new();
    let mut frontier = vec![root];

    while let Some(parent) = frontier.pop() {
        for (pid, process) in sys.processes() {
            if process.parent() == Some(parent) {
                result.push(*pid);
                frontier.push(*pid);
            }
        }
    }

    result
}
