//! Launch registry
//!
//! Maps caller-chosen launch ids to running processes. A launch is registered
//! only after readiness was detected, and leaves the registry exactly once:
//! through an explicit stop, or through the orphan safety net at shutdown.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{debug, error, info, warn};

use crate::child::ManagedChild;
use crate::error::{ProcessError, Result};
use crate::terminate::TerminationStrategy;

struct TrackerState {
    processes: HashMap<String, ManagedChild>,
    hook_installed: bool,
}

/// Thread-safe registry of running launches.
///
/// The lock guards only the map itself; termination always runs unlocked so a
/// slow shutdown of one launch cannot stall registration or removal of others.
pub struct ProcessTracker {
    state: Arc<Mutex<TrackerState>>,
    strategy: TerminationStrategy,
}

impl ProcessTracker {
    /// Create a registry that stops launches with the given strategy
    pub fn new(strategy: TerminationStrategy) -> Self {
        Self {
            state: Arc::new(Mutex::new(TrackerState {
                processes: HashMap::new(),
                hook_installed: false,
            })),
            strategy,
        }
    }

    /// The termination strategy this registry stops launches with
    pub fn strategy(&self) -> TerminationStrategy {
        self.strategy
    }

    /// Register a running process under `id`.
    ///
    /// Fails with [`ProcessError::DuplicateLaunchId`] if `id` is already
    /// tracked. The first successful registration installs the interrupt hook
    /// that force-kills everything still registered when the supervising
    /// program is terminated.
    pub fn start_tracking(&self, id: impl Into<String>, child: ManagedChild) -> Result<()> {
        let id = id.into();
        let mut state = self.lock();

        if state.processes.contains_key(&id) {
            return Err(ProcessError::DuplicateLaunchId { id });
        }
        debug!(launch = %id, pid = %child.pid(), "Start tracking process");
        state.processes.insert(id, child);

        if !state.hook_installed {
            let hook_state = Arc::clone(&self.state);
            match ctrlc::set_handler(move || {
                kill_remaining(&hook_state);
                std::process::exit(130);
            }) {
                Ok(()) => state.hook_installed = true,
                // Another registry in this process already owns the hook;
                // leave the flag unset so the next registration retries
                Err(e) => warn!(error = %e, "Interrupt hook not installed"),
            }
        }

        Ok(())
    }

    /// Whether `id` is currently tracked
    pub fn is_tracked(&self, id: &str) -> bool {
        self.lock().processes.contains_key(id)
    }

    /// Pid of the tracked process for `id`, if any
    pub fn pid_of(&self, id: &str) -> Option<u32> {
        self.lock().processes.get(id).map(|child| child.pid())
    }

    /// Remove the launch for `id` and stop it gracefully.
    ///
    /// Stopping an unknown or already-stopped id is a logged no-op, so stop
    /// requests are safe to repeat.
    pub async fn stop(&self, id: &str) -> Result<()> {
        let child = self.lock().processes.remove(id);

        match child {
            None => {
                warn!(launch = %id, "Process not found in launch registry, skip stopping");
                Ok(())
            }
            Some(mut child) => {
                info!(launch = %id, pid = %child.pid(), "Stopping launch");
                self.strategy.terminate(&mut child, false).await
            }
        }
    }

    /// Force-kill every launch still registered.
    ///
    /// Synchronous on purpose so the interrupt hook and `Drop` can use it.
    /// Each leaked launch is logged as an error: it should have been stopped
    /// explicitly.
    pub fn force_kill_all(&self) {
        kill_remaining(&self.state);
    }

    fn lock(&self) -> MutexGuard<'_, TrackerState> {
        // Lock is only ever held for map operations, poisoning means a panic
        // mid-operation and the map content is still the best we have
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Drop for ProcessTracker {
    fn drop(&mut self) {
        kill_remaining(&self.state);
    }
}

fn kill_remaining(state: &Mutex<TrackerState>) {
    let mut state = match state.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    };
    for (id, child) in state.processes.drain() {
        error!(
            launch = %id,
            pid = %child.pid(),
            "Launch was not shut down! Destroying forcibly from safety net"
        );
        child.force_kill();
    }
}
