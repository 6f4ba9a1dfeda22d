//! Start flow
//!
//! Launches are started strictly in declaration order: each launch must
//! resolve its readiness wait (detected or timed out) before the next one is
//! spawned, so cross-launch ordering is deterministic.

use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use launchkit_config::LaunchSet;
use launchkit_process::{ProcessError, ProcessTracker, ReadinessWatcher};
use tracing::{error, info, warn};

use crate::commands::args::build_process_config;

/// Start every non-skipped launch and register it with the tracker.
///
/// A spawn failure or a readiness timeout aborts the run; launches already
/// registered stay tracked and are torn down by the caller (or, at worst, by
/// the tracker's safety net).
pub async fn start_launches(set: &LaunchSet, work_dir: &Path, tracker: &ProcessTracker) -> Result<()> {
    for launch in &set.launches {
        if launch.skip {
            info!(launch = %launch.id, "Skipping starting launch");
            continue;
        }
        launch.validate()?;

        let config = build_process_config(launch, &set.environment_variables, work_dir);
        info!(launch = %launch.id, command = %config.command, args = ?config.args, "Starting launch");

        let mut child = config.spawn()?;
        let stderr = child.take_stderr().ok_or_else(|| {
            ProcessError::SpawnFailed(std::io::Error::other("child stderr was not piped"))
        })?;

        let watcher = ReadinessWatcher::spawn(stderr, &*launch.startup_marker);
        info!(launch = %launch.id, "Waiting for launch to start");

        let deadline = Duration::from_secs(launch.start_timeout_seconds);
        if !watcher.wait_ready(deadline).await {
            error!(
                launch = %launch.id,
                timeout_secs = launch.start_timeout_seconds,
                "Launch failed to start, stopping its process"
            );
            if let Err(e) = tracker.strategy().terminate(&mut child, false).await {
                warn!(launch = %launch.id, error = %e, "Failed to stop timed-out launch");
            }
            return Err(ProcessError::StartTimeout {
                id: launch.id.clone(),
                seconds: launch.start_timeout_seconds,
            }
            .into());
        }

        tracker.start_tracking(&launch.id, child)?;
        info!(launch = %launch.id, "Launch started");
    }

    Ok(())
}
