//! Stop flow

use anyhow::Result;
use launchkit_config::Launch;
use launchkit_process::ProcessTracker;
use tracing::info;

/// Stop every non-skipped launch.
///
/// Unknown or already-stopped ids are no-ops inside the tracker, so a stop
/// pass is safe to run even after a partially failed start.
pub async fn stop_launches(launches: &[Launch], tracker: &ProcessTracker) -> Result<()> {
    for launch in launches {
        if launch.skip {
            info!(launch = %launch.id, "Skipping stopping launch");
            continue;
        }

        info!(launch = %launch.id, "Stopping launch");
        tracker.stop(&launch.id).await?;
    }
    Ok(())
}
