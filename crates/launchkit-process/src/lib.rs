//! # launchkit-process
//!
//! **Purpose**: Supervision of long-running service processes for one build/test cycle
//!
//! Provides process spawning, startup readiness detection via a marker line in the
//! diagnostic output, a thread-safe registry of running launches, and bounded
//! graceful/forceful termination including process-tree teardown for platforms
//! that start services through an intermediate launcher script.
//!
//! ## Features
//!
//! - **Process Spawning**: Async process creation with merged environment and working directory
//! - **Readiness Detection**: Background scan of the child's stderr for a startup marker line
//! - **Launch Registry**: Mutex-guarded id-to-process map with idempotent stop
//! - **Graceful Shutdown**: SIGTERM with bounded grace period, SIGKILL escalation
//! - **Tree Teardown**: Transitive descendant termination for indirect launchers
//! - **Orphan Safety Net**: Interrupt hook that force-kills any launch still registered
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use launchkit_process::{ProcessConfig, ProcessTracker, ReadinessWatcher, TerminationStrategy};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let tracker = ProcessTracker::new(TerminationStrategy::for_host());
//!
//! let config = ProcessConfig::new("service").args(["--port", "8090"]);
//! let mut child = config.spawn()?;
//!
//! let stderr = child.take_stderr().expect("stderr is piped");
//! let watcher = ReadinessWatcher::spawn(stderr, "Framework started");
//! if watcher.wait_ready(Duration::from_secs(180)).await {
//!     tracker.start_tracking("svc", child)?;
//! }
//!
//! // Later, on demand
//! tracker.stop("svc").await?;
//! # Ok(())
//! # }
//! ```

pub mod child;
pub mod config;
pub mod error;
pub mod terminate;
pub mod tracker;
pub mod watcher;

pub use child::ManagedChild;
pub use config::ProcessConfig;
pub use error::{ProcessError, Result};
pub use terminate::TerminationStrategy;
pub use tracker::ProcessTracker;
pub use watcher::{ReadinessSignal, ReadinessWatcher};
