//! Error types for process supervision

use std::io;
use thiserror::Error;

/// Process supervision errors
#[derive(Debug, Error)]
pub enum ProcessError {
    /// Failed to spawn process
    #[error("Failed to spawn process: {0}")]
    SpawnFailed(#[from] io::Error),

    /// A launch id was registered while still associated with a running process
    #[error("Launch id '{id}' is already associated with a process")]
    DuplicateLaunchId { id: String },

    /// The launch did not emit its startup marker within the deadline
    #[error("Launch '{id}' failed to start in {seconds} seconds")]
    StartTimeout { id: String, seconds: u64 },

    /// Failed to deliver a signal to a process
    #[error("Failed to signal process {pid}: {reason}")]
    SignalFailed { pid: u32, reason: String },
}

/// Result type for process operations
pub type Result<T> = std::result::Result<T, ProcessError>;
