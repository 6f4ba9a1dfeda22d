//! Declarative launch configuration

use std::collections::HashMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::arguments::LauncherArguments;
use crate::error::{ConfigError, Result};

/// Default startup marker emitted by the launched framework
pub const DEFAULT_STARTUP_MARKER: &str = "Framework started";

/// Default startup timeout in seconds
pub const DEFAULT_START_TIMEOUT_SECS: u64 = 180;

/// One declared long-running service to start and later stop.
///
/// The `program` and optional `feature_file` are resolved, filesystem-local
/// paths; resolving them from a repository is the caller's concern.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Launch {
    /// Unique id of this launch, used as the registry key
    pub id: String,
    /// Skip starting and stopping this launch entirely
    #[serde(default)]
    pub skip: bool,
    /// Program to execute
    pub program: String,
    /// Feature/configuration file handed to the program via `-f`
    #[serde(default)]
    pub feature_file: Option<PathBuf>,
    /// Substring of a diagnostic line that signals successful startup
    #[serde(default = "default_startup_marker")]
    pub startup_marker: String,
    /// Bounded wait for the startup marker
    #[serde(default = "default_start_timeout")]
    pub start_timeout_seconds: u64,
    /// Extra arguments for the launcher command line
    #[serde(default)]
    pub launcher_arguments: LauncherArguments,
    /// Environment overrides for this launch, applied over the shared set
    #[serde(default)]
    pub environment_variables: HashMap<String, String>,
    /// Working directory for the launched process
    #[serde(default)]
    pub working_directory: Option<PathBuf>,
}

fn default_startup_marker() -> String {
    DEFAULT_STARTUP_MARKER.to_string()
}

fn default_start_timeout() -> u64 {
    DEFAULT_START_TIMEOUT_SECS
}

impl Launch {
    /// Validate this launch declaration.
    ///
    /// Skipped launches are validated too; a typo should surface even when the
    /// launch is currently disabled.
    pub fn validate(&self) -> Result<()> {
        if self.id.is_empty() {
            return Err(ConfigError::Invalid("the launch id is mandatory".into()));
        }
        if !self
            .id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
        {
            return Err(ConfigError::Invalid(format!(
                "launch id '{}' may only contain letters, digits, '_', '.' and '-'",
                self.id
            )));
        }
        if self.program.is_empty() {
            return Err(ConfigError::Invalid(format!(
                "launch '{}' declares no program",
                self.id
            )));
        }
        if self.start_timeout_seconds == 0 {
            return Err(ConfigError::Invalid(format!(
                "launch '{}' declares a zero start timeout",
                self.id
            )));
        }
        if self.startup_marker.is_empty() {
            return Err(ConfigError::Invalid(format!(
                "launch '{}' declares an empty startup marker",
                self.id
            )));
        }
        if let Some(feature_file) = &self.feature_file {
            if !feature_file.exists() {
                return Err(ConfigError::Invalid(format!(
                    "launch '{}' references missing feature file {}",
                    self.id,
                    feature_file.display()
                )));
            }
        }
        Ok(())
    }
}
