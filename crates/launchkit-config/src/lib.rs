//! # launchkit-config
//!
//! **Purpose**: Declarative configuration of supervised launches
//!
//! A launch set declares the long-running services to start for one
//! build/test cycle: their programs, startup markers, timeouts, launcher
//! arguments and environment. Loaded from TOML and validated up front so
//! configuration mistakes fail the run before any process is spawned.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

pub mod arguments;
pub mod error;
pub mod launch;

pub use arguments::LauncherArguments;
pub use error::{ConfigError, Result};
pub use launch::{Launch, DEFAULT_STARTUP_MARKER, DEFAULT_START_TIMEOUT_SECS};

/// The full launch declaration for one supervised run
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct LaunchSet {
    /// Environment variables shared by every launch
    #[serde(default)]
    pub environment_variables: HashMap<String, String>,
    /// Declared launches, started in order
    #[serde(default)]
    pub launches: Vec<Launch>,
}

impl LaunchSet {
    /// Load a launch set from a TOML file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        debug!(path = %path.display(), "Loading launch configuration");
        let content = std::fs::read_to_string(path)?;
        Self::load_from_str(&content)
    }

    /// Load a launch set from a TOML string
    pub fn load_from_str(content: &str) -> Result<Self> {
        let set: LaunchSet = toml::from_str(content)?;
        set.validate()?;
        info!(launches = set.launches.len(), "Loaded launch configuration");
        Ok(set)
    }

    /// Validate every launch and reject duplicate ids
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for launch in &self.launches {
            launch.validate()?;
            if !seen.insert(launch.id.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "duplicate launch id '{}'",
                    launch.id
                )));
            }
        }
        Ok(())
    }
}
