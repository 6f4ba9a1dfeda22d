//! Launch process configuration

use std::collections::HashMap;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info};

use crate::{
    child::ManagedChild,
    error::{ProcessError, Result},
};

/// Configuration for spawning a launch process.
///
/// Stdout is inherited so the service's regular output reaches the operator
/// directly; stderr is piped so a [`crate::ReadinessWatcher`] can scan it for
/// the startup marker.
#[derive(Debug, Clone)]
pub struct ProcessConfig {
    /// Executable command
    pub command: String,
    /// Command arguments
    pub args: Vec<String>,
    /// Working directory (None = current dir)
    pub working_dir: Option<PathBuf>,
    /// Environment variables (added to parent env)
    pub env: HashMap<String, String>,
}

impl ProcessConfig {
    /// Create new process configuration
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            args: vec![],
            working_dir: None,
            env: HashMap::new(),
        }
    }

    /// Set command arguments
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Append a single argument
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Set working directory
    pub fn working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    /// Add environment variable
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    /// Merge a set of environment variables
    pub fn envs(mut self, vars: &HashMap<String, String>) -> Self {
        for (key, value) in vars {
            self.env.insert(key.clone(), value.clone());
        }
        self
    }

    /// Spawn the configured process
    pub fn spawn(&self) -> Result<ManagedChild> {
        debug!(
            command = %self.command,
            args = ?self.args,
            "Spawning process"
        );

        let mut cmd = Command::new(&self.command);
        cmd.args(&self.args);

        if let Some(ref dir) = self.working_dir {
            cmd.current_dir(dir);
        }

        for (key, value) in &self.env {
            cmd.env(key, value);
        }

        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::inherit());
        cmd.stderr(Stdio::piped());

        let child = cmd.spawn()?;
        let pid = child.id().ok_or_else(|| {
            ProcessError::SpawnFailed(std::io::Error::other("Failed to get process ID"))
        })?;

        info!(pid = %pid, command = %self.command, "Process spawned");

        Ok(ManagedChild::new(child, pid))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_spawn_echo() {
        let config = ProcessConfig::new("echo").args(["hello"]);
        let child = config.spawn().unwrap();
        assert!(child.pid() > 0);
    }

    #[tokio::test]
    async fn test_spawn_missing_executable() {
        let config = ProcessConfig::new("definitely-not-a-real-binary");
        let err = config.spawn().unwrap_err();
        assert!(matches!(err, ProcessError::SpawnFailed(_)));
    }

    #[test]
    fn test_env_merge_order() {
        let mut shared = HashMap::new();
        shared.insert("A".to_string(), "shared".to_string());
        shared.insert("B".to_string(), "shared".to_string());

        let config = ProcessConfig::new("true").envs(&shared).env("A", "override");
        assert_eq!(config.env.get("A").unwrap(), "override");
        assert_eq!(config.env.get("B").unwrap(), "shared");
    }
}
