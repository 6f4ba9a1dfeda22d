//! Error types for launch configuration

use thiserror::Error;

/// Launch configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file
    #[error("Failed to read launch configuration: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to parse the configuration file
    #[error("Failed to parse launch configuration: {0}")]
    Parse(#[from] toml::de::Error),

    /// A declared launch is invalid
    #[error("Invalid launch configuration: {0}")]
    Invalid(String),
}

/// Result type for configuration operations
pub type Result<T> = std::result::Result<T, ConfigError>;
