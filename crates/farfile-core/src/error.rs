//! Error types for remote operations and configuration.

use std::path::PathBuf;

use thiserror::Error;

/// Result alias for calls into a [`DeviceCommands`](crate::DeviceCommands) backend.
pub type DeviceResult<T> = Result<T, DeviceError>;

/// Failure reported by the remote device.
///
/// Every remote failure collapses into a single class whose message is shown
/// to the user verbatim. Permission, not-found and transport errors are not
/// distinguished.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeviceError {
    /// The remote operation was rejected.
    #[error("{message}")]
    OperationFailed { message: String },
}

impl DeviceError {
    /// Create an operation failure from any displayable message.
    pub fn failed(message: impl Into<String>) -> Self {
        Self::OperationFailed {
            message: message.into(),
        }
    }

    /// The displayable message carried by this error.
    pub fn message(&self) -> &str {
        match self {
            Self::OperationFailed { message } => message,
        }
    }
}

impl From<std::io::Error> for DeviceError {
    fn from(err: std::io::Error) -> Self {
        Self::failed(err.to_string())
    }
}

/// Errors that can occur while loading or saving configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read or written.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The config file is not valid TOML for this schema.
    #[error("Invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// The config could not be serialized.
    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// A value is outside its allowed range.
    #[error("Invalid configuration: {message}")]
    Invalid { message: String },

    /// No platform config directory is available.
    #[error("No config directory available")]
    NoConfigDir,
}
