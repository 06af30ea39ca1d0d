use std::path::PathBuf;

use thiserror::Error;

/// Result alias for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors emitted while loading configuration or credentials.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Underlying I/O failure.
    #[error("i/o error on {path}: {source}")]
    Io {
        /// File being accessed.
        path: PathBuf,
        /// Source [`std::io::Error`].
        source: std::io::Error,
    },
    /// File contents were not valid JSON for the expected type.
    #[error("failed to parse {path}: {source}")]
    Parse {
        /// File being parsed.
        path: PathBuf,
        /// Source [`serde_json::Error`].
        source: serde_json::Error,
    },
    /// A configuration value failed validation.
    #[error("invalid configuration: {reason}")]
    Invalid {
        /// Human-readable reason.
        reason: String,
    },
    /// The credential cannot be changed for the configured source.
    #[error("credential source `{0}` is read-only")]
    ReadOnlySource(&'static str),
}

impl ConfigError {
    /// Helper to construct validation errors.
    #[must_use]
    pub fn invalid(reason: impl Into<String>) -> Self {
        Self::Invalid {
            reason: reason.into(),
        }
    }
}
