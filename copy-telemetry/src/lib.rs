//! Observability utilities for trigger-copy binaries.

#![warn(missing_docs, clippy::pedantic)]

use thiserror::Error;
use tracing_subscriber::EnvFilter;

/// Directive used when `RUST_LOG` is unset.
pub const DEFAULT_DIRECTIVE: &str = "info";

/// Errors raised while installing the subscriber.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// The filter directive could not be parsed.
    #[error("invalid log directive `{directive}`: {reason}")]
    InvalidDirective {
        /// Offending directive.
        directive: String,
        /// Parser message.
        reason: String,
    },
    /// A global subscriber was already installed.
    #[error("tracing subscriber already initialised: {0}")]
    AlreadyInitialized(String),
}

/// Subscriber settings.
#[derive(Clone, Debug)]
pub struct TelemetryConfig {
    /// Filter directive applied when `RUST_LOG` is unset.
    pub directive: String,
    /// Whether to print event targets.
    pub with_target: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            directive: DEFAULT_DIRECTIVE.to_owned(),
            with_target: false,
        }
    }
}

impl TelemetryConfig {
    /// Raises verbosity to `debug` for the workspace crates.
    #[must_use]
    pub fn verbose(mut self) -> Self {
        self.directive =
            "info,copy_adapters=debug,copy_prompts=debug,copy_session=debug".to_owned();
        self
    }
}

/// Builds the filter: `RUST_LOG` when set, otherwise `directive`.
///
/// # Errors
///
/// Returns [`TelemetryError::InvalidDirective`] if `directive` does not parse.
pub fn build_filter(directive: &str) -> Result<EnvFilter, TelemetryError> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    EnvFilter::try_new(directive).map_err(|err| TelemetryError::InvalidDirective {
        directive: directive.to_owned(),
        reason: err.to_string(),
    })
}

/// Installs a `fmt` subscriber as the global default.
///
/// # Errors
///
/// Returns [`TelemetryError`] if the directive is invalid or a subscriber is
/// already installed.
pub fn init_tracing(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    let filter = build_filter(&config.directive)?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(config.with_target)
        .try_init()
        .map_err(|err| TelemetryError::AlreadyInitialized(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_and_verbose_directives_parse() {
        assert!(EnvFilter::try_new(TelemetryConfig::default().directive).is_ok());
        assert!(EnvFilter::try_new(TelemetryConfig::default().verbose().directive).is_ok());
    }

    #[test]
    fn second_init_reports_already_initialized() {
        let config = TelemetryConfig::default();
        let _ = init_tracing(&config);
        assert!(matches!(
            init_tracing(&config),
            Err(TelemetryError::AlreadyInitialized(_))
        ));
    }
}
