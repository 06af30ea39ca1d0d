//! Configuration file loading.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use tracing::debug;

use crate::error::{ConfigError, ConfigResult};
use crate::schema::AppConfig;

/// Loads and validates configuration from a JSON file.
///
/// A missing file yields the defaults.
///
/// # Errors
///
/// Returns [`ConfigError`] if the file cannot be read, parsed, or validated.
pub fn load_config(path: &Path) -> ConfigResult<AppConfig> {
    let config = match fs::read_to_string(path) {
        Ok(raw) => serde_json::from_str::<AppConfig>(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_owned(),
            source,
        })?,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            debug!(path = %path.display(), "config file not found, using defaults");
            AppConfig::default()
        }
        Err(source) => {
            return Err(ConfigError::Io {
                path: path.to_owned(),
                source,
            });
        }
    };
    config.validate()
}
