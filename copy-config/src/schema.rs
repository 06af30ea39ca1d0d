//! Strongly typed configuration schema.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};

/// Where the API credential comes from. Exactly one source is active.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CredentialSource {
    /// Read from an environment variable set at deploy time.
    Environment,
    /// Entered by the user and persisted in a local credential file.
    #[default]
    UserProvided,
}

impl CredentialSource {
    /// Configuration spelling of the source.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Environment => "environment",
            Self::UserProvided => "user_provided",
        }
    }
}

/// Application configuration. Every field has a default.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    /// Active credential source.
    pub credential_source: CredentialSource,
    /// Environment variable read when `credential_source` is `environment`.
    pub api_key_env: String,
    /// Credential file used when `credential_source` is `user_provided`.
    pub credential_file: PathBuf,
    /// Gemini model identifier.
    pub model: String,
    /// Gemini API root.
    pub base_url: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            credential_source: CredentialSource::default(),
            api_key_env: "API_KEY".to_owned(),
            credential_file: PathBuf::from(".trigger-copy/credentials.json"),
            model: "gemini-2.5-flash".to_owned(),
            base_url: "https://generativelanguage.googleapis.com/".to_owned(),
            timeout_secs: 60,
        }
    }
}

impl AppConfig {
    /// Request timeout as a [`Duration`].
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Checks value constraints and normalises the base URL.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] describing the first offending field.
    pub fn validate(mut self) -> ConfigResult<Self> {
        if self.model.trim().is_empty() {
            return Err(ConfigError::invalid("model cannot be empty"));
        }
        if self.timeout_secs == 0 {
            return Err(ConfigError::invalid("timeout_secs must be greater than zero"));
        }
        let base = self.base_url.trim();
        if !(base.starts_with("http://") || base.starts_with("https://")) {
            return Err(ConfigError::invalid(
                "base_url must start with http:// or https://",
            ));
        }
        let mut base = base.to_owned();
        if !base.ends_with('/') {
            base.push('/');
        }
        self.base_url = base;

        if self.credential_source == CredentialSource::Environment
            && self.api_key_env.trim().is_empty()
        {
            return Err(ConfigError::invalid(
                "api_key_env is required for the environment credential source",
            ));
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = AppConfig::default().validate().expect("defaults");
        assert_eq!(config.credential_source, CredentialSource::UserProvided);
        assert_eq!(config.timeout(), Duration::from_secs(60));
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config: AppConfig =
            serde_json::from_str(r#"{ "credential_source": "environment" }"#).unwrap();
        assert_eq!(config.credential_source, CredentialSource::Environment);
        assert_eq!(config.api_key_env, "API_KEY");
    }

    #[test]
    fn unknown_fields_are_rejected() {
        assert!(serde_json::from_str::<AppConfig>(r#"{ "modle": "x" }"#).is_err());
    }

    #[test]
    fn base_url_is_normalised() {
        let config = AppConfig {
            base_url: " http://localhost:8080 ".to_owned(),
            ..AppConfig::default()
        };
        assert_eq!(config.validate().unwrap().base_url, "http://localhost:8080/");
    }

    #[test]
    fn zero_timeout_is_invalid() {
        let config = AppConfig {
            timeout_secs: 0,
            ..AppConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid { .. })));
    }
}
