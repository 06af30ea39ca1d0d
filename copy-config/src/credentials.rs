//! Credential storage and resolution.

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use copy_primitives::Credential;
use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::error::{ConfigError, ConfigResult};
use crate::schema::{AppConfig, CredentialSource};

/// Fixed key under which the user-provided credential is stored.
pub const CREDENTIAL_KEY: &str = "gemini_api_key";

/// Small key-value store holding user-provided credentials.
pub trait CredentialStore: Send + Sync {
    /// Reads the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the backing storage cannot be read.
    fn load(&self, key: &str) -> ConfigResult<Option<String>>;

    /// Stores `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the backing storage cannot be written.
    fn store(&self, key: &str, value: &str) -> ConfigResult<()>;
}

/// In-memory store, mostly for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryCredentialStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn load(&self, key: &str) -> ConfigResult<Option<String>> {
        let values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(values.get(key).cloned())
    }

    fn store(&self, key: &str, value: &str) -> ConfigResult<()> {
        let mut values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        values.insert(key.to_owned(), value.to_owned());
        Ok(())
    }
}

/// Store backed by a JSON object file.
#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    /// Uses the file at `path`; it is created on first write.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Backing file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> ConfigResult<Map<String, Value>> {
        match fs::read_to_string(&self.path) {
            Ok(raw) => serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
                path: self.path.clone(),
                source,
            }),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(Map::new()),
            Err(source) => Err(self.io_error(source)),
        }
    }

    fn io_error(&self, source: std::io::Error) -> ConfigError {
        ConfigError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl CredentialStore for FileCredentialStore {
    fn load(&self, key: &str) -> ConfigResult<Option<String>> {
        let values = self.read_all()?;
        Ok(values
            .get(key)
            .and_then(Value::as_str)
            .map(ToOwned::to_owned))
    }

    fn store(&self, key: &str, value: &str) -> ConfigResult<()> {
        let mut values = self.read_all()?;
        values.insert(key.to_owned(), Value::String(value.to_owned()));

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|err| self.io_error(err))?;
        }
        let encoded = serde_json::to_vec_pretty(&Value::Object(values)).map_err(|source| {
            ConfigError::Parse {
                path: self.path.clone(),
                source,
            }
        })?;
        fs::write(&self.path, encoded).map_err(|err| self.io_error(err))?;
        restrict_permissions(&self.path).map_err(|err| self.io_error(err))?;

        debug!(path = %self.path.display(), "credential file updated");
        Ok(())
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o600))
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> std::io::Result<()> {
    Ok(())
}

type EnvLookup = Arc<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Resolves the credential from the configured source.
#[derive(Clone)]
pub struct CredentialProvider {
    source: CredentialSource,
    env_var: String,
    env_lookup: EnvLookup,
    store: Arc<dyn CredentialStore>,
}

impl fmt::Debug for CredentialProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialProvider")
            .field("source", &self.source)
            .field("env_var", &self.env_var)
            .finish_non_exhaustive()
    }
}

impl CredentialProvider {
    /// Reads the credential from environment variable `env_var` at resolve time.
    #[must_use]
    pub fn environment(env_var: impl Into<String>) -> Self {
        Self {
            source: CredentialSource::Environment,
            env_var: env_var.into(),
            env_lookup: Arc::new(|name: &str| std::env::var(name).ok()),
            store: Arc::new(MemoryCredentialStore::new()),
        }
    }

    /// Reads and writes the credential through `store`.
    #[must_use]
    pub fn user_provided(store: Arc<dyn CredentialStore>) -> Self {
        Self {
            source: CredentialSource::UserProvided,
            env_var: String::new(),
            env_lookup: Arc::new(|_: &str| None),
            store,
        }
    }

    /// Builds the provider selected by `config`.
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        match config.credential_source {
            CredentialSource::Environment => Self::environment(config.api_key_env.clone()),
            CredentialSource::UserProvided => Self::user_provided(Arc::new(
                FileCredentialStore::new(config.credential_file.clone()),
            )),
        }
    }

    /// Replaces the environment lookup function.
    #[must_use]
    pub fn with_env_lookup<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String> + Send + Sync + 'static,
    {
        self.env_lookup = Arc::new(lookup);
        self
    }

    /// Active source.
    #[must_use]
    pub const fn source(&self) -> CredentialSource {
        self.source
    }

    /// Returns the current credential, or `None` when none is set.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the credential store cannot be read.
    pub fn resolve(&self) -> ConfigResult<Option<Credential>> {
        let raw = match self.source {
            CredentialSource::Environment => (self.env_lookup)(&self.env_var),
            CredentialSource::UserProvided => self.store.load(CREDENTIAL_KEY)?,
        };
        Ok(raw.and_then(Credential::new))
    }

    /// Persists a user-entered credential.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ReadOnlySource`] for the environment source, or a
    /// store error if writing fails.
    pub fn save(&self, value: &str) -> ConfigResult<()> {
        match self.source {
            CredentialSource::Environment => {
                Err(ConfigError::ReadOnlySource(self.source.as_str()))
            }
            CredentialSource::UserProvided => {
                self.store.store(CREDENTIAL_KEY, value.trim())?;
                info!("credential saved");
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn environment_source_reads_variable() {
        let provider = CredentialProvider::environment("API_KEY")
            .with_env_lookup(|name| (name == "API_KEY").then(|| "env-key".to_owned()));
        let credential = provider.resolve().unwrap().expect("credential");
        assert_eq!(credential.expose(), "env-key");
    }

    #[test]
    fn environment_source_is_read_only() {
        let provider = CredentialProvider::environment("API_KEY").with_env_lookup(|_| None);
        assert!(provider.resolve().unwrap().is_none());
        assert!(matches!(
            provider.save("abc"),
            Err(ConfigError::ReadOnlySource("environment"))
        ));
    }

    #[test]
    fn user_provided_round_trips_through_store() {
        let provider = CredentialProvider::user_provided(Arc::new(MemoryCredentialStore::new()));
        assert!(provider.resolve().unwrap().is_none());

        provider.save("  user-key  ").unwrap();
        assert_eq!(provider.resolve().unwrap().unwrap().expose(), "user-key");
    }

    #[test]
    fn blank_saved_value_reads_as_missing() {
        let provider = CredentialProvider::user_provided(Arc::new(MemoryCredentialStore::new()));
        provider.save("   ").unwrap();
        assert!(provider.resolve().unwrap().is_none());
    }

    #[test]
    fn file_store_persists_under_fixed_key() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/credentials.json");
        let store = FileCredentialStore::new(&path);

        assert_eq!(store.load(CREDENTIAL_KEY).unwrap(), None);
        store.store(CREDENTIAL_KEY, "file-key").unwrap();
        store.store("other", "kept").unwrap();

        let reopened = FileCredentialStore::new(&path);
        assert_eq!(reopened.load(CREDENTIAL_KEY).unwrap().as_deref(), Some("file-key"));
        assert_eq!(reopened.load("other").unwrap().as_deref(), Some("kept"));

        let raw: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw[CREDENTIAL_KEY], "file-key");
    }

    #[test]
    fn from_config_selects_one_source() {
        let config = AppConfig {
            credential_source: CredentialSource::Environment,
            ..AppConfig::default()
        };
        assert_eq!(
            CredentialProvider::from_config(&config).source(),
            CredentialSource::Environment
        );
        assert_eq!(
            CredentialProvider::from_config(&AppConfig::default()).source(),
            CredentialSource::UserProvided
        );
    }
}
