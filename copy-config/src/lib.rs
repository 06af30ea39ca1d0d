//! Configuration management for trigger-copy.
//!
//! [`schema::AppConfig`] is loaded from a JSON file by [`loader::load_config`];
//! [`credentials::CredentialProvider`] resolves the API credential from the
//! single configured [`schema::CredentialSource`].

#![warn(missing_docs, clippy::pedantic)]

pub mod credentials;
pub mod loader;
pub mod schema;

mod error;

pub use credentials::{
    CREDENTIAL_KEY, CredentialProvider, CredentialStore, FileCredentialStore,
    MemoryCredentialStore,
};
pub use error::{ConfigError, ConfigResult};
pub use loader::load_config;
pub use schema::{AppConfig, CredentialSource};
